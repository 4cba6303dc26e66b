//! Observable state reported by the game client.
//!
//! Every value sits behind a `watch` channel and is only republished on material change,
//! so subscribers never recompute for a tick that read identical content.

use serde::Serialize;
use tokio::sync::watch;
use utoipa::ToSchema;

use crate::state::live::{ApiMod, ChatMessage, Phase, TournamentBeatmap, UNKNOWN_BEATMAP_ID};

/// Latest values read from the IPC directory.
pub struct InboundState {
    enabled: watch::Sender<bool>,
    beatmap_id: watch::Sender<i64>,
    beatmap: watch::Sender<Option<TournamentBeatmap>>,
    mods: watch::Sender<Vec<ApiMod>>,
    phase: watch::Sender<Phase>,
    scores: watch::Sender<(i64, i64)>,
    chat: watch::Sender<Vec<ChatMessage>>,
}

/// Point-in-time copy of [`InboundState`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InboundSnapshot {
    /// Whether the poller is reading the IPC directory.
    pub enabled: bool,
    /// Current beatmap id, `-1` when the beatmap is not submitted online.
    pub beatmap_id: i64,
    /// Resolved details of the current beatmap.
    pub beatmap: Option<TournamentBeatmap>,
    /// Mods required on the current beatmap.
    pub mods: Vec<ApiMod>,
    /// Phase reported by the client.
    pub phase: Phase,
    /// Live `(red, blue)` scores.
    #[schema(value_type = Vec<i64>)]
    pub scores: (i64, i64),
    /// Accumulated chat history.
    pub chat: Vec<ChatMessage>,
}

impl InboundState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: watch::channel(enabled).0,
            beatmap_id: watch::channel(UNKNOWN_BEATMAP_ID).0,
            beatmap: watch::channel(None).0,
            mods: watch::channel(Vec::new()).0,
            phase: watch::channel(Phase::default()).0,
            scores: watch::channel((0, 0)).0,
            chat: watch::channel(Vec::new()).0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Toggle inbound synchronisation. Returns whether the flag changed.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        replace_if_changed(&self.enabled, enabled)
    }

    pub fn enabled_watcher(&self) -> watch::Receiver<bool> {
        self.enabled.subscribe()
    }

    pub fn current_beatmap_id(&self) -> i64 {
        *self.beatmap_id.borrow()
    }

    pub fn set_beatmap_id(&self, beatmap_id: i64) -> bool {
        replace_if_changed(&self.beatmap_id, beatmap_id)
    }

    pub fn beatmap_id_watcher(&self) -> watch::Receiver<i64> {
        self.beatmap_id.subscribe()
    }

    pub fn current_beatmap(&self) -> Option<TournamentBeatmap> {
        self.beatmap.borrow().clone()
    }

    pub fn set_beatmap(&self, beatmap: Option<TournamentBeatmap>) -> bool {
        replace_if_changed(&self.beatmap, beatmap)
    }

    pub fn set_mods(&self, mods: Vec<ApiMod>) -> bool {
        replace_if_changed(&self.mods, mods)
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Publish a phase, returning the previous one when it changed.
    pub fn set_phase(&self, phase: Phase) -> Option<Phase> {
        let mut previous = None;
        self.phase.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            previous = Some(std::mem::replace(current, phase));
            true
        });
        previous
    }

    pub fn phase_watcher(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn scores(&self) -> (i64, i64) {
        *self.scores.borrow()
    }

    pub fn set_scores(&self, scores: (i64, i64)) -> bool {
        replace_if_changed(&self.scores, scores)
    }

    /// Merge a batch of chat lines read in one tick. An empty batch changes nothing.
    pub fn merge_chat(&self, batch: &[ChatMessage]) -> bool {
        self.chat
            .send_if_modified(|history| merge_chat_batch(history, batch))
    }

    /// Forget the chat history, as when the client truncated its chat file.
    pub fn clear_chat(&self) -> bool {
        self.chat.send_if_modified(|history| {
            let changed = !history.is_empty();
            history.clear();
            changed
        })
    }

    pub fn chat_watcher(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.chat.subscribe()
    }

    pub fn snapshot(&self) -> InboundSnapshot {
        InboundSnapshot {
            enabled: self.is_enabled(),
            beatmap_id: self.current_beatmap_id(),
            beatmap: self.current_beatmap(),
            mods: self.mods.borrow().clone(),
            phase: self.phase(),
            scores: self.scores(),
            chat: self.chat.borrow().clone(),
        }
    }
}

fn replace_if_changed<T: PartialEq>(sender: &watch::Sender<T>, value: T) -> bool {
    sender.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    })
}

/// Fold a freshly read chat batch into `history`.
///
/// The first line of the batch is the oldest message still present in the file, so
/// anything older was truncated away by the writer and is dropped. Lines are then
/// accepted only when strictly newer than the last accepted one.
///
/// A batch without any decodable line carries no information and leaves `history` as is.
pub fn merge_chat_batch(history: &mut Vec<ChatMessage>, batch: &[ChatMessage]) -> bool {
    let Some(first) = batch.first() else {
        return false;
    };

    let before = history.len();
    history.retain(|message| message.timestamp_ms >= first.timestamp_ms);
    let mut changed = history.len() != before;

    let mut last_accepted = history
        .last()
        .map(|message| message.timestamp_ms)
        .unwrap_or(i64::MIN);

    for message in batch {
        if message.timestamp_ms > last_accepted {
            last_accepted = message.timestamp_ms;
            history.push(message.clone());
            changed = true;
        }
    }

    changed
}
