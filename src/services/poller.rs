//! Inbound half of the IPC protocol: turns the files written by the game client into
//! observable state.
//!
//! Each resource is read and decoded on its own. A busy or malformed resource only means
//! "no update this tick" and never keeps the others from being processed.

use std::sync::{Arc, Weak};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, trace, warn};

use crate::{
    ipc::{
        ChannelError, files,
        records::{BeatmapRecord, parse_phase, parse_scores},
    },
    services::{match_service, sse_events},
    state::{
        AppState, SharedState,
        live::{BeatmapMetadata, ChatMessage, TournamentBeatmap, UNKNOWN_BEATMAP_ID},
    },
};

/// Periodic reader of the IPC directory.
pub struct InboundPoller {
    /// Last beatmap record seen, compared verbatim to detect changes.
    last_record: Option<BeatmapRecord>,
    lookup: Option<JoinHandle<()>>,
    background: Option<JoinHandle<()>>,
}

impl Default for InboundPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundPoller {
    pub fn new() -> Self {
        Self {
            last_record: None,
            lookup: None,
            background: None,
        }
    }

    /// Run the poller in the background until the application state is dropped.
    pub fn spawn(state: &SharedState) -> JoinHandle<()> {
        let weak = Arc::downgrade(state);
        let every = state.config().poll_interval;
        let mut enabled = state.inbound().enabled_watcher();

        tokio::spawn(async move {
            let mut poller = InboundPoller::new();
            let mut interval = interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if !*enabled.borrow_and_update() {
                    debug!("inbound sync disabled; poller idle");
                    if enabled.changed().await.is_err() {
                        break;
                    }
                    interval.reset();
                    continue;
                }

                interval.tick().await;

                let Some(state) = weak.upgrade() else {
                    break;
                };
                poller.tick(&state).await;
            }

            poller.cancel_tasks();
            info!("inbound poller stopped");
        })
    }

    /// Read every resource once.
    pub async fn tick(&mut self, state: &SharedState) {
        self.poll_beatmap(state).await;
        self.poll_metadata(state).await;
        poll_chat(state).await;
        poll_scores(state).await;
        poll_phase(state).await;
    }

    fn cancel_tasks(&mut self) {
        for task in [self.lookup.take(), self.background.take()].into_iter().flatten() {
            task.abort();
        }
    }

    async fn poll_beatmap(&mut self, state: &SharedState) {
        let Some(text) = read_resource(state, files::BEATMAP).await else {
            return;
        };
        let record = match BeatmapRecord::parse(&text) {
            Ok(record) => record,
            Err(err) => {
                trace!(resource = files::BEATMAP, error = %err, "beatmap record not decodable yet");
                return;
            }
        };

        if self.last_record.as_ref() == Some(&record) {
            return;
        }
        self.last_record = Some(record.clone());

        let beatmap_id = record.beatmap_id;
        let mods = record.parsed_mods().unwrap_or_else(|err| {
            debug!(beatmap_id, error = %err, "mods line not decodable; clearing mods");
            Vec::new()
        });

        let inbound = state.inbound();
        inbound.set_mods(mods.clone());

        if inbound.set_beatmap_id(beatmap_id) {
            debug!(beatmap_id, "client beatmap changed");
            if let Some(task) = self.lookup.take() {
                task.abort();
            }
            inbound.set_beatmap(None);

            if beatmap_id != UNKNOWN_BEATMAP_ID {
                self.resolve_beatmap(state, beatmap_id).await;
                match_service::on_inbound_beatmap(state, beatmap_id).await;
            }
        }

        sse_events::broadcast_beatmap_changed(state, beatmap_id, inbound.current_beatmap(), mods);
    }

    /// Resolve details from the pool first, then through the lookup service.
    async fn resolve_beatmap(&mut self, state: &SharedState, beatmap_id: i64) {
        let pooled = {
            let current = state.current_match().read().await;
            current
                .round()
                .and_then(|round| round.find(beatmap_id))
                .and_then(|entry| entry.beatmap.clone())
        };

        if let Some(beatmap) = pooled {
            apply_lookup_result(state, beatmap_id, Some(beatmap));
            return;
        }

        let lookup = state.lookup();
        let weak = Arc::downgrade(state);
        self.lookup = Some(tokio::spawn(async move {
            let result = lookup.lookup(beatmap_id).await;
            let Some(state) = weak.upgrade() else {
                return;
            };

            match result {
                Ok(found) => {
                    apply_lookup_result(&state, beatmap_id, found);
                }
                Err(err) => warn!(beatmap_id, error = %err, "beatmap lookup failed"),
            }
        }));
    }

    /// Metadata written by the client for beatmaps without an online id.
    async fn poll_metadata(&mut self, state: &SharedState) {
        let inbound = state.inbound();
        if inbound.current_beatmap_id() != UNKNOWN_BEATMAP_ID {
            return;
        }

        let Some(text) = read_resource(state, files::BEATMAP_METADATA).await else {
            return;
        };
        let metadata: BeatmapMetadata = match serde_json::from_str(&text) {
            Ok(metadata) => metadata,
            Err(err) => {
                trace!(resource = files::BEATMAP_METADATA, error = %err, "metadata not decodable yet");
                return;
            }
        };

        let displayed_md5 = inbound.current_beatmap().map(|beatmap| beatmap.md5);
        if displayed_md5.as_deref() == Some(metadata.md5.as_str()) {
            return;
        }

        if let Some(task) = self.background.take() {
            task.abort();
        }

        let channel = state.channel();
        let cover = if channel.exists(files::BEATMAP_BACKGROUND).await {
            background_location(state)
        } else {
            self.background = Some(spawn_background_watch(state, metadata.md5.clone()));
            String::new()
        };

        info!(md5 = %metadata.md5, title = %metadata.title, "client beatmap read from metadata");
        publish_beatmap(state, metadata.to_beatmap(&cover));
    }
}

/// Apply a lookup result if `requested_id` is still the client's beatmap.
///
/// Returns whether the result was applied; results for an outdated id are dropped.
pub fn apply_lookup_result(
    state: &SharedState,
    requested_id: i64,
    beatmap: Option<TournamentBeatmap>,
) -> bool {
    let current_id = state.inbound().current_beatmap_id();
    if current_id != requested_id {
        debug!(requested_id, current_id, "dropping stale beatmap lookup");
        return false;
    }

    publish_beatmap(
        state,
        beatmap.unwrap_or_else(|| TournamentBeatmap {
            online_id: requested_id,
            ..TournamentBeatmap::default()
        }),
    );
    true
}

fn publish_beatmap(state: &SharedState, beatmap: TournamentBeatmap) {
    let inbound = state.inbound();
    if inbound.set_beatmap(Some(beatmap)) {
        let snapshot = inbound.snapshot();
        sse_events::broadcast_beatmap_changed(
            state,
            snapshot.beatmap_id,
            snapshot.beatmap,
            snapshot.mods,
        );
    }
}

fn background_location(state: &AppState) -> String {
    state
        .channel()
        .resource_path(files::BEATMAP_BACKGROUND)
        .display()
        .to_string()
}

/// Wait for the background image of the metadata beatmap `md5`, then publish it as cover.
///
/// Stops early once the client moves on to another beatmap.
fn spawn_background_watch(state: &SharedState, md5: String) -> JoinHandle<()> {
    let weak: Weak<AppState> = Arc::downgrade(state);
    let every = state.config().background_poll;

    tokio::spawn(async move {
        let mut interval = interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let Some(state) = weak.upgrade() else {
                break;
            };

            let inbound = state.inbound();
            let Some(beatmap) = inbound.current_beatmap() else {
                break;
            };
            if inbound.current_beatmap_id() != UNKNOWN_BEATMAP_ID || beatmap.md5 != md5 {
                trace!(md5 = %md5, "beatmap changed; background watch stopped");
                break;
            }

            if state.channel().exists(files::BEATMAP_BACKGROUND).await {
                let cover = background_location(&state);
                debug!(md5 = %md5, cover = %cover, "beatmap background available");
                publish_beatmap(&state, TournamentBeatmap { cover, ..beatmap });
                break;
            }
        }
    })
}

async fn poll_chat(state: &SharedState) {
    let Some(text) = read_resource(state, files::CHAT).await else {
        return;
    };

    let inbound = state.inbound();
    let changed = if text.is_empty() {
        inbound.clear_chat()
    } else {
        // A file with no complete line is mid-write; the next tick reads it whole.
        let batch: Vec<ChatMessage> = text.lines().filter_map(ChatMessage::parse_line).collect();
        inbound.merge_chat(&batch)
    };

    if changed {
        let chat = inbound.snapshot().chat;
        trace!(lines = chat.len(), "chat history updated");
        sse_events::broadcast_chat_changed(state, chat);
    }
}

async fn poll_scores(state: &SharedState) {
    let Some(text) = read_resource(state, files::SCORES).await else {
        return;
    };

    match parse_scores(&text) {
        Ok(scores) => {
            if state.inbound().set_scores(scores) {
                sse_events::broadcast_scores_changed(state, scores);
            }
        }
        Err(err) => trace!(resource = files::SCORES, error = %err, "scores not decodable yet"),
    }
}

async fn poll_phase(state: &SharedState) {
    let Some(text) = read_resource(state, files::STATE).await else {
        return;
    };

    let phase = match parse_phase(&text) {
        Ok(phase) => phase,
        Err(err) => {
            trace!(resource = files::STATE, error = %err, "phase not decodable yet");
            return;
        }
    };

    if let Some(previous) = state.inbound().set_phase(phase) {
        info!(%previous, %phase, "client phase changed");
        sse_events::broadcast_phase_changed(state, phase, previous);
        match_service::on_phase_changed(state, previous, phase).await;
    }
}

async fn read_resource(state: &AppState, name: &str) -> Option<String> {
    match state.channel().read_text(name).await {
        Ok(text) => Some(text),
        Err(err @ ChannelError::Busy { .. }) => {
            trace!(resource = name, error = %err, "resource busy");
            None
        }
        Err(err) => {
            debug!(resource = name, error = %err, "resource unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::lookup::{BeatmapLookup, LookupResult, NoopLookup},
        ipc::FileChannel,
        state::match_state::{MatchState, Round, RoundBeatmap},
    };

    /// Lookup that answers only once released.
    struct GatedLookup {
        gate: Arc<Notify>,
    }

    impl BeatmapLookup for GatedLookup {
        fn lookup(&self, beatmap_id: i64) -> BoxFuture<'static, LookupResult<Option<TournamentBeatmap>>> {
            let gate = Arc::clone(&self.gate);
            Box::pin(async move {
                gate.notified().await;
                Ok(Some(TournamentBeatmap {
                    online_id: beatmap_id,
                    title: format!("map {beatmap_id}"),
                    ..TournamentBeatmap::default()
                }))
            })
        }
    }

    fn shared_state(lookup: Arc<dyn BeatmapLookup>) -> SharedState {
        let root = std::env::temp_dir().join(format!("tourney-link-poller-{}", Uuid::new_v4()));
        let config = AppConfig {
            ipc_root: root.clone(),
            auto_pick: false,
            ..AppConfig::default()
        };
        let channel = FileChannel::new(root, Duration::from_millis(5)).unwrap();
        AppState::new(config, channel, lookup)
    }

    async fn write(state: &SharedState, name: &str, contents: &str) {
        state
            .channel()
            .write_resource(name, contents.to_owned())
            .await
            .unwrap();
    }

    async fn wait_for_title(state: &SharedState) -> Option<String> {
        for _ in 0..100 {
            if let Some(beatmap) = state.inbound().current_beatmap() {
                if !beatmap.title.is_empty() {
                    return Some(beatmap.title);
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn stale_lookup_results_are_dropped() {
        let state = shared_state(Arc::new(NoopLookup));
        for id in [1, 2, 3] {
            state.inbound().set_beatmap_id(id);
        }

        let stale = TournamentBeatmap {
            online_id: 1,
            ..TournamentBeatmap::default()
        };
        assert!(!apply_lookup_result(&state, 1, Some(stale)));
        assert!(state.inbound().current_beatmap().is_none());

        assert!(apply_lookup_result(&state, 3, None));
        assert_eq!(state.inbound().current_beatmap().unwrap().online_id, 3);
    }

    #[tokio::test]
    async fn lookup_for_previous_beatmap_never_lands() {
        let gate = Arc::new(Notify::new());
        let state = shared_state(Arc::new(GatedLookup {
            gate: Arc::clone(&gate),
        }));
        let mut poller = InboundPoller::new();

        write(&state, files::BEATMAP, "1\n[]\n").await;
        poller.tick(&state).await;
        write(&state, files::BEATMAP, "2\n[]\n").await;
        poller.tick(&state).await;

        gate.notify_one();
        assert_eq!(wait_for_title(&state).await.as_deref(), Some("map 2"));
        assert_eq!(state.inbound().current_beatmap_id(), 2);
    }

    #[tokio::test]
    async fn pooled_beatmaps_skip_the_lookup() {
        let state = shared_state(Arc::new(GatedLookup {
            gate: Arc::new(Notify::new()),
        }));
        {
            let mut entry = RoundBeatmap::new(7, "NM");
            entry.beatmap = Some(TournamentBeatmap {
                online_id: 7,
                title: "pooled".into(),
                ..TournamentBeatmap::default()
            });
            let round = Round::new("Finals", 1, vec![entry]);
            *state.current_match().write().await =
                MatchState::new(Some(round), state.config().match_rules());
        }

        let mut poller = InboundPoller::new();
        write(&state, files::BEATMAP, "7\n[{\"acronym\":\"HD\"}]\n").await;
        poller.tick(&state).await;

        let snapshot = state.inbound().snapshot();
        assert_eq!(snapshot.beatmap.map(|beatmap| beatmap.title).as_deref(), Some("pooled"));
        assert_eq!(snapshot.mods.len(), 1);
    }

    #[tokio::test]
    async fn malformed_resources_do_not_block_the_others() {
        let state = shared_state(Arc::new(NoopLookup));
        let mut poller = InboundPoller::new();

        write(&state, files::BEATMAP, "not a number\n").await;
        write(&state, files::SCORES, "100\n250\n").await;
        write(&state, files::STATE, "1\n").await;
        write(&state, files::CHAT, "10,peppy,2,hi\ngarbage\n20,peppy,2,gl\n").await;
        poller.tick(&state).await;

        let snapshot = state.inbound().snapshot();
        assert_eq!(snapshot.beatmap_id, UNKNOWN_BEATMAP_ID);
        assert_eq!(snapshot.scores, (100, 250));
        assert_eq!(snapshot.phase, crate::state::live::Phase::Playing);
        assert_eq!(snapshot.chat.len(), 2);
    }

    #[tokio::test]
    async fn metadata_describes_unsubmitted_beatmaps() {
        let state = shared_state(Arc::new(NoopLookup));
        let mut poller = InboundPoller::new();

        write(&state, files::BEATMAP, "-1\n[]\n").await;
        write(
            &state,
            files::BEATMAP_METADATA,
            r#"{"md5":"abc","title":"Local","artist":"Someone","version":"Insane"}"#,
        )
        .await;
        write(&state, files::BEATMAP_BACKGROUND, "png").await;
        poller.tick(&state).await;

        let beatmap = state.inbound().current_beatmap().unwrap();
        assert_eq!(beatmap.md5, "abc");
        assert_eq!(beatmap.title, "Local");
        assert!(beatmap.cover.ends_with(files::BEATMAP_BACKGROUND));
    }

    #[tokio::test]
    async fn torn_beatmap_record_keeps_current_beatmap() {
        let state = shared_state(Arc::new(NoopLookup));
        let mut poller = InboundPoller::new();

        write(&state, files::BEATMAP, "1234567\n[]\n").await;
        poller.tick(&state).await;
        assert_eq!(state.inbound().current_beatmap_id(), 1234567);

        for torn in ["12", "1234567\n"] {
            write(&state, files::BEATMAP, torn).await;
            poller.tick(&state).await;
            assert_eq!(state.inbound().current_beatmap_id(), 1234567);
        }
    }

    #[tokio::test]
    async fn chat_survives_partial_file_and_clears_on_empty_file() {
        let state = shared_state(Arc::new(NoopLookup));
        let mut poller = InboundPoller::new();

        write(&state, files::CHAT, "10,peppy,2,hi\n20,peppy,2,gl\n").await;
        poller.tick(&state).await;
        assert_eq!(state.inbound().snapshot().chat.len(), 2);

        write(&state, files::CHAT, "1700").await;
        poller.tick(&state).await;
        assert_eq!(state.inbound().snapshot().chat.len(), 2);

        write(&state, files::CHAT, "").await;
        poller.tick(&state).await;
        assert!(state.inbound().snapshot().chat.is_empty());
    }

    #[tokio::test]
    async fn unchanged_beatmap_record_is_not_reapplied() {
        let state = shared_state(Arc::new(NoopLookup));
        let mut poller = InboundPoller::new();
        let mut beatmap_ids = state.inbound().beatmap_id_watcher();

        write(&state, files::BEATMAP, "5\n[]\n").await;
        poller.tick(&state).await;
        assert!(beatmap_ids.has_changed().unwrap());
        beatmap_ids.borrow_and_update();

        poller.tick(&state).await;
        assert!(!beatmap_ids.has_changed().unwrap());
    }
}
