use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        matches::MatchSnapshot,
        sse::{
            BeatmapChangedEvent, ChatChangedEvent, MatchChangedEvent, PhaseChangedEvent,
            ScoresChangedEvent, ServerEvent, SyncChangedEvent,
        },
    },
    state::{
        SharedState,
        live::{ApiMod, ChatMessage, Phase, TournamentBeatmap},
    },
};

const EVENT_MATCH_CHANGED: &str = "match.changed";
const EVENT_BEATMAP_CHANGED: &str = "inbound.beatmap";
const EVENT_PHASE_CHANGED: &str = "inbound.phase";
const EVENT_SCORES_CHANGED: &str = "inbound.scores";
const EVENT_CHAT_CHANGED: &str = "inbound.chat";
const EVENT_SYNC_CHANGED: &str = "sync.inbound";

/// Broadcast the full match after a mutation.
pub fn broadcast_match_changed(state: &SharedState, snapshot: MatchSnapshot) {
    send_event(state, EVENT_MATCH_CHANGED, &MatchChangedEvent(snapshot));
}

/// Broadcast the beatmap reported by the game client.
pub fn broadcast_beatmap_changed(
    state: &SharedState,
    beatmap_id: i64,
    beatmap: Option<TournamentBeatmap>,
    mods: Vec<ApiMod>,
) {
    let payload = BeatmapChangedEvent {
        beatmap_id,
        beatmap,
        mods,
    };
    send_event(state, EVENT_BEATMAP_CHANGED, &payload);
}

/// Broadcast a phase transition reported by the game client.
pub fn broadcast_phase_changed(state: &SharedState, phase: Phase, previous: Phase) {
    send_event(state, EVENT_PHASE_CHANGED, &PhaseChangedEvent { phase, previous });
}

/// Broadcast live scores.
pub fn broadcast_scores_changed(state: &SharedState, (red, blue): (i64, i64)) {
    send_event(state, EVENT_SCORES_CHANGED, &ScoresChangedEvent { red, blue });
}

/// Broadcast the chat history read from the game client.
pub fn broadcast_chat_changed(state: &SharedState, messages: Vec<ChatMessage>) {
    send_event(state, EVENT_CHAT_CHANGED, &ChatChangedEvent { messages });
}

/// Broadcast the inbound synchronisation flag.
pub fn broadcast_sync_changed(state: &SharedState, enabled: bool) {
    send_event(state, EVENT_SYNC_CHANGED, &SyncChangedEvent { enabled });
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
