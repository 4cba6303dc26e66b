use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::matches::MatchSnapshot,
    state::live::{ApiMod, ChatMessage, Phase, TournamentBeatmap},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the inbound poller is reading the IPC directory.
    pub inbound_sync: bool,
    /// Version of the match at subscription time.
    pub match_version: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast after every mutation of the match.
pub struct MatchChangedEvent(pub MatchSnapshot);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the game client reports another beatmap.
pub struct BeatmapChangedEvent {
    pub beatmap_id: i64,
    pub beatmap: Option<TournamentBeatmap>,
    pub mods: Vec<ApiMod>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the reported phase changes.
pub struct PhaseChangedEvent {
    pub phase: Phase,
    pub previous: Phase,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when live scores change.
pub struct ScoresChangedEvent {
    pub red: i64,
    pub blue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the chat history read from the client changes.
pub struct ChatChangedEvent {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when inbound synchronisation is toggled.
pub struct SyncChangedEvent {
    pub enabled: bool,
}
