use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::live::{ApiMod, ChatMessage, Phase, RoomState};

/// Payload of `PUT /client/phase`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PhaseRequest {
    pub phase: Phase,
}

/// Payload of `PUT /client/room`: the live room changed state.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomStateRequest {
    pub state: RoomState,
}

/// Phase written after a phase or room update.
#[derive(Debug, Serialize, ToSchema)]
pub struct PhaseResponse {
    pub phase: Phase,
}

/// Payload of `PUT /client/beatmap`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ActiveBeatmapRequest {
    /// Online id, `-1` for a beatmap that is not submitted.
    #[validate(range(min = -1))]
    pub beatmap_id: i64,
    #[serde(default)]
    pub mods: Vec<ApiMod>,
}

/// Payload of `PUT /client/scores`: one value per team, red first.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamScoresRequest {
    #[validate(length(min = 1, max = 2))]
    pub scores: Vec<i64>,
}

/// Payload of `POST /client/chat`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChatMessageRequest {
    /// Unix milliseconds; the server clock is used when omitted.
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    pub user_id: i64,
    #[validate(length(min = 1, max = 1024))]
    pub content: String,
}

impl ChatMessageRequest {
    /// Build the message, stamping it with `now_ms` when no timestamp was given.
    pub fn into_message(self, now_ms: i64) -> ChatMessage {
        ChatMessage {
            timestamp_ms: self.timestamp_ms.unwrap_or(now_ms),
            username: self.username,
            user_id: self.user_id,
            content: self.content,
        }
    }
}
