//! Feed of the outbound publisher: live room updates forwarded by the game client side.

use std::sync::Arc;

use crate::{
    dto::{
        client::{ActiveBeatmapRequest, ChatMessageRequest, TeamScoresRequest},
        now_unix_ms,
    },
    error::ServiceError,
    services::publisher::Publisher,
    state::{
        SharedState,
        live::{Phase, RoomState},
    },
};

fn publisher(state: &SharedState) -> Result<&Arc<Publisher>, ServiceError> {
    if !state.config().outbound_sync {
        return Err(ServiceError::Disabled("outbound sync".into()));
    }
    Ok(state.publisher())
}

/// Publish a phase and wait for the write.
pub async fn set_phase(state: &SharedState, phase: Phase) -> Result<Phase, ServiceError> {
    publisher(state)?.set_phase(phase).await?;
    Ok(phase)
}

/// Publish the phase derived from a room state change.
pub async fn set_room_state(state: &SharedState, room: RoomState) -> Result<Phase, ServiceError> {
    Ok(publisher(state)?.set_room_state(room).await?)
}

/// Publish the active beatmap. The write completes in the background.
pub fn set_beatmap(state: &SharedState, request: ActiveBeatmapRequest) -> Result<(), ServiceError> {
    publisher(state)?.set_beatmap(request.beatmap_id, &request.mods);
    Ok(())
}

/// Buffer team scores for the next flush.
pub async fn update_scores(state: &SharedState, request: TeamScoresRequest) -> Result<(), ServiceError> {
    publisher(state)?.update_scores(request.scores).await;
    Ok(())
}

/// Buffer a chat line for the next flush.
pub async fn add_chat_message(
    state: &SharedState,
    request: ChatMessageRequest,
) -> Result<(), ServiceError> {
    let message = request.into_message(now_unix_ms());
    publisher(state)?.add_chat_message(message).await;
    Ok(())
}

/// Truncate the chat resource.
pub async fn clear_chat(state: &SharedState) -> Result<(), ServiceError> {
    publisher(state)?.clear_chat().await?;
    Ok(())
}
