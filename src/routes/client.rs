use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use axum_valid::Valid;

use crate::{
    dto::client::{
        ActiveBeatmapRequest, ChatMessageRequest, PhaseRequest, PhaseResponse, RoomStateRequest,
        TeamScoresRequest,
    },
    error::AppError,
    services::client_service,
    state::SharedState,
};

/// Routes feeding the resources read by the game client.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/client/phase", put(set_phase))
        .route("/client/room", put(set_room_state))
        .route("/client/beatmap", put(set_beatmap))
        .route("/client/scores", put(update_scores))
        .route("/client/chat", post(add_chat_message).delete(clear_chat))
}

/// Write the tournament phase.
#[utoipa::path(
    put,
    path = "/client/phase",
    tag = "client",
    request_body = PhaseRequest,
    responses(
        (status = 200, description = "Phase written", body = PhaseResponse),
        (status = 503, description = "Outbound sync disabled or IPC directory unavailable")
    )
)]
pub async fn set_phase(
    State(state): State<SharedState>,
    Json(payload): Json<PhaseRequest>,
) -> Result<Json<PhaseResponse>, AppError> {
    let phase = client_service::set_phase(&state, payload.phase).await?;
    Ok(Json(PhaseResponse { phase }))
}

/// Report a live room state change; the matching phase is written.
#[utoipa::path(
    put,
    path = "/client/room",
    tag = "client",
    request_body = RoomStateRequest,
    responses(
        (status = 200, description = "Phase written", body = PhaseResponse),
        (status = 503, description = "Outbound sync disabled or IPC directory unavailable")
    )
)]
pub async fn set_room_state(
    State(state): State<SharedState>,
    Json(payload): Json<RoomStateRequest>,
) -> Result<Json<PhaseResponse>, AppError> {
    let phase = client_service::set_room_state(&state, payload.state).await?;
    Ok(Json(PhaseResponse { phase }))
}

/// Write the active beatmap and its mods.
#[utoipa::path(
    put,
    path = "/client/beatmap",
    tag = "client",
    request_body = ActiveBeatmapRequest,
    responses(
        (status = 202, description = "Write queued"),
        (status = 503, description = "Outbound sync disabled")
    )
)]
pub async fn set_beatmap(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ActiveBeatmapRequest>>,
) -> Result<StatusCode, AppError> {
    client_service::set_beatmap(&state, payload)?;
    Ok(StatusCode::ACCEPTED)
}

/// Buffer team scores; they are written on the next flush.
#[utoipa::path(
    put,
    path = "/client/scores",
    tag = "client",
    request_body = TeamScoresRequest,
    responses(
        (status = 202, description = "Scores buffered"),
        (status = 503, description = "Outbound sync disabled")
    )
)]
pub async fn update_scores(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<TeamScoresRequest>>,
) -> Result<StatusCode, AppError> {
    client_service::update_scores(&state, payload).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Buffer a chat line; it is appended on the next flush.
#[utoipa::path(
    post,
    path = "/client/chat",
    tag = "client",
    request_body = ChatMessageRequest,
    responses(
        (status = 202, description = "Chat line buffered"),
        (status = 503, description = "Outbound sync disabled")
    )
)]
pub async fn add_chat_message(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ChatMessageRequest>>,
) -> Result<StatusCode, AppError> {
    client_service::add_chat_message(&state, payload).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Truncate the chat history shared with the game client.
#[utoipa::path(
    delete,
    path = "/client/chat",
    tag = "client",
    responses(
        (status = 204, description = "Chat truncated"),
        (status = 503, description = "Outbound sync disabled or IPC directory unavailable")
    )
)]
pub async fn clear_chat(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    client_service::clear_chat(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}
