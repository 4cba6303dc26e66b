use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use tracing::info;

use crate::{
    dto::inbound::{SyncRequest, SyncStatus},
    services::sse_events,
    state::{SharedState, inbound::InboundSnapshot},
};

/// Routes exposing what the game client reported.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/inbound", get(get_inbound))
        .route("/sync/inbound", put(set_inbound_sync))
}

/// Values last read from the IPC directory.
#[utoipa::path(
    get,
    path = "/inbound",
    tag = "inbound",
    responses((status = 200, description = "Inbound observables", body = InboundSnapshot))
)]
pub async fn get_inbound(State(state): State<SharedState>) -> Json<InboundSnapshot> {
    Json(state.inbound().snapshot())
}

/// Pause or resume the inbound poller.
#[utoipa::path(
    put,
    path = "/sync/inbound",
    tag = "inbound",
    request_body = SyncRequest,
    responses((status = 200, description = "Synchronisation flag", body = SyncStatus))
)]
pub async fn set_inbound_sync(
    State(state): State<SharedState>,
    Json(payload): Json<SyncRequest>,
) -> Json<SyncStatus> {
    if state.inbound().set_enabled(payload.enabled) {
        info!(enabled = payload.enabled, "inbound sync toggled");
        sse_events::broadcast_sync_changed(&state, payload.enabled);
    }

    Json(SyncStatus {
        enabled: state.inbound().is_enabled(),
    })
}
