use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Directory shared with the game client.
    pub ipc_root: String,
    /// Whether the IPC directory is currently reachable.
    pub ipc_reachable: bool,
    /// Whether the inbound poller is enabled.
    pub inbound_sync: bool,
    /// Version of the match being played.
    pub match_version: u64,
    /// RFC 3339 time of the check.
    pub checked_at: String,
}

impl HealthResponse {
    /// Status string for the given IPC reachability.
    pub fn status_for(ipc_reachable: bool) -> String {
        if ipc_reachable { "ok" } else { "degraded" }.to_string()
    }
}
