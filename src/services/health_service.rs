use tokio::fs;
use tracing::warn;

use crate::{
    dto::{health::HealthResponse, now_rfc3339},
    state::SharedState,
};

/// Report IPC reachability, logging when the directory is gone.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let root = state.channel().root();
    let ipc_reachable = match fs::try_exists(root).await {
        Ok(true) => true,
        Ok(false) => {
            warn!(root = %root.display(), "IPC directory missing (degraded mode)");
            false
        }
        Err(err) => {
            warn!(root = %root.display(), error = %err, "IPC directory unreachable");
            false
        }
    };

    let match_version = state.current_match().read().await.version();

    HealthResponse {
        status: HealthResponse::status_for(ipc_reachable),
        ipc_root: root.display().to_string(),
        ipc_reachable,
        inbound_sync: state.inbound().is_enabled(),
        match_version,
        checked_at: now_rfc3339(),
    }
}
