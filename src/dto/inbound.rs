use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload of `PUT /sync/inbound`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub enabled: bool,
}

/// Inbound synchronisation status.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncStatus {
    pub enabled: bool,
}
