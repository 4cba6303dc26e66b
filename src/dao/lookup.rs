use std::error::Error;

use futures::future::{self, BoxFuture};
use thiserror::Error;

use crate::state::live::TournamentBeatmap;

/// Result alias for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;

/// Error raised by lookup backends regardless of the underlying service.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("beatmap lookup unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("beatmap lookup for {beatmap_id} failed with status {status}")]
    Status { beatmap_id: i64, status: u16 },
}

impl LookupError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        LookupError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Resolves beatmaps that are not part of the active pool.
pub trait BeatmapLookup: Send + Sync {
    /// Fetch beatmap details by online id; `Ok(None)` when the service does not know it.
    fn lookup(&self, beatmap_id: i64) -> BoxFuture<'static, LookupResult<Option<TournamentBeatmap>>>;
}

/// Lookup used when no lookup service is configured: every beatmap is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLookup;

impl BeatmapLookup for NoopLookup {
    fn lookup(&self, _beatmap_id: i64) -> BoxFuture<'static, LookupResult<Option<TournamentBeatmap>>> {
        Box::pin(future::ready(Ok(None)))
    }
}
