pub mod inbound;
pub mod live;
pub mod match_state;
pub mod sets;
mod sse;
pub mod turns;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    dao::lookup::BeatmapLookup,
    ipc::FileChannel,
    services::publisher::Publisher,
    state::{inbound::InboundState, match_state::MatchState},
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Central application state: the match being played, the IPC handles and the event hub.
pub struct AppState {
    config: AppConfig,
    channel: FileChannel,
    current_match: RwLock<MatchState>,
    inbound: InboundState,
    publisher: Arc<Publisher>,
    lookup: Arc<dyn BeatmapLookup>,
    events: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts with an empty match without a round.
    pub fn new(config: AppConfig, channel: FileChannel, lookup: Arc<dyn BeatmapLookup>) -> SharedState {
        let current_match = MatchState::new(None, config.match_rules());
        let inbound = InboundState::new(config.inbound_sync);
        let publisher = Arc::new(Publisher::new(channel.clone()));

        Arc::new(Self {
            config,
            channel,
            current_match: RwLock::new(current_match),
            inbound,
            publisher,
            lookup,
            events: SseHub::new(EVENT_CAPACITY),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle on the shared IPC directory.
    pub fn channel(&self) -> &FileChannel {
        &self.channel
    }

    /// The match being played.
    pub fn current_match(&self) -> &RwLock<MatchState> {
        &self.current_match
    }

    /// Values last read from the game client.
    pub fn inbound(&self) -> &InboundState {
        &self.inbound
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    pub fn lookup(&self) -> Arc<dyn BeatmapLookup> {
        Arc::clone(&self.lookup)
    }

    /// Broadcast hub used for the SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }
}
