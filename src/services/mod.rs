/// Outbound feed forwarded to the publisher.
pub mod client_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Pick/ban and scoring operations on the match being played.
pub mod match_service;
/// Periodic reader of the resources written by the game client.
pub mod poller;
/// Writer of the resources read by the game client.
pub mod publisher;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
