/// Beatmap lookup abstraction and its offline implementation.
pub mod lookup;
/// HTTP beatmap lookup.
#[cfg(feature = "online-lookup")]
pub mod online;
