//! Names of the resources living inside the shared IPC directory.

/// Current beatmap id (line 1) and required mods as JSON (line 2).
pub const BEATMAP: &str = "ipc.txt";
/// Serialized beatmap metadata, used when the beatmap is not submitted online.
pub const BEATMAP_METADATA: &str = "ipc-beatmap.json";
/// Background image accompanying [`BEATMAP_METADATA`].
pub const BEATMAP_BACKGROUND: &str = "ipc-beatmap-bg.png";
/// Live match phase as a single integer line.
pub const STATE: &str = "ipc-state.txt";
/// Red and blue scores, one per line.
pub const SCORES: &str = "ipc-scores.txt";
/// Append-only chat log.
pub const CHAT: &str = "ipc-chat.txt";
