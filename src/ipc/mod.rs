//! File-based IPC shared with the game client: resource names, record codecs and the
//! per-resource single-writer channel.

pub mod channel;
pub mod files;
pub mod records;

pub use self::channel::{ChannelError, ChannelResult, FileChannel};
