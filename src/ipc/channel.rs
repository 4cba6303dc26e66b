//! Read/write primitive for the shared IPC directory.
//!
//! Reads never fail loudly: any I/O error is reported as [`ChannelError::Busy`] and the
//! caller simply tries again on its next tick. Writes go through one queue per resource,
//! drained by a dedicated worker task, so two writes to the same file can never
//! interleave. A failed write is retried after a short delay until it lands.

use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use dashmap::DashMap;
use thiserror::Error;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::{mpsc, oneshot},
    time::sleep,
};
use tracing::{debug, trace, warn};

/// Delay between two attempts of a failed write.
pub const DEFAULT_WRITE_RETRY: Duration = Duration::from_millis(50);

/// Result alias for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Failures reported by the file channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The resource could not be read, most likely because the other process is writing it.
    #[error("resource `{name}` is busy")]
    Busy {
        name: String,
        #[source]
        source: io::Error,
    },
    /// The resource was read but its content does not decode.
    #[error("resource `{name}` is malformed: {reason}")]
    Malformed { name: String, reason: String },
    /// The writer task for the resource is gone (runtime shutting down).
    #[error("writer for resource `{name}` is closed")]
    Closed { name: String },
    /// The storage root could not be created.
    #[error("failed to prepare IPC root `{}`", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ChannelError {
    /// Build a [`ChannelError::Malformed`] for the given resource.
    pub fn malformed(name: &str, reason: impl ToString) -> Self {
        ChannelError::Malformed {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// How a queued write touches the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate then write the new content.
    Replace,
    /// Append the content at the end of the file.
    Append,
    /// Truncate to zero length.
    Truncate,
}

struct WriteJob {
    mode: WriteMode,
    bytes: Vec<u8>,
    done: oneshot::Sender<()>,
}

/// Handle to the shared IPC directory. Cloning is cheap.
#[derive(Clone)]
pub struct FileChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    root: PathBuf,
    retry_delay: Duration,
    /// Pause inserted halfway through every write; only set by tests.
    write_stall: Option<Duration>,
    writers: DashMap<String, mpsc::UnboundedSender<WriteJob>>,
}

impl FileChannel {
    /// Open the channel rooted at `root`, creating the directory tree when missing.
    pub fn new(root: impl Into<PathBuf>, retry_delay: Duration) -> ChannelResult<Self> {
        Self::build(root.into(), retry_delay, None)
    }

    fn build(
        root: PathBuf,
        retry_delay: Duration,
        write_stall: Option<Duration>,
    ) -> ChannelResult<Self> {
        std::fs::create_dir_all(&root).map_err(|source| ChannelError::Root {
            path: root.clone(),
            source,
        })?;
        debug!(root = %root.display(), "IPC storage ready");

        Ok(Self {
            inner: Arc::new(ChannelInner {
                root,
                retry_delay,
                write_stall,
                writers: DashMap::new(),
            }),
        })
    }

    /// Directory holding every resource.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Location of a resource on disk.
    pub fn resource_path(&self, name: &str) -> PathBuf {
        self.inner.root.join(name)
    }

    /// Read the raw bytes of a resource.
    pub async fn read_resource(&self, name: &str) -> ChannelResult<Vec<u8>> {
        fs::read(self.resource_path(name))
            .await
            .map_err(|source| ChannelError::Busy {
                name: name.to_owned(),
                source,
            })
    }

    /// Read a resource as UTF-8 text.
    pub async fn read_text(&self, name: &str) -> ChannelResult<String> {
        let bytes = self.read_resource(name).await?;
        String::from_utf8(bytes).map_err(|err| ChannelError::malformed(name, err))
    }

    /// Whether the resource currently exists.
    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.resource_path(name)).await.unwrap_or(false)
    }

    /// Replace the content of a resource.
    ///
    /// The write is queued before this returns; awaiting the future only waits for it to
    /// reach the disk, so the future may be dropped for fire-and-forget writes.
    pub fn write_resource(
        &self,
        name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> impl Future<Output = ChannelResult<()>> + Send + 'static {
        self.enqueue(name, WriteMode::Replace, bytes.into())
    }

    /// Append to a resource, creating it when missing.
    pub fn append_resource(
        &self,
        name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> impl Future<Output = ChannelResult<()>> + Send + 'static {
        self.enqueue(name, WriteMode::Append, bytes.into())
    }

    /// Truncate a resource to zero length.
    pub fn truncate_resource(
        &self,
        name: &str,
    ) -> impl Future<Output = ChannelResult<()>> + Send + 'static {
        self.enqueue(name, WriteMode::Truncate, Vec::new())
    }

    fn enqueue(
        &self,
        name: &str,
        mode: WriteMode,
        bytes: Vec<u8>,
    ) -> impl Future<Output = ChannelResult<()>> + Send + 'static {
        let (done, completed) = oneshot::channel();
        let queued = self
            .writer_for(name)
            .send(WriteJob { mode, bytes, done })
            .is_ok();
        let name = name.to_owned();

        async move {
            if !queued {
                return Err(ChannelError::Closed { name });
            }
            completed.await.map_err(|_| ChannelError::Closed { name })
        }
    }

    /// Sender of the worker owning `name`, spawning the worker on first use.
    fn writer_for(&self, name: &str) -> mpsc::UnboundedSender<WriteJob> {
        let entry = self
            .inner
            .writers
            .entry(name.to_owned())
            .or_insert_with(|| self.spawn_writer(name));
        entry.value().clone()
    }

    fn spawn_writer(&self, name: &str) -> mpsc::UnboundedSender<WriteJob> {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = ResourceWriter {
            name: name.to_owned(),
            path: self.resource_path(name),
            retry_delay: self.inner.retry_delay,
            write_stall: self.inner.write_stall,
        };
        tokio::spawn(writer.run(rx));
        tx
    }
}

/// Worker draining the write queue of a single resource in FIFO order.
struct ResourceWriter {
    name: String,
    path: PathBuf,
    retry_delay: Duration,
    write_stall: Option<Duration>,
}

impl ResourceWriter {
    async fn run(self, mut jobs: mpsc::UnboundedReceiver<WriteJob>) {
        while let Some(job) = jobs.recv().await {
            let mut attempt: u32 = 0;
            loop {
                attempt += 1;
                match self.perform(job.mode, &job.bytes).await {
                    Ok(()) => break,
                    Err(err) => {
                        warn!(
                            resource = %self.name,
                            attempt,
                            error = %err,
                            "failed writing IPC resource; retrying"
                        );
                        sleep(self.retry_delay).await;
                    }
                }
            }

            trace!(resource = %self.name, mode = ?job.mode, bytes = job.bytes.len(), "IPC resource written");
            let _ = job.done.send(());
        }

        trace!(resource = %self.name, "IPC writer stopped");
    }

    async fn perform(&self, mode: WriteMode, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Replace | WriteMode::Truncate => {
                options.write(true).create(true).truncate(true);
            }
            WriteMode::Append => {
                options.append(true).create(true);
            }
        }

        let mut file = options.open(&self.path).await?;

        match self.write_stall {
            Some(pause) if bytes.len() > 1 => {
                let (head, tail) = bytes.split_at(bytes.len() / 2);
                file.write_all(head).await?;
                file.flush().await?;
                sleep(pause).await;
                file.write_all(tail).await?;
            }
            _ => file.write_all(bytes).await?,
        }

        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("tourney-link-channel-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn creates_missing_root() {
        let root = temp_root().join("nested").join("tournaments");
        let channel = FileChannel::new(&root, DEFAULT_WRITE_RETRY).unwrap();
        assert!(channel.root().is_dir());
    }

    #[tokio::test]
    async fn missing_resource_reads_as_busy() {
        let channel = FileChannel::new(temp_root(), DEFAULT_WRITE_RETRY).unwrap();
        let err = channel.read_resource("ipc.txt").await.unwrap_err();
        assert!(matches!(err, ChannelError::Busy { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_malformed() {
        let channel = FileChannel::new(temp_root(), DEFAULT_WRITE_RETRY).unwrap();
        channel
            .write_resource("ipc.txt", vec![0xff, 0xfe, 0xfd])
            .await
            .unwrap();
        let err = channel.read_text("ipc.txt").await.unwrap_err();
        assert!(matches!(err, ChannelError::Malformed { .. }));
    }

    #[tokio::test]
    async fn replace_truncates_previous_content() {
        let channel = FileChannel::new(temp_root(), DEFAULT_WRITE_RETRY).unwrap();
        channel
            .write_resource("ipc-scores.txt", "123456\n654321\n")
            .await
            .unwrap();
        channel
            .write_resource("ipc-scores.txt", "1\n2\n")
            .await
            .unwrap();
        assert_eq!(channel.read_text("ipc-scores.txt").await.unwrap(), "1\n2\n");
    }

    #[tokio::test]
    async fn append_then_truncate() {
        let channel = FileChannel::new(temp_root(), DEFAULT_WRITE_RETRY).unwrap();
        channel.append_resource("ipc-chat.txt", "a\n").await.unwrap();
        channel.append_resource("ipc-chat.txt", "b\n").await.unwrap();
        assert_eq!(channel.read_text("ipc-chat.txt").await.unwrap(), "a\nb\n");

        channel.truncate_resource("ipc-chat.txt").await.unwrap();
        assert_eq!(channel.read_text("ipc-chat.txt").await.unwrap(), "");
    }

    #[tokio::test]
    async fn dropped_write_future_still_lands_in_order() {
        let channel = FileChannel::new(temp_root(), DEFAULT_WRITE_RETRY).unwrap();
        drop(channel.write_resource("ipc.txt", "1\n[]\n"));
        drop(channel.write_resource("ipc.txt", "2\n[]\n"));
        channel.write_resource("ipc.txt", "3\n[]\n").await.unwrap();
        assert_eq!(channel.read_text("ipc.txt").await.unwrap(), "3\n[]\n");
    }

    #[tokio::test]
    async fn concurrent_writes_to_same_resource_never_interleave() {
        let stall = Duration::from_millis(150);
        let channel = FileChannel::build(temp_root(), DEFAULT_WRITE_RETRY, Some(stall)).unwrap();

        let first = channel.write_resource("ipc-scores.txt", vec![b'a'; 4096]);
        let second = channel.write_resource("ipc-scores.txt", vec![b'b'; 4096]);

        // The first write is parked halfway; the second one must still be queued.
        sleep(stall / 2).await;
        let during = channel.read_resource("ipc-scores.txt").await.unwrap();
        assert!(!during.is_empty());
        assert!(during.iter().all(|byte| *byte == b'a'));

        first.await.unwrap();
        second.await.unwrap();
        let after = channel.read_resource("ipc-scores.txt").await.unwrap();
        assert_eq!(after.len(), 4096);
        assert!(after.iter().all(|byte| *byte == b'b'));
    }

    #[tokio::test]
    async fn different_resources_write_independently() {
        let stall = Duration::from_millis(200);
        let channel = FileChannel::build(temp_root(), DEFAULT_WRITE_RETRY, Some(stall)).unwrap();

        let slow = channel.write_resource("ipc-scores.txt", vec![b'a'; 64]);
        let started = tokio::time::Instant::now();
        channel.write_resource("ipc-state.txt", "1\n").await.unwrap();
        assert!(started.elapsed() < stall * 2);
        slow.await.unwrap();
    }
}
