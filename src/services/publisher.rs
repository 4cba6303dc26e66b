//! Outbound half of the IPC protocol: mirrors client-side state into the shared directory.
//!
//! Phase and beatmap changes are written right away. Scores and chat are buffered and
//! flushed periodically, so bursts collapse into a single write.

use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    ipc::{
        ChannelResult, FileChannel, files,
        records::{BeatmapRecord, encode_phase, encode_scores},
    },
    state::live::{ApiMod, ChatMessage, Phase, RoomState},
};

#[derive(Default)]
struct ChatBuffer {
    pending: Vec<ChatMessage>,
    /// Encoded lines already appended to the chat resource.
    seen: HashSet<String>,
}

/// Writer of the resources the game client reads.
pub struct Publisher {
    channel: FileChannel,
    phase: Mutex<Phase>,
    pending_scores: Mutex<Option<Vec<i64>>>,
    chat: Mutex<ChatBuffer>,
}

impl Publisher {
    pub fn new(channel: FileChannel) -> Self {
        Self {
            channel,
            phase: Mutex::new(Phase::default()),
            pending_scores: Mutex::new(None),
            chat: Mutex::new(ChatBuffer::default()),
        }
    }

    /// Write the startup state: the current phase and an empty chat.
    pub async fn publish_initial(&self) -> ChannelResult<()> {
        let phase = *self.phase.lock().await;
        self.channel
            .write_resource(files::STATE, encode_phase(phase))
            .await?;
        self.clear_chat().await
    }

    /// Phase last published.
    pub async fn phase(&self) -> Phase {
        *self.phase.lock().await
    }

    /// Publish a phase and wait for it to reach the disk.
    pub async fn set_phase(&self, phase: Phase) -> ChannelResult<()> {
        let write = {
            let mut current = self.phase.lock().await;
            *current = phase;
            // Queued under the lock so concurrent callers land in lock order.
            self.channel
                .write_resource(files::STATE, encode_phase(phase))
        };

        info!(%phase, "tournament phase changed");
        write.await
    }

    /// Derive the phase from the live room state and publish it.
    pub async fn set_room_state(&self, room: RoomState) -> ChannelResult<Phase> {
        let next = self.phase().await.after_room_update(room);
        self.set_phase(next).await?;
        Ok(next)
    }

    /// Publish the active beatmap without waiting for the write.
    ///
    /// Writes reach the disk in call order because the channel queues them per resource.
    pub fn set_beatmap(&self, beatmap_id: i64, mods: &[ApiMod]) {
        let record = BeatmapRecord::new(beatmap_id, mods);
        let write = self.channel.write_resource(files::BEATMAP, record.encode());
        info!(beatmap_id, "active beatmap changed");

        tokio::spawn(async move {
            if let Err(err) = write.await {
                warn!(beatmap_id, error = %err, "failed to publish active beatmap");
            }
        });
    }

    /// Buffer team scores; only the latest values before a flush are written.
    pub async fn update_scores(&self, scores: Vec<i64>) {
        *self.pending_scores.lock().await = Some(scores);
    }

    /// Write pending scores, if any. Returns whether something was written.
    pub async fn flush_scores(&self) -> ChannelResult<bool> {
        let Some(scores) = self.pending_scores.lock().await.take() else {
            return Ok(false);
        };
        if scores.is_empty() {
            return Ok(false);
        }

        self.channel
            .write_resource(files::SCORES, encode_scores(&scores))
            .await?;
        Ok(true)
    }

    /// Buffer a chat line for the next flush.
    pub async fn add_chat_message(&self, message: ChatMessage) {
        self.chat.lock().await.pending.push(message);
    }

    /// Append buffered chat lines that were never written. Returns how many were appended.
    pub async fn flush_chat(&self) -> ChannelResult<usize> {
        let (payload, count) = {
            let mut chat = self.chat.lock().await;
            let pending = std::mem::take(&mut chat.pending);

            let mut payload = String::new();
            let mut count = 0;
            for message in pending {
                let line = message.encode_line();
                if chat.seen.insert(line.clone()) {
                    payload.push_str(&line);
                    count += 1;
                }
            }
            (payload, count)
        };

        if count == 0 {
            return Ok(0);
        }

        self.channel.append_resource(files::CHAT, payload).await?;
        debug!(count, "chat lines appended");
        Ok(count)
    }

    /// Truncate the chat resource and forget every line written so far.
    pub async fn clear_chat(&self) -> ChannelResult<()> {
        let write = {
            let mut chat = self.chat.lock().await;
            chat.pending.clear();
            chat.seen.clear();
            self.channel.truncate_resource(files::CHAT)
        };

        write.await?;
        info!("chat history truncated");
        Ok(())
    }

    /// Start the periodic score and chat flushers. They stop once the publisher is dropped.
    pub fn spawn_flush_tasks(
        self: &Arc<Self>,
        score_every: Duration,
        chat_every: Duration,
    ) -> [JoinHandle<()>; 2] {
        let scores = spawn_periodic(Arc::downgrade(self), score_every, |publisher| async move {
            if let Err(err) = publisher.flush_scores().await {
                warn!(error = %err, "failed to flush scores");
            }
        });
        let chat = spawn_periodic(Arc::downgrade(self), chat_every, |publisher| async move {
            if let Err(err) = publisher.flush_chat().await {
                warn!(error = %err, "failed to flush chat");
            }
        });
        [scores, chat]
    }
}

fn spawn_periodic<F, Fut>(weak: Weak<Publisher>, every: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut(Arc<Publisher>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let Some(publisher) = weak.upgrade() else {
                break;
            };
            tick(publisher).await;
        }
    })
}
