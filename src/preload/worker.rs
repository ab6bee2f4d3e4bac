//! 预加载 worker：独占 `PreloadQueue` 与 `SpanCache` 的 tokio 任务
//!
//! 窗口管理器通过 [`ChannelBackend`] 同步地投递命令，完成通知从事件通道异步返回。

use std::ops::Range;
use std::time::Duration;

use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::cache::SpanCache;
use crate::domain::MediaItem;
use crate::error::PreloadError;

use super::policy::{PreloadIntensity, PreloadPriorityPolicy};
use super::queue::{PreloadQueue, PreloadTask};
use super::traits::{PreloadBackend, PreloadEvent};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// 模拟每个条目的加载耗时（毫秒）
    pub load_delay_ms: u64,
    /// 模拟码率，用于把缓冲时长换算成字节
    pub bytes_per_second: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: 50,
            bytes_per_second: 250_000,
        }
    }
}

#[derive(Debug)]
pub enum PreloadCommand {
    Add {
        item: MediaItem,
        rank: usize,
    },
    Remove {
        item: MediaItem,
    },
    Invalidate {
        policy: PreloadPriorityPolicy,
    },
    QuerySpans {
        key: String,
        reply: oneshot::Sender<Vec<Range<u64>>>,
    },
    Release,
}

pub type EventReceiver = mpsc::UnboundedReceiver<PreloadEvent<MediaItem>>;

#[derive(Debug, Clone)]
pub struct ChannelBackend {
    tx: mpsc::UnboundedSender<PreloadCommand>,
}

impl ChannelBackend {
    fn send(&self, cmd: PreloadCommand) -> Result<(), PreloadError> {
        self.tx.send(cmd).map_err(|_| PreloadError::WorkerGone)
    }

    /// 查询 worker 持有的缓存中某个 key 的字节段
    pub async fn cached_spans(&self, key: &str) -> Result<Vec<Range<u64>>, PreloadError> {
        let (reply, rx) = oneshot::channel();
        self.send(PreloadCommand::QuerySpans {
            key: key.to_owned(),
            reply,
        })?;
        rx.await.map_err(|_| PreloadError::WorkerGone)
    }
}

impl PreloadBackend<MediaItem> for ChannelBackend {
    fn add(&mut self, item: MediaItem, rank: usize) -> Result<(), PreloadError> {
        self.send(PreloadCommand::Add { item, rank })
    }

    fn remove(&mut self, item: &MediaItem) -> Result<(), PreloadError> {
        self.send(PreloadCommand::Remove { item: item.clone() })
    }

    fn invalidate(&mut self, policy: &PreloadPriorityPolicy) -> Result<(), PreloadError> {
        self.send(PreloadCommand::Invalidate {
            policy: policy.clone(),
        })
    }

    fn release(&mut self) {
        if self.send(PreloadCommand::Release).is_err() {
            tracing::debug!("预加载 worker 已提前退出");
        }
    }
}

/// 需要在 tokio runtime 内调用
pub fn spawn_preload_worker(cache: SpanCache, config: WorkerConfig) -> (ChannelBackend, EventReceiver) {
    let (tx_cmd, rx_cmd) = mpsc::unbounded_channel::<PreloadCommand>();
    let (tx_evt, rx_evt) = mpsc::unbounded_channel::<PreloadEvent<MediaItem>>();

    let worker = PreloadWorker {
        rx_cmd,
        tx_evt,
        queue: PreloadQueue::new(),
        cache,
        config,
    };
    tokio::spawn(worker.run());

    (ChannelBackend { tx: tx_cmd }, rx_evt)
}

struct PreloadWorker {
    rx_cmd: mpsc::UnboundedReceiver<PreloadCommand>,
    tx_evt: mpsc::UnboundedSender<PreloadEvent<MediaItem>>,
    queue: PreloadQueue<MediaItem>,
    cache: SpanCache,
    config: WorkerConfig,
}

impl PreloadWorker {
    async fn run(mut self) {
        tracing::info!(
            delay_ms = self.config.load_delay_ms,
            bytes_per_second = self.config.bytes_per_second,
            "预加载 worker 已启动"
        );
        let delay = Duration::from_millis(self.config.load_delay_ms);
        // 计时只跟随队首条目；队首不变时命令不会重置计时
        let mut deadline: Option<(MediaItem, Instant)> = None;

        loop {
            let head = self.queue.next_task().cloned();
            deadline = match (&head, deadline) {
                (Some(task), Some((item, at))) if item == task.item => Some((item, at)),
                (Some(task), _) => Some((task.item.clone(), Instant::now() + delay)),
                (None, _) => None,
            };
            let wake_at = deadline
                .as_ref()
                .map(|(_, at)| *at)
                .unwrap_or_else(Instant::now);

            select! {
                maybe_cmd = self.rx_cmd.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        break;
                    };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                _ = tokio::time::sleep_until(wake_at), if head.is_some() => {
                    if let Some(task) = head {
                        self.finish(task);
                    }
                }
            }
        }

        if let Err(e) = self.cache.persist() {
            tracing::warn!(err = %e, "保存缓存索引失败");
        }
        tracing::info!(keys = self.cache.key_count(), bytes = self.cache.total_bytes(), "预加载 worker 已退出");
    }

    fn handle_command(&mut self, cmd: PreloadCommand) -> bool {
        match cmd {
            PreloadCommand::Add { item, rank } => {
                self.queue.add(item, rank);
            }
            PreloadCommand::Remove { item } => {
                self.queue.remove(&item);
            }
            PreloadCommand::Invalidate { policy } => {
                self.queue.invalidate(&policy);
                tracing::debug!(
                    current = ?policy.current_index(),
                    pending = self.queue.pending_len(),
                    "预加载队列已重排"
                );
            }
            PreloadCommand::QuerySpans { key, reply } => {
                let _ = reply.send(self.cache.cached_spans(&key));
            }
            PreloadCommand::Release => {
                self.queue.release();
                return false;
            }
        }
        true
    }

    fn finish(&mut self, task: PreloadTask<MediaItem>) {
        let Some(done) = self.queue.complete(&task.item) else {
            return;
        };
        let bytes = self
            .config
            .bytes_per_second
            .saturating_mul(done.intensity.duration_ms())
            / 1000;
        let key = done.item.cache_key();
        let rank = done.rank;

        let evt = match self.cache.add_span(&key, 0, bytes) {
            Ok(()) => match done.intensity {
                PreloadIntensity::FullyCached { .. } => PreloadEvent::ItemFullyCached {
                    rank,
                    item: done.item,
                },
                _ => PreloadEvent::ItemBuffered {
                    rank,
                    item: done.item,
                },
            },
            Err(e) => {
                tracing::warn!(key = %key, bytes, err = %e, "写入缓存失败");
                PreloadEvent::PreloadFailed {
                    rank,
                    item: done.item,
                    message: e.to_string(),
                }
            }
        };
        let _ = self.tx_evt.send(evt);
    }
}
