use std::future::Future;
use std::sync::Arc;

use log::info;
use teloxide::types::{ChatId, UserId};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::core::types::{Platform, Quality};
use crate::download::downloader::DownloadRequest;
use crate::download::error::DownloadError;

/// A download accepted by the selection flow, waiting for a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    /// Unique task identifier (UUID)
    pub id: String,
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Session the task was accepted under; stale completions are dropped
    pub session_id: String,
    pub platform: Platform,
    pub quality: Quality,
    pub url: String,
}

impl DownloadJob {
    pub fn new(
        user_id: UserId,
        chat_id: ChatId,
        session_id: impl Into<String>,
        platform: Platform,
        quality: Quality,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            chat_id,
            session_id: session_id.into(),
            platform,
            quality,
            url: url.into(),
        }
    }

    pub fn request(&self) -> DownloadRequest {
        DownloadRequest {
            platform: self.platform,
            quality: self.quality,
            url: self.url.clone(),
        }
    }
}

/// Sending half of the download queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DownloadQueue {
    tx: mpsc::UnboundedSender<DownloadJob>,
}

/// Receiving half, consumed by [`process_queue`].
pub type QueueReceiver = mpsc::UnboundedReceiver<DownloadJob>;

impl DownloadQueue {
    /// Creates a queue and the receiver its worker reads from.
    pub fn channel() -> (Self, QueueReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hands a task to the worker.
    pub fn enqueue(&self, task: DownloadJob) -> Result<(), DownloadError> {
        info!("Adding task {} for user {} to queue: {}", task.id, task.user_id, task.url);
        self.tx.send(task).map_err(|_| DownloadError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Runs queued tasks with at most `max_concurrent` in flight.
///
/// Returns once every sender is dropped and all started tasks have finished.
pub async fn process_queue<F, Fut>(mut rx: QueueReceiver, max_concurrent: usize, handler: F)
where
    F: Fn(DownloadJob) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let handler = Arc::new(handler);
    let mut running = JoinSet::new();

    while let Some(task) = rx.recv().await {
        // Reap finished tasks so the set does not grow without bound
        while let Some(joined) = running.try_join_next() {
            if let Err(e) = joined {
                log::error!("Download task panicked: {}", e);
            }
        }

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(p) => p,
            Err(e) => {
                log::error!("Failed to acquire semaphore permit for task {}: {}", task.id, e);
                continue;
            }
        };
        info!(
            "Processing task {} (permits available: {})",
            task.id,
            semaphore.available_permits()
        );

        let handler = Arc::clone(&handler);
        running.spawn(async move {
            let _permit = permit;
            handler(task).await;
        });
    }

    info!("Download queue closed, waiting for {} running task(s)", running.len());
    while let Some(joined) = running.join_next().await {
        if let Err(e) = joined {
            log::error!("Download task panicked: {}", e);
        }
    }
}
