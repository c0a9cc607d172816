//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::UserId;
use tubegrab::core::types::{Platform, Quality};
use tubegrab::download::downloader::VideoSink;
use tubegrab::download::error::DownloadError;
use tubegrab::storage::SessionStore;
use tubegrab::telegram::SelectionFlow;

/// A video the sink received
#[derive(Debug, Clone, PartialEq)]
pub struct SentVideo {
    pub path: PathBuf,
    pub caption: String,
    pub size: u64,
}

/// Sink that records what would have been sent to the chat
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentVideo>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentVideo> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSink for RecordingSink {
    async fn send_video(&self, path: &Path, caption: &str) -> Result<(), DownloadError> {
        if let Some(ref message) = self.fail_with {
            return Err(DownloadError::SendFailed(message.clone()));
        }
        let size = std::fs::metadata(path)?.len();
        self.sent.lock().unwrap().push(SentVideo {
            path: path.to_path_buf(),
            caption: caption.to_string(),
            size,
        });
        Ok(())
    }
}

pub fn new_flow() -> SelectionFlow {
    SelectionFlow::new(SessionStore::new(Duration::from_secs(3600)))
}

/// Presses the platform and quality buttons for `user`
pub async fn select(flow: &SelectionFlow, user: UserId, platform: Platform, quality: Quality) {
    flow.choose_platform(user, platform).await;
    flow.choose_quality(user, quality)
        .await
        .expect("session was just created");
}

/// Names of all entries in `dir`
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
