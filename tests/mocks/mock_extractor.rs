//! Mock extraction engine
//!
//! Writes files into the requested output template the way yt-dlp does, or
//! fails in the ways yt-dlp fails, without touching the network.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tubegrab::download::error::DownloadError;
use tubegrab::download::ytdlp::{ExtractOptions, ExtractedVideo, VideoExtractor};

/// What the next engine call does
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Writes `<token>.mp4` of `size` bytes and reports it
    Video { size: u64, title: Option<String> },
    /// Writes a `.part` file, then fails with `message`
    PartialThenFail { message: String },
    /// Fails with `message` without writing anything
    Fail { message: String },
    /// Succeeds but writes nothing
    NoFile,
}

/// Scripted engine: behaviors are consumed in order, the last one repeats.
pub struct MockExtractor {
    script: Mutex<Vec<MockBehavior>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<ExtractOptions>>,
}

impl MockExtractor {
    pub fn new(script: Vec<MockBehavior>) -> Self {
        assert!(!script.is_empty(), "script needs at least one behavior");
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn video(size: u64, title: &str) -> Self {
        Self::new(vec![MockBehavior::Video {
            size,
            title: Some(title.to_string()),
        }])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<ExtractOptions> {
        self.seen.lock().unwrap().last().cloned()
    }

    fn next_behavior(&self) -> MockBehavior {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }
}

fn output_path(options: &ExtractOptions, ext: &str) -> PathBuf {
    PathBuf::from(options.output_template.replace("%(ext)s", ext))
}

#[async_trait]
impl VideoExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, _url: &str, options: &ExtractOptions) -> Result<ExtractedVideo, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(options.clone());

        match self.next_behavior() {
            MockBehavior::Video { size, title } => {
                let path = output_path(options, "mp4");
                let file = std::fs::File::create(&path)?;
                file.set_len(size)?;
                Ok(ExtractedVideo {
                    title,
                    file_path: Some(path),
                })
            }
            MockBehavior::PartialThenFail { message } => {
                std::fs::write(output_path(options, "mp4.part"), b"partial")?;
                Err(DownloadError::Engine(message))
            }
            MockBehavior::Fail { message } => Err(DownloadError::Engine(message)),
            MockBehavior::NoFile => Ok(ExtractedVideo::default()),
        }
    }
}
