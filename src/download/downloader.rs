//! Download orchestrator.
//!
//! Runs one request end to end: engine call, artifact validation, size
//! ceiling, transmission through a [`VideoSink`], and unconditional cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs_err::tokio as fs;

use crate::core::config;
use crate::core::types::{Platform, Quality};
use crate::download::artifact::Artifact;
use crate::download::error::DownloadError;
use crate::download::ytdlp::{ExtractOptions, ExtractedVideo, VideoExtractor};

/// Destination for a finished video (the chat, in production).
#[async_trait]
pub trait VideoSink: Send + Sync {
    async fn send_video(&self, path: &Path, caption: &str) -> Result<(), DownloadError>;
}

/// Parameters of a single download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub platform: Platform,
    pub quality: Quality,
    pub url: String,
}

/// Result of a delivered download.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    pub caption: String,
    pub file_size: u64,
}

/// Runs downloads through an extraction engine.
pub struct Downloader {
    extractor: Arc<dyn VideoExtractor>,
    work_dir: PathBuf,
    max_file_size: u64,
    cookies_file: Option<PathBuf>,
}

impl Downloader {
    pub fn new(extractor: Arc<dyn VideoExtractor>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            extractor,
            work_dir: work_dir.into(),
            max_file_size: config::download::DEFAULT_MAX_FILE_SIZE,
            cookies_file: None,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_cookies_file(mut self, cookies_file: Option<PathBuf>) -> Self {
        self.cookies_file = cookies_file;
        self
    }

    /// Downloads `request.url` and sends it through `sink`.
    ///
    /// Whatever happens, no file belonging to this request is left in the
    /// working directory when this returns.
    pub async fn download(&self, request: &DownloadRequest, sink: &dyn VideoSink) -> Result<Delivered, DownloadError> {
        fs::create_dir_all(&self.work_dir).await?;

        let mut artifact = Artifact::new(&self.work_dir);
        log::info!(
            "Starting {} download [{}] via {} at {} for {}",
            request.platform,
            artifact.token(),
            self.extractor.name(),
            request.quality,
            request.url
        );

        let result = self.run(request, &mut artifact, sink).await;
        let removed = artifact.cleanup().await;

        match &result {
            Ok(delivered) => log::info!(
                "Download [{}] delivered ({} bytes, {} file(s) cleaned up)",
                artifact.token(),
                delivered.file_size,
                removed
            ),
            Err(e) => log::error!(
                "Download [{}] failed ({}): {} ({} file(s) cleaned up)",
                artifact.token(),
                e.subcategory(),
                e,
                removed
            ),
        }

        result
    }

    async fn run(
        &self,
        request: &DownloadRequest,
        artifact: &mut Artifact,
        sink: &dyn VideoSink,
    ) -> Result<Delivered, DownloadError> {
        let options = ExtractOptions::for_quality(request.quality, artifact.output_template())
            .with_cookies_file(self.cookies_file.clone());

        let ExtractedVideo { title, file_path } = self.extractor.extract(&request.url, &options).await?;

        let reported = file_path.filter(|p| p.exists());
        let path = match reported {
            Some(path) => path,
            None => artifact.locate().await.ok_or_else(|| {
                DownloadError::FileNotFound(format!("no output for token {} in {}", artifact.token(), artifact.dir().display()))
            })?,
        };
        artifact.set_path(path.clone());

        let file_size = fs::metadata(&path).await?.len();
        if file_size > self.max_file_size {
            log::warn!(
                "Artifact {} is {} bytes, above the {} byte limit",
                path.display(),
                file_size,
                self.max_file_size
            );
            return Err(DownloadError::TooLarge {
                size: file_size,
                limit: self.max_file_size,
            });
        }

        let caption = title.unwrap_or_else(|| config::download::FALLBACK_CAPTION.to_string());
        sink.send_video(&path, &caption).await?;

        Ok(Delivered { caption, file_size })
    }
}
