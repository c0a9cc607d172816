//! Extraction engine adapter.
//!
//! `VideoExtractor` is the seam between the orchestrator and the engine that
//! actually fetches media. `YtDlpExtractor` drives the `yt-dlp` binary as a
//! subprocess; tests plug in fakes that write files directly.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::core::config;
use crate::core::types::Quality;
use crate::download::error::DownloadError;

/// Options handed to the engine for one download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// yt-dlp format selector
    pub format: String,
    /// Output template, `<dir>/<token>.%(ext)s`
    pub output_template: String,
    pub no_playlist: bool,
    pub quiet: bool,
    pub no_progress: bool,
    pub socket_timeout: Duration,
    pub retries: u32,
    pub fragment_retries: u32,
    /// Resume partially downloaded files
    pub continue_partial: bool,
    pub cookies_file: Option<PathBuf>,
}

impl ExtractOptions {
    /// Builds the standard options for `quality`, writing to `output_template`.
    pub fn for_quality(quality: Quality, output_template: impl Into<String>) -> Self {
        Self {
            format: format_selector(quality),
            output_template: output_template.into(),
            no_playlist: true,
            quiet: true,
            no_progress: true,
            socket_timeout: config::download::socket_timeout(),
            retries: config::download::RETRIES,
            fragment_retries: config::download::FRAGMENT_RETRIES,
            continue_partial: true,
            cookies_file: None,
        }
    }

    pub fn with_cookies_file(mut self, cookies_file: Option<PathBuf>) -> Self {
        self.cookies_file = cookies_file;
        self
    }

    /// Command-line arguments for yt-dlp (without the URL).
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            self.format.clone(),
            "--output".to_string(),
            self.output_template.clone(),
            "--socket-timeout".to_string(),
            self.socket_timeout.as_secs().to_string(),
            "--retries".to_string(),
            self.retries.to_string(),
            "--fragment-retries".to_string(),
            self.fragment_retries.to_string(),
        ];
        if self.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        if self.no_progress {
            args.push("--no-progress".to_string());
        }
        let continue_flag = if self.continue_partial { "--continue" } else { "--no-continue" };
        args.push(continue_flag.to_string());
        if let Some(ref cookies) = self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }
        // Info JSON on stdout while still downloading
        args.push("--dump-json".to_string());
        args.push("--no-simulate".to_string());
        args
    }
}

/// Best stream at or below the quality's height, else the best stream at all.
pub fn format_selector(quality: Quality) -> String {
    format!("best[height<={}]/best", quality.max_height())
}

/// What the engine reports back after a download.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedVideo {
    pub title: Option<String>,
    /// Path the engine wrote to, when it reported one
    pub file_path: Option<PathBuf>,
}

/// Extraction engine interface.
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    /// Human-readable name of the engine (e.g. "yt-dlp")
    fn name(&self) -> &str;

    /// Downloads `url` according to `options`.
    async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<ExtractedVideo, DownloadError>;
}

/// Subset of the yt-dlp info dict we care about.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    filename: Option<String>,
    #[serde(rename = "_filename")]
    legacy_filename: Option<String>,
}

/// Parses the last JSON object yt-dlp printed on stdout.
fn parse_info(stdout: &str) -> ExtractedVideo {
    let info = stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<YtDlpInfo>(line).ok());

    match info {
        Some(info) => ExtractedVideo {
            title: info.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            file_path: info.filename.or(info.legacy_filename).map(PathBuf::from),
        },
        None => ExtractedVideo::default(),
    }
}

/// Keeps the useful tail of yt-dlp stderr (the `ERROR:` lines when present).
fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR"))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let tail = &lines[lines.len().saturating_sub(5)..];
    if tail.is_empty() {
        "yt-dlp exited without an error message".to_string()
    } else {
        tail.join("\n")
    }
}

/// yt-dlp subprocess engine.
pub struct YtDlpExtractor {
    binary: String,
    timeout: Duration,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpExtractor {
    /// Engine configured from `YTDL_BIN` and `YTDLP_TIMEOUT_SECS`.
    pub fn new() -> Self {
        Self::with_binary(config::YTDL_BIN.clone(), config::download::ytdlp_timeout())
    }

    pub fn with_binary(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VideoExtractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<ExtractedVideo, DownloadError> {
        let mut args = options.to_args();
        args.push("--".to_string());
        args.push(url.to_string());

        log::info!("Running {} with format {} for {}", self.binary, options.format, url);
        log::debug!("{} {}", self.binary, args.join(" "));

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::Engine(format!("Failed to run {}: {}", self.binary, e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                log::error!("{} timed out after {}s, killing", self.binary, self.timeout.as_secs());
                return Err(DownloadError::Timeout(format!(
                    "{} timed out after {}s",
                    self.binary,
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            log::warn!("{} exited with {}: {}", self.binary, output.status, stderr.trim());
            return Err(DownloadError::Engine(summarize_stderr(&stderr)));
        }

        Ok(parse_info(&stdout))
    }
}

/// Returns the installed yt-dlp version.
pub async fn ytdlp_version(binary: &str) -> Result<String, DownloadError> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .await
        .map_err(|e| DownloadError::Engine(format!("Failed to get yt-dlp version: {}", e)))?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || version.is_empty() {
        return Err(DownloadError::Engine(
            "yt-dlp is not installed or --version produced no output".to_string(),
        ));
    }
    Ok(version)
}

/// Cookies file from `YTDL_COOKIES_FILE`, if it exists on disk.
pub fn configured_cookies_file() -> Option<PathBuf> {
    let raw = (*config::YTDL_COOKIES_FILE).as_ref()?;
    let path = PathBuf::from(shellexpand::tilde(raw).into_owned());
    if Path::new(&path).exists() {
        Some(path)
    } else {
        log::warn!("YTDL_COOKIES_FILE {} not found, downloading without cookies", raw);
        None
    }
}
