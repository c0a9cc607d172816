use std::fmt;

/// Structured error type for download operations.
///
/// The selection flow matches on these variants to pick the reply the user
/// sees, so every distinct user-facing outcome has its own variant.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp failed (bad exit code, unsupported URL, network errors reported by the engine)
    Engine(String),
    /// The engine returned but the expected file is not on disk
    FileNotFound(String),
    /// Artifact exceeds the upload ceiling
    TooLarge { size: u64, limit: u64 },
    /// yt-dlp did not finish within the configured limit
    Timeout(String),
    /// Failed to send the file via the chat gateway
    SendFailed(String),
    /// The download queue worker is gone
    QueueClosed,
    /// Local filesystem failure (working directory, metadata, removal)
    Io(std::io::Error),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Engine(msg) => write!(f, "{}", msg),
            DownloadError::FileNotFound(msg) => write!(f, "file not found: {}", msg),
            DownloadError::TooLarge { size, limit } => {
                write!(f, "file too large: {} bytes (limit: {} bytes)", size, limit)
            }
            DownloadError::Timeout(msg) => write!(f, "{}", msg),
            DownloadError::SendFailed(msg) => write!(f, "{}", msg),
            DownloadError::QueueClosed => write!(f, "download queue is closed"),
            DownloadError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DownloadError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::Io(err)
    }
}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Engine(_) => "engine",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::TooLarge { .. } => "too_large",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::SendFailed(_) => "send_failed",
            DownloadError::QueueClosed => "queue_closed",
            DownloadError::Io(_) => "io",
        }
    }
}
