use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Configuration constants for the bot
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Path to a cookies file handed to yt-dlp
/// Read from YTDL_COOKIES_FILE environment variable
/// Ignored when the file does not exist
pub static YTDL_COOKIES_FILE: Lazy<Option<String>> =
    Lazy::new(|| env::var("YTDL_COOKIES_FILE").ok().filter(|s| !s.trim().is_empty()));

/// Working directory for downloaded artifacts
/// Read from DOWNLOAD_FOLDER environment variable
/// Default: downloads (relative to the working directory)
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Custom Bot API server URL (local telegram-bot-api)
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Returns the bot token or a configuration error when it is missing.
///
/// Reads the environment directly so that `.env` files loaded after the
/// statics were first touched are still honoured.
pub fn require_bot_token() -> AppResult<String> {
    let token = env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default();
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Config(
            "BOT_TOKEN is not set (export BOT_TOKEN or TELOXIDE_TOKEN)".to_string(),
        ));
    }
    Ok(token.to_string())
}

/// Working directory with `~` expanded.
pub fn download_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).into_owned())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Invalid value for {}: {:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Session configuration
pub mod sessions {
    use super::{env_parse, Duration, Lazy};

    /// Idle time after which a session is evicted (seconds)
    /// Read from SESSION_TTL_SECS, default 24 hours
    pub static TTL_SECS: Lazy<u64> = Lazy::new(|| env_parse("SESSION_TTL_SECS", 24 * 60 * 60));

    /// Interval between eviction sweeps (in seconds)
    pub const CLEANUP_INTERVAL_SECS: u64 = 600;

    pub fn ttl() -> Duration {
        Duration::from_secs(*TTL_SECS)
    }

    pub fn cleanup_interval() -> Duration {
        Duration::from_secs(CLEANUP_INTERVAL_SECS)
    }
}

/// Queue processing configuration
pub mod queue {
    use super::{env_parse, Lazy};

    /// Maximum number of concurrent downloads
    /// Read from MAX_CONCURRENT_DOWNLOADS, default 2
    pub static MAX_CONCURRENT_DOWNLOADS: Lazy<usize> =
        Lazy::new(|| env_parse::<usize>("MAX_CONCURRENT_DOWNLOADS", 2).max(1));
}

/// Download configuration
pub mod download {
    use super::{env_parse, Duration, Lazy};

    /// Telegram upload ceiling for local Bot API servers (2 GiB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

    /// Size ceiling in bytes, read from MAX_FILE_SIZE_BYTES
    pub static MAX_FILE_SIZE: Lazy<u64> = Lazy::new(|| env_parse("MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE));

    /// yt-dlp --socket-timeout (in seconds)
    pub const SOCKET_TIMEOUT_SECS: u64 = 120;

    /// yt-dlp --retries
    pub const RETRIES: u32 = 10;

    /// yt-dlp --fragment-retries
    pub const FRAGMENT_RETRIES: u32 = 10;

    /// Length of the random token that namespaces artifact files
    pub const TOKEN_LEN: usize = 10;

    /// Caption used when the engine reports no title
    pub const FALLBACK_CAPTION: &str = "Downloaded video";

    /// Hard limit for a whole yt-dlp run (in seconds), read from YTDLP_TIMEOUT_SECS
    pub static YTDLP_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| env_parse("YTDLP_TIMEOUT_SECS", 30 * 60));

    pub fn socket_timeout() -> Duration {
        Duration::from_secs(SOCKET_TIMEOUT_SECS)
    }

    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(*YTDLP_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Upper bound for a single backoff sleep (in seconds)
    pub const MAX_BACKOFF_SECS: u64 = 60;

    /// Attempts made while the Bot API is still starting
    pub const STARTUP_MAX_RETRIES: u32 = 60;

    /// Delay between startup attempts (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;

    pub fn startup_delay() -> Duration {
        Duration::from_secs(STARTUP_RETRY_DELAY_SECS)
    }

    /// Backoff before the `attempt`-th dispatcher restart.
    pub fn backoff(attempt: u32) -> Duration {
        let secs = EXPONENTIAL_BACKOFF_BASE.saturating_pow(attempt).min(MAX_BACKOFF_SECS);
        Duration::from_secs(secs)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Large enough for 2 GiB video uploads through a local Bot API server
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Telegram message limits
pub mod telegram {
    /// Maximum length of a text message
    pub const MAX_MESSAGE_LEN: usize = 4096;

    /// Maximum length of a media caption
    pub const MAX_CAPTION_LEN: usize = 1024;
}
