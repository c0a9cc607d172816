//! Tubegrab - Telegram bot that downloads videos from YouTube, TikTok and Facebook
//!
//! The user picks a platform and a quality through inline buttons, then sends
//! a link. The video is fetched with yt-dlp, sent back to the chat, and the
//! local file is removed.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, domain types and URL validation
//! - `storage`: In-memory user sessions
//! - `download`: yt-dlp adapter, download orchestration and the job queue
//! - `telegram`: Telegram bot integration, selection flow and handlers

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Platform, Quality};
pub use crate::download::{DownloadQueue, Downloader};
pub use crate::storage::SessionStore;
pub use crate::telegram::SelectionFlow;
