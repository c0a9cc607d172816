//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Download engine configuration logging

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// The log file is opened in append mode so restarts keep earlier history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the log file or install the logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", log_file_path, e))?;

    let log_config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, log_config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, log_config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the download engine setup at application startup
///
/// Reports the yt-dlp binary, working directory, cookies file and limits.
pub fn log_engine_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🎬 Download Engine Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("yt-dlp binary: {}", *config::YTDL_BIN);
    log::info!("Working directory: {}", config::download_dir().display());

    match *config::YTDL_COOKIES_FILE {
        Some(ref cookies_file) => {
            let expanded = shellexpand::tilde(cookies_file).to_string();
            if std::path::Path::new(&expanded).exists() {
                log::info!("✅ YTDL_COOKIES_FILE: {}", expanded);
            } else {
                log::error!("❌ YTDL_COOKIES_FILE: {} (FILE NOT FOUND!)", cookies_file);
                log::error!("   Current directory: {:?}", std::env::current_dir());
            }
        }
        None => log::info!("YTDL_COOKIES_FILE: not set, downloading without cookies"),
    }

    log::info!(
        "Max concurrent downloads: {}, size limit: {} bytes, engine timeout: {}s",
        *config::queue::MAX_CONCURRENT_DOWNLOADS,
        *config::download::MAX_FILE_SIZE,
        *config::download::YTDLP_TIMEOUT_SECS
    );
    log::info!("Session idle timeout: {}s", config::sessions::ttl().as_secs());
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
