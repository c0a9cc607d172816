use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use tubegrab::cli::{Cli, Commands};
use tubegrab::core::{config, init_logger, log_engine_configuration};
use tubegrab::download::queue::{process_queue, DownloadQueue};
use tubegrab::download::ytdlp::{configured_cookies_file, ytdlp_version, YtDlpExtractor};
use tubegrab::download::Downloader;
use tubegrab::storage::SessionStore;
use tubegrab::telegram::{create_bot, deliver_job, schema, setup_bot_commands, HandlerDeps, SelectionFlow};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics instead of losing them with the dispatcher task
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env first so LOG_FILE_PATH and friends are honoured
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::CheckYtdlp) => run_ytdlp_check().await,
        Some(Commands::Run) => run_bot().await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot().await
        }
    }
}

/// Prints the yt-dlp version
async fn run_ytdlp_check() -> Result<()> {
    let version = ytdlp_version(&config::YTDL_BIN).await?;
    log::info!("{} version: {}", *config::YTDL_BIN, version);
    println!("{}", version);
    Ok(())
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    let token = config::require_bot_token()?;
    log_engine_configuration();

    let bot = create_bot(&token)?;

    // Retry while a local Bot API server is still starting
    let bot_info = {
        let mut startup_retry = 0;
        loop {
            match bot.get_me().await {
                Ok(info) => break info,
                Err(e) => {
                    let err_str = e.to_string();
                    let is_retryable = err_str.contains("restart")
                        || err_str.contains("network")
                        || err_str.contains("connection")
                        || err_str.contains("timed out")
                        || err_str.contains("Connection refused");

                    startup_retry += 1;
                    if startup_retry >= config::retry::STARTUP_MAX_RETRIES || !is_retryable {
                        return Err(anyhow::anyhow!(
                            "Failed to connect to Bot API after {} attempt(s): {}",
                            startup_retry,
                            e
                        ));
                    }

                    log::warn!(
                        "Bot API not ready (attempt {}/{}): {}. Retrying in {} seconds...",
                        startup_retry,
                        config::retry::STARTUP_MAX_RETRIES,
                        err_str,
                        config::retry::STARTUP_RETRY_DELAY_SECS
                    );
                    sleep(config::retry::startup_delay()).await;
                }
            }
        }
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username.as_deref(), bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let work_dir = config::download_dir();
    fs_err::tokio::create_dir_all(&work_dir).await?;
    log::info!("Working directory ready: {}", work_dir.display());

    let sessions = SessionStore::new(config::sessions::ttl());
    sessions.spawn_cleanup_task(config::sessions::cleanup_interval());
    let flow = SelectionFlow::new(sessions);

    let downloader = Arc::new(
        Downloader::new(Arc::new(YtDlpExtractor::new()), work_dir)
            .with_max_file_size(*config::download::MAX_FILE_SIZE)
            .with_cookies_file(configured_cookies_file()),
    );

    let (download_queue, queue_rx) = DownloadQueue::channel();
    {
        let bot = bot.clone();
        let flow = flow.clone();
        tokio::spawn(process_queue(
            queue_rx,
            *config::queue::MAX_CONCURRENT_DOWNLOADS,
            move |job| deliver_job(bot.clone(), flow.clone(), Arc::clone(&downloader), job),
        ));
    }

    let handler = schema(HandlerDeps::new(flow, download_queue));

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // Separate task so a panic in the dispatcher surfaces on the JoinHandle
        let handle = tokio::spawn(async move {
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);
                if retry_count >= max_retries {
                    log::error!("Max retries reached after panic. Exiting...");
                    break;
                }
                retry_count += 1;
                let delay = config::retry::backoff(retry_count);
                log::info!(
                    "Restarting dispatcher in {}s (attempt {}/{})",
                    delay.as_secs(),
                    retry_count,
                    max_retries
                );
                sleep(delay).await;
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }
    }

    Ok(())
}
