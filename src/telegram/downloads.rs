//! Queue worker side of a download: run it, then tell the user how it went.

use std::sync::Arc;

use teloxide::prelude::*;

use crate::download::downloader::Downloader;
use crate::download::queue::DownloadJob;
use crate::telegram::flow::SelectionFlow;
use crate::telegram::sink::TelegramVideoSink;

/// Runs one queued job and sends the final reply to its chat.
pub async fn deliver_job(bot: Bot, flow: SelectionFlow, downloader: Arc<Downloader>, job: DownloadJob) {
    log::info!("Worker picked up job {} for user {}", job.id, job.user_id);

    let sink = TelegramVideoSink::new(bot.clone(), job.chat_id);
    let reply = flow.run_download(&job, &downloader, &sink).await;

    if let Err(e) = bot.send_message(job.chat_id, reply.text()).await {
        log::error!("Failed to send final reply for job {} to chat {}: {}", job.id, job.chat_id, e);
    }
}
