//! Command and text message handlers

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::types::HandlerDeps;
use crate::download::error::DownloadError;
use crate::telegram::flow::{FlowReply, Submission};
use crate::telegram::menu;

/// Handles /start: shows the welcome message. No session is created.
pub async fn handle_start_command(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    log::info!("/start from chat {}", msg.chat.id);
    bot.send_message(msg.chat.id, menu::welcome_text())
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(menu::welcome_keyboard())
        .await?;
    Ok(())
}

/// Handles a plain text message as a URL submission.
pub async fn handle_url_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    let job = match deps.flow.submit_url(user.id, msg.chat.id, text).await {
        Submission::Rejected(reply) => {
            bot.send_message(msg.chat.id, reply.text()).await?;
            return Ok(());
        }
        Submission::Accepted(job) => job,
    };

    // Acknowledge before the worker can report back
    let ack = bot.send_message(msg.chat.id, FlowReply::Downloading.text()).await;
    if let Err(e) = deps.download_queue.enqueue(job.clone()) {
        log::error!("Failed to enqueue job {}: {}", job.id, e);
        let reply = deps.flow.finish_download(&job, &Err(DownloadError::QueueClosed)).await;
        bot.send_message(msg.chat.id, reply.text()).await?;
    }
    ack?;
    Ok(())
}
