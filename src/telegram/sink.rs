use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::core::config;
use crate::download::downloader::VideoSink;
use crate::download::error::DownloadError;
use crate::telegram::flow::truncate_utf16;

/// Caption cut to the Bot API limit, counted in UTF-16 units.
fn fit_caption(caption: &str) -> &str {
    truncate_utf16(caption, config::telegram::MAX_CAPTION_LEN)
}

/// Sends finished videos to one chat.
pub struct TelegramVideoSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramVideoSink {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl VideoSink for TelegramVideoSink {
    async fn send_video(&self, path: &Path, caption: &str) -> Result<(), DownloadError> {
        log::info!("Sending {} to chat {}", path.display(), self.chat_id);
        self.bot
            .send_video(self.chat_id, InputFile::file(path.to_path_buf()))
            .caption(fit_caption(caption))
            .supports_streaming(true)
            .await
            .map_err(|e| DownloadError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
