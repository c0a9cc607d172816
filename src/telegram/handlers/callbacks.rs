//! Inline button handler

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};

use super::types::HandlerDeps;
use crate::telegram::menu::{self, MenuAction};

/// Handles callback queries from the menu inline keyboards.
///
/// Every query is answered, including ones with unknown data, so the
/// client stops showing the loading spinner.
pub async fn handle_menu_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let message_id = q.message.as_ref().map(|m| m.id());
    let (Some(chat_id), Some(message_id)) = (chat_id, message_id) else {
        log::warn!("Callback {} from user {} has no message attached", data, q.from.id);
        return Ok(());
    };

    let Some(action) = MenuAction::parse(data) else {
        log::warn!("Unknown callback data from user {}: {}", q.from.id, data);
        return Ok(());
    };

    match action {
        MenuAction::OpenPlatforms => {
            edit_menu(bot, chat_id, message_id, menu::platform_menu_text(), Some(menu::platform_keyboard())).await?;
        }
        MenuAction::Platform(platform) => {
            deps.flow.choose_platform(q.from.id, platform).await;
            edit_menu(
                bot,
                chat_id,
                message_id,
                menu::platform_selected_text(platform),
                Some(menu::quality_keyboard()),
            )
            .await?;
        }
        MenuAction::Quality(quality) => match deps.flow.choose_quality(q.from.id, quality).await {
            Ok(_) => {
                edit_menu(bot, chat_id, message_id, menu::quality_selected_text(quality), None).await?;
            }
            Err(reply) => {
                bot.edit_message_text(chat_id, message_id, reply.text()).await?;
            }
        },
    }

    Ok(())
}

async fn edit_menu(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let mut req = bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(kb) = keyboard {
        req = req.reply_markup(kb);
    }
    req.await?;
    Ok(())
}
