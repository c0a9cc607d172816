//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command list and menu button registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, MenuButton};
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::error::AppResult;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(AppError)` - Invalid BOT_API_URL or HTTP client setup failure
pub fn create_bot(token: &str) -> AppResult<Bot> {
    let client = ClientBuilder::new()
        .timeout(config::network::timeout())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
    let bot = Bot::with_client(token, client);

    let bot = match *config::BOT_API_URL {
        Some(ref bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url)?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Commands shown in the Telegram UI
pub fn bot_commands() -> Vec<BotCommand> {
    Command::bot_commands()
}

/// Sets up bot commands and the chat menu button in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(bot_commands()).await?;
    bot.set_chat_menu_button().menu_button(MenuButton::Commands).await?;
    Ok(())
}
