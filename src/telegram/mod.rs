//! Telegram bot integration and handlers

pub mod bot;
pub mod downloads;
pub mod flow;
pub mod handlers;
pub mod menu;
pub mod sink;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use downloads::deliver_job;
pub use flow::{FlowReply, SelectionFlow, Submission};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use sink::TelegramVideoSink;
