//! Telegram update handlers
//!
//! - `schema`: dispatcher tree
//! - `commands`: /start and URL messages
//! - `callbacks`: inline menu buttons

pub mod callbacks;
pub mod commands;
pub mod schema;
pub mod types;

pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
