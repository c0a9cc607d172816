//! Inline keyboards, menu texts and callback data.
//!
//! Texts are MarkdownV2; every literal part goes through `escape`.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::markdown::{bold, escape};

use crate::core::types::{Platform, Quality};

/// Button presses the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// "📺 Download Video" on the welcome message
    OpenPlatforms,
    Platform(Platform),
    Quality(Quality),
}

impl MenuAction {
    /// Callback data for this action (`menu:download`, `platform:<label>`, `quality:<label>`).
    pub fn to_data(self) -> String {
        match self {
            MenuAction::OpenPlatforms => "menu:download".to_string(),
            MenuAction::Platform(p) => format!("platform:{}", p.as_str()),
            MenuAction::Quality(q) => format!("quality:{}", q.as_str()),
        }
    }

    /// Parses callback data; unknown or garbled data yields `None`.
    pub fn parse(data: &str) -> Option<Self> {
        if data == "menu:download" {
            return Some(MenuAction::OpenPlatforms);
        }
        if let Some(label) = data.strip_prefix("platform:") {
            return label.parse().ok().map(MenuAction::Platform);
        }
        if let Some(label) = data.strip_prefix("quality:") {
            return label.parse().ok().map(MenuAction::Quality);
        }
        None
    }
}

pub fn welcome_text() -> String {
    format!(
        "👋 {}\n\n{}",
        bold(&escape("Welcome to the Video Downloader Bot!")),
        escape("Choose an option:")
    )
}

pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "📺 Download Video",
        MenuAction::OpenPlatforms.to_data(),
    )]])
}

pub fn platform_menu_text() -> String {
    escape("Select a platform:")
}

/// One platform per row.
pub fn platform_keyboard() -> InlineKeyboardMarkup {
    let rows = Platform::all()
        .map(|p| {
            vec![InlineKeyboardButton::callback(
                format!("{} {}", p.emoji(), p.as_str()),
                MenuAction::Platform(p).to_data(),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn platform_selected_text(platform: Platform) -> String {
    format!(
        "📥 Platform selected: {}\n{}",
        bold(&escape(platform.as_str())),
        escape("Now choose video quality:")
    )
}

/// Qualities side by side in a single row.
pub fn quality_keyboard() -> InlineKeyboardMarkup {
    let row = Quality::all()
        .map(|q| InlineKeyboardButton::callback(q.as_str(), MenuAction::Quality(q).to_data()))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

pub fn quality_selected_text(quality: Quality) -> String {
    format!(
        "🎞 Quality selected: {}\n{}",
        bold(&escape(quality.as_str())),
        escape("Now send the video URL:")
    )
}
