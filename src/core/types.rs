use std::fmt;
use std::str::FromStr;

use strum::{EnumIter, IntoEnumIterator};

/// Source platform the user picked from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Platform {
    YouTube,
    TikTok,
    Facebook,
}

impl Platform {
    /// Label shown on buttons and used as the callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
            Platform::Facebook => "Facebook",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Platform::YouTube => "▶️",
            Platform::TikTok => "🎵",
            Platform::Facebook => "📘",
        }
    }

    /// All platforms in menu order.
    pub fn all() -> impl Iterator<Item = Platform> {
        Platform::iter()
    }

    /// Returns the platform whose URL pattern accepts `url`, if any.
    pub fn detect(url: &str) -> Option<Platform> {
        Platform::iter().find(|p| crate::core::validation::is_valid_url(*p, url))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

/// Video quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Quality {
    P360,
    #[default]
    P720,
    P1080,
    K2,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P360 => "360p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::K2 => "2k",
        }
    }

    /// Height ceiling in pixels passed to the format selector.
    ///
    /// `p` labels carry the height directly; `2k` is the 1440p tier.
    pub fn max_height(&self) -> u32 {
        match self.as_str().strip_suffix('p').and_then(|h| h.parse().ok()) {
            Some(height) => height,
            None => 1440,
        }
    }

    /// All qualities in menu order.
    pub fn all() -> impl Iterator<Item = Quality> {
        Quality::iter()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Quality::iter()
            .find(|q| q.as_str() == lower)
            .ok_or_else(|| format!("Unknown quality: {}", s))
    }
}
