//! URL validation for the supported platforms
//!
//! Pure string matching, no network access. Each platform accepts an optional
//! scheme, an optional well-known subdomain, its canonical or short-link
//! domain, and a non-empty path.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::types::Platform;

static YOUTUBE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(https?://)?(www\.|m\.|music\.)?(youtube\.com|youtu\.be)/.+")
        .expect("Failed to compile YouTube URL regex")
});

static TIKTOK_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(https?://)?(www\.|m\.|vm\.|vt\.)?tiktok\.com/.+").expect("Failed to compile TikTok URL regex")
});

static FACEBOOK_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(https?://)?(www\.|m\.|web\.)?(facebook\.com|fb\.watch)/.+")
        .expect("Failed to compile Facebook URL regex")
});

fn pattern_for(platform: Platform) -> &'static Regex {
    match platform {
        Platform::YouTube => &YOUTUBE_URL_REGEX,
        Platform::TikTok => &TIKTOK_URL_REGEX,
        Platform::Facebook => &FACEBOOK_URL_REGEX,
    }
}

/// Checks that `url` points at `platform`.
///
/// Surrounding whitespace is ignored. Anything that does not match the
/// platform's pattern (including garbage input) yields `false`.
///
/// # Examples
/// ```
/// use tubegrab::core::types::Platform;
/// use tubegrab::core::validation::is_valid_url;
///
/// assert!(is_valid_url(Platform::YouTube, "https://youtu.be/abc123"));
/// assert!(is_valid_url(Platform::TikTok, "vt.tiktok.com/ZSabc/"));
/// assert!(!is_valid_url(Platform::Facebook, "https://youtube.com/watch?v=abc"));
/// ```
pub fn is_valid_url(platform: Platform, url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || url.chars().any(char::is_whitespace) {
        return false;
    }
    pattern_for(platform).is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_urls() {
        let valid = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/shorts/abc",
            "youtube.com/watch?v=abc",
            "https://m.youtube.com/watch?v=abc",
            "https://music.youtube.com/watch?v=abc",
            "https://youtu.be/abc123",
            "youtu.be/abc123",
            "  https://youtu.be/abc123  ",
            "HTTPS://WWW.YOUTUBE.COM/watch?v=abc",
        ];
        for url in valid {
            assert!(is_valid_url(Platform::YouTube, url), "should accept {url}");
        }
    }

    #[test]
    fn test_tiktok_urls() {
        let valid = [
            "https://www.tiktok.com/@user/video/7234567890",
            "tiktok.com/@user/video/1",
            "https://vm.tiktok.com/ZMabc123/",
            "https://vt.tiktok.com/ZSabc123/",
            "https://m.tiktok.com/v/123.html",
        ];
        for url in valid {
            assert!(is_valid_url(Platform::TikTok, url), "should accept {url}");
        }
    }

    #[test]
    fn test_facebook_urls() {
        let valid = [
            "https://www.facebook.com/watch/?v=123",
            "https://m.facebook.com/story.php?id=1",
            "https://web.facebook.com/reel/123",
            "facebook.com/user/videos/123",
            "https://fb.watch/abcDEF/",
        ];
        for url in valid {
            assert!(is_valid_url(Platform::Facebook, url), "should accept {url}");
        }
    }

    #[test]
    fn test_cross_platform_urls_rejected() {
        assert!(!is_valid_url(Platform::TikTok, "https://www.facebook.com/watch/?v=123"));
        assert!(!is_valid_url(Platform::YouTube, "https://vm.tiktok.com/ZMabc123/"));
        assert!(!is_valid_url(Platform::Facebook, "https://youtu.be/abc123"));
    }

    #[test]
    fn test_other_domains_rejected() {
        for platform in Platform::all() {
            assert!(!is_valid_url(platform, "https://vimeo.com/123"));
            assert!(!is_valid_url(platform, "https://evil.com/youtube.com/watch"));
            assert!(!is_valid_url(platform, "https://notyoutube.com/watch?v=1"));
        }
    }

    #[test]
    fn test_malformed_input_rejected() {
        for platform in Platform::all() {
            assert!(!is_valid_url(platform, ""));
            assert!(!is_valid_url(platform, "   "));
            assert!(!is_valid_url(platform, "hello there"));
            assert!(!is_valid_url(platform, "https://"));
            assert!(!is_valid_url(platform, "\u{0}\u{1}binary"));
        }
        // Domain without a path is not a video link.
        assert!(!is_valid_url(Platform::YouTube, "https://youtube.com"));
        assert!(!is_valid_url(Platform::YouTube, "https://youtube.com/"));
        // Embedded whitespace means the user pasted more than a link.
        assert!(!is_valid_url(Platform::YouTube, "https://youtu.be/abc and more"));
    }
}
