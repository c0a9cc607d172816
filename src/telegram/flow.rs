//! Selection flow: platform → quality → URL → download → send.
//!
//! Gateway independent. Handlers translate Telegram updates into calls on
//! [`SelectionFlow`] and render the returned [`FlowReply`] values; the queue
//! worker reports results back through [`SelectionFlow::finish_download`].

use std::fmt;

use teloxide::types::{ChatId, UserId};

use crate::core::config;
use crate::core::types::{Platform, Quality};
use crate::core::validation::is_valid_url;
use crate::download::downloader::{Delivered, Downloader, VideoSink};
use crate::download::error::DownloadError;
use crate::download::queue::DownloadJob;
use crate::storage::sessions::{Session, SessionStore};

const ENGINE_FAILURE_PREFIX: &str =
    "Please wait a moment, the video is being downloaded. If it takes too long, please try again later.\n\nError: ";

/// Plain-text replies produced by the flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowReply {
    /// URL sent without any session
    NoSession,
    /// Quality picked after the session expired
    SessionExpired,
    QualityMissing,
    InvalidUrl(Platform),
    AlreadyDownloaded,
    InProgress,
    Downloading,
    Sent,
    /// Engine, transmission or local failure; carries the raw error text
    DownloadFailed(String),
    FileNotFound,
    TooLarge,
}

impl FlowReply {
    /// Maps a failed download to the reply the user sees.
    pub fn from_error(err: &DownloadError) -> Self {
        match err {
            DownloadError::FileNotFound(_) => FlowReply::FileNotFound,
            DownloadError::TooLarge { .. } => FlowReply::TooLarge,
            other => FlowReply::DownloadFailed(other.to_string()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            FlowReply::NoSession => "⚠ Please start with /start to choose a platform.".to_string(),
            FlowReply::SessionExpired => "⚠ Session expired. Please restart with /start.".to_string(),
            FlowReply::QualityMissing => "⚠ Please choose a video quality first.".to_string(),
            FlowReply::InvalidUrl(platform) => format!("❌ Invalid URL for {}. Try again.", platform),
            FlowReply::AlreadyDownloaded => "✅ You've already downloaded a video. Start again with /start.".to_string(),
            FlowReply::InProgress => "⏳ Your video is still being downloaded, please wait.".to_string(),
            FlowReply::Downloading => "⏳ Downloading video, please wait...".to_string(),
            FlowReply::Sent => "✅ Video sent successfully!".to_string(),
            FlowReply::DownloadFailed(raw) => engine_failure_text(raw),
            FlowReply::FileNotFound => "❌ Download failed: file not found.".to_string(),
            FlowReply::TooLarge => "⚠ File too large (limit: 2GB). Try lower quality.".to_string(),
        }
    }
}

impl fmt::Display for FlowReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Longest prefix of `text` that fits in `max_units` UTF-16 code units.
///
/// Telegram counts message and caption limits in UTF-16 units; the cut always
/// lands on a char boundary.
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}

/// Failure text with the raw error cut to fit a single Telegram message.
fn engine_failure_text(raw: &str) -> String {
    let budget = config::telegram::MAX_MESSAGE_LEN.saturating_sub(ENGINE_FAILURE_PREFIX.encode_utf16().count());
    let raw = raw.trim();
    let mut text = String::with_capacity(ENGINE_FAILURE_PREFIX.len() + raw.len());
    text.push_str(ENGINE_FAILURE_PREFIX);
    if raw.encode_utf16().count() > budget {
        text.push_str(truncate_utf16(raw, budget.saturating_sub(1)));
        text.push('…');
    } else {
        text.push_str(raw);
    }
    text
}

/// Outcome of a URL submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Job to enqueue; the session is now marked as downloading
    Accepted(DownloadJob),
    /// Nothing to do but reply
    Rejected(FlowReply),
}

/// Per-user state machine over the session store.
#[derive(Clone)]
pub struct SelectionFlow {
    sessions: SessionStore,
}

impl SelectionFlow {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Starts a fresh session for `platform`, replacing any previous one.
    pub async fn choose_platform(&self, user: UserId, platform: Platform) -> Session {
        let session = Session::new(platform);
        self.sessions.put(user, session.clone()).await;
        log::info!("User {} selected platform {}", user, platform);
        session
    }

    /// Stores the quality on the live session.
    pub async fn choose_quality(&self, user: UserId, quality: Quality) -> Result<Session, FlowReply> {
        let updated = self
            .sessions
            .update(user, |session| {
                session.quality = Some(quality);
                session.clone()
            })
            .await;

        match updated {
            Some(session) => {
                log::info!("User {} selected quality {} for {}", user, quality, session.platform);
                Ok(session)
            }
            None => {
                log::info!("User {} picked quality {} without a live session", user, quality);
                Err(FlowReply::SessionExpired)
            }
        }
    }

    /// Runs the submission guards and, when they pass, marks the session as
    /// downloading and returns the job to enqueue.
    pub async fn submit_url(&self, user: UserId, chat_id: ChatId, text: &str) -> Submission {
        let url = text.trim();
        let outcome = self
            .sessions
            .update(user, |session| {
                if session.sent {
                    return Err(FlowReply::AlreadyDownloaded);
                }
                if session.downloading {
                    return Err(FlowReply::InProgress);
                }
                let Some(quality) = session.quality else {
                    return Err(FlowReply::QualityMissing);
                };
                if !is_valid_url(session.platform, url) {
                    return Err(FlowReply::InvalidUrl(session.platform));
                }
                session.downloading = true;
                Ok(DownloadJob::new(user, chat_id, session.id.clone(), session.platform, quality, url))
            })
            .await;

        match outcome {
            None => Submission::Rejected(FlowReply::NoSession),
            Some(Err(FlowReply::InvalidUrl(platform))) => {
                match Platform::detect(url) {
                    Some(detected) => log::info!(
                        "User {} sent a {} URL while {} is selected: {}",
                        user,
                        detected,
                        platform,
                        url
                    ),
                    None => log::info!("User {} sent an invalid {} URL: {}", user, platform, url),
                }
                Submission::Rejected(FlowReply::InvalidUrl(platform))
            }
            Some(Err(reply)) => Submission::Rejected(reply),
            Some(Ok(job)) => {
                log::info!(
                    "Accepted {} download {} for user {} at {}: {}",
                    job.platform,
                    job.id,
                    user,
                    job.quality,
                    job.url
                );
                Submission::Accepted(job)
            }
        }
    }

    /// Applies a download result to the session and returns the final reply.
    ///
    /// Results for a session that was replaced in the meantime do not touch
    /// the live session.
    pub async fn finish_download(&self, job: &DownloadJob, result: &Result<Delivered, DownloadError>) -> FlowReply {
        let success = result.is_ok();
        let applied = self
            .sessions
            .update(job.user_id, |session| {
                if session.id != job.session_id {
                    return false;
                }
                session.downloading = false;
                session.sent = success;
                true
            })
            .await
            .unwrap_or(false);

        if !applied {
            log::info!(
                "Session for user {} changed while job {} was running, leaving it untouched",
                job.user_id,
                job.id
            );
        }

        match result {
            Ok(_) => FlowReply::Sent,
            Err(e) => FlowReply::from_error(e),
        }
    }

    /// Runs the job through `downloader` and reports the result.
    pub async fn run_download(&self, job: &DownloadJob, downloader: &Downloader, sink: &dyn VideoSink) -> FlowReply {
        let result = downloader.download(&job.request(), sink).await;
        self.finish_download(job, &result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const USER: UserId = UserId(1001);
    const CHAT: ChatId = ChatId(1001);

    fn flow() -> SelectionFlow {
        SelectionFlow::new(SessionStore::new(Duration::from_secs(3600)))
    }

    fn accepted(submission: Submission) -> DownloadJob {
        match submission {
            Submission::Accepted(job) => job,
            Submission::Rejected(reply) => panic!("expected a job, got {reply:?}"),
        }
    }

    #[tokio::test]
    async fn test_platform_choice_starts_clean_session() {
        let flow = flow();
        let session = flow.choose_platform(USER, Platform::YouTube).await;
        assert!(!session.sent);
        assert!(!session.downloading);
        assert_eq!(session.quality, None);
    }

    #[tokio::test]
    async fn test_quality_without_session_is_expired() {
        let flow = flow();
        assert_eq!(
            flow.choose_quality(USER, Quality::P720).await,
            Err(FlowReply::SessionExpired)
        );
    }

    #[tokio::test]
    async fn test_url_guards() {
        let flow = flow();
        let url = "https://youtu.be/abc123";

        assert_eq!(
            flow.submit_url(USER, CHAT, url).await,
            Submission::Rejected(FlowReply::NoSession)
        );

        flow.choose_platform(USER, Platform::YouTube).await;
        assert_eq!(
            flow.submit_url(USER, CHAT, url).await,
            Submission::Rejected(FlowReply::QualityMissing)
        );

        flow.choose_quality(USER, Quality::P720).await.unwrap();
        assert_eq!(
            flow.submit_url(USER, CHAT, "https://vimeo.com/123").await,
            Submission::Rejected(FlowReply::InvalidUrl(Platform::YouTube))
        );

        let job = accepted(flow.submit_url(USER, CHAT, &format!("  {url}\n")).await);
        assert_eq!(job.url, url);
        assert_eq!(job.quality, Quality::P720);
        assert_eq!(
            flow.submit_url(USER, CHAT, url).await,
            Submission::Rejected(FlowReply::InProgress)
        );
    }

    #[tokio::test]
    async fn test_success_marks_sent_and_blocks_resubmission() {
        let flow = flow();
        flow.choose_platform(USER, Platform::TikTok).await;
        flow.choose_quality(USER, Quality::P360).await.unwrap();
        let job = accepted(flow.submit_url(USER, CHAT, "https://vm.tiktok.com/ZMabc/").await);

        let delivered = Delivered {
            caption: "clip".into(),
            file_size: 1,
        };
        assert_eq!(flow.finish_download(&job, &Ok(delivered)).await, FlowReply::Sent);

        let session = flow.sessions().get(USER).await.unwrap();
        assert!(session.sent);
        assert!(!session.downloading);
        assert_eq!(
            flow.submit_url(USER, CHAT, "https://vm.tiktok.com/ZMabc/").await,
            Submission::Rejected(FlowReply::AlreadyDownloaded)
        );

        // Picking a platform again starts over
        flow.choose_platform(USER, Platform::TikTok).await;
        assert!(!flow.sessions().get(USER).await.unwrap().sent);
    }

    #[tokio::test]
    async fn test_failure_keeps_selection_and_allows_retry() {
        let flow = flow();
        flow.choose_platform(USER, Platform::Facebook).await;
        flow.choose_quality(USER, Quality::P1080).await.unwrap();
        let url = "https://fb.watch/abcdef/";
        let job = accepted(flow.submit_url(USER, CHAT, url).await);

        let reply = flow
            .finish_download(&job, &Err(DownloadError::Engine("Connection reset by peer".into())))
            .await;
        assert!(reply.text().ends_with("Error: Connection reset by peer"));

        let session = flow.sessions().get(USER).await.unwrap();
        assert!(!session.sent);
        assert!(!session.downloading);
        assert_eq!(session.quality, Some(Quality::P1080));
        accepted(flow.submit_url(USER, CHAT, url).await);
    }

    #[tokio::test]
    async fn test_stale_completion_leaves_new_session_alone() {
        let flow = flow();
        flow.choose_platform(USER, Platform::YouTube).await;
        flow.choose_quality(USER, Quality::P720).await.unwrap();
        let job = accepted(flow.submit_url(USER, CHAT, "https://www.youtube.com/watch?v=abc").await);

        flow.choose_platform(USER, Platform::TikTok).await;
        let delivered = Delivered {
            caption: "x".into(),
            file_size: 1,
        };
        flow.finish_download(&job, &Ok(delivered)).await;

        let session = flow.sessions().get(USER).await.unwrap();
        assert_eq!(session.platform, Platform::TikTok);
        assert!(!session.sent);
    }

    #[test]
    fn test_error_replies() {
        assert_eq!(
            FlowReply::from_error(&DownloadError::FileNotFound("x".into())).text(),
            "❌ Download failed: file not found."
        );
        assert_eq!(
            FlowReply::from_error(&DownloadError::TooLarge { size: 2, limit: 1 }).text(),
            "⚠ File too large (limit: 2GB). Try lower quality."
        );
        assert_eq!(
            FlowReply::from_error(&DownloadError::SendFailed("Request Entity Too Large".into())).text(),
            format!("{ENGINE_FAILURE_PREFIX}Request Entity Too Large")
        );
    }

    #[test]
    fn test_engine_failure_text_fits_one_message() {
        let raw = "x".repeat(10_000);
        let text = engine_failure_text(&raw);
        assert_eq!(text.chars().count(), config::telegram::MAX_MESSAGE_LEN);
        assert!(text.starts_with(ENGINE_FAILURE_PREFIX));
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_engine_failure_text_counts_utf16_units() {
        let text = FlowReply::DownloadFailed("🎵".repeat(5000)).text();
        let units = text.encode_utf16().count();
        assert!(units <= config::telegram::MAX_MESSAGE_LEN, "{units} UTF-16 units");
        assert!(units >= config::telegram::MAX_MESSAGE_LEN - 2);
        assert!(text.ends_with("🎵…"));
    }

    #[test]
    fn test_truncate_utf16_keeps_char_boundaries() {
        assert_eq!(truncate_utf16("abc", 5), "abc");
        assert_eq!(truncate_utf16("abc", 2), "ab");
        // Each emoji takes two units; half of one is never kept
        assert_eq!(truncate_utf16("🎵🎵🎵", 3), "🎵");
        assert_eq!(truncate_utf16("é🎵", 2), "é");
        assert_eq!(truncate_utf16("🎵", 0), "");
    }
}
