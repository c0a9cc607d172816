//! Per-user selection sessions.
//!
//! A session records the platform and quality a user picked and whether a
//! download is in flight or already delivered. Sessions live in memory and
//! expire after a period of inactivity.

use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::UserId;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::core::types::{Platform, Quality};

/// One user's progress through platform → quality → URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Regenerated on every platform choice
    pub id: String,
    pub platform: Platform,
    pub quality: Option<Quality>,
    /// A video was delivered under this session
    pub sent: bool,
    /// A download for this session is queued or running
    pub downloading: bool,
}

impl Session {
    pub fn new(platform: Platform) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platform,
            quality: None,
            sent: false,
            downloading: false,
        }
    }
}

struct Entry {
    session: Session,
    last_active: Instant,
}

/// In-memory session store with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<UserId, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns a copy of the user's live session.
    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.update(user, |session| session.clone()).await
    }

    /// Replaces the user's session.
    pub async fn put(&self, user: UserId, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            user,
            Entry {
                session,
                last_active: Instant::now(),
            },
        );
    }

    /// Removes the user's session, returning it if it was live.
    pub async fn clear(&self, user: UserId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.remove(&user)?;
        (entry.last_active.elapsed() < self.ttl).then_some(entry.session)
    }

    /// Runs `f` on the user's live session under the store lock.
    ///
    /// Returns `None` when there is no session or it has expired. Touching a
    /// session resets its idle timer.
    pub async fn update<R>(&self, user: UserId, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        let expired = match sessions.get(&user) {
            Some(entry) => entry.last_active.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            sessions.remove(&user);
            return None;
        }
        let entry = sessions.get_mut(&user)?;
        entry.last_active = Instant::now();
        Some(f(&mut entry.session))
    }

    /// Drops expired sessions, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.elapsed() < self.ttl);
        before - sessions.len()
    }

    /// Number of stored sessions, expired ones included until the next cleanup.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Starts a background task that evicts expired sessions every `interval`.
    pub fn spawn_cleanup_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.cleanup_expired().await;
                if removed > 0 {
                    log::info!(
                        "Session cleanup: removed {} expired session(s), {} left",
                        removed,
                        store.len().await
                    );
                }
            }
        });
        log::info!("Session cleanup task started (runs every {}s)", interval.as_secs());
        handle
    }
}
