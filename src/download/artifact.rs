//! Transient download artifact.
//!
//! Every request gets a random token; the engine writes `<token>.<ext>` into
//! the working directory. The realized path stays `None` until it is known,
//! and cleanup removes it together with any `<token>.*` leftovers such as
//! `.part` files from an interrupted download. An artifact dropped before
//! [`Artifact::cleanup`] finished (task aborted, runtime shutting down) sweeps
//! its files synchronously on drop.

use std::path::{Path, PathBuf};

use fs_err::tokio as fs;

use crate::core::config;

/// Suffixes yt-dlp uses for in-progress files.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Generates a short random token for artifact names.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..config::download::TOKEN_LEN].to_string()
}

fn is_partial(name: &str) -> bool {
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) || name.contains(".part-Frag")
}

/// One request's file in the working directory.
#[derive(Debug)]
pub struct Artifact {
    dir: PathBuf,
    token: String,
    path: Option<PathBuf>,
    cleaned: bool,
}

impl Artifact {
    /// New artifact with a fresh token under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_token(dir, new_token())
    }

    pub fn with_token(dir: impl Into<PathBuf>, token: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            token: token.into(),
            path: None,
            cleaned: false,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<token>.%(ext)s` for the engine.
    pub fn output_template(&self) -> String {
        self.dir
            .join(format!("{}.%(ext)s", self.token))
            .to_string_lossy()
            .into_owned()
    }

    /// Realized path, once known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    fn owns_name(&self, name: &str) -> bool {
        name.strip_prefix(self.token.as_str())
            .map(|rest| rest.starts_with('.'))
            .unwrap_or(false)
    }

    /// Finds the finished `<token>.<ext>` file, ignoring partial downloads.
    pub async fn locate(&self) -> Option<PathBuf> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read working directory {}: {}", self.dir.display(), e);
                return None;
            }
        };

        let mut found = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.owns_name(&name) && !is_partial(&name) {
                found.push(entry.path());
            }
        }
        found.sort();
        found.into_iter().next()
    }

    /// Removes the realized file and every `<token>.*` leftover.
    ///
    /// Returns the number of files removed. Failures are logged, never raised.
    pub async fn cleanup(&mut self) -> usize {
        let mut removed = 0;

        if let Some(path) = self.path.take() {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    log::info!("File {} removed from working directory", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return removed,
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.owns_name(&name) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    log::debug!("Removed leftover {}", name);
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to remove leftover {}: {}", name, e),
            }
        }

        self.cleaned = true;
        removed
    }

    /// Blocking variant of the leftover sweep, for `Drop`.
    fn sweep_blocking(&self) -> usize {
        let Ok(entries) = fs_err::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| self.owns_name(&entry.file_name().to_string_lossy()))
            .filter(|entry| fs_err::remove_file(entry.path()).is_ok())
            .count()
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        let removed = self.sweep_blocking();
        if removed > 0 {
            log::warn!(
                "Download [{}] was interrupted, removed {} leftover file(s)",
                self.token,
                removed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = new_token();
        assert_eq!(token.len(), 10);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_token(), token);
    }

    #[test]
    fn test_output_template() {
        let artifact = Artifact::with_token("downloads", "abc123def0");
        assert_eq!(
            artifact.output_template(),
            Path::new("downloads").join("abc123def0.%(ext)s").to_string_lossy()
        );
        assert!(artifact.path().is_none());
    }

    #[test]
    fn test_owns_name() {
        let artifact = Artifact::with_token("d", "abc");
        assert!(artifact.owns_name("abc.mp4"));
        assert!(artifact.owns_name("abc.mp4.part"));
        assert!(!artifact.owns_name("abcd.mp4"));
        assert!(!artifact.owns_name("xabc.mp4"));
        assert!(!artifact.owns_name("abc"));
    }

    #[tokio::test]
    async fn test_locate_skips_partials_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::with_token(dir.path(), "tok1234567");
        std::fs::write(dir.path().join("tok1234567.mp4.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("other00000.mp4"), b"other").unwrap();
        assert_eq!(artifact.locate().await, None);

        std::fs::write(dir.path().join("tok1234567.mp4"), b"done").unwrap();
        assert_eq!(artifact.locate().await, Some(dir.path().join("tok1234567.mp4")));
    }

    #[tokio::test]
    async fn test_cleanup_without_known_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = Artifact::with_token(dir.path(), "tok1234567");
        std::fs::write(dir.path().join("tok1234567.webm.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("keep000000.mp4"), b"other").unwrap();

        assert_eq!(artifact.cleanup().await, 1);
        assert!(!dir.path().join("tok1234567.webm.part").exists());
        assert!(dir.path().join("keep000000.mp4").exists());
    }

    #[tokio::test]
    async fn test_cleanup_with_known_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = Artifact::with_token(dir.path(), "tok1234567");
        let path = dir.path().join("tok1234567.mp4");
        std::fs::write(&path, b"video").unwrap();
        artifact.set_path(path.clone());

        assert_eq!(artifact.cleanup().await, 1);
        assert!(!path.exists());
        assert!(artifact.path().is_none());
        // Second cleanup is a no-op.
        assert_eq!(artifact.cleanup().await, 0);
    }

    #[test]
    fn test_drop_without_cleanup_removes_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tok1234567.mp4.part"), b"partial").unwrap();
        std::fs::write(dir.path().join("keep000000.mp4"), b"other").unwrap();

        drop(Artifact::with_token(dir.path(), "tok1234567"));

        assert!(!dir.path().join("tok1234567.mp4.part").exists());
        assert!(dir.path().join("keep000000.mp4").exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir_is_noop() {
        let mut artifact = Artifact::with_token("/nonexistent/tubegrab-test-dir", "tok1234567");
        assert_eq!(artifact.cleanup().await, 0);
    }
}
