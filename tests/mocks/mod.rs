//! Mock implementations for integration tests
//!
//! This module provides a scripted extraction engine so the download
//! pipeline can be exercised without yt-dlp or network access.

pub mod mock_extractor;

pub use mock_extractor::{MockBehavior, MockExtractor};
