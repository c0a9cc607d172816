pub mod artifact;
pub mod downloader;
pub mod error;
pub mod queue;
pub mod ytdlp;

// Re-exports for convenience
pub use downloader::{Delivered, DownloadRequest, Downloader, VideoSink};
pub use error::DownloadError;
pub use queue::{process_queue, DownloadQueue, DownloadJob};
pub use ytdlp::{ExtractOptions, ExtractedVideo, VideoExtractor, YtDlpExtractor};
