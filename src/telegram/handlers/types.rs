//! Handler types and dependencies

use crate::download::queue::DownloadQueue;
use crate::telegram::flow::SelectionFlow;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub flow: SelectionFlow,
    pub download_queue: DownloadQueue,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(flow: SelectionFlow, download_queue: DownloadQueue) -> Self {
        Self { flow, download_queue }
    }
}
