//! In-memory user state

pub mod sessions;

// Re-exports for convenience
pub use sessions::{Session, SessionStore};
