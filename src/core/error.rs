use thiserror::Error;

/// Centralized error types for the application
///
/// Startup and wiring failures end up here. Errors a user can recover from
/// inside the chat never reach this type; the selection flow turns them into
/// replies instead.
///
/// # Example
///
/// ```no_run
/// use tubegrab::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
