//! Error types for beztack-vcs

/// Result type for beztack-vcs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in beztack-vcs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to invoke git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git check-ignore failed (exit {code:?}): {stderr}")]
    CheckIgnoreFailed { code: Option<i32>, stderr: String },
}
