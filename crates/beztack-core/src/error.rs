//! Error types for beztack-core

use std::path::PathBuf;

/// Result type for beztack-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in beztack-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workspace has no manifest: it was not scaffolded from a template
    #[error("No beztack manifest at {path}; is this a beztack workspace?")]
    ManifestNotFound { path: PathBuf },

    /// The manifest exists but cannot be parsed. Fatal: diffing without the
    /// baseline would misclassify every divergence as conflict-free.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Referenced snapshot does not exist
    #[error("Snapshot not found: {id}")]
    SnapshotNotFound { id: String },

    /// Snapshot id contains path separators or traversal segments
    #[error("Invalid snapshot id: {id}")]
    InvalidSnapshotId { id: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from beztack-fs
    #[error(transparent)]
    Fs(#[from] beztack_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
