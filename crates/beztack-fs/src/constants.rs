//! Constants and enums for beztack control paths.

use std::path::Path;

/// Directory segments that never participate in syncing or snapshots.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "dist", ".cache", ".beztack"];

/// File names that never participate in syncing.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["package-lock.json", "beztack.json"];

/// Standard beztack filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPath {
    /// The `.beztack` directory (tool sandbox root)
    BeztackDir,
    /// The `.git` directory (VCS database)
    GitDir,
    /// The `manifest.json` file inside the sandbox
    ManifestFile,
    /// The `snapshots` directory inside the sandbox
    SnapshotsDir,
    /// The `inspect` directory inside the sandbox
    InspectDir,
}

impl ControlPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeztackDir => ".beztack",
            Self::GitDir => ".git",
            Self::ManifestFile => "manifest.json",
            Self::SnapshotsDir => "snapshots",
            Self::InspectDir => "inspect",
        }
    }
}

impl AsRef<Path> for ControlPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ControlPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ControlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
