//! Filesystem layer for the beztack update engine
//!
//! Provides normalized path handling, content hashing, path filtering and
//! tree loading. Everything above this crate compares files exclusively by
//! checksum; this crate is where bytes are read and fingerprinted.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod filter;
pub mod io;
pub mod path;
pub mod tree;

pub use constants::{ControlPath, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES};
pub use error::{Error, Result};
pub use filter::{FilterConfig, NoopIgnoreOracle, PathFilter, PathIgnoreOracle};
pub use path::{NormalizedPath, canonicalize_root};
pub use tree::{FileContent, FileEntry, FileTree, is_binary, load_tree};
