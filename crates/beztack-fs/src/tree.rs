//! File tree loading
//!
//! Walks a root directory through a [`PathFilter`] and produces a map of
//! root-relative paths to file entries, each tagged binary or text. The
//! loader stores raw content, not hashes; checksums are computed lazily by
//! the diff layer via [`FileEntry::checksum`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::checksum::{compute_bytes_checksum, compute_content_checksum};
use crate::filter::PathFilter;
use crate::path::relative_key;
use crate::{Error, Result};

/// Extensions always treated as binary, regardless of content.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "ico", "bmp", "woff", "woff2", "ttf", "otf", "eot",
    "pdf", "zip", "gz", "tar", "bz2", "7z", "jar", "class", "exe", "dll", "so", "dylib", "wasm",
    "mp3", "mp4", "ogg", "avi", "mov",
];

/// How many leading bytes to sniff for NUL when the extension is unknown.
const SNIFF_WINDOW: usize = 8192;

/// Loaded file content, text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

/// One file in a loaded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Whether the file was classified binary
    pub is_binary: bool,
    /// Raw content as read from disk
    pub content: FileContent,
}

impl FileEntry {
    /// Compute the canonical checksum of this entry's content.
    ///
    /// Text hashes as UTF-8 bytes, so a file read as text and the same file
    /// read as bytes produce identical digests.
    pub fn checksum(&self) -> String {
        match &self.content {
            FileContent::Text(text) => compute_content_checksum(text),
            FileContent::Binary(bytes) => compute_bytes_checksum(bytes),
        }
    }

    /// Content as raw bytes, regardless of classification.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.content {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Binary(bytes) => bytes,
        }
    }
}

/// A loaded tree: root-relative forward-slashed path → entry.
///
/// `BTreeMap` keeps iteration lexicographic, which is what makes diff output
/// deterministic without an explicit sort.
pub type FileTree = BTreeMap<String, FileEntry>;

/// Classify a file as binary from its path and leading bytes.
///
/// Pure function: known binary extensions first, then a NUL-byte scan over
/// the leading window (the same heuristic git uses).
pub fn is_binary(path: &str, leading: &[u8]) -> bool {
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(stem, ext)| if stem.is_empty() { "" } else { ext })
        .unwrap_or("");
    if BINARY_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
        return true;
    }
    let window = &leading[..leading.len().min(SNIFF_WINDOW)];
    window.contains(&0)
}

/// Load the file tree under `root`, honoring `filter`.
///
/// Uses an explicit work-list rather than recursion. Excluded paths are
/// pruned before descent, so an excluded directory is never traversed. A
/// directory that fails to list is skipped with a warning; a file that fails
/// to read is omitted with a warning. If the filter carries an ignore
/// oracle, a batched ignore pass runs over the collected paths afterwards.
///
/// # Errors
///
/// Returns [`Error::RootNotFound`] if `root` is not a directory.
pub fn load_tree(root: &Path, filter: &PathFilter) -> Result<FileTree> {
    if !root.is_dir() {
        return Err(Error::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut tree = FileTree::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let Some(key) = relative_key(root, &path) else {
                continue;
            };
            if filter.should_exclude(&key) {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping entry with unknown type");
                    continue;
                }
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                match read_entry(&path, &key) {
                    Ok(file_entry) => {
                        tree.insert(key, file_entry);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Omitting unreadable file");
                    }
                }
            }
            // Symlinks and other special entries do not participate.
        }
    }

    let ignored = filter.ignored(root, &tree.keys().cloned().collect::<Vec<_>>());
    if !ignored.is_empty() {
        debug!(count = ignored.len(), "Dropping VCS-ignored paths from tree");
        tree.retain(|key, _| !ignored.contains(key));
    }

    debug!(root = %root.display(), files = tree.len(), "Loaded file tree");
    Ok(tree)
}

fn read_entry(path: &Path, key: &str) -> std::io::Result<FileEntry> {
    let bytes = fs::read(path)?;
    if is_binary(key, &bytes) {
        return Ok(FileEntry {
            is_binary: true,
            content: FileContent::Binary(bytes),
        });
    }
    // Undeclared encodings that fail UTF-8 validation are binary in practice.
    match String::from_utf8(bytes) {
        Ok(text) => Ok(FileEntry {
            is_binary: false,
            content: FileContent::Text(text),
        }),
        Err(e) => Ok(FileEntry {
            is_binary: true,
            content: FileContent::Binary(e.into_bytes()),
        }),
    }
}
