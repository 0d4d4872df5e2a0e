//! Snapshot manager
//!
//! Copies the whole workspace tree (control directories excluded) to a
//! timestamped location before any mutation, and can restore it
//! byte-for-byte. Restore is exact, not an overlay: files added after the
//! snapshot are deleted so the tree converges to the snapshot state, and
//! re-running a rollback converges to the same result.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};

use beztack_fs::{ControlPath, FilterConfig, NormalizedPath, PathFilter, DEFAULT_EXCLUDED_DIRS};

use crate::{Error, Result};

/// Manages full-tree snapshots under `<root>/.beztack/snapshots/`.
pub struct SnapshotManager {
    root: NormalizedPath,
    snapshots_dir: NormalizedPath,
}

impl SnapshotManager {
    /// Create a manager for the given workspace root.
    pub fn new(root: NormalizedPath) -> Self {
        let snapshots_dir = root
            .join(ControlPath::BeztackDir.as_str())
            .join(ControlPath::SnapshotsDir.as_str());
        Self {
            root,
            snapshots_dir,
        }
    }

    /// Copy every non-control file under the root into a new timestamped
    /// snapshot. Purely additive: the workspace itself is never touched.
    ///
    /// Returns the snapshot id.
    pub fn create_snapshot(&self) -> Result<String> {
        let id = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string();
        let dest = self.snapshots_dir.join(&id);
        fs::create_dir_all(dest.as_ref())?;

        let files = collect_files(self.root.as_ref(), &workspace_walk_filter())?;
        for rel in &files {
            let source = self.root.join(rel);
            let target = dest.join(rel);
            if let Some(parent) = target.as_ref().parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source.as_ref(), target.as_ref())?;
        }

        debug!(id = %id, files = files.len(), "Created workspace snapshot");
        Ok(id)
    }

    /// Restore the workspace to the exact state captured in `snapshot_id`.
    ///
    /// First copies every snapshot file back over the workspace, then
    /// deletes every workspace file that exists now but did not exist in the
    /// snapshot. Safe to re-run against the same id.
    pub fn rollback_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let snapshot_dir = self.snapshot_dir(snapshot_id)?;
        if !snapshot_dir.is_dir() {
            return Err(Error::SnapshotNotFound {
                id: snapshot_id.to_string(),
            });
        }

        // Nothing is excluded inside a snapshot; it holds only synced files.
        let unfiltered = PathFilter::new(FilterConfig {
            excluded_dirs: vec![],
            excluded_files: vec![],
        });
        let snapshot_files: BTreeSet<String> =
            collect_files(snapshot_dir.as_ref(), &unfiltered)?.into_iter().collect();

        for rel in &snapshot_files {
            let source = snapshot_dir.join(rel);
            let target = self.root.join(rel);
            if let Some(parent) = target.as_ref().parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source.as_ref(), target.as_ref())?;
        }

        // Reverse additions: anything on disk that the snapshot lacks goes.
        let current_files = collect_files(self.root.as_ref(), &workspace_walk_filter())?;
        for rel in &current_files {
            if !snapshot_files.contains(rel) {
                let target = self.root.join(rel);
                fs::remove_file(target.as_ref())?;
                prune_empty_parents(target.as_ref(), self.root.as_ref());
            }
        }

        debug!(id = %snapshot_id, restored = snapshot_files.len(), "Rolled back workspace");
        Ok(())
    }

    /// List snapshot ids, oldest first.
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        if !self.snapshots_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.snapshots_dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Purge all snapshot history and transient inspect state.
    ///
    /// The manifest survives: it is the sync baseline, not transient state.
    pub fn clear_snapshots(&self) -> Result<()> {
        if self.snapshots_dir.exists() {
            fs::remove_dir_all(self.snapshots_dir.as_ref())?;
        }
        let inspect_dir = self
            .root
            .join(ControlPath::BeztackDir.as_str())
            .join(ControlPath::InspectDir.as_str());
        if inspect_dir.exists() {
            fs::remove_dir_all(inspect_dir.as_ref())?;
        }
        Ok(())
    }

    fn snapshot_dir(&self, snapshot_id: &str) -> Result<NormalizedPath> {
        // Ids are single path segments; anything else could escape the
        // snapshots directory.
        if snapshot_id.is_empty()
            || snapshot_id.contains('/')
            || snapshot_id.contains('\\')
            || snapshot_id.contains("..")
        {
            return Err(Error::InvalidSnapshotId {
                id: snapshot_id.to_string(),
            });
        }
        Ok(self.snapshots_dir.join(snapshot_id))
    }
}

/// Filter for walking the live workspace: control directories only, with no
/// file exclusions. Snapshots must capture lockfiles and metadata that the
/// sync itself skips.
fn workspace_walk_filter() -> PathFilter {
    PathFilter::new(FilterConfig {
        excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        excluded_files: vec![],
    })
}

/// Collect root-relative file paths under `root`, honoring `filter`, using
/// an explicit work-list. Unreadable subtrees are skipped with a warning.
fn collect_files(root: &Path, filter: &PathFilter) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

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
                    warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            let Some(key) = beztack_fs::path::relative_key(root, &path) else {
                continue;
            };
            if filter.should_exclude(&key) {
                continue;
            }
            match entry.file_type() {
                Ok(t) if t.is_dir() => pending.push(path),
                Ok(t) if t.is_file() => files.push(key),
                _ => {}
            }
        }
    }

    files.sort();
    Ok(files)
}

fn prune_empty_parents(path: &Path, root: &Path) {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir == root {
            break;
        }
        // Stops at the first non-empty directory; errors just end pruning.
        if fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}
