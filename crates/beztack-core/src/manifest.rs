//! Workspace manifest
//!
//! The manifest pins the template version a workspace was generated from and
//! carries the baseline store. It lives at `.beztack/manifest.json`, is
//! created at scaffold time, and is rewritten only after a successful,
//! confirmed apply. A missing or unparseable manifest is fatal for planning:
//! without the baseline, every divergence would be misclassified as
//! conflict-free.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use beztack_fs::{ControlPath, NormalizedPath, io};

use crate::diff::ChangeKind;
use crate::origin::{OriginRecord, OriginStore};
use crate::plan::{Ownership, UpdatePlan};
use crate::{Error, Result};

/// Workspace-persisted sync state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Template version the workspace is pinned to
    pub current_version: Version,
    /// When the manifest was last committed
    pub updated_at: DateTime<Utc>,
    /// Baseline records per path
    #[serde(default)]
    pub origin: OriginStore,
}

impl Manifest {
    /// Create a fresh manifest for a workspace scaffolded at `version`.
    pub fn new(version: Version) -> Self {
        Self {
            current_version: version,
            updated_at: Utc::now(),
            origin: OriginStore::new(),
        }
    }

    /// Path of the manifest file under a workspace root.
    pub fn path_in(root: &NormalizedPath) -> NormalizedPath {
        root.join(ControlPath::BeztackDir.as_str())
            .join(ControlPath::ManifestFile.as_str())
    }

    /// Load the manifest for a workspace.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestNotFound`] if the file does not exist,
    /// [`Error::ManifestParse`] if it exists but is not valid.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = Self::path_in(root);
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_native(),
            });
        }
        let content = io::read_text(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::ManifestParse {
            path: path.to_native(),
            message: e.to_string(),
        })
    }

    /// Save the manifest atomically.
    pub fn save(&self, root: &NormalizedPath) -> Result<()> {
        let path = Self::path_in(root);
        let content = serde_json::to_string_pretty(self)?;
        io::write_atomic(&path, content.as_bytes())?;
        Ok(())
    }

    /// Advance the baseline after a successful apply.
    ///
    /// Only the `template-owned` subset of the plan was written, so only
    /// those paths move: applied adds/modifies record the just-applied
    /// template hash for both sides, applied deletes drop their record.
    /// Conflicting and custom-owned paths keep whatever baseline they had.
    pub fn commit_sync(&mut self, plan: &UpdatePlan, new_version: Option<Version>) {
        for change in &plan.changes {
            if change.ownership != Ownership::TemplateOwned {
                continue;
            }
            match change.kind {
                ChangeKind::Add | ChangeKind::Modify => {
                    if let Some(hash) = change.template_checksum() {
                        self.origin.record(change.path.clone(), OriginRecord::synced(hash));
                    }
                }
                ChangeKind::Delete => {
                    self.origin.remove(&change.path);
                }
            }
        }
        if let Some(version) = new_version {
            self.current_version = version;
        }
        self.updated_at = Utc::now();
    }
}
