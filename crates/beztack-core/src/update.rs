//! UpdateEngine facade
//!
//! Coordinates one sync run end to end: load the manifest and both trees,
//! compute the plan, and on apply take a snapshot before any mutation. The
//! snapshot-then-apply ordering is the system's sole durability guarantee,
//! so apply fails closed: no snapshot, no mutation.

use std::path::Path;
use std::sync::Arc;

use semver::Version;
use tracing::debug;

use beztack_fs::{FilterConfig, NormalizedPath, PathFilter, PathIgnoreOracle, canonicalize_root, load_tree};
use beztack_vcs::GitCheckIgnoreOracle;

use crate::apply::{ApplyOptions, ApplyReport, apply_plan};
use crate::diff::DiffEngine;
use crate::manifest::Manifest;
use crate::plan::{UpdatePlan, build_update_plan};
use crate::snapshot::SnapshotManager;
use crate::Result;

/// Predicate marking template-declared never-synced paths.
pub type TemplatePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One-shot engine for planning and applying a template update.
pub struct UpdateEngine {
    workspace_root: NormalizedPath,
    template_root: NormalizedPath,
    filter_config: FilterConfig,
    template_predicate: Option<TemplatePredicate>,
    oracle: Arc<dyn PathIgnoreOracle>,
    template_version: Option<Version>,
}

impl UpdateEngine {
    /// Create an engine for the given workspace and template roots.
    ///
    /// Both roots must exist; they are canonicalized here so every derived
    /// path is absolute and normalized. The VCS ignore oracle defaults to
    /// the git binary.
    pub fn new(workspace_root: impl AsRef<Path>, template_root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            workspace_root: canonicalize_root(workspace_root)?,
            template_root: canonicalize_root(template_root)?,
            filter_config: FilterConfig::default(),
            template_predicate: None,
            oracle: Arc::new(GitCheckIgnoreOracle::new()),
            template_version: None,
        })
    }

    /// Replace the static exclusion policy.
    pub fn with_filter_config(mut self, config: FilterConfig) -> Self {
        self.filter_config = config;
        self
    }

    /// Add a template-supplied never-synced predicate (applied to both
    /// trees).
    pub fn with_template_predicate(
        mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.template_predicate = Some(Arc::new(predicate));
        self
    }

    /// Swap the VCS ignore oracle (e.g. for a no-op in tests).
    pub fn with_ignore_oracle(mut self, oracle: Arc<dyn PathIgnoreOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Template version to pin the manifest to when an apply commits.
    pub fn with_template_version(mut self, version: Version) -> Self {
        self.template_version = Some(version);
        self
    }

    /// The workspace root this engine operates on.
    pub fn workspace_root(&self) -> &NormalizedPath {
        &self.workspace_root
    }

    /// Snapshot manager for this workspace.
    pub fn snapshots(&self) -> SnapshotManager {
        SnapshotManager::new(self.workspace_root.clone())
    }

    /// Compute a fresh [`UpdatePlan`]. Never mutates the workspace.
    pub fn plan(&self) -> Result<UpdatePlan> {
        let manifest = Manifest::load(&self.workspace_root)?;

        let workspace = load_tree(self.workspace_root.as_ref(), &self.workspace_filter())?;
        let template = load_tree(self.template_root.as_ref(), &self.template_filter())?;

        debug!(
            workspace_files = workspace.len(),
            template_files = template.len(),
            "Loaded trees for planning"
        );

        let outcome = DiffEngine::new(&manifest.origin).compute(&workspace, &template);
        Ok(build_update_plan(outcome, &manifest.origin))
    }

    /// Apply a plan after snapshotting, then commit the baseline.
    ///
    /// On dry-run nothing is snapshotted, written, or committed. A snapshot
    /// failure aborts before any mutation.
    pub fn apply(&self, plan: &UpdatePlan, options: ApplyOptions) -> Result<ApplyReport> {
        // Surface a broken manifest before the snapshot is taken.
        let mut manifest = Manifest::load(&self.workspace_root)?;

        let snapshot_id = if options.dry_run {
            None
        } else {
            Some(self.snapshots().create_snapshot()?)
        };

        let mut report = apply_plan(&self.workspace_root, plan, &options)?;
        report.snapshot_id = snapshot_id;

        if !options.dry_run {
            manifest.commit_sync(plan, self.template_version.clone());
            manifest.save(&self.workspace_root)?;
        }

        Ok(report)
    }

    /// Restore the workspace to a snapshot.
    pub fn rollback(&self, snapshot_id: &str) -> Result<()> {
        self.snapshots().rollback_snapshot(snapshot_id)
    }

    /// Purge snapshot history and transient tool state.
    pub fn clear_snapshots(&self) -> Result<()> {
        self.snapshots().clear_snapshots()
    }

    fn workspace_filter(&self) -> PathFilter {
        let mut filter =
            PathFilter::new(self.filter_config.clone()).with_ignore_oracle(self.oracle.clone());
        if let Some(predicate) = self.template_predicate.clone() {
            filter = filter.with_template_predicate(move |path| predicate(path));
        }
        filter
    }

    fn template_filter(&self) -> PathFilter {
        // Workspace VCS ignore rules never apply to the template tree.
        let mut filter = PathFilter::new(self.filter_config.clone());
        if let Some(predicate) = self.template_predicate.clone() {
            filter = filter.with_template_predicate(move |path| predicate(path));
        }
        filter
    }
}
