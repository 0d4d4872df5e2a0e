//! Plan application
//!
//! Writes the `template-owned` subset of an [`UpdatePlan`] into the
//! workspace. Conflicting (`mixed`) and user-authored (`custom-owned`)
//! changes are never touched here; they are reported as skipped.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use beztack_fs::{NormalizedPath, io};

use crate::diff::ChangeKind;
use crate::plan::{Ownership, UpdatePlan};
use crate::Result;

/// Options for an apply run.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Simulate without modifying the filesystem
    pub dry_run: bool,
}

/// Accounting of what an apply run did (or, on dry-run, would do).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Snapshot taken before mutation (absent on dry-run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Paths written from the template
    pub applied: Vec<String>,
    /// Paths deleted because the template no longer ships them
    pub deleted: Vec<String>,
    /// Mixed changes left for human resolution
    pub skipped_conflicts: Vec<String>,
    /// Custom-owned paths preserved
    pub skipped_custom: Vec<String>,
    /// Whether this was a simulation
    pub dry_run: bool,
}

/// Apply every `template-owned` change of `plan` to the workspace.
///
/// Callers are responsible for snapshotting first; this function only
/// mutates. Writes are atomic per file.
pub fn apply_plan(
    root: &NormalizedPath,
    plan: &UpdatePlan,
    options: &ApplyOptions,
) -> Result<ApplyReport> {
    let mut report = ApplyReport {
        snapshot_id: None,
        applied: Vec::new(),
        deleted: Vec::new(),
        skipped_conflicts: Vec::new(),
        skipped_custom: Vec::new(),
        dry_run: options.dry_run,
    };

    for change in &plan.changes {
        match change.ownership {
            Ownership::Mixed => report.skipped_conflicts.push(change.path.clone()),
            Ownership::CustomOwned => report.skipped_custom.push(change.path.clone()),
            Ownership::TemplateOwned => match change.kind {
                ChangeKind::Add | ChangeKind::Modify => {
                    let Some(bytes) = change.template_bytes() else {
                        warn!(path = %change.path, "Change carries no template content; skipping");
                        continue;
                    };
                    if !options.dry_run {
                        io::write_atomic(&root.join(&change.path), bytes)?;
                    }
                    report.applied.push(change.path.clone());
                }
                ChangeKind::Delete => {
                    if !options.dry_run {
                        let target = root.join(&change.path);
                        if target.is_file() {
                            fs::remove_file(target.as_ref())?;
                        }
                    }
                    report.deleted.push(change.path.clone());
                }
            },
        }
    }

    debug!(
        applied = report.applied.len(),
        deleted = report.deleted.len(),
        conflicts = report.skipped_conflicts.len(),
        dry_run = options.dry_run,
        "Applied update plan"
    );
    Ok(report)
}
