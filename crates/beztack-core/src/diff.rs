//! Three-way diff engine
//!
//! Classifies every path in the union of the workspace and template trees
//! into add/modify/delete, using the baseline store to tell "the template
//! evolved" apart from "only the user touched this". The latter case is not
//! a change at all: the template has nothing new to offer, so the path is
//! skipped and counted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use beztack_fs::{FileContent, FileTree};

use crate::origin::OriginStore;

/// Kind of a per-file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
}

/// Diff-engine output for one path, before ownership classification.
#[derive(Debug, Clone)]
pub struct RawChange {
    /// Root-relative forward-slashed path
    pub path: String,
    pub kind: ChangeKind,
    pub is_binary: bool,
    /// Workspace-side content (absent for adds)
    pub current: Option<FileContent>,
    /// Template-side content (absent for deletes)
    pub template: Option<FileContent>,
    /// Whether the workspace diverged from the baseline. `None` when no
    /// baseline record existed, so there was nothing to compare against.
    pub user_modified: Option<bool>,
}

/// Result of one diff run.
#[derive(Debug, Clone, Default)]
pub struct DiffOutcome {
    /// Per-path changes, sorted by path
    pub changes: Vec<RawChange>,
    /// Paths skipped because only the workspace side moved since baseline
    pub skipped_unchanged_template_files: u32,
}

/// Three-way comparison of two loaded trees against a baseline store.
pub struct DiffEngine<'a> {
    origin: &'a OriginStore,
}

impl<'a> DiffEngine<'a> {
    pub fn new(origin: &'a OriginStore) -> Self {
        Self { origin }
    }

    /// Compute the change set between a workspace tree and a template tree.
    ///
    /// Deterministic: the same inputs always produce the same changes in the
    /// same (lexicographic) order.
    pub fn compute(&self, workspace: &FileTree, template: &FileTree) -> DiffOutcome {
        let mut changes = Vec::new();
        let mut skipped = 0u32;

        let paths: BTreeSet<&String> = workspace.keys().chain(template.keys()).collect();

        for path in paths {
            match (workspace.get(path.as_str()), template.get(path.as_str())) {
                // Template ships a file the workspace lacks.
                (None, Some(entry)) => changes.push(RawChange {
                    path: path.clone(),
                    kind: ChangeKind::Add,
                    is_binary: entry.is_binary,
                    current: None,
                    template: Some(entry.content.clone()),
                    user_modified: None,
                }),

                // Workspace has a file the template no longer ships.
                (Some(entry), None) => changes.push(RawChange {
                    path: path.clone(),
                    kind: ChangeKind::Delete,
                    is_binary: entry.is_binary,
                    current: Some(entry.content.clone()),
                    template: None,
                    user_modified: None,
                }),

                (Some(current), Some(template_entry)) => {
                    let current_hash = current.checksum();
                    let template_hash = template_entry.checksum();
                    if current_hash == template_hash {
                        continue;
                    }

                    let user_modified = match self.origin.get(path) {
                        None => None,
                        Some(record) => {
                            if template_hash == record.template_hash {
                                // Template side has not moved since baseline:
                                // the divergence is purely local editing.
                                skipped += 1;
                                continue;
                            }
                            Some(current_hash != record.project_hash)
                        }
                    };

                    changes.push(RawChange {
                        path: path.clone(),
                        kind: ChangeKind::Modify,
                        is_binary: current.is_binary || template_entry.is_binary,
                        current: Some(current.content.clone()),
                        template: Some(template_entry.content.clone()),
                        user_modified,
                    });
                }

                (None, None) => unreachable!("path came from the union of both trees"),
            }
        }

        debug!(
            changes = changes.len(),
            skipped, "Computed three-way diff"
        );

        DiffOutcome {
            changes,
            skipped_unchanged_template_files: skipped,
        }
    }
}
