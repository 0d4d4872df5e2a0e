//! Update planning and ownership classification
//!
//! Wraps the diff engine's raw changes with an ownership verdict per path:
//! `template-owned` changes are safe to auto-apply, `custom-owned` paths
//! must be preserved, `mixed` changes conflict and need a human.

use serde::{Deserialize, Serialize};

use beztack_fs::FileContent;
use beztack_fs::checksum::{compute_bytes_checksum, compute_content_checksum};

use crate::diff::{ChangeKind, DiffOutcome, RawChange};
use crate::origin::OriginStore;

/// Conflict reason when both sides diverged from the common ancestor.
pub const CONFLICT_BOTH_CHANGED: &str =
    "template and workspace both changed this file since the last sync";

/// Conflict reason when a path was never tracked but differs on both sides.
pub const CONFLICT_NO_BASELINE: &str =
    "no sync baseline for this path; template and workspace copies differ";

/// Who owns a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// The template is the authority; safe to auto-apply
    #[serde(rename = "template-owned")]
    TemplateOwned,
    /// The user authored this; must be preserved
    #[serde(rename = "custom-owned")]
    CustomOwned,
    /// Both sides diverged; needs human resolution
    #[serde(rename = "mixed")]
    Mixed,
}

/// One proposed change in an [`UpdatePlan`]. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub is_binary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_binary_content: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_binary_content: Option<Vec<u8>>,
    pub ownership: Ownership,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_modified: Option<bool>,
}

impl FileChange {
    fn from_raw(raw: RawChange, ownership: Ownership, conflict_reason: Option<String>) -> Self {
        let (current_content, current_binary_content) = split_content(raw.current);
        let (template_content, template_binary_content) = split_content(raw.template);
        Self {
            path: raw.path,
            kind: raw.kind,
            is_binary: raw.is_binary,
            current_content,
            current_binary_content,
            template_content,
            template_binary_content,
            ownership,
            conflict_reason,
            user_modified: raw.user_modified,
        }
    }

    /// Template-side content as raw bytes, if present.
    pub fn template_bytes(&self) -> Option<&[u8]> {
        self.template_content
            .as_deref()
            .map(str::as_bytes)
            .or(self.template_binary_content.as_deref())
    }

    /// Checksum of the template-side content, if present.
    pub fn template_checksum(&self) -> Option<String> {
        match (&self.template_content, &self.template_binary_content) {
            (Some(text), _) => Some(compute_content_checksum(text)),
            (None, Some(bytes)) => Some(compute_bytes_checksum(bytes)),
            (None, None) => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn test_text_change(
        path: &str,
        kind: ChangeKind,
        current: Option<&str>,
        template: Option<&str>,
        ownership: Ownership,
        user_modified: Option<bool>,
    ) -> Self {
        Self {
            path: path.to_string(),
            kind,
            is_binary: false,
            current_content: current.map(str::to_string),
            current_binary_content: None,
            template_content: template.map(str::to_string),
            template_binary_content: None,
            ownership,
            conflict_reason: None,
            user_modified,
        }
    }
}

fn split_content(content: Option<FileContent>) -> (Option<String>, Option<Vec<u8>>) {
    match content {
        Some(FileContent::Text(text)) => (Some(text), None),
        Some(FileContent::Binary(bytes)) => (None, Some(bytes)),
        None => (None, None),
    }
}

/// The complete, reviewable result of one sync run.
///
/// Produced fresh on every run; never mutated after construction. Paths in
/// `changes` are unique and lexicographically sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlan {
    /// All proposed changes, sorted by path
    pub changes: Vec<FileChange>,
    /// The `mixed` subset of `changes`; never auto-applied
    pub conflicts: Vec<FileChange>,
    /// Paths where only the workspace moved since baseline
    pub skipped_unchanged_template_files: u32,
}

impl UpdatePlan {
    /// Whether the plan proposes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether any change needs human resolution.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Classify the diff output into an [`UpdatePlan`].
///
/// Ownership rules:
/// - adds are `template-owned`;
/// - deletes are `template-owned` unless the path has no baseline record, in
///   which case the file is user-authored and becomes `custom-owned`
///   (excluded from automatic deletion);
/// - modifies with an untouched workspace side are `template-owned`;
/// - modifies where the user also moved, or where no baseline exists to
///   prove they did not, are `mixed` conflicts.
pub fn build_update_plan(outcome: DiffOutcome, origin: &OriginStore) -> UpdatePlan {
    let mut changes = Vec::with_capacity(outcome.changes.len());

    for raw in outcome.changes {
        let (ownership, conflict_reason) = match raw.kind {
            ChangeKind::Add => (Ownership::TemplateOwned, None),
            ChangeKind::Delete => {
                if origin.get(&raw.path).is_some() {
                    (Ownership::TemplateOwned, None)
                } else {
                    (Ownership::CustomOwned, None)
                }
            }
            ChangeKind::Modify => match raw.user_modified {
                Some(false) => (Ownership::TemplateOwned, None),
                Some(true) => (Ownership::Mixed, Some(CONFLICT_BOTH_CHANGED.to_string())),
                None => (Ownership::Mixed, Some(CONFLICT_NO_BASELINE.to_string())),
            },
        };
        changes.push(FileChange::from_raw(raw, ownership, conflict_reason));
    }

    let conflicts = changes
        .iter()
        .filter(|c| c.ownership == Ownership::Mixed)
        .cloned()
        .collect();

    UpdatePlan {
        changes,
        conflicts,
        skipped_unchanged_template_files: outcome.skipped_unchanged_template_files,
    }
}
