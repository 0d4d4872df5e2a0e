//! Baseline (origin) store
//!
//! Per-file record of the hashes that existed at the last successful sync:
//! the common ancestor for three-way comparison. Absence of a record is a
//! first-class state meaning "never tracked", not an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hash pair captured for one path at the last known-good sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRecord {
    /// Checksum of the template side at the last sync
    pub template_hash: String,
    /// Checksum of the workspace side at the last sync
    pub project_hash: String,
}

impl OriginRecord {
    /// Record a freshly applied file, where both sides carry the same
    /// just-written template content.
    pub fn synced(hash: impl Into<String>) -> Self {
        let hash = hash.into();
        Self {
            template_hash: hash.clone(),
            project_hash: hash,
        }
    }
}

/// Path-keyed collection of [`OriginRecord`]s.
///
/// Read-only during diffing; mutated only when a sync is committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginStore {
    records: BTreeMap<String, OriginRecord>,
}

impl OriginStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the baseline for a path. `None` means never tracked.
    pub fn get(&self, path: &str) -> Option<&OriginRecord> {
        self.records.get(path)
    }

    /// Insert or replace the baseline for a path.
    pub fn record(&mut self, path: impl Into<String>, record: OriginRecord) {
        self.records.insert(path.into(), record);
    }

    /// Drop the baseline for a path (the file left the sync set).
    pub fn remove(&mut self, path: &str) -> Option<OriginRecord> {
        self.records.remove(path)
    }

    /// Number of tracked paths.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether any paths are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate tracked paths and their records in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OriginRecord)> {
        self.records.iter()
    }
}
