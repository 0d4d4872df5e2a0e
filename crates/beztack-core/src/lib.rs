//! Template update engine for beztack workspaces
//!
//! A workspace scaffolded from a template keeps receiving template updates
//! without clobbering local customizations. This crate reconciles three
//! versions of every file (the baseline captured at the last sync, the
//! template's current version, and the workspace's current version) into a
//! reviewable [`UpdatePlan`], and makes applying a plan reversible through
//! full-tree snapshots.
//!
//! # Architecture
//!
//! `beztack-core` sits above the layer 0 crates:
//!
//! ```text
//!        beztack-core
//!             |
//!      +------+------+
//!      |             |
//! beztack-fs   beztack-vcs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use beztack_core::{ApplyOptions, UpdateEngine};
//!
//! let engine = UpdateEngine::new("/path/to/workspace", "/path/to/template")?;
//! let plan = engine.plan()?;
//! if !plan.has_conflicts() {
//!     let report = engine.apply(&plan, ApplyOptions::default())?;
//!     println!("applied {} files, snapshot {:?}", report.applied.len(), report.snapshot_id);
//! }
//! ```

pub mod apply;
pub mod diff;
pub mod error;
pub mod inspect;
pub mod manifest;
pub mod origin;
pub mod plan;
pub mod snapshot;
pub mod update;

pub use apply::{ApplyOptions, ApplyReport, apply_plan};
pub use diff::{ChangeKind, DiffEngine, DiffOutcome, RawChange};
pub use error::{Error, Result};
pub use inspect::write_report;
pub use manifest::Manifest;
pub use origin::{OriginRecord, OriginStore};
pub use plan::{
    CONFLICT_BOTH_CHANGED, CONFLICT_NO_BASELINE, FileChange, Ownership, UpdatePlan,
    build_update_plan,
};
pub use snapshot::SnapshotManager;
pub use update::UpdateEngine;
