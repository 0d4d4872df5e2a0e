//! Snapshot and rollback scenarios: applying a plan must always be
//! undoable, byte for byte.

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use beztack_core::{ApplyOptions, SnapshotManager, UpdateEngine};
use beztack_fs::{FilterConfig, NoopIgnoreOracle, NormalizedPath, PathFilter, load_tree};
use beztack_test_utils::TestWorkspace;

fn engine(fixture: &TestWorkspace) -> UpdateEngine {
    UpdateEngine::new(fixture.workspace_root(), fixture.template_root())
        .unwrap()
        .with_ignore_oracle(Arc::new(NoopIgnoreOracle))
}

#[test]
fn apply_then_rollback_restores_the_pre_update_tree() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.scaffold_file("README.md", "scaffolded readme");
    fixture.write_manifest("1.0.0");

    fixture.write_template("src/app.js", "v2");
    fixture.write_template("src/new-module.js", "added by template");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();
    let report = update_engine.apply(&plan, ApplyOptions::default()).unwrap();

    fixture.assert_workspace_file_eq("src/app.js", "v2");
    fixture.assert_workspace_file_eq("src/new-module.js", "added by template");

    let snapshot_id = report.snapshot_id.expect("apply must snapshot first");
    update_engine.rollback(&snapshot_id).unwrap();

    // Exact pre-update state: the modify is reverted and the addition gone.
    fixture.assert_workspace_file_eq("src/app.js", "v1");
    fixture.assert_workspace_file_eq("README.md", "scaffolded readme");
    fixture.assert_workspace_file_missing("src/new-module.js");
}

#[test]
fn rollback_round_trip_reproduces_the_tree_exactly() {
    let fixture = TestWorkspace::new();
    fixture.write_workspace("a.txt", "alpha");
    fixture.write_workspace("deep/nested/b.txt", "beta");
    fixture.write_workspace("bin.dat", [0u8, 1, 2, 3]);

    let root = NormalizedPath::new(fixture.workspace_root());
    let manager = SnapshotManager::new(root);
    let filter = PathFilter::new(FilterConfig::default());

    let before = load_tree(fixture.workspace_root(), &filter).unwrap();
    let id = manager.create_snapshot().unwrap();

    // Arbitrary add/modify/delete churn.
    fixture.write_workspace("a.txt", "mutated");
    fixture.remove_workspace("deep/nested/b.txt");
    fixture.write_workspace("added/later.txt", "post-snapshot");

    manager.rollback_snapshot(&id).unwrap();
    let after = load_tree(fixture.workspace_root(), &filter).unwrap();

    assert_eq!(before, after);
}

#[test]
fn snapshot_failure_aborts_before_any_mutation() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");
    fixture.write_template("src/app.js", "v2");

    // A file squatting on the snapshots directory makes snapshot creation
    // impossible.
    fixture.write_workspace(".beztack/snapshots", "not a directory");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();
    let result = update_engine.apply(&plan, ApplyOptions::default());

    assert!(result.is_err());
    fixture.assert_workspace_file_eq("src/app.js", "v1");
}

#[test]
fn clear_snapshots_purges_history() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");
    fixture.write_template("src/app.js", "v2");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();
    update_engine.apply(&plan, ApplyOptions::default()).unwrap();

    assert!(!update_engine.snapshots().list_snapshots().unwrap().is_empty());

    update_engine.clear_snapshots().unwrap();

    assert!(update_engine.snapshots().list_snapshots().unwrap().is_empty());
    assert!(fixture.workspace_root().join(".beztack/manifest.json").is_file());
}

#[test]
fn successive_snapshots_are_independent() {
    let fixture = TestWorkspace::new();
    fixture.write_workspace("a.txt", "first");

    let manager = SnapshotManager::new(NormalizedPath::new(fixture.workspace_root()));
    let first = manager.create_snapshot().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    fixture.write_workspace("a.txt", "second");
    let second = manager.create_snapshot().unwrap();

    manager.rollback_snapshot(&first).unwrap();
    assert_eq!(fixture.read_workspace("a.txt"), "first");

    manager.rollback_snapshot(&second).unwrap();
    assert_eq!(fixture.read_workspace("a.txt"), "second");

    let listed = manager.list_snapshots().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(fs::read_dir(fixture.workspace_root().join(".beztack/snapshots")).is_ok());
}
