//! End-to-end planning and apply scenarios for the update engine.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use semver::Version;

use beztack_core::{
    ApplyOptions, ChangeKind, Error, Manifest, Ownership, UpdateEngine, write_report,
};
use beztack_fs::checksum::compute_file_checksum;
use beztack_fs::NoopIgnoreOracle;
use beztack_test_utils::TestWorkspace;

fn engine(fixture: &TestWorkspace) -> UpdateEngine {
    UpdateEngine::new(fixture.workspace_root(), fixture.template_root())
        .unwrap()
        .with_ignore_oracle(Arc::new(NoopIgnoreOracle))
}

#[test]
fn identical_trees_produce_an_empty_plan() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "console.log('v1');");
    fixture.scaffold_file("package.json", "{\"name\":\"demo\"}");
    fixture.write_manifest("1.0.0");

    let plan = engine(&fixture).plan().unwrap();

    assert!(plan.is_empty());
    assert!(!plan.has_conflicts());
    assert_eq!(plan.skipped_unchanged_template_files, 0);
}

#[test]
fn local_only_edits_are_skipped_not_offered() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    // The user edits; the template side has not moved since baseline.
    fixture.write_workspace("src/app.js", "locally customized");

    let plan = engine(&fixture).plan().unwrap();

    assert!(plan.is_empty());
    assert_eq!(plan.skipped_unchanged_template_files, 1);
}

#[test]
fn clean_template_update_is_offered_and_converges() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    fixture.write_template("src/app.js", "v2");

    let update_engine = engine(&fixture).with_template_version(Version::new(1, 1, 0));
    let plan = update_engine.plan().unwrap();

    assert_eq!(plan.changes.len(), 1);
    let change = &plan.changes[0];
    assert_eq!(change.kind, ChangeKind::Modify);
    assert_eq!(change.user_modified, Some(false));
    assert_eq!(change.ownership, Ownership::TemplateOwned);
    assert!(!plan.has_conflicts());

    let report = update_engine.apply(&plan, ApplyOptions::default()).unwrap();
    assert_eq!(report.applied, vec!["src/app.js"]);

    // Apply convergence: workspace and template hash identically now.
    let workspace_hash =
        compute_file_checksum(&fixture.workspace_root().join("src/app.js")).unwrap();
    let template_hash =
        compute_file_checksum(&fixture.template_root().join("src/app.js")).unwrap();
    assert_eq!(workspace_hash, template_hash);

    // The committed baseline makes a second run a no-op.
    let second = update_engine.plan().unwrap();
    assert!(second.is_empty());

    let manifest = Manifest::load(&beztack_fs::NormalizedPath::new(fixture.workspace_root()))
        .unwrap();
    assert_eq!(manifest.current_version, Version::new(1, 1, 0));
}

#[test]
fn independent_edits_on_both_sides_conflict() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    fixture.write_template("src/app.js", "template v2");
    fixture.write_workspace("src/app.js", "my local v3");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();

    assert_eq!(plan.conflicts.len(), 1);
    let conflict = &plan.conflicts[0];
    assert_eq!(conflict.kind, ChangeKind::Modify);
    assert_eq!(conflict.user_modified, Some(true));
    assert_eq!(conflict.ownership, Ownership::Mixed);
    assert!(conflict.conflict_reason.is_some());

    // Conflicts are never auto-applied.
    let report = update_engine.apply(&plan, ApplyOptions::default()).unwrap();
    assert_eq!(report.skipped_conflicts, vec!["src/app.js"]);
    fixture.assert_workspace_file_eq("src/app.js", "my local v3");
}

#[test]
fn planning_is_deterministic() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("b.txt", "b");
    fixture.scaffold_file("a.txt", "a");
    fixture.write_manifest("1.0.0");

    fixture.write_template("a.txt", "a2");
    fixture.write_template("z.txt", "new");
    fixture.write_workspace("m.txt", "mine");

    let update_engine = engine(&fixture);
    let first = update_engine.plan().unwrap();
    let second = update_engine.plan().unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let paths: Vec<&str> = first.changes.iter().map(|c| c.path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted, "changes must be lexicographically sorted");
}

#[test]
fn template_addition_is_template_owned_and_applied() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    fixture.write_template("src/feature.js", "shiny new module");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();

    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].kind, ChangeKind::Add);
    assert_eq!(plan.changes[0].ownership, Ownership::TemplateOwned);

    update_engine.apply(&plan, ApplyOptions::default()).unwrap();
    fixture.assert_workspace_file_eq("src/feature.js", "shiny new module");

    // Baseline now tracks the new file.
    let second = update_engine.plan().unwrap();
    assert!(second.is_empty());
}

#[test]
fn user_created_files_are_protected_from_deletion() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    // Created by the user after scaffold; the template never shipped it.
    fixture.write_workspace("notes/todo.md", "remember the milk");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();

    assert_eq!(plan.changes.len(), 1);
    let change = &plan.changes[0];
    assert_eq!(change.kind, ChangeKind::Delete);
    assert_eq!(change.ownership, Ownership::CustomOwned);

    let report = update_engine.apply(&plan, ApplyOptions::default()).unwrap();
    assert_eq!(report.skipped_custom, vec!["notes/todo.md"]);
    fixture.assert_workspace_file_eq("notes/todo.md", "remember the milk");
}

#[test]
fn template_retired_files_are_deleted_and_untracked() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.scaffold_file("legacy/old.js", "deprecated");
    fixture.write_manifest("1.0.0");

    fixture.remove_template("legacy/old.js");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();

    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].kind, ChangeKind::Delete);
    assert_eq!(plan.changes[0].ownership, Ownership::TemplateOwned);

    let report = update_engine.apply(&plan, ApplyOptions::default()).unwrap();
    assert_eq!(report.deleted, vec!["legacy/old.js"]);
    fixture.assert_workspace_file_missing("legacy/old.js");

    let second = update_engine.plan().unwrap();
    assert!(second.is_empty());
}

#[test]
fn both_sides_created_same_path_is_a_conflict_not_an_add() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    // No baseline for this path: the template ships it in a new version,
    // and the user independently created it too.
    fixture.write_template("src/util.js", "template helper");
    fixture.write_workspace("src/util.js", "my own helper");

    let plan = engine(&fixture).plan().unwrap();

    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].kind, ChangeKind::Modify);
    assert_eq!(plan.conflicts[0].user_modified, None);
}

#[test]
fn dry_run_touches_nothing() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");
    fixture.write_template("src/app.js", "v2");

    let update_engine = engine(&fixture);
    let plan = update_engine.plan().unwrap();
    let report = update_engine
        .apply(&plan, ApplyOptions { dry_run: true })
        .unwrap();

    assert!(report.dry_run);
    assert!(report.snapshot_id.is_none());
    assert_eq!(report.applied, vec!["src/app.js"]);
    fixture.assert_workspace_file_eq("src/app.js", "v1");
    assert!(!fixture.workspace_root().join(".beztack/snapshots").exists());

    // The baseline did not move either: planning again offers the same update.
    let second = update_engine.plan().unwrap();
    assert_eq!(second.changes.len(), 1);
}

#[test]
fn missing_manifest_is_fatal() {
    let fixture = TestWorkspace::new();
    fixture.write_workspace("src/app.js", "v1");
    fixture.write_template("src/app.js", "v1");

    let result = engine(&fixture).plan();
    assert!(matches!(result, Err(Error::ManifestNotFound { .. })));
}

#[test]
fn corrupt_manifest_is_fatal() {
    let fixture = TestWorkspace::new();
    fixture.write_workspace(".beztack/manifest.json", "{ definitely not json");
    fixture.write_workspace("src/app.js", "v1");
    fixture.write_template("src/app.js", "v1");

    let result = engine(&fixture).plan();
    assert!(matches!(result, Err(Error::ManifestParse { .. })));
}

#[test]
fn inspect_report_serializes_the_plan() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");
    fixture.write_template("src/app.js", "v2");

    let plan = engine(&fixture).plan().unwrap();
    let root = beztack_fs::NormalizedPath::new(fixture.workspace_root());
    let path = write_report(&root, &plan).unwrap();

    let raw = std::fs::read_to_string(path.as_ref()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["changes"][0]["path"], "src/app.js");
    assert_eq!(value["changes"][0]["type"], "modify");
    assert_eq!(value["changes"][0]["ownership"], "template-owned");
}

#[test]
fn template_predicate_excludes_declared_paths() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    // Template authors mark generated/ as never-synced.
    fixture.write_template("generated/schema.ts", "autogen");
    fixture.write_workspace("generated/schema.ts", "stale autogen");

    let update_engine =
        engine(&fixture).with_template_predicate(|path| path.starts_with("generated/"));
    let plan = update_engine.plan().unwrap();

    assert!(plan.is_empty());
}

#[test]
fn gitignored_workspace_files_do_not_surface_as_deletes() {
    let mut fixture = TestWorkspace::new();
    fixture.scaffold_file("src/app.js", "v1");
    fixture.write_manifest("1.0.0");

    let status = std::process::Command::new("git")
        .args(["init", "-q"])
        .current_dir(fixture.workspace_root())
        .status()
        .expect("git must be available for this test");
    assert!(status.success());
    fixture.write_workspace(".gitignore", "*.log\n");
    fixture.write_workspace("debug.log", "transient noise");

    // Default engine keeps the git oracle.
    let update_engine = UpdateEngine::new(fixture.workspace_root(), fixture.template_root())
        .unwrap();
    let plan = update_engine.plan().unwrap();

    assert!(
        plan.changes.iter().all(|c| c.path != "debug.log"),
        "ignored file must not appear in the plan"
    );
}
