//! [`TestWorkspace`] builder for template-update test scenarios.
//!
//! Stands up a workspace directory and a template directory in tempdirs,
//! with helpers to seed files on either side and to write a manifest whose
//! baseline records match seeded content.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use beztack_fs::checksum::compute_content_checksum;

/// A temporary workspace/template pair with helper methods for test setup
/// and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use beztack_test_utils::TestWorkspace;
///
/// let mut fixture = TestWorkspace::new();
/// fixture.scaffold_file("src/app.js", "console.log('v1');");
/// fixture.write_manifest("1.0.0");
/// ```
pub struct TestWorkspace {
    workspace: TempDir,
    template: TempDir,
    origin: BTreeMap<String, (String, String)>,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create empty workspace and template directories.
    pub fn new() -> Self {
        Self {
            workspace: TempDir::new().unwrap(),
            template: TempDir::new().unwrap(),
            origin: BTreeMap::new(),
        }
    }

    /// Root of the workspace directory.
    pub fn workspace_root(&self) -> &Path {
        self.workspace.path()
    }

    /// Root of the template directory.
    pub fn template_root(&self) -> &Path {
        self.template.path()
    }

    /// Write a file (creating parents) under the workspace.
    pub fn write_workspace(&self, rel: &str, content: impl AsRef<[u8]>) {
        write_file(self.workspace.path(), rel, content.as_ref());
    }

    /// Write a file (creating parents) under the template.
    pub fn write_template(&self, rel: &str, content: impl AsRef<[u8]>) {
        write_file(self.template.path(), rel, content.as_ref());
    }

    /// Remove a file from the workspace.
    pub fn remove_workspace(&self, rel: &str) {
        fs::remove_file(self.workspace.path().join(rel)).unwrap();
    }

    /// Remove a file from the template.
    pub fn remove_template(&self, rel: &str) {
        fs::remove_file(self.template.path().join(rel)).unwrap();
    }

    /// Seed `rel` with identical content on both sides and record a matching
    /// baseline, as a scaffold-time sync would have.
    pub fn scaffold_file(&mut self, rel: &str, content: &str) {
        self.write_workspace(rel, content);
        self.write_template(rel, content);
        self.record_origin(rel, content, content);
    }

    /// Record a baseline entry from the content each side had at the last
    /// sync. Takes effect at the next [`write_manifest`](Self::write_manifest).
    pub fn record_origin(&mut self, rel: &str, template_content: &str, project_content: &str) {
        self.origin.insert(
            rel.to_string(),
            (
                compute_content_checksum(template_content),
                compute_content_checksum(project_content),
            ),
        );
    }

    /// Write `.beztack/manifest.json` with the recorded baselines.
    pub fn write_manifest(&self, version: &str) {
        let origin: serde_json::Map<String, serde_json::Value> = self
            .origin
            .iter()
            .map(|(path, (template_hash, project_hash))| {
                (
                    path.clone(),
                    serde_json::json!({
                        "templateHash": template_hash,
                        "projectHash": project_hash,
                    }),
                )
            })
            .collect();

        let manifest = serde_json::json!({
            "currentVersion": version,
            "updatedAt": "2024-01-01T00:00:00Z",
            "origin": origin,
        });

        write_file(
            self.workspace.path(),
            ".beztack/manifest.json",
            serde_json::to_string_pretty(&manifest).unwrap().as_bytes(),
        );
    }

    /// Read a workspace file as text.
    pub fn read_workspace(&self, rel: &str) -> String {
        fs::read_to_string(self.workspace.path().join(rel))
            .unwrap_or_else(|_| panic!("Could not read workspace file: {rel}"))
    }

    /// Assert that a workspace file exists with exactly `expected` content.
    ///
    /// # Panics
    /// Panics with a descriptive message on mismatch.
    pub fn assert_workspace_file_eq(&self, rel: &str, expected: &str) {
        let actual = self.read_workspace(rel);
        assert_eq!(
            actual, expected,
            "Workspace file {rel} has unexpected content"
        );
    }

    /// Assert that `rel` does **not** exist in the workspace.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_workspace_file_missing(&self, rel: &str) {
        let path = self.workspace.path().join(rel);
        assert!(
            !path.exists(),
            "Expected workspace file NOT to exist: {}",
            path.display()
        );
    }
}

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
