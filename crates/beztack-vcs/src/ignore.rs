//! Batched `git check-ignore` oracle
//!
//! Queries the git binary for ignored paths in bounded batches so argument
//! lists stay under platform limits. Exit code 1 with empty output means "no
//! paths matched" and is a normal outcome, not an error. Any other failure
//! degrades the oracle to "nothing further is ignored": an unavailable git
//! must never abort a diff.

use std::collections::HashSet;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use beztack_fs::PathIgnoreOracle;

use crate::{Error, Result};

/// Paths per `git check-ignore` invocation.
const DEFAULT_BATCH_SIZE: usize = 500;

/// [`PathIgnoreOracle`] backed by the host `git` binary.
#[derive(Debug, Clone)]
pub struct GitCheckIgnoreOracle {
    batch_size: usize,
}

impl Default for GitCheckIgnoreOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCheckIgnoreOracle {
    /// Create an oracle with the default batch size.
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size. Values below 1 are clamped to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn check_batch(&self, root: &Path, paths: &[String]) -> Result<HashSet<String>> {
        let output = Command::new("git")
            .arg("check-ignore")
            .arg("-z")
            .arg("--")
            .args(paths)
            .current_dir(root)
            .output()
            .map_err(Error::Spawn)?;

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                Ok(stdout
                    .split('\0')
                    .filter(|p| !p.is_empty())
                    .map(|p| p.to_string())
                    .collect())
            }
            // Exit 1 is git's "none of these paths are ignored".
            Some(1) => Ok(HashSet::new()),
            code => Err(Error::CheckIgnoreFailed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

impl PathIgnoreOracle for GitCheckIgnoreOracle {
    fn ignored(&self, root: &Path, paths: &[String]) -> HashSet<String> {
        let mut ignored = HashSet::new();
        for batch in paths.chunks(self.batch_size) {
            match self.check_batch(root, batch) {
                Ok(matched) => ignored.extend(matched),
                Err(e) => {
                    warn!(
                        root = %root.display(),
                        error = %e,
                        "git check-ignore unavailable; treating remaining paths as not ignored"
                    );
                    break;
                }
            }
        }
        debug!(
            root = %root.display(),
            checked = paths.len(),
            ignored = ignored.len(),
            "Completed ignore-check batches"
        );
        ignored
    }
}
