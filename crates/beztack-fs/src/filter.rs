//! Path filtering for tree loading
//!
//! Decides which filesystem entries participate in a sync at all. The filter
//! composes three layers: a static excluded-segment set, an optional
//! template-supplied predicate, and a VCS ignore oracle that is consulted in
//! a batched pass over the workspace tree only.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::constants::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES};

/// Oracle answering "which of these paths does the host VCS ignore?".
///
/// Implementations must treat "none of them" as a normal outcome and degrade
/// internally on failure (returning an empty set) rather than propagating an
/// error; an unavailable oracle never aborts a diff.
pub trait PathIgnoreOracle {
    /// Return the subset of `paths` (root-relative, forward-slashed) that are
    /// ignored under `root`.
    fn ignored(&self, root: &Path, paths: &[String]) -> HashSet<String>;
}

/// Oracle that never ignores anything. Used for template trees and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIgnoreOracle;

impl PathIgnoreOracle for NoopIgnoreOracle {
    fn ignored(&self, _root: &Path, _paths: &[String]) -> HashSet<String> {
        HashSet::new()
    }
}

/// Injected exclusion policy for a single tree load.
///
/// A value, not global state: two loads in one process can run with
/// different policies.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Directory/file segments excluded wherever they appear in a path
    pub excluded_dirs: Vec<String>,
    /// File names (final segment) excluded wherever they appear
    pub excluded_files: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Composite path filter used by the tree loader.
pub struct PathFilter {
    config: FilterConfig,
    template_excluded: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
    oracle: Option<Arc<dyn PathIgnoreOracle>>,
}

impl PathFilter {
    /// Create a filter with the given static exclusion policy.
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            template_excluded: None,
            oracle: None,
        }
    }

    /// Add a template-supplied predicate marking additional paths as
    /// never-synced.
    pub fn with_template_predicate(
        mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.template_excluded = Some(Arc::new(predicate));
        self
    }

    /// Attach a VCS ignore oracle.
    ///
    /// Only filters built for the workspace root carry one; template trees
    /// are never filtered by workspace ignore rules.
    pub fn with_ignore_oracle(mut self, oracle: Arc<dyn PathIgnoreOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Decide whether a root-relative path is excluded from the walk.
    ///
    /// Applied before descending into directories, so an excluded directory
    /// is never traversed.
    pub fn should_exclude(&self, relative_path: &str) -> bool {
        let mut segments = relative_path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            if self.config.excluded_dirs.iter().any(|d| d == segment) {
                return true;
            }
            if is_last && self.config.excluded_files.iter().any(|f| f == segment) {
                return true;
            }
        }
        if let Some(predicate) = &self.template_excluded
            && predicate(relative_path)
        {
            return true;
        }
        false
    }

    /// Run the batched ignore pass over collected file paths.
    ///
    /// Returns the subset of `paths` the oracle reports as ignored; empty if
    /// no oracle is attached.
    pub fn ignored(&self, root: &Path, paths: &[String]) -> HashSet<String> {
        match &self.oracle {
            Some(oracle) => oracle.ignored(root, paths),
            None => HashSet::new(),
        }
    }
}

impl std::fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFilter")
            .field("config", &self.config)
            .field("has_template_predicate", &self.template_excluded.is_some())
            .field("has_ignore_oracle", &self.oracle.is_some())
            .finish()
    }
}
