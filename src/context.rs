use std::path::{Path, PathBuf};

/// Deployment-root prefixes stripped when remapping foreign paths, tried in
/// order. Conventions vary across deployments, so the list is overridable via
/// [`ResolutionContext::with_strip_prefixes`].
const DEFAULT_STRIP_PREFIXES: &[&[&str]] = &[
    &["usr", "srv", "app"],
    &["usr", "srv"],
    &["app"],
    &["home"],
    &["var", "www"],
    &["srv"],
];

const DEFAULT_MAX_SEARCH_DEPTH: usize = 16;
const DEFAULT_MAX_SEARCH_NODES: usize = 50_000;

/// Per-run configuration for path resolution.
///
/// Built once at pipeline start and passed by reference into every resolution
/// and validation call. Concurrent pipeline runs in one process each own an
/// independent context, so one run's root can never leak into another's
/// resolution.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    local_root: Option<PathBuf>,
    strip_prefixes: Vec<Vec<String>>,
    max_search_depth: usize,
    max_search_nodes: usize,
}

impl ResolutionContext {
    /// Create a context rooted at the local copy of the target codebase.
    pub fn new(local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: Some(local_root.into()),
            ..Self::unrooted()
        }
    }

    /// Create a context without a local root. All resolution degrades to
    /// identity: absolute paths are returned as-is, relative paths are left
    /// for the caller to interpret.
    pub fn unrooted() -> Self {
        Self {
            local_root: None,
            strip_prefixes: DEFAULT_STRIP_PREFIXES
                .iter()
                .map(|p| p.iter().map(|s| s.to_string()).collect())
                .collect(),
            max_search_depth: DEFAULT_MAX_SEARCH_DEPTH,
            max_search_nodes: DEFAULT_MAX_SEARCH_NODES,
        }
    }

    /// Replace the ordered list of deployment prefixes tried during
    /// prefix-stripping resolution.
    pub fn with_strip_prefixes(mut self, prefixes: Vec<Vec<String>>) -> Self {
        self.strip_prefixes = prefixes;
        self
    }

    /// Bound the filename-search fallback by directory depth and total
    /// entries visited.
    pub fn with_search_limits(mut self, max_depth: usize, max_nodes: usize) -> Self {
        self.max_search_depth = max_depth;
        self.max_search_nodes = max_nodes;
        self
    }

    pub fn local_root(&self) -> Option<&Path> {
        self.local_root.as_deref()
    }

    pub fn strip_prefixes(&self) -> &[Vec<String>] {
        &self.strip_prefixes
    }

    pub fn max_search_depth(&self) -> usize {
        self.max_search_depth
    }

    pub fn max_search_nodes(&self) -> usize {
        self.max_search_nodes
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::unrooted()
    }
}
