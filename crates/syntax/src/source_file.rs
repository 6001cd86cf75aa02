use crate::node::Node;
use std::path::Path;

/// Outcome of one parse attempt for one file.
///
/// `root` is present iff the parse succeeded; `error` is present iff it did
/// not. Both are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    path: String,
    error: Option<String>,
    root: Option<Node>,
    node_count: Option<usize>,
}

impl SourceFile {
    pub fn parsed(path: impl Into<String>, root: Node) -> Self {
        let node_count = root.count_nodes();
        Self {
            path: path.into(),
            error: None,
            root: Some(root),
            node_count: Some(node_count),
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: Some(error.into()),
            root: None,
            node_count: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.root.is_some()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn node_count(&self) -> Option<usize> {
        self.node_count
    }
}

/// Repo-relative, forward-slash path for `path` under `root`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}
