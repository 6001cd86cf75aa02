use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source language of a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Unknown,
}

/// Grammar tags the extractor keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKinds {
    pub class: &'static str,
    pub function: &'static str,
    pub decorated: &'static str,
    pub import: &'static str,
    pub import_from: &'static str,
    /// `from __future__ import …`, which has no module field
    pub future_import: &'static str,
    pub call: &'static str,
}

const PYTHON_KINDS: NodeKinds = NodeKinds {
    class: "class_definition",
    function: "function_definition",
    decorated: "decorated_definition",
    import: "import_statement",
    import_from: "import_from_statement",
    future_import: "future_import_statement",
    call: "call",
};

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyw" => Self::Python,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }

    /// File extensions (without the dot) that belong to this language.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyw"],
            Self::Unknown => &[],
        }
    }

    /// The canonical extension used when turning a module string into a path.
    pub const fn module_extension(self) -> Option<&'static str> {
        match self {
            Self::Python => Some("py"),
            Self::Unknown => None,
        }
    }

    /// Name of the file that stands in for a package directory, if any.
    pub const fn package_marker(self) -> Option<&'static str> {
        match self {
            Self::Python => Some("__init__.py"),
            Self::Unknown => None,
        }
    }

    pub fn node_kinds(self) -> Result<NodeKinds> {
        match self {
            Self::Python => Ok(PYTHON_KINDS),
            Self::Unknown => Err(ParseError::unsupported_language(self.as_str())),
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Self::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Self::Unknown => Err(ParseError::unsupported_language(self.as_str())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
