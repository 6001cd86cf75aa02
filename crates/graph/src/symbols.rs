use repograph_syntax::Span;
use serde::{Deserialize, Serialize};

/// Kind of a named definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractionKind {
    Class,
    Function,
}

impl AbstractionKind {
    /// Prefix used in graph node ids
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Class => "CLASS",
            Self::Function => "FUNCTION",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Function => "Function",
        }
    }
}

/// A class or function definition found anywhere in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abstraction {
    pub kind: AbstractionKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Base class expressions, dotted where the source is dotted (classes only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_names: Vec<String>,
    /// Functions defined directly in the class body (classes only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method_names: Vec<String>,
    /// Parameter names in declaration order (functions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

impl Abstraction {
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.span.map(|s| s.start_line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `import a.b [as c]`
    Import,
    /// `from m import n [as a]`
    ImportFrom,
}

/// One imported module or name.
///
/// `from m import a, b` yields two records sharing `module`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub kind: ImportKind,
    /// Module text as written, including any leading dots
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub relative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl ImportRecord {
    /// The name this import binds in the importing file
    #[must_use]
    pub fn bound_name(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.imported_name.as_deref())
            .unwrap_or(&self.module)
    }
}

/// What a call expression invokes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CallTarget {
    /// `foo(...)`; callees that are neither names nor attributes are `complex_expr`
    Direct {
        #[serde(rename = "calleeName")]
        callee_name: String,
    },
    /// `obj.method(...)`
    Method {
        #[serde(rename = "objectName")]
        object_name: String,
        #[serde(rename = "methodName")]
        method_name: String,
    },
}

/// Placeholder for receivers and callees that are not plain names
pub const COMPLEX_EXPR: &str = "complex_expr";
/// Placeholder for a missing receiver or attribute
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    #[serde(flatten)]
    pub target: CallTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl CallSite {
    #[must_use]
    pub fn direct(callee_name: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            target: CallTarget::Direct {
                callee_name: callee_name.into(),
            },
            span,
        }
    }

    #[must_use]
    pub fn method(
        object_name: impl Into<String>,
        method_name: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            target: CallTarget::Method {
                object_name: object_name.into(),
                method_name: method_name.into(),
            },
            span,
        }
    }

    /// `foo` for direct calls, `obj.method` for method calls
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.target {
            CallTarget::Direct { callee_name } => callee_name.clone(),
            CallTarget::Method {
                object_name,
                method_name,
            } => format!("{object_name}.{method_name}"),
        }
    }

    /// Start line of the call, 0 when the tree carried no span
    #[must_use]
    pub fn line(&self) -> usize {
        self.span.map_or(0, |s| s.start_line)
    }

    #[must_use]
    pub const fn is_method(&self) -> bool {
        matches!(self.target, CallTarget::Method { .. })
    }
}

/// Everything extracted from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSymbols {
    pub path: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub abstractions: Vec<Abstraction>,
    pub imports: Vec<ImportRecord>,
    pub calls: Vec<CallSite>,
}

impl FileSymbols {
    /// Symbols for a file that failed to parse: status only, no lists
    pub fn failed(path: impl Into<String>, error: Option<String>) -> Self {
        Self {
            path: path.into(),
            ok: false,
            error,
            abstractions: Vec::new(),
            imports: Vec::new(),
            calls: Vec::new(),
        }
    }
}
