use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field that holds the source text of leaf nodes.
pub const TEXT_FIELD: &str = "text";
/// Field that holds unlabelled children, in source order.
pub const CHILDREN_FIELD: &str = "children";
/// Field that holds the primitive value of a literal.
pub const VALUE_FIELD: &str = "value";

/// Source span: 1-based lines, 0-based columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/// One element of a normalized syntax tree.
///
/// A node owns its fields outright; trees are built once and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Value>,
}

/// A field value: a nested node, a list, or a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Node(Box<Node>),
}

impl Value {
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match self {
            Self::Node(node) => out.push(node),
            Self::List(items) => {
                for item in items {
                    item.collect_nodes(out);
                }
            }
            _ => {}
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(Box::new(node))
    }
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            span: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// First node stored under `name` (a single node or the head of a list).
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children_in(name).into_iter().next()
    }

    /// Every node stored under `name`, flattening lists.
    #[must_use]
    pub fn children_in(&self, name: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        if let Some(value) = self.fields.get(name) {
            value.collect_nodes(&mut out);
        }
        out
    }

    /// Unlabelled children, in source order.
    #[must_use]
    pub fn unlabelled(&self) -> Vec<&Node> {
        self.children_in(CHILDREN_FIELD)
    }

    /// All direct child nodes, in field declaration order.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for value in self.fields.values() {
            value.collect_nodes(&mut out);
        }
        out
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.fields.get(TEXT_FIELD).and_then(Value::as_str)
    }

    #[must_use]
    pub fn start_line(&self) -> Option<usize> {
        self.span.map(|s| s.start_line)
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count_nodes(&self) -> usize {
        self.preorder().count()
    }

    /// Depth-first, pre-order traversal over this subtree.
    #[must_use]
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Iterative pre-order walk; no recursion so deep trees are safe.
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children = node.child_nodes();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}
