use crate::symbols::{Abstraction, AbstractionKind, CallSite, ImportRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a graph node, matching its id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    File,
    Class,
    Function,
    Import,
    Call,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Class => "CLASS",
            Self::Function => "FUNCTION",
            Self::Import => "IMPORT",
            Self::Call => "CALL",
        }
    }
}

/// What a node carries besides its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    File { ok: bool, error: Option<String> },
    Abstraction(Abstraction),
    Import(ImportRecord),
    Call(CallSite),
}

/// Node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Unique, deterministic id such as `FUNCTION:pkg/a.py:main`
    pub id: String,
    /// Path of the file the node belongs to
    pub file: String,
    pub data: NodeData,
}

impl GraphNode {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::File { .. } => NodeKind::File,
            NodeData::Abstraction(a) => match a.kind {
                AbstractionKind::Class => NodeKind::Class,
                AbstractionKind::Function => NodeKind::Function,
            },
            NodeData::Import(_) => NodeKind::Import,
            NodeData::Call(_) => NodeKind::Call,
        }
    }

    /// Human-facing name: the path, the abstraction or imported name, or the callee
    #[must_use]
    pub fn name(&self) -> String {
        match &self.data {
            NodeData::File { .. } => self.file.clone(),
            NodeData::Abstraction(a) => a.name.clone(),
            NodeData::Import(i) => i.imported_name.clone().unwrap_or_else(|| i.module.clone()),
            NodeData::Call(c) => c.display_name(),
        }
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match &self.data {
            NodeData::File { .. } => None,
            NodeData::Abstraction(a) => a.line(),
            NodeData::Import(i) => i.span.map(|s| s.start_line),
            NodeData::Call(c) => c.span.map(|s| s.start_line),
        }
    }
}

/// Relationship carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// FILE -> CLASS/FUNCTION defined in it
    Contains,
    /// FILE -> FILE it imports from
    ImportsFrom,
    /// FILE -> IMPORT node for a resolved name
    DirectlyImports,
    /// IMPORT -> the abstraction it names
    References,
    /// FILE -> CALL made in it
    ContainsCall,
    /// CALL -> the abstraction it invokes
    Calls,
    /// CLASS -> base CLASS
    Inherits,
}

impl RelationshipType {
    pub const ALL: [Self; 7] = [
        Self::Contains,
        Self::ImportsFrom,
        Self::DirectlyImports,
        Self::References,
        Self::ContainsCall,
        Self::Calls,
        Self::Inherits,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::ImportsFrom => "imports_from",
            Self::DirectlyImports => "directly_imports",
            Self::References => "references",
            Self::ContainsCall => "contains_call",
            Self::Calls => "calls",
            Self::Inherits => "inherits",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub relationship: RelationshipType,
}

/// Build counters, carried with the graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub files: usize,
    pub failed_files: usize,
    pub abstractions: usize,
    pub imports: usize,
    pub calls: usize,
    pub nodes: usize,
    pub edges: usize,
    /// `imports_from` edges
    pub resolved_imports: usize,
    /// CALL nodes with a `calls` edge
    pub resolved_calls: usize,
    pub unresolved_calls: usize,
}

/// Typed, directed multigraph over files, abstractions, imports and calls.
///
/// Nodes are unique by id; edges are unique by (source, target, relationship).
/// Only the builder mutates it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<GraphNode, GraphEdge>,
    pub(crate) index: HashMap<String, NodeIndex>,
    pub(crate) stats: GraphStats,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless its id is taken; either way return the node for that id.
    pub(crate) fn add_node(&mut self, node: GraphNode) -> (NodeIndex, bool) {
        if let Some(&idx) = self.index.get(&node.id) {
            return (idx, false);
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        (idx, true)
    }

    /// Add an edge unless an identical one exists.
    pub(crate) fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        relationship: RelationshipType,
    ) -> bool {
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().relationship == relationship);
        if !exists {
            self.graph.add_edge(from, to, GraphEdge { relationship });
        }
        !exists
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> + '_ {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx).map(|n| (idx, n)))
    }

    /// All edges as (source, target, relationship)
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, RelationshipType)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight().relationship))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub const fn stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Underlying petgraph structure, for algorithms not wrapped here
    #[must_use]
    pub const fn inner(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }
}
