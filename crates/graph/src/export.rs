use crate::error::Result;
use crate::types::{DependencyGraph, GraphStats, NodeData, NodeKind, RelationshipType};
use serde::{Deserialize, Serialize};

/// Serializable snapshot of a graph, sorted by id so the same repository
/// always exports the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub stats: GraphStats,
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub file: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// FILE nodes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relationship: RelationshipType,
}

impl GraphExport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DependencyGraph {
    #[must_use]
    pub fn export(&self) -> GraphExport {
        let mut nodes: Vec<ExportNode> = self
            .nodes()
            .map(|(_, node)| {
                let (ok, error) = match &node.data {
                    NodeData::File { ok, error } => (Some(*ok), error.clone()),
                    _ => (None, None),
                };
                ExportNode {
                    id: node.id.clone(),
                    kind: node.kind(),
                    file: node.file.clone(),
                    name: node.name(),
                    line: node.line(),
                    ok,
                    error,
                }
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<ExportEdge> = self
            .edges()
            .filter_map(|(from, to, relationship)| {
                Some(ExportEdge {
                    source: self.node(from)?.id.clone(),
                    target: self.node(to)?.id.clone(),
                    relationship,
                })
            })
            .collect();
        edges.sort();

        GraphExport {
            stats: self.stats().clone(),
            nodes,
            edges,
        }
    }
}
