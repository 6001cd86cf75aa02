use crate::builder::file_node_id;
use crate::error::{GraphError, Result};
use crate::types::{DependencyGraph, GraphNode, NodeKind, RelationshipType};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashSet;

impl DependencyGraph {
    /// Node for `id`, or [`GraphError::NodeNotFound`]
    pub fn require(&self, id: &str) -> Result<NodeIndex> {
        self.find_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Abstractions a CALL node resolves to (outgoing `calls` edges)
    #[must_use]
    pub fn callees(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_by_relationship(node, RelationshipType::Calls, Direction::Outgoing)
    }

    /// CALL nodes that resolve to `node` (incoming `calls` edges)
    #[must_use]
    pub fn callers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors_by_relationship(node, RelationshipType::Calls, Direction::Incoming)
    }

    /// Neighbours over edges of one relationship, in edge insertion order
    #[must_use]
    pub fn neighbors_by_relationship(
        &self,
        node: NodeIndex,
        rel_type: RelationshipType,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let mut out: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| e.weight().relationship == rel_type)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id().index(), other)
            })
            .collect();
        out.sort_unstable();
        out.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Files that `path` imports from
    pub fn file_dependencies(&self, path: &str) -> Result<Vec<&str>> {
        let node = self.require(&file_node_id(path))?;
        Ok(self
            .neighbors_by_relationship(node, RelationshipType::ImportsFrom, Direction::Outgoing)
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .map(|n| n.file.as_str())
            .collect())
    }

    /// Files that import from `path`
    pub fn file_dependents(&self, path: &str) -> Result<Vec<&str>> {
        let node = self.require(&file_node_id(path))?;
        Ok(self
            .neighbors_by_relationship(node, RelationshipType::ImportsFrom, Direction::Incoming)
            .into_iter()
            .filter_map(|idx| self.node(idx))
            .map(|n| n.file.as_str())
            .collect())
    }

    /// Every node that belongs to `path`, the FILE node first
    #[must_use]
    pub fn nodes_in_file(&self, path: &str) -> Vec<(NodeIndex, &GraphNode)> {
        self.nodes().filter(|(_, n)| n.file == path).collect()
    }

    #[must_use]
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<(NodeIndex, &GraphNode)> {
        self.nodes().filter(|(_, n)| n.kind() == kind).collect()
    }

    /// All edges of one relationship as (source id, target id), in insertion order
    #[must_use]
    pub fn edges_of(&self, rel_type: RelationshipType) -> Vec<(&str, &str)> {
        self.edges()
            .filter(|(_, _, rel)| *rel == rel_type)
            .filter_map(|(from, to, _)| {
                Some((self.node(from)?.id.as_str(), self.node(to)?.id.as_str()))
            })
            .collect()
    }

    /// Files reachable from `path` over `imports_from`, nearest first.
    ///
    /// Returns (file, depth) pairs, excluding `path` itself.
    pub fn transitive_dependencies(
        &self,
        path: &str,
        max_depth: usize,
    ) -> Result<Vec<(&str, usize)>> {
        let start = self.require(&file_node_id(path))?;
        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut result = Vec::new();

        for depth in 1..=max_depth {
            let mut next = Vec::new();
            for current in frontier {
                for target in self.neighbors_by_relationship(
                    current,
                    RelationshipType::ImportsFrom,
                    Direction::Outgoing,
                ) {
                    if visited.insert(target) {
                        if let Some(node) = self.node(target) {
                            result.push((node.file.as_str(), depth));
                        }
                        next.push(target);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(result)
    }

    /// Abstractions with no resolved callers, in node order
    #[must_use]
    pub fn uncalled_functions(&self) -> Vec<NodeIndex> {
        self.nodes_of_kind(NodeKind::Function)
            .into_iter()
            .map(|(idx, _)| idx)
            .filter(|&idx| self.callers(idx).is_empty())
            .collect()
    }
}
