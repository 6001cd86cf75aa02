use crate::types::{DependencyGraph, RelationshipType};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramConfig {
    pub max_edges: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self { max_edges: 60 }
    }
}

/// Mermaid `graph LR` text showing file imports and class inheritance.
///
/// Edges are ordered by (source id, target id), import edges first, and cut
/// at `max_edges`. Mermaid ids are assigned in order of first use.
#[must_use]
pub fn render_mermaid(graph: &DependencyGraph, config: DiagramConfig) -> String {
    let mut edges: Vec<(NodeIndex, NodeIndex, RelationshipType)> = Vec::new();
    for rel in [RelationshipType::ImportsFrom, RelationshipType::Inherits] {
        let mut group: Vec<(NodeIndex, NodeIndex, RelationshipType)> = graph
            .edges()
            .filter(|(_, _, r)| *r == rel)
            .collect();
        group.sort_by_cached_key(|(from, to, _)| (node_id(graph, *from), node_id(graph, *to)));
        edges.extend(group);
    }

    let total = edges.len();
    edges.truncate(config.max_edges);

    let mut ids: HashMap<NodeIndex, String> = HashMap::new();
    let mut out = String::from("graph LR\n");
    for (from, to, rel) in &edges {
        let source = declare(graph, &mut ids, *from);
        let target = declare(graph, &mut ids, *to);
        let arrow = match rel {
            RelationshipType::Inherits => "-. inherits .->",
            _ => "-->",
        };
        out.push_str(&format!("    {source} {arrow} {target}\n"));
    }
    if total > edges.len() {
        out.push_str(&format!("    %% {} more edges omitted\n", total - edges.len()));
    }
    out
}

fn node_id(graph: &DependencyGraph, idx: NodeIndex) -> String {
    graph.node(idx).map(|n| n.id.clone()).unwrap_or_default()
}

/// Mermaid reference for `idx`; the first use carries the label.
fn declare(graph: &DependencyGraph, ids: &mut HashMap<NodeIndex, String>, idx: NodeIndex) -> String {
    if let Some(id) = ids.get(&idx) {
        return id.clone();
    }
    let id = format!("n{}", ids.len());
    ids.insert(idx, id.clone());
    let label = graph.node(idx).map(|n| n.name()).unwrap_or_default();
    format!("{id}[\"{}\"]", escape_label(&label))
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphBuilder;
    use repograph_syntax::{Language, SourceParser};

    fn graph() -> DependencyGraph {
        let mut parser = SourceParser::new(Language::Python).unwrap();
        let files = vec![
            parser.parse_file("a.py", "from b import Base\nfrom c import x\n\nclass User(Base):\n    pass\n"),
            parser.parse_file("b.py", "class Base:\n    pass\n"),
            parser.parse_file("c.py", "x = 1\n"),
        ];
        GraphBuilder::new(Language::Python).unwrap().build(&files).unwrap()
    }

    #[test]
    fn renders_imports_then_inheritance() {
        let text = render_mermaid(&graph(), DiagramConfig::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "graph LR",
                "    n0[\"a.py\"] --> n1[\"b.py\"]",
                "    n0 --> n2[\"c.py\"]",
                "    n3[\"User\"] -. inherits .-> n4[\"Base\"]",
            ]
        );
    }

    #[test]
    fn edge_cap_is_reported() {
        let text = render_mermaid(&graph(), DiagramConfig { max_edges: 1 });
        assert!(text.ends_with("    %% 2 more edges omitted\n"));
        assert_eq!(text.lines().count(), 3);
    }
}
