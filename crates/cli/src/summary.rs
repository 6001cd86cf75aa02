use repograph_graph::GraphStats;
use repograph_indexer::ParseStats;
use serde::Serialize;
use std::path::PathBuf;

/// What a run did, printed once at the end
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<ParseStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    /// Files written by the graph step
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PathBuf>,
}

impl RunSummary {
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(parse) = &self.parse {
            out.push_str(&format!(
                "Parsed {} of {} files: {} ok, {} failed, {} nodes in {}ms\n",
                parse.attempted, parse.discovered, parse.ok, parse.failed, parse.total_nodes, parse.time_ms
            ));
            if parse.cancelled {
                out.push_str(&format!("Run cancelled: {} files skipped\n", parse.skipped));
            }
        }
        if let Some(graph) = &self.graph {
            out.push_str(&format!(
                "Graph: {} nodes, {} edges ({} files, {} failed)\n",
                graph.nodes, graph.edges, graph.files, graph.failed_files
            ));
            out.push_str(&format!(
                "  {} abstractions, {} resolved imports, {}/{} calls resolved\n",
                graph.abstractions, graph.resolved_imports, graph.resolved_calls, graph.calls
            ));
        }
        for path in &self.outputs {
            out.push_str(&format!("Wrote {}\n", path.display()));
        }
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
