use super::write_output;
use crate::cli::GraphArgs;
use crate::config::Settings;
use anyhow::{Context, Result};
use repograph_graph::{build_digest, render_mermaid, GraphBuilder, GraphStats};
use repograph_indexer::RollupIndex;
use repograph_syntax::Language;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_NAME: &str = "graph.json";

/// Build the graph from the parse results in `output` and write the
/// requested views. Nothing is written unless the build succeeds.
pub fn build_graph(
    output: &Path,
    args: &GraphArgs,
    settings: &Settings,
) -> Result<(GraphStats, Vec<PathBuf>)> {
    let files = RollupIndex::load(output)
        .with_context(|| format!("failed to load parse results from {}", output.display()))?;

    let builder = GraphBuilder::new(Language::Python)?;
    let symbols = builder.extract_all(&files);
    let graph = builder
        .build_from_symbols(&symbols)
        .context("failed to build the dependency graph")?;

    let mut rendered: Vec<(PathBuf, String)> = Vec::new();
    let export_path = args
        .export
        .clone()
        .unwrap_or_else(|| output.join(DEFAULT_EXPORT_NAME));
    rendered.push((export_path, graph.export().to_json_pretty()?));

    if args.digest.is_some() || args.prompt.is_some() {
        let digest = build_digest(&graph, &symbols, &files, settings.digest);
        if let Some(path) = &args.digest {
            rendered.push((path.clone(), digest.to_json_pretty()?));
        }
        if let Some(path) = &args.prompt {
            rendered.push((path.clone(), digest.render_prompt()));
        }
    }
    if let Some(path) = &args.mermaid {
        rendered.push((path.clone(), render_mermaid(&graph, settings.diagram)));
    }

    let mut written = Vec::with_capacity(rendered.len());
    for (path, contents) in rendered {
        write_output(&path, &contents)?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok((graph.stats().clone(), written))
}
