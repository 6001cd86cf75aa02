mod graph;
mod parse;

use crate::cli::{Command, CommonArgs};
use crate::config::{FileConfig, Settings};
use crate::summary::RunSummary;
use anyhow::{Context, Result};
use std::path::Path;

pub use graph::build_graph;
pub use parse::parse_repository;

/// Run one subcommand and print its summary to stdout.
pub async fn execute(command: Command) -> Result<()> {
    let (summary, common) = match command {
        Command::Parse { parse, common } => {
            let (file, config_path) =
                FileConfig::discover(common.config.as_deref(), Some(&parse.root))?;
            let settings = Settings::resolve(file, Some(&parse));
            let stats = parse_repository(&parse.root, &common.output, &settings).await?;
            let summary = RunSummary {
                parse: Some(stats),
                config_path,
                ..RunSummary::default()
            };
            (summary, common)
        }
        Command::Graph { graph, common } => {
            let (file, config_path) = FileConfig::discover(common.config.as_deref(), None)?;
            let settings = Settings::resolve(file, None);
            let (stats, outputs) = build_graph(&common.output, &graph, &settings)?;
            let summary = RunSummary {
                graph: Some(stats),
                config_path,
                outputs,
                ..RunSummary::default()
            };
            (summary, common)
        }
        Command::Analyze {
            parse,
            graph,
            common,
        } => {
            let (file, config_path) =
                FileConfig::discover(common.config.as_deref(), Some(&parse.root))?;
            let settings = Settings::resolve(file, Some(&parse));
            let parse_stats = parse_repository(&parse.root, &common.output, &settings).await?;
            let (graph_stats, outputs) = build_graph(&common.output, &graph, &settings)?;
            let summary = RunSummary {
                parse: Some(parse_stats),
                graph: Some(graph_stats),
                config_path,
                outputs,
            };
            (summary, common)
        }
    };

    print_summary(&summary, &common)
}

fn print_summary(summary: &RunSummary, common: &CommonArgs) -> Result<()> {
    if common.json {
        println!("{}", summary.render_json()?);
    } else {
        print!("{}", summary.render_text());
    }
    Ok(())
}

/// Write `contents` to `path`, creating parent directories.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
