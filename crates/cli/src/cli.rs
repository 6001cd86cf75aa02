use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// repograph: syntax trees and a dependency graph for a source repository
#[derive(Parser, Debug)]
#[command(name = "repograph")]
#[command(version)]
#[command(
    about = "Parse a repository into normalized syntax trees and build its dependency graph",
    long_about = "repograph parses every Python file of a repository in parallel, stores one \
                  normalized syntax tree per file plus an index, and builds a graph of files, \
                  classes, functions, imports and calls from them.\n\nUsage:\n  \
                  repograph analyze ./repo --output ./out      Parse and build in one go\n  \
                  repograph parse ./repo --output ./out        Parse only\n  \
                  repograph graph --output ./out --mermaid deps.mmd"
)]
pub struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse every source file under ROOT into OUTPUT
    Parse {
        #[command(flatten)]
        parse: ParseArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Build the dependency graph from a previous parse in OUTPUT
    Graph {
        #[command(flatten)]
        graph: GraphArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Parse, then build the graph
    Analyze {
        #[command(flatten)]
        parse: ParseArgs,
        #[command(flatten)]
        graph: GraphArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the index and per-file artifacts
    #[arg(short, long)]
    pub output: PathBuf,

    /// TOML configuration file (default: ROOT/repograph.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Repository root
    pub root: PathBuf,

    /// Number of parse workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Stop taking new files after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Extra directory names to skip (repeatable)
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Where to write the graph JSON (default: OUTPUT/graph.json)
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write the narration digest JSON here
    #[arg(long)]
    pub digest: Option<PathBuf>,

    /// Write the narration prompt text here
    #[arg(long)]
    pub prompt: Option<PathBuf>,

    /// Write a Mermaid diagram of imports and inheritance here
    #[arg(long)]
    pub mermaid: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::try_parse_from([
            "repograph",
            "parse",
            "./repo",
            "--output",
            "./out",
            "--workers",
            "3",
            "--exclude",
            "vendor",
            "--exclude",
            "third_party",
        ])
        .unwrap();
        match cli.command {
            Command::Parse { parse, common } => {
                assert_eq!(parse.root, PathBuf::from("./repo"));
                assert_eq!(parse.workers, Some(3));
                assert_eq!(parse.deadline_secs, None);
                assert_eq!(parse.exclude, vec!["vendor", "third_party"]);
                assert_eq!(common.output, PathBuf::from("./out"));
                assert!(!common.json);
            }
            other => panic!("expected parse, got {other:?}"),
        }
    }

    #[test]
    fn test_graph_command() {
        let cli = Cli::try_parse_from([
            "repograph",
            "graph",
            "-o",
            "out",
            "--mermaid",
            "deps.mmd",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Graph { graph, common } => {
                assert_eq!(graph.mermaid, Some(PathBuf::from("deps.mmd")));
                assert!(graph.export.is_none());
                assert!(common.json);
            }
            other => panic!("expected graph, got {other:?}"),
        }
    }

    #[test]
    fn test_global_verbosity() {
        let cli = Cli::try_parse_from(["repograph", "analyze", "repo", "-o", "out", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_output_is_required() {
        let err = Cli::try_parse_from(["repograph", "parse", "repo"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["repograph", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
