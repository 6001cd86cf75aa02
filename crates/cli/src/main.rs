//! repograph command-line tool
//!
//! ## Commands
//!
//! - `parse` - parse every source file into normalized syntax-tree artifacts
//! - `graph` - build the dependency graph from a previous parse
//! - `analyze` - both, in one run
//!
//! Logs go to stderr (`RUST_LOG` overrides `-v`/`-q`); the run summary goes
//! to stdout.

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod command;
mod config;
mod summary;

use cli::Cli;

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match command::execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
