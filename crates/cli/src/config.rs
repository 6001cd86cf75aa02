//! Layered settings: built-in defaults, then `repograph.toml`, then flags.

use crate::cli::ParseArgs;
use anyhow::{Context, Result};
use repograph_graph::{DiagramConfig, DigestConfig};
use repograph_indexer::PoolConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "repograph.toml";

/// Contents of a `repograph.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub parse: ParseSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSection {
    pub workers: Option<usize>,
    pub deadline_secs: Option<u64>,
    pub exclude_dirs: Vec<String>,
    pub progress_every: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub outline_max_lines: Option<usize>,
    pub max_items_per_section: Option<usize>,
    pub max_diagram_edges: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// An explicit path must exist; otherwise `root/repograph.toml` is used
    /// when present, and defaults when not.
    pub fn discover(explicit: Option<&Path>, root: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        if let Some(path) = root.map(|r| r.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()) {
            return Ok((Self::load(&path)?, Some(path)));
        }
        Ok((Self::default(), None))
    }
}

/// Effective settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub pool: PoolConfig,
    pub deadline: Option<Duration>,
    pub digest: DigestConfig,
    pub diagram: DiagramConfig,
}

impl Settings {
    pub fn resolve(file: FileConfig, flags: Option<&ParseArgs>) -> Self {
        let mut pool = PoolConfig::default();
        if let Some(workers) = file.parse.workers {
            pool.workers = workers;
        }
        if let Some(every) = file.parse.progress_every {
            pool.progress_every = every;
        }
        pool.exclude_dirs = file.parse.exclude_dirs;
        let mut deadline_secs = file.parse.deadline_secs;

        if let Some(flags) = flags {
            if let Some(workers) = flags.workers {
                pool.workers = workers;
            }
            if flags.deadline_secs.is_some() {
                deadline_secs = flags.deadline_secs;
            }
            for dir in &flags.exclude {
                if !pool.exclude_dirs.contains(dir) {
                    pool.exclude_dirs.push(dir.clone());
                }
            }
        }
        pool.workers = pool.workers.max(1);

        let defaults = DigestConfig::default();
        let digest = DigestConfig {
            outline_max_lines: file
                .output
                .outline_max_lines
                .unwrap_or(defaults.outline_max_lines),
            max_items_per_section: file
                .output
                .max_items_per_section
                .unwrap_or(defaults.max_items_per_section),
        };
        let diagram = DiagramConfig {
            max_edges: file
                .output
                .max_diagram_edges
                .unwrap_or(DiagramConfig::default().max_edges),
        };

        Self {
            pool,
            deadline: deadline_secs.map(Duration::from_secs),
            digest,
            diagram,
        }
    }
}
