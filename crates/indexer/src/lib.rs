//! # Repograph Indexer
//!
//! Parses a repository into one normalized-tree artifact per source file.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (noisy directories pruned)
//!     │      └─> Source files
//!     │
//!     ├──> Parser Pool (N workers, one parser each)
//!     │      └─> files/<path>.ast.json   (write-then-rename)
//!     │
//!     └──> Collector (single writer)
//!            └─> index.jsonl             (one record per file)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use repograph_indexer::{ParserPool, PoolConfig, RollupIndex};
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> repograph_indexer::Result<()> {
//!     let pool = ParserPool::new(PoolConfig::default());
//!     let report = pool
//!         .run(Path::new("repo"), Path::new("out"), CancellationToken::new())
//!         .await?;
//!     println!("parsed {} files", report.stats.ok);
//!
//!     let files = RollupIndex::load(Path::new("out"))?;
//!     assert_eq!(files.len(), report.records.len());
//!     Ok(())
//! }
//! ```

mod artifact;
mod error;
mod pool;
mod rollup;
mod scanner;
mod stats;

pub use artifact::{Artifact, ArtifactStore, INDEX_FILE_NAME};
pub use error::{IndexerError, Result};
pub use pool::{cancel_after, ParserPool, PoolConfig, PoolReport};
pub use rollup::{ParseRecord, RollupIndex};
pub use scanner::{FileScanner, DEFAULT_EXCLUDED_DIRS};
pub use stats::ParseStats;
