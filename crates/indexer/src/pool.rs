use crate::artifact::ArtifactStore;
use crate::error::{IndexerError, Result};
use crate::rollup::{ParseRecord, RollupIndex};
use crate::scanner::FileScanner;
use crate::stats::ParseStats;
use repograph_syntax::{relative_path, Language, SourceParser};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of parse workers. Never affects the artifacts produced.
    pub workers: usize,
    pub language: Language,
    /// Directory names excluded in addition to the scanner defaults
    pub exclude_dirs: Vec<String>,
    /// Log progress every N completed files (0 disables)
    pub progress_every: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get),
            language: Language::Python,
            exclude_dirs: Vec::new(),
            progress_every: 25,
        }
    }
}

/// Result of one pool run
#[derive(Debug, Clone)]
pub struct PoolReport {
    /// Records in completion order
    pub records: Vec<ParseRecord>,
    pub stats: ParseStats,
    pub index_path: PathBuf,
}

/// Parses every source file of a repository on a fixed set of workers.
///
/// Workers pull paths from a shared queue, each with its own parser, write
/// their artifact and send a [`ParseRecord`] back. A single collector
/// gathers the records and writes the rollup index once all workers stop.
pub struct ParserPool {
    config: PoolConfig,
    observer: Option<RecordObserver>,
}

type WorkQueue = Arc<Mutex<VecDeque<PathBuf>>>;
type RecordObserver = Arc<dyn Fn(&ParseRecord) + Send + Sync>;

impl ParserPool {
    #[must_use]
    pub const fn new(config: PoolConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Call `observer` on the worker thread after each file, before that
    /// worker takes its next one.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&ParseRecord) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Parse the repository at `root` into `output_dir`.
    ///
    /// Cancelling `cancel` lets in-flight files finish and stops workers from
    /// taking new ones; the index then lists only the files that completed.
    pub async fn run(
        &self,
        root: &Path,
        output_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<PoolReport> {
        let started = Instant::now();

        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Path does not exist or is not a directory: {}",
                root.display()
            )));
        }

        let files = FileScanner::new(root)
            .with_language(self.config.language)
            .with_excluded_dirs(self.config.exclude_dirs.iter().cloned())
            .scan();
        let discovered = files.len();
        log::info!("Found {discovered} {} files under {}", self.config.language, root.display());

        tokio::fs::create_dir_all(output_dir).await?;
        let store = ArtifactStore::new(output_dir);

        let worker_count = self.config.workers.clamp(1, discovered.max(1));
        let queue: WorkQueue = Arc::new(Mutex::new(files.into_iter().collect()));
        let (tx, mut rx) = mpsc::unbounded_channel::<ParseRecord>();

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = Worker {
                id: worker_id,
                language: self.config.language,
                root: root.to_path_buf(),
                store: store.clone(),
                queue: Arc::clone(&queue),
                results: tx.clone(),
                cancel: cancel.clone(),
                observer: self.observer.clone(),
            };
            handles.push(tokio::task::spawn_blocking(move || worker.run()));
        }
        drop(tx);

        let mut records = Vec::with_capacity(discovered);
        while let Some(record) = rx.recv().await {
            if !record.ok {
                log::warn!(
                    "{}: {}",
                    record.path,
                    record.error.as_deref().unwrap_or("parse failed")
                );
            }
            records.push(record);
            let done = records.len();
            if self.config.progress_every > 0
                && (done % self.config.progress_every == 0 || done == discovered)
            {
                log::info!("Parsed {done}/{discovered} files");
            }
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| IndexerError::WorkerFailed(e.to_string()))??;
        }

        RollupIndex::write(&store, &records)?;

        let mut stats = ParseStats::from_records(discovered, &records);
        stats.cancelled = cancel.is_cancelled();
        stats.time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if stats.cancelled {
            log::warn!(
                "Parse run cancelled: {} of {discovered} files skipped",
                stats.skipped
            );
        }
        log::info!(
            "Parse completed: ok={}, failed={}, nodes={}, {}ms",
            stats.ok,
            stats.failed,
            stats.total_nodes,
            stats.time_ms
        );

        Ok(PoolReport {
            records,
            stats,
            index_path: store.index_path(),
        })
    }
}

/// Cancel `token` once `deadline` elapses, unless it is cancelled first.
pub fn cancel_after(token: CancellationToken, deadline: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(deadline) => {
                log::warn!("Parse deadline of {}s reached; cancelling", deadline.as_secs());
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    })
}

struct Worker {
    id: usize,
    language: Language,
    root: PathBuf,
    store: ArtifactStore,
    queue: WorkQueue,
    results: mpsc::UnboundedSender<ParseRecord>,
    cancel: CancellationToken,
    observer: Option<RecordObserver>,
}

impl Worker {
    fn run(self) -> Result<usize> {
        let mut parser = SourceParser::new(self.language)?;
        let mut processed = 0;

        loop {
            if self.cancel.is_cancelled() {
                log::debug!("Worker {} stopping on cancellation", self.id);
                break;
            }
            let Some(path) = self.next_file() else {
                break;
            };

            let rel = relative_path(&self.root, &path);
            let record = match catch_unwind(AssertUnwindSafe(|| {
                self.process(&mut parser, &path, &rel)
            })) {
                Ok(record) => record,
                Err(_) => {
                    // The parser may be left mid-parse; start over with a fresh one.
                    parser = SourceParser::new(self.language)?;
                    self.discard_stale(&rel);
                    ParseRecord::failed(rel, "Error: Panic: parser aborted on this file")
                }
            };

            processed += 1;
            if let Some(observe) = &self.observer {
                observe(&record);
            }
            if self.results.send(record).is_err() {
                break;
            }
        }

        Ok(processed)
    }

    fn next_file(&self) -> Option<PathBuf> {
        match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }

    fn process(&self, parser: &mut SourceParser, path: &Path, rel: &str) -> ParseRecord {
        let source = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                self.discard_stale(rel);
                return ParseRecord::failed(rel, format!("Error: {:?}: {err}", err.kind()));
            }
        };

        let file = parser.parse_file(rel, &source);
        let Some(root) = file.root() else {
            self.discard_stale(rel);
            return ParseRecord::failed(rel, file.error().unwrap_or("Error: parse failed"));
        };

        match self.store.write(rel, parser.language(), root) {
            Ok(location) => ParseRecord::parsed(rel, location, file.node_count().unwrap_or(1)),
            Err(err) => ParseRecord::failed(rel, format!("Error: failed to write artifact: {err}")),
        }
    }

    fn discard_stale(&self, rel: &str) {
        if let Err(err) = self.store.remove_stale(rel) {
            log::warn!("{rel}: could not remove stale artifact: {err}");
        }
    }
}
