//! End-to-end behaviour of the parse pool on scratch repositories

use pretty_assertions::assert_eq;
use repograph_indexer::{
    ArtifactStore, IndexerError, ParseRecord, ParserPool, PoolConfig, RollupIndex,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "from b import foo\n\ndef main():\n    foo()\n");
    write(dir.path(), "b.py", "def foo():\n    return 1\n");
    write(dir.path(), "pkg/c.py", "class C:\n    def m(self):\n        pass\n");
    write(dir.path(), "broken.py", "def nope(:\n");
    write(dir.path(), ".venv/lib/ignored.py", "x = 1\n");
    write(dir.path(), "notes.txt", "not python");
    dir
}

fn pool(workers: usize) -> ParserPool {
    ParserPool::new(PoolConfig {
        workers,
        ..PoolConfig::default()
    })
}

fn by_path(records: &[ParseRecord]) -> BTreeMap<String, ParseRecord> {
    records.iter().map(|r| (r.path.clone(), r.clone())).collect()
}

#[tokio::test]
async fn pool_records_every_file_and_survives_failures() {
    let repo = sample_repo();
    let out = TempDir::new().unwrap();

    let report = pool(4)
        .run(repo.path(), out.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stats.discovered, 4);
    assert_eq!(report.stats.ok, 3);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.skipped, 0);
    assert!(!report.stats.cancelled);
    assert!(report.stats.total_nodes > 0);

    let records = by_path(&report.records);
    let paths: Vec<&str> = records.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["a.py", "b.py", "broken.py", "pkg/c.py"]);

    let broken = &records["broken.py"];
    assert!(!broken.ok);
    assert!(broken.error.as_deref().unwrap().starts_with("SyntaxError"));
    assert!(broken.artifact_location.is_none());
    assert!(!out.path().join("files/broken.py.ast.json").exists());

    let c = &records["pkg/c.py"];
    assert_eq!(c.artifact_location.as_deref(), Some("files/pkg/c.py.ast.json"));
    assert!(out.path().join("files/pkg/c.py.ast.json").exists());

    let index = fs::read_to_string(&report.index_path).unwrap();
    assert_eq!(index.lines().count(), 4);

    let files = RollupIndex::load(out.path()).unwrap();
    assert_eq!(files.len(), 4);
    for file in &files {
        let record = &records[file.path()];
        assert_eq!(file.is_ok(), record.ok);
        assert_eq!(file.node_count(), record.node_count);
    }
}

#[tokio::test]
async fn worker_count_does_not_change_artifacts() {
    let repo = sample_repo();
    let sequential = TempDir::new().unwrap();
    let parallel = TempDir::new().unwrap();

    let one = pool(1)
        .run(repo.path(), sequential.path(), CancellationToken::new())
        .await
        .unwrap();
    let many = pool(8)
        .run(repo.path(), parallel.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(by_path(&one.records), by_path(&many.records));
    for record in one.records.iter().filter(|r| r.ok) {
        let location = record.artifact_location.as_deref().unwrap();
        let a = fs::read(sequential.path().join(location)).unwrap();
        let b = fs::read(parallel.path().join(location)).unwrap();
        assert_eq!(a, b, "artifact bytes differ for {}", record.path);
    }
}

#[tokio::test]
async fn cancelled_runs_stop_taking_work() {
    let repo = sample_repo();
    let out = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = pool(2).run(repo.path(), out.path(), cancel).await.unwrap();

    assert!(report.stats.cancelled);
    assert_eq!(report.stats.attempted, 0);
    assert_eq!(report.stats.skipped, 4);
    assert!(RollupIndex::load(out.path()).unwrap().is_empty());
}

#[tokio::test]
async fn cancelling_mid_run_keeps_finished_files() {
    let repo = sample_repo();
    let out = TempDir::new().unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let report = pool(1)
        .with_observer(move |_| trigger.cancel())
        .run(repo.path(), out.path(), cancel)
        .await
        .unwrap();

    assert!(report.stats.cancelled);
    assert_eq!(report.stats.attempted, 1);
    assert_eq!(report.stats.skipped, 3);
    assert_eq!(report.records.len(), 1);

    let done = &report.records[0];
    assert_eq!(done.path, "a.py");
    assert!(done.ok);
    let store = ArtifactStore::new(out.path());
    let artifact = store
        .read(done.artifact_location.as_deref().unwrap())
        .unwrap();
    assert_eq!(artifact.path, "a.py");
    assert_eq!(Some(artifact.node_count), done.node_count);
    assert!(!out.path().join("files/b.py.ast.json").exists());

    let files = RollupIndex::load(out.path()).unwrap();
    let loaded: Vec<(&str, bool)> = files.iter().map(|f| (f.path(), f.is_ok())).collect();
    let reported: Vec<(&str, bool)> = report
        .records
        .iter()
        .map(|r| (r.path.as_str(), r.ok))
        .collect();
    assert_eq!(loaded, reported);
}

#[tokio::test]
async fn deeply_nested_files_fail_alone() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(repo.path(), "ok.py", "def fine():\n    return 1\n");
    let depth = 20_000;
    write(
        repo.path(),
        "deep.py",
        &format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth)),
    );

    let report = pool(2)
        .run(repo.path(), out.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stats.ok, 1);
    assert_eq!(report.stats.failed, 1);
    let records = by_path(&report.records);
    assert!(records["ok.py"].ok);
    let deep = &records["deep.py"];
    assert!(deep.error.as_deref().unwrap().starts_with("RecursionError"));
    assert!(!out.path().join("files/deep.py.ast.json").exists());

    let files = RollupIndex::load(out.path()).unwrap();
    assert_eq!(files.iter().filter(|f| f.is_ok()).count(), 1);
}

#[tokio::test]
async fn files_that_stop_parsing_lose_their_artifact() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(repo.path(), "mod.py", "def ok():\n    pass\n");

    pool(1)
        .run(repo.path(), out.path(), CancellationToken::new())
        .await
        .unwrap();
    assert!(out.path().join("files/mod.py.ast.json").exists());

    write(repo.path(), "mod.py", "def ok(:\n");
    let report = pool(1)
        .run(repo.path(), out.path(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.stats.failed, 1);
    assert!(!out.path().join("files/mod.py.ast.json").exists());
}

#[tokio::test]
async fn empty_repositories_produce_an_empty_index() {
    let repo = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let report = pool(4)
        .run(repo.path(), out.path(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.stats.discovered, 0);
    assert!(report.records.is_empty());
    assert_eq!(fs::read_to_string(&report.index_path).unwrap(), "");
}

#[tokio::test]
async fn missing_roots_are_rejected() {
    let out = TempDir::new().unwrap();
    let missing = out.path().join("does-not-exist");
    let err = pool(1)
        .run(&missing, out.path(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::InvalidPath(_)));
}
