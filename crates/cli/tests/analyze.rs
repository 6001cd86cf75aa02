//! End-to-end runs of the `repograph` binary

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "from b import foo\n\ndef main():\n    foo()\n");
    write(dir.path(), "b.py", "class Base:\n    pass\n\ndef foo():\n    return 1\n");
    write(dir.path(), "broken.py", "def nope(:\n");
    dir
}

fn repograph() -> Command {
    let mut cmd = Command::cargo_bin("repograph").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

#[test]
fn analyze_writes_artifacts_graph_and_views() {
    let repo = sample_repo();
    let out = TempDir::new().unwrap();
    let mermaid = out.path().join("views/deps.mmd");
    let digest = out.path().join("views/digest.json");

    let output = repograph()
        .arg("analyze")
        .arg(repo.path())
        .arg("--output")
        .arg(out.path())
        .arg("--workers")
        .arg("2")
        .arg("--mermaid")
        .arg(&mermaid)
        .arg("--digest")
        .arg(&digest)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["parse"]["ok"], 2);
    assert_eq!(summary["parse"]["failed"], 1);
    assert_eq!(summary["graph"]["files"], 3);
    assert_eq!(summary["graph"]["failedFiles"], 1);
    assert_eq!(summary["graph"]["resolvedCalls"], 1);

    assert!(out.path().join("index.jsonl").exists());
    assert!(out.path().join("files/a.py.ast.json").exists());

    let graph: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("graph.json")).unwrap()).unwrap();
    let edges = graph["edges"].as_array().unwrap();
    assert!(edges.iter().any(|e| e["source"] == "IMPORT:a.py:foo"
        && e["target"] == "FUNCTION:b.py:foo"
        && e["type"] == "references"));

    assert!(fs::read_to_string(&mermaid).unwrap().starts_with("graph LR\n"));
    let digest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&digest).unwrap()).unwrap();
    assert_eq!(digest["files"].as_array().unwrap().len(), 3);
}

#[test]
fn graph_reuses_a_previous_parse() {
    let repo = sample_repo();
    let out = TempDir::new().unwrap();

    repograph()
        .arg("parse")
        .arg(repo.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    let output = repograph()
        .arg("graph")
        .arg("-o")
        .arg(out.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("Graph: "), "unexpected summary: {text}");
    assert!(out.path().join("graph.json").exists());
}

#[test]
fn missing_root_fails() {
    let out = TempDir::new().unwrap();
    repograph()
        .arg("parse")
        .arg(out.path().join("absent"))
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure();
}

#[test]
fn graph_without_a_parse_fails() {
    let out = TempDir::new().unwrap();
    repograph()
        .arg("graph")
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure();
    assert!(!out.path().join("graph.json").exists());
}

#[test]
fn parse_failures_do_not_fail_the_run() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "only.py", "class (:\n");
    let out = TempDir::new().unwrap();

    repograph()
        .arg("analyze")
        .arg(repo.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();
}
