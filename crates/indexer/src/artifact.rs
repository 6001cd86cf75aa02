use crate::error::{IndexerError, Result};
use repograph_syntax::{Language, Node, MAX_TREE_DEPTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILE_NAME: &str = "index.jsonl";
const FILES_DIR: &str = "files";
const ARTIFACT_SUFFIX: &str = ".ast.json";

/// JSON nesting an artifact of a [`MAX_TREE_DEPTH`] tree can reach: node,
/// field map and list per level, plus the wrapper and a leaf span.
const MAX_JSON_DEPTH: usize = 3 * MAX_TREE_DEPTH + 4;

/// Persisted normalized tree of one source file. Self-contained: the tree can
/// be rebuilt from this record alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: String,
    pub language: Language,
    pub node_count: usize,
    pub root: Node,
}

/// Layout of an output directory: `index.jsonl` plus
/// `files/<relative path>.ast.json` per parsed file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(INDEX_FILE_NAME)
    }

    /// Location recorded in the rollup index, relative to the output directory.
    #[must_use]
    pub fn location_for(rel_path: &str) -> String {
        format!("{FILES_DIR}/{rel_path}{ARTIFACT_SUFFIX}")
    }

    #[must_use]
    pub fn resolve(&self, location: &str) -> PathBuf {
        self.output_dir.join(location)
    }

    /// Write the artifact for `rel_path`. The bytes land in a temporary file
    /// first and are renamed into place, so a reader never sees a partial
    /// artifact under the final name.
    pub fn write(&self, rel_path: &str, language: Language, root: &Node) -> Result<String> {
        let location = Self::location_for(rel_path);
        let path = self.resolve(&location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let artifact = ArtifactRef {
            path: rel_path,
            language,
            node_count: root.count_nodes(),
            root,
        };
        let bytes = serde_json::to_vec(&artifact)?;

        let tmp = tmp_path(&path);
        if let Err(err) = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(location)
    }

    pub fn read(&self, location: &str) -> Result<Artifact> {
        let bytes = fs::read(self.resolve(location))?;
        if let Some(depth) = nesting_past(&bytes, MAX_JSON_DEPTH) {
            return Err(IndexerError::Other(format!(
                "artifact nests deeper than {depth} levels"
            )));
        }
        let mut de = serde_json::Deserializer::from_slice(&bytes);
        de.disable_recursion_limit();
        let artifact = Artifact::deserialize(&mut de)?;
        de.end()?;
        Ok(artifact)
    }

    /// Drop an artifact left by an earlier run for a file that no longer
    /// parses. Missing files are fine.
    pub fn remove_stale(&self, rel_path: &str) -> Result<()> {
        let path = self.resolve(&Self::location_for(rel_path));
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed stale artifact {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(IndexerError::IoError(err)),
        }
    }

    /// Replace the file at `path` with `contents` via write-then-rename.
    pub(crate) fn publish(path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = tmp_path(path);
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Borrowing twin of [`Artifact`] so writing does not clone the tree.
#[derive(Serialize)]
struct ArtifactRef<'a> {
    path: &'a str,
    language: Language,
    node_count: usize,
    root: &'a Node,
}

/// Scan `bytes` as JSON and return the depth once nesting passes `limit`.
fn nesting_past(bytes: &[u8], limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Some(depth);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
