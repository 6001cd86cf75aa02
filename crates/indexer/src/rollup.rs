use crate::artifact::ArtifactStore;
use crate::error::{IndexerError, Result};
use repograph_syntax::SourceFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One line of the rollup index: the outcome of parsing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRecord {
    pub path: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
}

impl ParseRecord {
    pub fn parsed(path: impl Into<String>, artifact_location: String, node_count: usize) -> Self {
        Self {
            path: path.into(),
            ok: true,
            error: None,
            artifact_location: Some(artifact_location),
            node_count: Some(node_count),
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ok: false,
            error: Some(error.into()),
            artifact_location: None,
            node_count: None,
        }
    }
}

/// Line-delimited index connecting file paths to parse outcomes.
pub struct RollupIndex;

impl RollupIndex {
    /// Write all records, in the order given, as one JSON object per line.
    pub fn write(store: &ArtifactStore, records: &[ParseRecord]) -> Result<()> {
        let mut out = Vec::new();
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.push(b'\n');
        }
        ArtifactStore::publish(&store.index_path(), &out)
    }

    /// Read the raw records of an index.
    pub fn read(store: &ArtifactStore) -> Result<Vec<ParseRecord>> {
        let index_path = store.index_path();
        let content = std::fs::read_to_string(&index_path).map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", index_path.display()))
        })?;

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: ParseRecord =
                serde_json::from_str(line).map_err(|e| IndexerError::InvalidIndexLine {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Rebuild every [`SourceFile`] from an output directory.
    ///
    /// An artifact that is missing or unreadable turns its file into a
    /// failed one; a malformed index is an error.
    pub fn load(output_dir: &Path) -> Result<Vec<SourceFile>> {
        let store = ArtifactStore::new(output_dir);
        let records = Self::read(&store)?;
        let files: Vec<SourceFile> = records
            .into_iter()
            .map(|record| Self::restore(&store, record))
            .collect();
        log::info!(
            "Loaded {} files from {} ({} parsed)",
            files.len(),
            store.index_path().display(),
            files.iter().filter(|f| f.is_ok()).count()
        );
        Ok(files)
    }

    fn restore(store: &ArtifactStore, record: ParseRecord) -> SourceFile {
        if !record.ok {
            let error = record
                .error
                .unwrap_or_else(|| "Error: parse failed".to_string());
            return SourceFile::failed(record.path, error);
        }

        let Some(location) = record.artifact_location else {
            log::warn!("{}: index marks file ok but has no artifact", record.path);
            return SourceFile::failed(record.path, "Error: artifact location missing");
        };

        match store.read(&location) {
            Ok(artifact) if artifact.path == record.path => {
                SourceFile::parsed(record.path, artifact.root)
            }
            Ok(artifact) => {
                log::warn!(
                    "{}: artifact {location} belongs to {}",
                    record.path,
                    artifact.path
                );
                SourceFile::failed(
                    record.path,
                    format!("Error: artifact {location} belongs to {}", artifact.path),
                )
            }
            Err(err) => {
                log::warn!("{}: unreadable artifact {location}: {err}", record.path);
                SourceFile::failed(
                    record.path,
                    format!("Error: unreadable artifact {location}: {err}"),
                )
            }
        }
    }
}
