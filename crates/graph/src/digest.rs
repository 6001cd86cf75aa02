use crate::error::Result;
use crate::export::GraphExport;
use crate::symbols::{Abstraction, CallSite, FileSymbols, ImportRecord};
use crate::types::DependencyGraph;
use repograph_syntax::{render_outline, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DIGEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Outline lines kept per file; 0 leaves outlines out
    pub outline_max_lines: usize,
    /// Cap on each of the abstraction, import and call lists
    pub max_items_per_section: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            outline_max_lines: 40,
            max_items_per_section: 50,
        }
    }
}

/// Per-file slice of the digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDigest {
    pub path: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub abstractions: Vec<Abstraction>,
    pub imports: Vec<ImportRecord>,
    pub calls: Vec<CallSite>,
    /// Items dropped by the per-section cap
    #[serde(default, skip_serializing_if = "is_zero")]
    pub omitted: usize,
    /// Files this one imports from, per the graph
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
}

/// Everything handed to a narrator: the graph and the per-file lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationDigest {
    pub version: u32,
    /// FNV-1a of the rendered prompt; equal digests render equal prompts
    pub fingerprint: u64,
    pub graph: GraphExport,
    pub files: Vec<FileDigest>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Assemble the digest. Files come out ordered by path.
#[must_use]
pub fn build_digest(
    graph: &DependencyGraph,
    symbols: &[FileSymbols],
    sources: &[SourceFile],
    config: DigestConfig,
) -> NarrationDigest {
    let roots: HashMap<&str, &SourceFile> = sources.iter().map(|s| (s.path(), s)).collect();

    let mut files: Vec<FileDigest> = symbols
        .iter()
        .map(|file| {
            let outline = (config.outline_max_lines > 0)
                .then(|| roots.get(file.path.as_str()).and_then(|s| s.root()))
                .flatten()
                .map(|root| render_outline(root, config.outline_max_lines));
            let depends_on = graph
                .file_dependencies(&file.path)
                .map(|deps| deps.into_iter().map(str::to_string).collect())
                .unwrap_or_default();

            let cap = config.max_items_per_section;
            let mut omitted = 0;
            let abstractions = capped(&file.abstractions, cap, &mut omitted);
            let imports = capped(&file.imports, cap, &mut omitted);
            let calls = capped(&file.calls, cap, &mut omitted);

            FileDigest {
                path: file.path.clone(),
                ok: file.ok,
                error: file.error.clone(),
                abstractions,
                imports,
                calls,
                omitted,
                depends_on,
                outline,
            }
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut digest = NarrationDigest {
        version: DIGEST_VERSION,
        fingerprint: 0,
        graph: graph.export(),
        files,
    };
    digest.fingerprint = fnv1a64(digest.render_prompt().as_bytes());
    digest
}

fn capped<T: Clone>(items: &[T], cap: usize, omitted: &mut usize) -> Vec<T> {
    let keep = items.len().min(cap);
    *omitted += items.len() - keep;
    items[..keep].to_vec()
}

impl NarrationDigest {
    /// Plain-text listing of the repository for a narrator.
    #[must_use]
    pub fn render_prompt(&self) -> String {
        let mut out = String::from("You are analyzing a codebase. Here are the abstractions:\n");
        let stats = &self.graph.stats;
        out.push_str(&format!(
            "({} files, {} failed to parse; graph has {} nodes and {} edges)\n",
            stats.files, stats.failed_files, stats.nodes, stats.edges
        ));

        for file in &self.files {
            out.push_str(&format!("\nFile: {}\n", file.path));
            if let Some(error) = &file.error {
                out.push_str(&format!("  (not parsed: {error})\n"));
                continue;
            }
            for abstraction in &file.abstractions {
                out.push_str(&format!("  - {}: {}\n", abstraction.kind.label(), abstraction.name));
            }
            if !file.depends_on.is_empty() {
                out.push_str(&format!("  Imports from: {}\n", file.depends_on.join(", ")));
            }
            if file.omitted > 0 {
                out.push_str(&format!("  ({} more items omitted)\n", file.omitted));
            }
            if let Some(outline) = &file.outline {
                out.push_str("  Outline:\n");
                for line in outline.lines() {
                    out.push_str(&format!("    {line}\n"));
                }
            }
        }

        out.push_str("\nIdentify the core abstractions, architectural patterns, and relationships.\n");
        out
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 14_695_981_039_346_656_037;
    const PRIME: u64 = 1_099_511_628_211;
    let mut hash = OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
