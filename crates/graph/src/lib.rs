//! # Repograph Graph
//!
//! Cross-file dependency graph over normalized syntax trees.
//!
//! ## Architecture
//!
//! ```text
//! SourceFile[]
//!     │
//!     ├──> Extractor (one pre-order walk per file)
//!     │      ├─ classes and functions
//!     │      ├─ import and from-import statements
//!     │      └─ call sites
//!     │
//!     ├──> Graph Builder (petgraph)
//!     │      ├─ FILE ─contains─> CLASS / FUNCTION
//!     │      ├─ FILE ─imports_from─> FILE, FILE ─directly_imports─> IMPORT ─references─> abstraction
//!     │      ├─ FILE ─contains_call─> CALL ─calls─> abstraction
//!     │      └─ CLASS ─inherits─> CLASS
//!     │
//!     └──> Consumers
//!            ├─ JSON export
//!            ├─ narration digest
//!            └─ Mermaid diagram
//! ```
//!
//! Resolution is by name only: a module matches a file by stem or path
//! suffix, a call matches the first local then imported abstraction of that
//! name. Misses leave edges out; they are never errors.

mod builder;
mod diagram;
mod digest;
mod error;
mod export;
mod extract;
mod graph;
mod resolve;
mod symbols;
mod types;

pub use builder::{
    abstraction_node_id, call_node_id, file_node_id, import_node_id, GraphBuilder,
};
pub use diagram::{render_mermaid, DiagramConfig};
pub use digest::{build_digest, DigestConfig, FileDigest, NarrationDigest, DIGEST_VERSION};
pub use error::{GraphError, Result};
pub use export::{ExportEdge, ExportNode, GraphExport};
pub use extract::Extractor;
pub use resolve::{call_candidates, last_segment, lookup, ModuleResolver, SymbolEntry};
pub use symbols::{
    Abstraction, AbstractionKind, CallSite, CallTarget, FileSymbols, ImportKind, ImportRecord,
    COMPLEX_EXPR, UNKNOWN_NAME,
};
pub use types::{
    DependencyGraph, GraphEdge, GraphNode, GraphStats, NodeData, NodeKind, RelationshipType,
};

pub use petgraph::graph::NodeIndex;
pub use petgraph::Direction;
