//! # Repograph Syntax
//!
//! Parses source files with tree-sitter and turns the grammar-specific tree
//! into a generic [`Node`] tree: a type tag, an ordered field map and a span.
//!
//! ```text
//! source bytes
//!     │
//!     ├──> SourceParser (one per worker)
//!     │      └─ tree-sitter Tree
//!     │
//!     └──> normalize_tree
//!            └─ Node { type, fields, span }
//! ```
//!
//! ## Example
//!
//! ```
//! use repograph_syntax::{Language, SourceParser};
//!
//! let mut parser = SourceParser::new(Language::Python).unwrap();
//! let file = parser.parse_file("hello.py", "def hello():\n    return 1\n");
//! assert!(file.is_ok());
//! assert_eq!(file.root().unwrap().kind, "module");
//! ```

mod error;
mod language;
mod node;
mod normalize;
mod outline;
mod parser;
mod source_file;

pub use error::{ParseError, Result};
pub use language::{Language, NodeKinds};
pub use node::{Node, PreOrder, Span, Value, CHILDREN_FIELD, TEXT_FIELD, VALUE_FIELD};
pub use normalize::{normalize_tree, MAX_TREE_DEPTH};
pub use outline::render_outline;
pub use parser::SourceParser;
pub use source_file::{relative_path, SourceFile};
