use crate::error::{ParseError, Result};
use crate::language::Language;
use crate::node::Node;
use crate::normalize::{first_syntax_error, normalize_tree};
use crate::source_file::SourceFile;
use tree_sitter::Parser;

/// A parser handle owned by exactly one worker.
///
/// Tree-sitter parsers carry mutable state, so each worker builds its own
/// handle instead of sharing one.
pub struct SourceParser {
    language: Language,
    parser: Parser,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        let ts_lang = language.tree_sitter_language()?;
        parser
            .set_language(&ts_lang)
            .map_err(|e| ParseError::LanguageSetup(e.to_string()))?;
        Ok(Self { language, parser })
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Parse and normalize `source`. Any syntax error fails the whole file.
    pub fn parse(&mut self, source: &str) -> Result<Node> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParseError::ParserReturnedNone)?;
        if let Some(err) = first_syntax_error(&tree) {
            return Err(err);
        }
        normalize_tree(&tree, source.as_bytes())
    }

    /// Parse one file's contents into a [`SourceFile`], folding failures into
    /// the record instead of returning them.
    pub fn parse_file(&mut self, rel_path: &str, source: &str) -> SourceFile {
        match self.parse(source) {
            Ok(root) => SourceFile::parsed(rel_path, root),
            Err(err) => {
                log::debug!("{rel_path}: {err}");
                SourceFile::failed(rel_path, err.to_string())
            }
        }
    }
}
