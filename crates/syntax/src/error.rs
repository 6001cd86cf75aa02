use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to set language: {0}")]
    LanguageSetup(String),

    #[error("SyntaxError: {message} at line {line}, column {column}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("RecursionError: nesting deeper than {limit} levels at line {line}, column {column}")]
    TooDeep {
        line: usize,
        column: usize,
        limit: usize,
    },

    #[error("Parser produced no tree")]
    ParserReturnedNone,
}

impl ParseError {
    pub fn unsupported_language(name: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(name.into())
    }

    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}
