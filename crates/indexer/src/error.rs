use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parser error: {0}")]
    ParserError(#[from] repograph_syntax::ParseError),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid rollup index line {line}: {message}")]
    InvalidIndexLine { line: usize, message: String },

    #[error("Parse worker failed: {0}")]
    WorkerFailed(String),

    #[error("{0}")]
    Other(String),
}
