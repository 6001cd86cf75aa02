use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Language error: {0}")]
    Language(#[from] repograph_syntax::ParseError),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Graph build error: {0}")]
    BuildError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
