use thiserror::Error;

pub type Result<T> = std::result::Result<T, PathError>;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("path rejected by traversal policy: {0}")]
    TraversalRejected(String),

    #[error("resolved file escapes its base directory: {0}")]
    EscapesBase(String),

    #[error("no candidate base resolves: {0}")]
    NotResolved(String),
}
