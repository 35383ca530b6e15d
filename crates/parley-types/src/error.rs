use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
