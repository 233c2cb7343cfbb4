use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid source id: {0}")]
    InvalidSourceId(String),

    #[error("expected a JSON object at the top level, got {0}")]
    NotADocument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for type-level results.
pub type TypeResult<T> = Result<T, TypeError>;
