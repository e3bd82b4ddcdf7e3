//! Error types for the det-eval library.

use thiserror::Error;

/// Result type for det-eval operations.
pub type Result<T> = std::result::Result<T, DetEvalError>;

/// Error types that can occur during detection evaluation.
#[derive(Error, Debug)]
pub enum DetEvalError {
    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error during JSON serialization of results.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed annotation record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid confidence or IoU threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Empty class map or dataset provided.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
}
