//! Error types for store operations

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur against the shared store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed input: missing/empty command, unparsable config value
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate job id on enqueue
    #[error("conflict: {0}")]
    Conflict(String),

    /// Referenced job/worker/config key does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The database rejected or failed the operation
    #[error("store error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True for errors caused by the caller's input rather than the store
    /// itself; the CLI reports these distinctly from store failures.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::Conflict(_) | StoreError::NotFound(_)
        )
    }
}
