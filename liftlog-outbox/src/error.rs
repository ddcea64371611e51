//! Error types for the outbox.

use thiserror::Error;

/// Result type for outbox operations.
pub type OutboxResult<T> = Result<T, OutboxError>;

/// Errors that can occur in outbox operations.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// The persistence layer could not be opened or a write could not
    /// commit. Callers must surface this: an action that failed to queue
    /// is lost unless the user is told.
    #[error("outbox storage unavailable: {0}")]
    Storage(String),

    /// A stored record could not be encoded or decoded.
    #[error("outbox serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
