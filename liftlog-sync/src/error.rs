//! Error types for the sync layer.

use liftlog_outbox::OutboxError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
///
/// The variants drive the dispatcher's recovery policy: transport
/// failures are recovered locally by queueing, everything else is
/// surfaced to the caller and never retried.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No response from the endpoint: network error, refused connection,
    /// or timeout. The only variant the dispatcher queues for replay.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint answered and declined the action. Never queued;
    /// a logical rejection does not change on retry.
    #[error("action rejected by endpoint: {0}")]
    Rejected(String),

    /// The endpoint answered with a body the client cannot interpret.
    #[error("unrecognized endpoint response: {0}")]
    Protocol(String),

    /// The local outbox is inaccessible. Surfaced as a data-loss risk,
    /// never swallowed.
    #[error(transparent)]
    Storage(#[from] OutboxError),

    /// The background replay worker is not running, so queued records
    /// would sit unobserved. Surfaced so the caller can warn the user
    /// instead of silently relying on a replay that will never fire.
    #[error("background sync unavailable")]
    SchedulerUnavailable,
}
