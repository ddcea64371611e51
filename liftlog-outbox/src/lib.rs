//! Durable offline outbox for liftlog actions.
//!
//! When the remote endpoint is unreachable, user actions are appended
//! here and redelivered by the background replayer once connectivity
//! returns. The store is an append-only log over SQLite:
//!
//! - `enqueue` appends a record and survives process restarts
//! - `drain` takes a fresh point-in-time snapshot in insertion order
//! - `clear` deletes exactly one drained snapshot, never later arrivals
//!
//! Sequence numbers are assigned by the store from a persisted counter,
//! so insertion order does not depend on any autoincrement behavior of
//! the underlying database and numbers are never reused, even after a
//! clear or a restart.

mod error;
mod store;

pub use error::{OutboxError, OutboxResult};
pub use store::{OutboxSnapshot, OutboxStore};
