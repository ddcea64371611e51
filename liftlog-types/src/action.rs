//! Action payloads sent to the remote logging endpoint.
//!
//! The endpoint accepts a single POST shape, `{action, data}`, where the
//! action name selects the operation. Payloads are immutable once built;
//! a payload that fails to send is persisted verbatim in the outbox and
//! replayed later without modification.

use crate::{WorkoutId, WorkoutType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequence number assigned to an outbox record by the queue store.
///
/// Monotonically increasing, never reused, even across clears and
/// process restarts.
pub type Seq = u64;

/// A single user action in the wire shape the endpoint expects.
///
/// Serializes as `{"action": "<name>", "data": {...}}` with the exact
/// action names the endpoint dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum ActionPayload {
    /// A set was logged during a workout session.
    #[serde(rename = "addSet", rename_all = "camelCase")]
    AddSet {
        workout_id: WorkoutId,
        workout_type: WorkoutType,
        exercise: String,
        weight: f64,
        reps: u32,
    },

    /// A workout session ended; the endpoint sends the session summary.
    #[serde(rename = "endWorkout", rename_all = "camelCase")]
    EndWorkout { workout_id: WorkoutId },

    /// A bodyweight measurement was recorded.
    #[serde(rename = "addWeight")]
    AddWeight { weight: f64 },
}

impl ActionPayload {
    /// The wire-level action name, for logging and routing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ActionPayload::AddSet { .. } => "addSet",
            ActionPayload::EndWorkout { .. } => "endWorkout",
            ActionPayload::AddWeight { .. } => "addWeight",
        }
    }
}

/// A persisted outbox record awaiting redelivery.
///
/// Records are created by the queue store when a send fails, and are
/// immutable once written: the store only appends new records or deletes
/// a drained snapshot wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedAction {
    /// Store-assigned insertion order. Iteration order equals `seq` ascending.
    pub seq: Seq,
    /// When the record was appended to the outbox.
    pub queued_at: DateTime<Utc>,
    /// The action to redeliver, exactly as originally dispatched.
    pub payload: ActionPayload,
}
