//! The in-memory workout session context.
//!
//! A session is an explicit context object created when the user starts a
//! workout and dropped when the workout ends. It is deliberately not
//! `Clone`: one session, one owner, never shared across sessions.

use crate::{ActionPayload, WorkoutId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of workout a session tracks.
///
/// The exercise catalog on the endpoint side is partitioned by this type,
/// so it travels with every logged set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
    Gym,
    Calisthenics,
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutType::Gym => write!(f, "Gym"),
            WorkoutType::Calisthenics => write!(f, "Calisthenics"),
        }
    }
}

/// A live workout session.
///
/// Holds the identity every action of the session refers to. Payload
/// builders on this type are the only way session-scoped actions are
/// created, which keeps the session identity out of global state.
#[derive(Debug)]
pub struct WorkoutSession {
    id: WorkoutId,
    workout_type: WorkoutType,
    started_at: DateTime<Utc>,
}

impl WorkoutSession {
    /// Begins a new session of the given type.
    #[must_use]
    pub fn begin(workout_type: WorkoutType) -> Self {
        Self {
            id: WorkoutId::new(),
            workout_type,
            started_at: Utc::now(),
        }
    }

    /// The session's identifier.
    #[must_use]
    pub fn id(&self) -> WorkoutId {
        self.id
    }

    /// The session's workout type.
    #[must_use]
    pub fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    /// When the session started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Builds the payload for a set logged in this session.
    #[must_use]
    pub fn add_set(&self, exercise: impl Into<String>, weight: f64, reps: u32) -> ActionPayload {
        ActionPayload::AddSet {
            workout_id: self.id,
            workout_type: self.workout_type,
            exercise: exercise.into(),
            weight,
            reps,
        }
    }

    /// Builds the payload that ends this session.
    #[must_use]
    pub fn finish(&self) -> ActionPayload {
        ActionPayload::EndWorkout { workout_id: self.id }
    }
}
