//! Core type definitions for liftlog.
//!
//! This crate defines the fundamental types shared by the offline core:
//! - Workout identifiers (UUID v7)
//! - The wire-level action payloads sent to the remote logging endpoint
//! - Queued outbox records
//! - The in-memory workout session context
//! - The hydration shapes returned by the endpoint's read side
//!
//! Everything UI-facing (screens, forms, charts) lives outside the core
//! and consumes these types.

mod action;
mod hydration;
mod ids;
mod session;

pub use action::{ActionPayload, QueuedAction, Seq};
pub use hydration::{BodyweightLog, Exercise, SetLog, TrainingData};
pub use ids::WorkoutId;
pub use session::{WorkoutSession, WorkoutType};
