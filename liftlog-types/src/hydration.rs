//! Read-side hydration shapes.
//!
//! A GET on the endpoint's base URL returns the full training history in
//! one document: the exercise catalog, every logged set, and bodyweight
//! measurements. The cache layer stores this response opaquely; these
//! types exist so consumers can decode a cached or live copy.
//!
//! Timestamps stay as strings. The endpoint is a spreadsheet-backed
//! service and its date formatting is not guaranteed stable, so parsing
//! is left to the consumer.

use crate::WorkoutType;
use serde::{Deserialize, Serialize};

/// The full hydration document returned by a read of the base URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub logs: Vec<SetLog>,
    #[serde(default)]
    pub bodyweight: Vec<BodyweightLog>,
}

/// An entry in the exercise catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub workout_type: WorkoutType,
}

/// One historical logged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "WorkoutId", default)]
    pub workout_id: Option<String>,
    #[serde(rename = "Exercise")]
    pub exercise: String,
    #[serde(rename = "Weight")]
    pub weight: f64,
    #[serde(rename = "Reps")]
    pub reps: u32,
}

/// One historical bodyweight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyweightLog {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Weight")]
    pub weight: f64,
}
