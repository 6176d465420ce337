use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ExerciseKind, MuscleGroup};

/// A catalog exercise. Immutable as far as aggregation is concerned;
/// `mn_name` carries the localized display name alongside the English one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub mn_name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ExerciseKind>,
}

/// A logged training session: one user, one timestamp, an ordered
/// collection of sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub completed: bool,
    pub sets: Vec<WorkoutSet>,
}

/// One set within a workout. The exercise reference may be unresolved
/// (the exercise was deleted after logging); such sets still count toward
/// workout-level totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub id: String,
    pub reps: i64,
    pub weight: f64,
    pub rpe: Option<f64>,
    pub completed: bool,
    pub order_index: i64,
    pub exercise: Option<Exercise>,
}

impl WorkoutSet {
    /// Training volume of this set, the load proxy used for records.
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }
}
