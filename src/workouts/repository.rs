//! Persistence contracts for workouts, sets and the exercise catalog.
//!
//! `storage::Database` implements them on SQLite and `storage::MemoryStore`
//! keeps everything in process for tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::database::DatabaseError;
use crate::workouts::exercise::Exercise;
use crate::workouts::types::{Workout, WorkoutSet};

/// Best estimated 1RM achieved for an exercise on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProgressionPoint {
    /// Day the exercise was performed
    pub date: NaiveDate,
    /// Highest estimated 1RM among that day's sets
    pub max_1rm: f64,
}

/// Workout persistence.
pub trait WorkoutRepository {
    /// Insert a new workout.
    ///
    /// A second workout for the same (user, date) fails with
    /// `DatabaseError::ConstraintViolation`.
    fn insert_workout(&self, workout: &Workout) -> Result<(), DatabaseError>;

    /// Get a workout by ID.
    fn get_workout(&self, id: Uuid) -> Result<Option<Workout>, DatabaseError>;

    /// All workouts of a user, newest date first.
    fn list_workouts_by_user(&self, user_id: Uuid) -> Result<Vec<Workout>, DatabaseError>;

    /// Workouts of a user with `start <= date <= end`, newest date first.
    fn list_workouts_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Workout>, DatabaseError>;

    /// The workout a user recorded on a given day, if any.
    fn get_workout_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Workout>, DatabaseError>;

    /// Persist score, memo and update timestamp of an existing workout.
    fn update_workout(&self, workout: &Workout) -> Result<(), DatabaseError>;

    /// Delete a workout by ID.
    fn delete_workout(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// Check whether a user already has a workout on a given day.
    fn workout_exists_on(&self, user_id: Uuid, date: NaiveDate) -> Result<bool, DatabaseError> {
        Ok(self.get_workout_by_date(user_id, date)?.is_some())
    }
}

/// Workout set persistence and set aggregates.
pub trait WorkoutSetRepository {
    /// Insert a new set. The owning workout and exercise must exist.
    fn insert_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError>;

    /// Get a set by ID.
    fn get_set(&self, id: Uuid) -> Result<Option<WorkoutSet>, DatabaseError>;

    /// Sets of a workout ordered by exercise, then set number.
    fn list_sets_by_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError>;

    /// Sets of one exercise within a workout ordered by set number.
    fn list_sets_by_workout_and_exercise(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WorkoutSet>, DatabaseError>;

    /// Sets of one exercise across all workouts, newest first.
    fn list_sets_by_exercise(&self, exercise_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError>;

    /// Persist reps, weight, 1RM, duration and notes of an existing set.
    fn update_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError>;

    /// Delete a set by ID.
    fn delete_set(&self, id: Uuid) -> Result<(), DatabaseError>;

    /// Delete every set of a workout. Returns the number of deleted sets.
    fn delete_sets_by_workout(&self, workout_id: Uuid) -> Result<usize, DatabaseError>;

    /// Highest estimated 1RM a user ever achieved for an exercise (0 when none).
    fn max_estimated_1rm(&self, user_id: Uuid, exercise_id: Uuid) -> Result<f64, DatabaseError>;

    /// Daily maximum estimated 1RM for an exercise, oldest date first.
    fn weight_progression(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WeightProgressionPoint>, DatabaseError>;
}

/// Read access to the exercise catalog.
pub trait ExerciseRepository {
    /// Get an exercise by ID.
    fn get_exercise(&self, id: Uuid) -> Result<Option<Exercise>, DatabaseError>;
}
