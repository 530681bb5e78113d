//! Workout recording and history.
//!
//! `WorkoutUsecase` turns raw set input into persisted workouts, keeps each
//! workout's daily score in sync with its sets, and serves the history views.
//! The caller's user id is passed into every operation explicitly.
//!
//! Multi-step writes are not wrapped in a transaction: a failure halfway through
//! `record_workout`, `add_workout_sets` or `delete_workout` leaves the steps that
//! already succeeded in the store and reports the error that stopped it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::database::DatabaseError;
use crate::workouts::repository::{
    ExerciseRepository, WeightProgressionPoint, WorkoutRepository, WorkoutSetRepository,
};
use crate::workouts::service::WorkoutDateService;
use crate::workouts::types::{ValidationError, Workout, WorkoutSet};

/// Input for a single set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetInput {
    pub exercise_id: Uuid,
    pub set_number: i32,
    pub reps: i32,
    pub weight: f64,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SetInput {
    pub fn new(exercise_id: Uuid, set_number: i32, reps: i32, weight: f64) -> Self {
        Self {
            exercise_id,
            set_number,
            reps,
            weight,
            duration_seconds: None,
            notes: None,
        }
    }
}

/// Input for recording a new workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWorkoutInput {
    pub user_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub memo: Option<String>,
    pub sets: Vec<SetInput>,
}

/// Changes applied by `update_workout_set`. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetChanges {
    /// New reps and weight; the estimated 1RM follows
    pub reps_and_weight: Option<(i32, f64)>,
    /// New duration (`Some(None)` clears it)
    pub duration_seconds: Option<Option<i32>>,
    /// New notes (`Some(None)` clears them)
    pub notes: Option<Option<String>>,
}

/// A workout together with all of its sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub sets: Vec<WorkoutSet>,
}

/// One day of the contribution calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPoint {
    pub date: NaiveDate,
    pub daily_score: i32,
}

/// Coarse classification of `WorkoutError` for outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Conflict,
    Validation,
    EmptyInput,
    Persistence,
}

/// Errors returned by workout operations.
#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("Workout not found: {0}")]
    WorkoutNotFound(Uuid),

    #[error("Workout set not found: {0}")]
    WorkoutSetNotFound(Uuid),

    #[error("Exercise not found: {0}")]
    ExerciseNotFound(Uuid),

    #[error("Access denied to workout {0}")]
    AccessDenied(Uuid),

    #[error("Workout already exists for {0}")]
    DuplicateWorkoutDate(NaiveDate),

    #[error("Workout must have at least one set")]
    EmptyWorkoutSets,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl WorkoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkoutError::WorkoutNotFound(_)
            | WorkoutError::WorkoutSetNotFound(_)
            | WorkoutError::ExerciseNotFound(_) => ErrorKind::NotFound,
            WorkoutError::AccessDenied(_) => ErrorKind::AccessDenied,
            WorkoutError::DuplicateWorkoutDate(_) => ErrorKind::Conflict,
            WorkoutError::Validation(_) => ErrorKind::Validation,
            WorkoutError::EmptyWorkoutSets => ErrorKind::EmptyInput,
            WorkoutError::Storage(_) => ErrorKind::Persistence,
        }
    }
}

/// Orchestrates workout recording, mutation, deletion and history queries.
pub struct WorkoutUsecase<'a> {
    workouts: &'a dyn WorkoutRepository,
    sets: &'a dyn WorkoutSetRepository,
    exercises: &'a dyn ExerciseRepository,
    dates: WorkoutDateService<'a>,
}

impl<'a> WorkoutUsecase<'a> {
    /// Create a usecase over separate stores.
    pub fn new(
        workouts: &'a dyn WorkoutRepository,
        sets: &'a dyn WorkoutSetRepository,
        exercises: &'a dyn ExerciseRepository,
    ) -> Self {
        Self {
            workouts,
            sets,
            exercises,
            dates: WorkoutDateService::new(workouts),
        }
    }

    /// Create a usecase over a single store implementing every contract.
    pub fn with_store<S>(store: &'a S) -> Self
    where
        S: WorkoutRepository + WorkoutSetRepository + ExerciseRepository,
    {
        Self::new(store, store, store)
    }

    /// Record a new workout with its sets.
    ///
    /// Every exercise is checked before anything is written. The daily score is
    /// computed from the created sets once they are all stored.
    pub fn record_workout(&self, input: RecordWorkoutInput) -> Result<WorkoutDetail, WorkoutError> {
        self.dates.check_date_uniqueness(input.user_id, input.date)?;

        if input.sets.is_empty() {
            return Err(WorkoutError::EmptyWorkoutSets);
        }

        self.ensure_exercises_exist(&input.sets)?;

        let mut workout = Workout::new(input.user_id, input.date);
        if input.memo.is_some() {
            workout.update_memo(input.memo);
        }

        self.workouts
            .insert_workout(&workout)
            .map_err(|e| match e {
                // Lost the race against a concurrent record for the same day
                DatabaseError::ConstraintViolation(_) => {
                    WorkoutError::DuplicateWorkoutDate(workout.date)
                }
                other => WorkoutError::Storage(other),
            })?;

        let sets = self.create_sets(workout.id, input.sets)?;
        self.recalculate_daily_score(&mut workout, &sets)?;

        tracing::info!(
            "Recorded workout {} for user {} on {} ({} sets, score {})",
            workout.id,
            workout.user_id,
            workout.date,
            sets.len(),
            workout.daily_score()
        );

        Ok(WorkoutDetail { workout, sets })
    }

    /// Get a workout and its sets.
    pub fn get_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<WorkoutDetail, WorkoutError> {
        let workout = self.owned_workout(user_id, workout_id)?;
        let sets = self.sets.list_sets_by_workout(workout_id)?;
        Ok(WorkoutDetail { workout, sets })
    }

    /// List a user's workouts, restricted to `start..=end` when both bounds are given.
    pub fn get_user_workouts(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Workout>, WorkoutError> {
        let workouts = match (start, end) {
            (Some(start), Some(end)) => self.workouts.list_workouts_in_range(user_id, start, end)?,
            _ => self.workouts.list_workouts_by_user(user_id)?,
        };
        Ok(workouts)
    }

    /// Replace or clear a workout's memo. The score is left alone.
    pub fn update_workout_memo(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        memo: Option<String>,
    ) -> Result<Workout, WorkoutError> {
        let mut workout = self.owned_workout(user_id, workout_id)?;
        workout.update_memo(memo);
        self.workouts.update_workout(&workout)?;
        Ok(workout)
    }

    /// Append sets to an existing workout and rescore it.
    ///
    /// Returns only the newly created sets.
    pub fn add_workout_sets(
        &self,
        user_id: Uuid,
        workout_id: Uuid,
        sets: Vec<SetInput>,
    ) -> Result<Vec<WorkoutSet>, WorkoutError> {
        let mut workout = self.owned_workout(user_id, workout_id)?;
        self.ensure_exercises_exist(&sets)?;

        let created = self.create_sets(workout_id, sets)?;

        let all_sets = self.sets.list_sets_by_workout(workout_id)?;
        self.recalculate_daily_score(&mut workout, &all_sets)?;

        tracing::debug!("Added {} sets to workout {}", created.len(), workout_id);
        Ok(created)
    }

    /// Change reps/weight, duration or notes of a set and rescore its workout.
    pub fn update_workout_set(
        &self,
        user_id: Uuid,
        workout_set_id: Uuid,
        changes: SetChanges,
    ) -> Result<WorkoutSet, WorkoutError> {
        let mut set = self
            .sets
            .get_set(workout_set_id)?
            .ok_or(WorkoutError::WorkoutSetNotFound(workout_set_id))?;
        let mut workout = self.owned_workout(user_id, set.workout_id)?;

        if let Some((reps, weight)) = changes.reps_and_weight {
            set.update_reps_and_weight(reps, weight)?;
        }
        if let Some(duration) = changes.duration_seconds {
            set.update_duration(duration)?;
        }
        if let Some(notes) = changes.notes {
            set.update_notes(notes);
        }
        self.sets.update_set(&set)?;

        let all_sets = self.sets.list_sets_by_workout(workout.id)?;
        self.recalculate_daily_score(&mut workout, &all_sets)?;

        Ok(set)
    }

    /// Delete a single set and rescore its workout from the remaining sets.
    pub fn delete_workout_set(&self, user_id: Uuid, workout_set_id: Uuid) -> Result<(), WorkoutError> {
        let set = self
            .sets
            .get_set(workout_set_id)?
            .ok_or(WorkoutError::WorkoutSetNotFound(workout_set_id))?;
        let mut workout = self.owned_workout(user_id, set.workout_id)?;

        self.sets.delete_set(workout_set_id)?;

        let remaining = self.sets.list_sets_by_workout(workout.id)?;
        self.recalculate_daily_score(&mut workout, &remaining)?;

        tracing::debug!(
            "Deleted set {} from workout {} ({} sets left)",
            workout_set_id,
            workout.id,
            remaining.len()
        );
        Ok(())
    }

    /// Delete a workout together with all of its sets.
    pub fn delete_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<(), WorkoutError> {
        self.owned_workout(user_id, workout_id)?;

        // Sets reference the workout, so they go first
        let removed = self.sets.delete_sets_by_workout(workout_id)?;
        self.workouts.delete_workout(workout_id)?;

        tracing::info!("Deleted workout {} and {} sets", workout_id, removed);
        Ok(())
    }

    /// Daily scores of the workouts in `start..=end` for a calendar heatmap.
    ///
    /// Days without a workout are not listed.
    pub fn get_contribution_data(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ContributionPoint>, WorkoutError> {
        let points = self
            .workouts
            .list_workouts_in_range(user_id, start, end)?
            .into_iter()
            .map(|workout| ContributionPoint {
                date: workout.date,
                daily_score: workout.daily_score(),
            })
            .collect();
        Ok(points)
    }

    /// Best estimated 1RM per training day for one exercise, oldest first.
    pub fn get_weight_progression(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WeightProgressionPoint>, WorkoutError> {
        Ok(self.sets.weight_progression(user_id, exercise_id)?)
    }

    /// Load a workout and verify the caller owns it.
    fn owned_workout(&self, user_id: Uuid, workout_id: Uuid) -> Result<Workout, WorkoutError> {
        let workout = self
            .workouts
            .get_workout(workout_id)?
            .ok_or(WorkoutError::WorkoutNotFound(workout_id))?;

        if !workout.is_owned_by(user_id) {
            tracing::warn!("User {} denied access to workout {}", user_id, workout_id);
            return Err(WorkoutError::AccessDenied(workout_id));
        }

        Ok(workout)
    }

    fn ensure_exercises_exist(&self, sets: &[SetInput]) -> Result<(), WorkoutError> {
        for input in sets {
            if self.exercises.get_exercise(input.exercise_id)?.is_none() {
                return Err(WorkoutError::ExerciseNotFound(input.exercise_id));
            }
        }
        Ok(())
    }

    fn create_sets(&self, workout_id: Uuid, inputs: Vec<SetInput>) -> Result<Vec<WorkoutSet>, WorkoutError> {
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let mut set = WorkoutSet::new(
                workout_id,
                input.exercise_id,
                input.set_number,
                input.reps,
                input.weight,
            )?;
            if input.duration_seconds.is_some() {
                set.update_duration(input.duration_seconds)?;
            }
            if input.notes.is_some() {
                set.update_notes(input.notes);
            }

            self.sets.insert_set(&set)?;
            created.push(set);
        }

        Ok(created)
    }

    fn recalculate_daily_score(
        &self,
        workout: &mut Workout,
        sets: &[WorkoutSet],
    ) -> Result<(), WorkoutError> {
        let score = workout.recalculate_daily_score(sets)?;
        self.workouts.update_workout(workout)?;

        tracing::debug!(
            "Workout {} rescored to {} from {} sets",
            workout.id,
            score,
            sets.len()
        );
        Ok(())
    }
}
