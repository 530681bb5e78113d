//! Workout and set entities.
//!
//! Both entities own a derived value that is never set directly:
//! - `WorkoutSet::estimated_1rm` follows the current reps and weight (Epley formula)
//! - `Workout::daily_score` is recomputed from the complete set list of the workout

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Points awarded per recorded set.
pub const POINTS_PER_SET: i64 = 5;

/// Volume thresholds that each add a bonus once exceeded.
pub const VOLUME_BONUS_THRESHOLDS: [f64; 3] = [1_000.0, 5_000.0, 10_000.0];

/// Points added per exceeded volume threshold.
pub const VOLUME_BONUS_POINTS: i64 = 10;

/// Lowest possible daily score.
pub const MIN_DAILY_SCORE: i32 = 0;

/// Highest possible daily score.
pub const MAX_DAILY_SCORE: i32 = 100;

/// Estimate a one-rep max from a submaximal set using the Epley formula.
///
/// A single rep is already the max, and non-positive reps estimate to zero.
pub fn estimate_1rm(weight: f64, reps: i32) -> f64 {
    if reps <= 0 {
        return 0.0;
    }
    if reps == 1 {
        return weight;
    }
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// A single training session for one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkoutRecord")]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// User who recorded the workout
    pub user_id: Uuid,
    /// Calendar day of the session
    pub date: NaiveDate,
    daily_score: i32,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Workout {
    /// Create a new workout with a zero score.
    pub fn new(user_id: Uuid, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            daily_score: MIN_DAILY_SCORE,
            memo: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a workout from stored values without recomputing anything.
    pub fn restore(
        id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        daily_score: i32,
        memo: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            daily_score,
            memo,
            created_at,
            updated_at,
        }
    }

    /// Current daily score (0..=100).
    pub fn daily_score(&self) -> i32 {
        self.daily_score
    }

    /// Free-form note for the day, if any.
    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check whether the given user owns this workout.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Score a day of training from its set count and total volume.
    ///
    /// Each set is worth five points, and every exceeded volume threshold adds ten
    /// more. The result is clamped to 0..=100.
    pub fn calculate_daily_score(total_sets: usize, total_volume: f64) -> i32 {
        let sets = i64::try_from(total_sets).unwrap_or(i64::MAX);
        let bonus = VOLUME_BONUS_THRESHOLDS
            .iter()
            .filter(|threshold| total_volume > **threshold)
            .count() as i64
            * VOLUME_BONUS_POINTS;

        let score = sets.saturating_mul(POINTS_PER_SET).saturating_add(bonus);
        score.clamp(i64::from(MIN_DAILY_SCORE), i64::from(MAX_DAILY_SCORE)) as i32
    }

    /// Recompute the daily score from the complete set list of this workout.
    pub fn recalculate_daily_score(&mut self, sets: &[WorkoutSet]) -> Result<i32, ValidationError> {
        let total_volume: f64 = sets.iter().map(WorkoutSet::volume).sum();
        let score = Self::calculate_daily_score(sets.len(), total_volume);
        self.update_daily_score(score)?;
        Ok(score)
    }

    /// Set the daily score after validating its range.
    pub fn update_daily_score(&mut self, score: i32) -> Result<(), ValidationError> {
        validate_daily_score(score)?;
        self.daily_score = score;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace or clear the memo.
    pub fn update_memo(&mut self, memo: Option<String>) {
        self.memo = memo;
        self.updated_at = Utc::now();
    }
}

/// One set within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkoutSetRecord")]
pub struct WorkoutSet {
    /// Unique identifier
    pub id: Uuid,
    /// Owning workout
    pub workout_id: Uuid,
    /// Exercise performed (catalog reference)
    pub exercise_id: Uuid,
    /// Position of the set within the exercise (1-based)
    pub set_number: i32,
    reps: i32,
    weight: f64,
    estimated_1rm: f64,
    duration_seconds: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl WorkoutSet {
    /// Create a validated set and derive its estimated 1RM.
    pub fn new(
        workout_id: Uuid,
        exercise_id: Uuid,
        set_number: i32,
        reps: i32,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        validate_set_number(set_number)?;
        validate_reps(reps)?;
        validate_weight(weight)?;

        Ok(Self {
            id: Uuid::new_v4(),
            workout_id,
            exercise_id,
            set_number,
            reps,
            weight,
            estimated_1rm: estimate_1rm(weight, reps),
            duration_seconds: None,
            notes: None,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a set from stored values without recomputing anything.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        workout_id: Uuid,
        exercise_id: Uuid,
        set_number: i32,
        reps: i32,
        weight: f64,
        estimated_1rm: f64,
        duration_seconds: Option<i32>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            workout_id,
            exercise_id,
            set_number,
            reps,
            weight,
            estimated_1rm,
            duration_seconds,
            notes,
            created_at,
        }
    }

    /// Repetitions performed.
    pub fn reps(&self) -> i32 {
        self.reps
    }

    /// Load in kilograms.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Estimated one-rep max for the current reps and weight.
    pub fn estimated_1rm(&self) -> f64 {
        self.estimated_1rm
    }

    /// Time under tension or rest, in seconds.
    pub fn duration_seconds(&self) -> Option<i32> {
        self.duration_seconds
    }

    /// Free-form note for the set, if any.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Training volume of this set (reps x weight).
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }

    /// Change reps and weight together and re-derive the estimated 1RM.
    pub fn update_reps_and_weight(&mut self, reps: i32, weight: f64) -> Result<(), ValidationError> {
        validate_reps(reps)?;
        validate_weight(weight)?;

        self.reps = reps;
        self.weight = weight;
        self.estimated_1rm = estimate_1rm(weight, reps);
        Ok(())
    }

    /// Replace or clear the set duration.
    pub fn update_duration(&mut self, duration_seconds: Option<i32>) -> Result<(), ValidationError> {
        if let Some(seconds) = duration_seconds {
            validate_duration(seconds)?;
        }
        self.duration_seconds = duration_seconds;
        Ok(())
    }

    /// Replace or clear the set notes.
    pub fn update_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }
}

/// Serialized form of a workout. Deserializing re-validates the score.
#[derive(Deserialize)]
struct WorkoutRecord {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    daily_score: i32,
    #[serde(default)]
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = ValidationError;

    fn try_from(record: WorkoutRecord) -> Result<Self, Self::Error> {
        validate_daily_score(record.daily_score)?;
        Ok(Self::restore(
            record.id,
            record.user_id,
            record.date,
            record.daily_score,
            record.memo,
            record.created_at,
            record.updated_at,
        ))
    }
}

/// Serialized form of a set. Any stored 1RM is ignored and derived again.
#[derive(Deserialize)]
struct WorkoutSetRecord {
    id: Uuid,
    workout_id: Uuid,
    exercise_id: Uuid,
    set_number: i32,
    reps: i32,
    weight: f64,
    #[serde(default)]
    duration_seconds: Option<i32>,
    #[serde(default)]
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkoutSetRecord> for WorkoutSet {
    type Error = ValidationError;

    fn try_from(record: WorkoutSetRecord) -> Result<Self, Self::Error> {
        validate_set_number(record.set_number)?;
        validate_reps(record.reps)?;
        validate_weight(record.weight)?;
        if let Some(seconds) = record.duration_seconds {
            validate_duration(seconds)?;
        }

        Ok(Self {
            id: record.id,
            workout_id: record.workout_id,
            exercise_id: record.exercise_id,
            set_number: record.set_number,
            reps: record.reps,
            weight: record.weight,
            estimated_1rm: estimate_1rm(record.weight, record.reps),
            duration_seconds: record.duration_seconds,
            notes: record.notes,
            created_at: record.created_at,
        })
    }
}

fn validate_set_number(set_number: i32) -> Result<(), ValidationError> {
    if set_number <= 0 {
        return Err(ValidationError::InvalidSetNumber(set_number));
    }
    Ok(())
}

fn validate_reps(reps: i32) -> Result<(), ValidationError> {
    if reps <= 0 {
        return Err(ValidationError::InvalidReps(reps));
    }
    Ok(())
}

fn validate_weight(weight: f64) -> Result<(), ValidationError> {
    // NaN fails this comparison too
    if !(weight >= 0.0) {
        return Err(ValidationError::InvalidWeight(weight));
    }
    Ok(())
}

fn validate_duration(seconds: i32) -> Result<(), ValidationError> {
    if seconds < 0 {
        return Err(ValidationError::InvalidDuration(seconds));
    }
    Ok(())
}

fn validate_daily_score(score: i32) -> Result<(), ValidationError> {
    if !(MIN_DAILY_SCORE..=MAX_DAILY_SCORE).contains(&score) {
        return Err(ValidationError::InvalidDailyScore(score));
    }
    Ok(())
}

/// Field values rejected by entity constructors and mutators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Set number must be greater than 0 (got {0})")]
    InvalidSetNumber(i32),

    #[error("Reps must be greater than 0 (got {0})")]
    InvalidReps(i32),

    #[error("Weight must be greater than or equal to 0 (got {0})")]
    InvalidWeight(f64),

    #[error("Duration must be greater than or equal to 0 seconds (got {0})")]
    InvalidDuration(i32),

    #[error("Daily score must be between 0 and 100 (got {0})")]
    InvalidDailyScore(i32),
}
