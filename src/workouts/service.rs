//! Domain checks that need more than a single entity.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::workouts::repository::WorkoutRepository;
use crate::workouts::usecase::WorkoutError;

/// Enforces one workout per user per calendar day.
pub struct WorkoutDateService<'a> {
    workouts: &'a dyn WorkoutRepository,
}

impl<'a> WorkoutDateService<'a> {
    pub fn new(workouts: &'a dyn WorkoutRepository) -> Self {
        Self { workouts }
    }

    /// Fail with `DuplicateWorkoutDate` if the user already trained on `date`.
    pub fn check_date_uniqueness(&self, user_id: Uuid, date: NaiveDate) -> Result<(), WorkoutError> {
        if self.workouts.workout_exists_on(user_id, date)? {
            tracing::warn!("Workout already recorded for user {} on {}", user_id, date);
            return Err(WorkoutError::DuplicateWorkoutDate(date));
        }
        Ok(())
    }
}
