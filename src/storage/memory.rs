//! In-process store implementing the workout repositories.
//!
//! Mirrors the SQLite contracts: one workout per user per day, sets must
//! reference an existing workout and exercise, and a workout with sets cannot
//! be deleted.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::storage::database::DatabaseError;
use crate::workouts::exercise::Exercise;
use crate::workouts::repository::{
    ExerciseRepository, WeightProgressionPoint, WorkoutRepository, WorkoutSetRepository,
};
use crate::workouts::types::{Workout, WorkoutSet};

#[derive(Default)]
struct Tables {
    exercises: Vec<Exercise>,
    workouts: Vec<Workout>,
    sets: Vec<WorkoutSet>,
}

/// Repository implementation backed by in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an exercise to the catalog.
    pub fn insert_exercise(&self, exercise: &Exercise) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        if tables
            .exercises
            .iter()
            .any(|e| e.id == exercise.id || e.name == exercise.name)
        {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Exercise {} already exists",
                exercise.name
            )));
        }
        tables.exercises.push(exercise.clone());
        Ok(())
    }
}

impl WorkoutRepository for MemoryStore {
    fn insert_workout(&self, workout: &Workout) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        if tables.workouts.iter().any(|w| w.id == workout.id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Workout {} already exists",
                workout.id
            )));
        }
        if tables
            .workouts
            .iter()
            .any(|w| w.user_id == workout.user_id && w.date == workout.date)
        {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Workout for user {} on {} already exists",
                workout.user_id, workout.date
            )));
        }
        tables.workouts.push(workout.clone());
        Ok(())
    }

    fn get_workout(&self, id: Uuid) -> Result<Option<Workout>, DatabaseError> {
        Ok(self.lock().workouts.iter().find(|w| w.id == id).cloned())
    }

    fn list_workouts_by_user(&self, user_id: Uuid) -> Result<Vec<Workout>, DatabaseError> {
        let mut workouts: Vec<Workout> = self
            .lock()
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(workouts)
    }

    fn list_workouts_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Workout>, DatabaseError> {
        let mut workouts: Vec<Workout> = self
            .lock()
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id && w.date >= start && w.date <= end)
            .cloned()
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(workouts)
    }

    fn get_workout_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Workout>, DatabaseError> {
        Ok(self
            .lock()
            .workouts
            .iter()
            .find(|w| w.user_id == user_id && w.date == date)
            .cloned())
    }

    fn update_workout(&self, workout: &Workout) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let stored = tables
            .workouts
            .iter_mut()
            .find(|w| w.id == workout.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Workout {}", workout.id)))?;

        // Identity columns are never rewritten by an update
        let mut updated = workout.clone();
        updated.user_id = stored.user_id;
        updated.date = stored.date;
        *stored = updated;
        Ok(())
    }

    fn delete_workout(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        if tables.sets.iter().any(|s| s.workout_id == id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Workout {} still has sets",
                id
            )));
        }

        let before = tables.workouts.len();
        tables.workouts.retain(|w| w.id != id);
        if tables.workouts.len() == before {
            return Err(DatabaseError::NotFound(format!("Workout {}", id)));
        }
        Ok(())
    }
}

impl WorkoutSetRepository for MemoryStore {
    fn insert_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        if !tables.workouts.iter().any(|w| w.id == set.workout_id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Unknown workout {}",
                set.workout_id
            )));
        }
        if !tables.exercises.iter().any(|e| e.id == set.exercise_id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Unknown exercise {}",
                set.exercise_id
            )));
        }
        if tables.sets.iter().any(|s| s.id == set.id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Workout set {} already exists",
                set.id
            )));
        }
        tables.sets.push(set.clone());
        Ok(())
    }

    fn get_set(&self, id: Uuid) -> Result<Option<WorkoutSet>, DatabaseError> {
        Ok(self.lock().sets.iter().find(|s| s.id == id).cloned())
    }

    fn list_sets_by_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError> {
        let mut sets: Vec<WorkoutSet> = self
            .lock()
            .sets
            .iter()
            .filter(|s| s.workout_id == workout_id)
            .cloned()
            .collect();
        sets.sort_by(|a, b| {
            a.exercise_id
                .cmp(&b.exercise_id)
                .then(a.set_number.cmp(&b.set_number))
                .then(a.created_at().cmp(&b.created_at()))
        });
        Ok(sets)
    }

    fn list_sets_by_workout_and_exercise(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WorkoutSet>, DatabaseError> {
        let mut sets: Vec<WorkoutSet> = self
            .lock()
            .sets
            .iter()
            .filter(|s| s.workout_id == workout_id && s.exercise_id == exercise_id)
            .cloned()
            .collect();
        sets.sort_by(|a, b| {
            a.set_number
                .cmp(&b.set_number)
                .then(a.created_at().cmp(&b.created_at()))
        });
        Ok(sets)
    }

    fn list_sets_by_exercise(&self, exercise_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError> {
        let mut sets: Vec<WorkoutSet> = self
            .lock()
            .sets
            .iter()
            .filter(|s| s.exercise_id == exercise_id)
            .cloned()
            .collect();
        sets.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(sets)
    }

    fn update_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let stored = tables
            .sets
            .iter_mut()
            .find(|s| s.id == set.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Workout set {}", set.id)))?;
        *stored = set.clone();
        Ok(())
    }

    fn delete_set(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.lock();
        let before = tables.sets.len();
        tables.sets.retain(|s| s.id != id);
        if tables.sets.len() == before {
            return Err(DatabaseError::NotFound(format!("Workout set {}", id)));
        }
        Ok(())
    }

    fn delete_sets_by_workout(&self, workout_id: Uuid) -> Result<usize, DatabaseError> {
        let mut tables = self.lock();
        let before = tables.sets.len();
        tables.sets.retain(|s| s.workout_id != workout_id);
        Ok(before - tables.sets.len())
    }

    fn max_estimated_1rm(&self, user_id: Uuid, exercise_id: Uuid) -> Result<f64, DatabaseError> {
        Ok(self
            .weight_progression(user_id, exercise_id)?
            .into_iter()
            .map(|point| point.max_1rm)
            .fold(0.0, f64::max))
    }

    fn weight_progression(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WeightProgressionPoint>, DatabaseError> {
        let tables = self.lock();
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for set in tables.sets.iter().filter(|s| s.exercise_id == exercise_id) {
            let workout = tables
                .workouts
                .iter()
                .find(|w| w.id == set.workout_id && w.user_id == user_id);
            if let Some(workout) = workout {
                let best = per_day.entry(workout.date).or_insert(set.estimated_1rm());
                *best = best.max(set.estimated_1rm());
            }
        }

        Ok(per_day
            .into_iter()
            .map(|(date, max_1rm)| WeightProgressionPoint { date, max_1rm })
            .collect())
    }
}

impl ExerciseRepository for MemoryStore {
    fn get_exercise(&self, id: Uuid) -> Result<Option<Exercise>, DatabaseError> {
        Ok(self.lock().exercises.iter().find(|e| e.id == id).cloned())
    }
}
