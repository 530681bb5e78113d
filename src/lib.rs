//! RustLift - Strength Training Log
//!
//! Records daily workouts made of sets, scores each day from its sets, and
//! serves workout history, contribution calendars and 1RM progression.

pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use storage::{AppConfig, Database, DatabaseError, MemoryStore};
pub use workouts::{Workout, WorkoutError, WorkoutSet, WorkoutUsecase};
