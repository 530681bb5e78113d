//! Workout module for recorded strength training sessions.

pub mod exercise;
pub mod repository;
pub mod service;
pub mod types;
pub mod usecase;

pub use exercise::{BodyPart, Exercise};
pub use repository::{
    ExerciseRepository, WeightProgressionPoint, WorkoutRepository, WorkoutSetRepository,
};
pub use service::WorkoutDateService;
pub use types::{estimate_1rm, ValidationError, Workout, WorkoutSet};
pub use usecase::{
    ContributionPoint, ErrorKind, RecordWorkoutInput, SetChanges, SetInput, WorkoutDetail,
    WorkoutError, WorkoutUsecase,
};
