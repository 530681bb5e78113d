//! Integration tests for recording and rescoring workouts.
//!
//! Every scenario runs once against `MemoryStore` and once against an
//! in-memory SQLite `Database`.

use chrono::NaiveDate;
use rustlift::storage::{Database, DatabaseError, MemoryStore};
use rustlift::workouts::{
    ErrorKind, Exercise, RecordWorkoutInput, SetChanges, SetInput, WorkoutError, WorkoutUsecase,
};
use uuid::Uuid;

struct Catalog {
    squat: Uuid,
    bench: Uuid,
}

impl Catalog {
    fn seed(insert: impl Fn(&Exercise) -> Result<(), DatabaseError>) -> Self {
        let squat = Exercise::new("Back Squat");
        let bench = Exercise::new("Bench Press");
        insert(&squat).expect("Failed to seed squat");
        insert(&bench).expect("Failed to seed bench");
        Self {
            squat: squat.id,
            bench: bench.id,
        }
    }
}

type Scenario = fn(&WorkoutUsecase<'_>, &Catalog);

fn for_each_store(scenario: Scenario) {
    let memory = MemoryStore::new();
    let catalog = Catalog::seed(|e| memory.insert_exercise(e));
    scenario(&WorkoutUsecase::with_store(&memory), &catalog);

    let db = Database::open_in_memory().expect("Failed to create database");
    let catalog = Catalog::seed(|e| db.insert_exercise(e));
    scenario(&WorkoutUsecase::with_store(&db), &catalog);
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

fn sets_of(exercise_id: Uuid, count: i32, reps: i32, weight: f64) -> Vec<SetInput> {
    (1..=count)
        .map(|n| SetInput::new(exercise_id, n, reps, weight))
        .collect()
}

fn record(
    usecase: &WorkoutUsecase<'_>,
    user_id: Uuid,
    date: NaiveDate,
    sets: Vec<SetInput>,
) -> Result<rustlift::workouts::WorkoutDetail, WorkoutError> {
    usecase.record_workout(RecordWorkoutInput {
        user_id,
        date,
        memo: None,
        sets,
    })
}

#[test]
fn test_record_then_add_sets_crosses_volume_tier() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();

        // 5 sets x 5 reps x 20 kg = 500 kg
        let detail = record(usecase, user_id, day(1), sets_of(catalog.squat, 5, 5, 20.0)).unwrap();
        assert_eq!(detail.sets.len(), 5);
        assert_eq!(detail.workout.daily_score(), 25);

        // +600 kg pushes the total over 1000 kg
        let added = usecase
            .add_workout_sets(
                user_id,
                detail.workout.id,
                vec![SetInput::new(catalog.bench, 1, 10, 60.0)],
            )
            .unwrap();
        assert_eq!(added.len(), 1);

        let reloaded = usecase.get_workout(user_id, detail.workout.id).unwrap();
        assert_eq!(reloaded.sets.len(), 6);
        assert_eq!(reloaded.workout.daily_score(), 40);
    });
}

#[test]
fn test_added_set_crosses_second_volume_tier() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();

        // 600 + 520 + 420 = 1540 kg
        let detail = record(
            usecase,
            user_id,
            day(12),
            vec![
                SetInput::new(catalog.bench, 1, 10, 60.0),
                SetInput::new(catalog.bench, 2, 8, 65.0),
                SetInput::new(catalog.bench, 3, 6, 70.0),
            ],
        )
        .unwrap();
        assert_eq!(detail.workout.daily_score(), 25);

        // +3500 kg brings the total to 5040 kg
        usecase
            .add_workout_sets(
                user_id,
                detail.workout.id,
                vec![SetInput::new(catalog.squat, 1, 10, 350.0)],
            )
            .unwrap();

        let reloaded = usecase.get_workout(user_id, detail.workout.id).unwrap();
        assert_eq!(reloaded.sets.len(), 4);
        assert_eq!(reloaded.workout.daily_score(), 40);
    });
}

#[test]
fn test_score_is_capped() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let detail = record(usecase, user_id, day(2), sets_of(catalog.squat, 25, 10, 100.0)).unwrap();
        assert_eq!(detail.workout.daily_score(), 100);
    });
}

#[test]
fn test_deleting_last_set_resets_score() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let detail = record(usecase, user_id, day(3), sets_of(catalog.squat, 1, 5, 100.0)).unwrap();
        assert_eq!(detail.workout.daily_score(), 5);

        usecase.delete_workout_set(user_id, detail.sets[0].id).unwrap();

        let reloaded = usecase.get_workout(user_id, detail.workout.id).unwrap();
        assert!(reloaded.sets.is_empty());
        assert_eq!(reloaded.workout.daily_score(), 0);
    });
}

#[test]
fn test_second_workout_same_day_conflicts() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        record(usecase, user_id, day(4), sets_of(catalog.squat, 1, 5, 60.0)).unwrap();

        let err = record(usecase, user_id, day(4), sets_of(catalog.bench, 1, 5, 60.0)).unwrap_err();
        assert!(matches!(err, WorkoutError::DuplicateWorkoutDate(d) if d == day(4)));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // Other users and other days are free
        record(usecase, Uuid::new_v4(), day(4), sets_of(catalog.squat, 1, 5, 60.0)).unwrap();
        record(usecase, user_id, day(5), sets_of(catalog.squat, 1, 5, 60.0)).unwrap();
    });
}

#[test]
fn test_rejected_inputs_write_nothing() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();

        let err = record(usecase, user_id, day(6), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);

        let mut sets = sets_of(catalog.squat, 2, 5, 60.0);
        let unknown = Uuid::new_v4();
        sets.push(SetInput::new(unknown, 1, 5, 60.0));
        let err = record(usecase, user_id, day(6), sets).unwrap_err();
        assert!(matches!(err, WorkoutError::ExerciseNotFound(id) if id == unknown));

        assert!(usecase.get_user_workouts(user_id, None, None).unwrap().is_empty());
    });
}

#[test]
fn test_invalid_set_leaves_partial_workout() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let sets = vec![
            SetInput::new(catalog.squat, 1, 5, 60.0),
            SetInput::new(catalog.squat, 2, 0, 60.0),
        ];

        let err = record(usecase, user_id, day(7), sets).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let workouts = usecase.get_user_workouts(user_id, None, None).unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].daily_score(), 0);

        let detail = usecase.get_workout(user_id, workouts[0].id).unwrap();
        assert_eq!(detail.sets.len(), 1);
    });
}

#[test]
fn test_other_users_are_denied() {
    for_each_store(|usecase, catalog| {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let detail = record(usecase, owner, day(8), sets_of(catalog.squat, 2, 5, 80.0)).unwrap();
        let workout_id = detail.workout.id;

        let denied = |result: Result<(), WorkoutError>| {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AccessDenied);
        };

        denied(usecase.get_workout(intruder, workout_id).map(|_| ()));
        denied(usecase.update_workout_memo(intruder, workout_id, Some("mine".into())).map(|_| ()));
        denied(
            usecase
                .add_workout_sets(intruder, workout_id, sets_of(catalog.bench, 1, 5, 50.0))
                .map(|_| ()),
        );
        denied(
            usecase
                .update_workout_set(intruder, detail.sets[0].id, SetChanges::default())
                .map(|_| ()),
        );
        denied(usecase.delete_workout_set(intruder, detail.sets[0].id));
        denied(usecase.delete_workout(intruder, workout_id));

        // Nothing changed for the owner
        let reloaded = usecase.get_workout(owner, workout_id).unwrap();
        assert_eq!(reloaded.sets.len(), 2);
        assert_eq!(reloaded.workout.memo(), None);
    });
}

#[test]
fn test_delete_workout_removes_sets() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let detail = record(usecase, user_id, day(9), sets_of(catalog.squat, 3, 5, 80.0)).unwrap();

        usecase.delete_workout(user_id, detail.workout.id).unwrap();

        let err = usecase.get_workout(user_id, detail.workout.id).unwrap_err();
        assert!(matches!(err, WorkoutError::WorkoutNotFound(_)));

        let err = usecase.delete_workout_set(user_id, detail.sets[0].id).unwrap_err();
        assert!(matches!(err, WorkoutError::WorkoutSetNotFound(_)));

        assert!(usecase
            .get_weight_progression(user_id, catalog.squat)
            .unwrap()
            .is_empty());

        // The day is free again
        record(usecase, user_id, day(9), sets_of(catalog.squat, 1, 5, 80.0)).unwrap();
    });
}

#[test]
fn test_update_set_rescores_workout() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let detail = record(usecase, user_id, day(10), sets_of(catalog.squat, 2, 5, 50.0)).unwrap();
        assert_eq!(detail.workout.daily_score(), 10);

        let changes = SetChanges {
            reps_and_weight: Some((10, 100.0)),
            duration_seconds: Some(Some(45)),
            notes: Some(Some("Paused reps".to_string())),
        };
        let updated = usecase
            .update_workout_set(user_id, detail.sets[0].id, changes)
            .unwrap();
        assert_eq!(updated.reps(), 10);
        assert_eq!(updated.duration_seconds(), Some(45));

        // 1000 + 250 kg crosses the first tier
        let reloaded = usecase.get_workout(user_id, detail.workout.id).unwrap();
        assert_eq!(reloaded.workout.daily_score(), 20);

        let err = usecase
            .update_workout_set(
                user_id,
                detail.sets[1].id,
                SetChanges {
                    duration_seconds: Some(Some(-1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    });
}

#[test]
fn test_memo_update_keeps_score() {
    for_each_store(|usecase, catalog| {
        let user_id = Uuid::new_v4();
        let detail = record(usecase, user_id, day(11), sets_of(catalog.bench, 3, 8, 40.0)).unwrap();

        let workout = usecase
            .update_workout_memo(user_id, detail.workout.id, Some("Felt strong".to_string()))
            .unwrap();
        assert_eq!(workout.memo(), Some("Felt strong"));
        assert_eq!(workout.daily_score(), detail.workout.daily_score());

        let cleared = usecase
            .update_workout_memo(user_id, detail.workout.id, None)
            .unwrap();
        assert_eq!(cleared.memo(), None);
    });
}
