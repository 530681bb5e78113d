//! Integration tests for workout history, contribution data and progression.

use chrono::NaiveDate;
use rustlift::storage::config::{load_config_from, save_config_to, AppConfig};
use rustlift::storage::Database;
use rustlift::workouts::{estimate_1rm, Exercise, RecordWorkoutInput, SetInput, WorkoutUsecase};
use uuid::Uuid;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn record_day(usecase: &WorkoutUsecase<'_>, user_id: Uuid, date: NaiveDate, sets: Vec<SetInput>) {
    usecase
        .record_workout(RecordWorkoutInput {
            user_id,
            date,
            memo: None,
            sets,
        })
        .expect("Failed to record workout");
}

#[test]
fn test_history_listing_and_contributions() {
    let db = Database::open_in_memory().expect("Failed to create database");
    let deadlift = Exercise::new("Deadlift");
    db.insert_exercise(&deadlift).unwrap();
    let usecase = WorkoutUsecase::with_store(&db);
    let user_id = Uuid::new_v4();

    for (date, count) in [(day(1, 10), 1), (day(1, 20), 2), (day(2, 5), 3), (day(3, 1), 4)] {
        let sets = (1..=count)
            .map(|n| SetInput::new(deadlift.id, n, 3, 100.0))
            .collect();
        record_day(&usecase, user_id, date, sets);
    }

    let all = usecase.get_user_workouts(user_id, None, None).unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|w| w.date).collect();
    assert_eq!(dates, vec![day(3, 1), day(2, 5), day(1, 20), day(1, 10)]);

    // A single bound is ignored
    assert_eq!(
        usecase
            .get_user_workouts(user_id, Some(day(2, 1)), None)
            .unwrap()
            .len(),
        4
    );

    let january = usecase
        .get_user_workouts(user_id, Some(day(1, 10)), Some(day(1, 31)))
        .unwrap();
    assert_eq!(january.len(), 2);

    let contributions = usecase
        .get_contribution_data(user_id, day(1, 15), day(2, 29))
        .unwrap();
    assert_eq!(contributions.len(), 2);
    assert_eq!(contributions[0].date, day(2, 5));
    // 3 sets x 300 kg = 900 kg, below the first tier
    assert_eq!(contributions[0].daily_score, 15);
    assert_eq!(contributions[1].date, day(1, 20));
    assert_eq!(contributions[1].daily_score, 10);

    assert!(usecase
        .get_contribution_data(user_id, day(3, 1), day(1, 1))
        .unwrap()
        .is_empty());
    assert!(usecase
        .get_contribution_data(Uuid::new_v4(), day(1, 1), day(12, 31))
        .unwrap()
        .is_empty());
}

#[test]
fn test_weight_progression_per_day() {
    let db = Database::open_in_memory().expect("Failed to create database");
    let squat = Exercise::new("Back Squat");
    let press = Exercise::new("Overhead Press");
    db.insert_exercise(&squat).unwrap();
    db.insert_exercise(&press).unwrap();
    let usecase = WorkoutUsecase::with_store(&db);
    let user_id = Uuid::new_v4();

    record_day(
        &usecase,
        user_id,
        day(5, 20),
        vec![
            SetInput::new(squat.id, 1, 5, 140.0),
            SetInput::new(squat.id, 2, 1, 160.0),
            SetInput::new(press.id, 1, 5, 60.0),
        ],
    );
    record_day(
        &usecase,
        user_id,
        day(5, 13),
        vec![SetInput::new(squat.id, 1, 8, 120.0)],
    );
    record_day(
        &usecase,
        user_id,
        day(5, 27),
        vec![SetInput::new(press.id, 1, 3, 65.0)],
    );

    let progression = usecase.get_weight_progression(user_id, squat.id).unwrap();
    assert_eq!(progression.len(), 2);
    assert_eq!(progression[0].date, day(5, 13));
    assert_eq!(progression[0].max_1rm, estimate_1rm(120.0, 8));
    assert_eq!(progression[1].date, day(5, 20));
    // 140 x 5 estimates to ~163.3, above the 160 single
    assert_eq!(progression[1].max_1rm, estimate_1rm(140.0, 5));

    let json = serde_json::to_value(&progression).unwrap();
    assert_eq!(json[0]["date"], "2024-05-13");

    assert!(usecase
        .get_weight_progression(Uuid::new_v4(), squat.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_workouts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.database.file_name = "history.db".to_string();
    save_config_to(&config, &config_path).unwrap();
    let config = load_config_from(&config_path).unwrap();

    let user_id = Uuid::new_v4();
    let bench = Exercise::new("Bench Press");
    let workout_id = {
        let db = Database::open(&config.database_path()).expect("Failed to open database");
        db.insert_exercise(&bench).unwrap();
        let usecase = WorkoutUsecase::with_store(&db);
        usecase
            .record_workout(RecordWorkoutInput {
                user_id,
                date: day(6, 1),
                memo: Some("Opener".to_string()),
                sets: vec![SetInput::new(bench.id, 1, 5, 80.0)],
            })
            .unwrap()
            .workout
            .id
    };

    assert!(dir.path().join("history.db").exists());

    let db = Database::open(&config.database_path()).expect("Failed to reopen database");
    let usecase = WorkoutUsecase::with_store(&db);
    let detail = usecase.get_workout(user_id, workout_id).unwrap();
    assert_eq!(detail.workout.memo(), Some("Opener"));
    assert_eq!(detail.workout.daily_score(), 5);
    assert_eq!(detail.sets[0].weight(), 80.0);
}
