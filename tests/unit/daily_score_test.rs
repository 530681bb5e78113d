//! Unit tests for daily score and 1RM calculation.

use chrono::NaiveDate;
use rustlift::workouts::types::{MAX_DAILY_SCORE, POINTS_PER_SET};
use rustlift::workouts::{estimate_1rm, Workout, WorkoutSet};
use uuid::Uuid;

#[test]
fn test_score_table() {
    let cases = [
        (0, 0.0, 0),
        (1, 100.0, 5),
        (4, 1_000.0, 20),
        (4, 1_000.5, 30),
        (6, 5_500.0, 50),
        (10, 10_000.1, 80),
        (30, 0.0, 100),
    ];

    for (sets, volume, expected) in cases {
        assert_eq!(
            Workout::calculate_daily_score(sets, volume),
            expected,
            "{} sets, {} kg",
            sets,
            volume
        );
    }
}

#[test]
fn test_score_never_exceeds_cap() {
    for sets in [20, 21, 100, usize::MAX] {
        assert_eq!(Workout::calculate_daily_score(sets, 50_000.0), MAX_DAILY_SCORE);
    }
    assert_eq!(POINTS_PER_SET, 5);
}

#[test]
fn test_epley_estimates() {
    assert_eq!(estimate_1rm(100.0, 1), 100.0);
    assert!((estimate_1rm(100.0, 10) - 133.333).abs() < 0.001);
    assert!((estimate_1rm(60.0, 5) - 70.0).abs() < 1e-9);
    assert_eq!(estimate_1rm(100.0, 0), 0.0);
    assert_eq!(estimate_1rm(0.0, 8), 0.0);
}

#[test]
fn test_recalculate_from_sets() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut workout = Workout::new(Uuid::new_v4(), date);
    let exercise_id = Uuid::new_v4();

    // 3 x 10 x 40 kg = 1200 kg
    let sets: Vec<WorkoutSet> = (1..=3)
        .map(|n| WorkoutSet::new(workout.id, exercise_id, n, 10, 40.0).unwrap())
        .collect();

    assert_eq!(workout.recalculate_daily_score(&sets).unwrap(), 25);
    assert_eq!(workout.daily_score(), 25);

    assert_eq!(workout.recalculate_daily_score(&[]).unwrap(), 0);
}
