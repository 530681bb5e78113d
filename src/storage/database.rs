//! Database operations using rusqlite.
//!
//! `Database` implements the workout, set and exercise repositories on a single
//! SQLite connection. Dates are stored as `YYYY-MM-DD` text so range filters and
//! ordering work on the raw column.

use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::workouts::exercise::{BodyPart, Exercise};
use crate::workouts::repository::{
    ExerciseRepository, WeightProgressionPoint, WorkoutRepository, WorkoutSetRepository,
};
use crate::workouts::types::{Workout, WorkoutSet};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, Params, Result as SqliteResult, Row};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        tracing::info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize pragmas and the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    // ========== Exercise Catalog ==========

    /// Insert an exercise into the catalog.
    pub fn insert_exercise(&self, exercise: &Exercise) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO exercises (id, name, description, body_part, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    exercise.id.to_string(),
                    exercise.name,
                    exercise.description,
                    exercise.body_part.map(|part| part.as_str()),
                    format_timestamp(exercise.created_at),
                    format_timestamp(exercise.updated_at),
                ],
            )
            .map_err(write_error)?;

        Ok(())
    }

    // ========== Row helpers ==========

    fn query_workouts<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Workout>, DatabaseError> {
        let mut stmt = self.conn.prepare(sql).map_err(query_error)?;
        let rows = stmt.query_map(params, WorkoutRow::from_row).map_err(query_error)?;

        let mut workouts = Vec::new();
        for row in rows {
            let row = row.map_err(query_error)?;
            workouts.push(row.into_workout()?);
        }

        Ok(workouts)
    }

    fn query_workout<P: Params>(&self, sql: &str, params: P) -> Result<Option<Workout>, DatabaseError> {
        match self.conn.query_row(sql, params, WorkoutRow::from_row) {
            Ok(row) => Ok(Some(row.into_workout()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(query_error(e)),
        }
    }

    fn query_sets<P: Params>(&self, sql: &str, params: P) -> Result<Vec<WorkoutSet>, DatabaseError> {
        let mut stmt = self.conn.prepare(sql).map_err(query_error)?;
        let rows = stmt.query_map(params, WorkoutSetRow::from_row).map_err(query_error)?;

        let mut sets = Vec::new();
        for row in rows {
            let row = row.map_err(query_error)?;
            sets.push(row.into_workout_set()?);
        }

        Ok(sets)
    }
}

impl WorkoutRepository for Database {
    fn insert_workout(&self, workout: &Workout) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO workouts (id, user_id, date, daily_score, memo, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    workout.id.to_string(),
                    workout.user_id.to_string(),
                    format_date(workout.date),
                    workout.daily_score(),
                    workout.memo(),
                    format_timestamp(workout.created_at()),
                    format_timestamp(workout.updated_at()),
                ],
            )
            .map_err(write_error)?;

        Ok(())
    }

    fn get_workout(&self, id: Uuid) -> Result<Option<Workout>, DatabaseError> {
        self.query_workout(
            "SELECT id, user_id, date, daily_score, memo, created_at, updated_at
             FROM workouts WHERE id = ?1",
            params![id.to_string()],
        )
    }

    fn list_workouts_by_user(&self, user_id: Uuid) -> Result<Vec<Workout>, DatabaseError> {
        self.query_workouts(
            "SELECT id, user_id, date, daily_score, memo, created_at, updated_at
             FROM workouts WHERE user_id = ?1
             ORDER BY date DESC",
            params![user_id.to_string()],
        )
    }

    fn list_workouts_in_range(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Workout>, DatabaseError> {
        self.query_workouts(
            "SELECT id, user_id, date, daily_score, memo, created_at, updated_at
             FROM workouts WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC",
            params![user_id.to_string(), format_date(start), format_date(end)],
        )
    }

    fn get_workout_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Workout>, DatabaseError> {
        self.query_workout(
            "SELECT id, user_id, date, daily_score, memo, created_at, updated_at
             FROM workouts WHERE user_id = ?1 AND date = ?2",
            params![user_id.to_string(), format_date(date)],
        )
    }

    fn update_workout(&self, workout: &Workout) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE workouts SET daily_score = ?2, memo = ?3, updated_at = ?4 WHERE id = ?1",
                params![
                    workout.id.to_string(),
                    workout.daily_score(),
                    workout.memo(),
                    format_timestamp(workout.updated_at()),
                ],
            )
            .map_err(write_error)?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Workout {}", workout.id)));
        }

        Ok(())
    }

    fn delete_workout(&self, id: Uuid) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM workouts WHERE id = ?1", params![id.to_string()])
            .map_err(write_error)?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Workout {}", id)));
        }

        Ok(())
    }

    fn workout_exists_on(&self, user_id: Uuid, date: NaiveDate) -> Result<bool, DatabaseError> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM workouts WHERE user_id = ?1 AND date = ?2)",
                params![user_id.to_string(), format_date(date)],
                |row| row.get(0),
            )
            .map_err(query_error)
    }
}

impl WorkoutSetRepository for Database {
    fn insert_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO workout_sets (id, workout_id, exercise_id, set_number, reps, weight,
                 estimated_1rm, duration_seconds, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    set.id.to_string(),
                    set.workout_id.to_string(),
                    set.exercise_id.to_string(),
                    set.set_number,
                    set.reps(),
                    set.weight(),
                    set.estimated_1rm(),
                    set.duration_seconds(),
                    set.notes(),
                    format_timestamp(set.created_at()),
                ],
            )
            .map_err(write_error)?;

        Ok(())
    }

    fn get_set(&self, id: Uuid) -> Result<Option<WorkoutSet>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, workout_id, exercise_id, set_number, reps, weight, estimated_1rm,
             duration_seconds, notes, created_at
             FROM workout_sets WHERE id = ?1",
            params![id.to_string()],
            WorkoutSetRow::from_row,
        );

        match result {
            Ok(row) => Ok(Some(row.into_workout_set()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(query_error(e)),
        }
    }

    fn list_sets_by_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError> {
        self.query_sets(
            "SELECT id, workout_id, exercise_id, set_number, reps, weight, estimated_1rm,
             duration_seconds, notes, created_at
             FROM workout_sets WHERE workout_id = ?1
             ORDER BY exercise_id, set_number, created_at",
            params![workout_id.to_string()],
        )
    }

    fn list_sets_by_workout_and_exercise(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WorkoutSet>, DatabaseError> {
        self.query_sets(
            "SELECT id, workout_id, exercise_id, set_number, reps, weight, estimated_1rm,
             duration_seconds, notes, created_at
             FROM workout_sets WHERE workout_id = ?1 AND exercise_id = ?2
             ORDER BY set_number, created_at",
            params![workout_id.to_string(), exercise_id.to_string()],
        )
    }

    fn list_sets_by_exercise(&self, exercise_id: Uuid) -> Result<Vec<WorkoutSet>, DatabaseError> {
        self.query_sets(
            "SELECT id, workout_id, exercise_id, set_number, reps, weight, estimated_1rm,
             duration_seconds, notes, created_at
             FROM workout_sets WHERE exercise_id = ?1
             ORDER BY created_at DESC",
            params![exercise_id.to_string()],
        )
    }

    fn update_set(&self, set: &WorkoutSet) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE workout_sets SET reps = ?2, weight = ?3, estimated_1rm = ?4,
                 duration_seconds = ?5, notes = ?6 WHERE id = ?1",
                params![
                    set.id.to_string(),
                    set.reps(),
                    set.weight(),
                    set.estimated_1rm(),
                    set.duration_seconds(),
                    set.notes(),
                ],
            )
            .map_err(write_error)?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Workout set {}", set.id)));
        }

        Ok(())
    }

    fn delete_set(&self, id: Uuid) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM workout_sets WHERE id = ?1", params![id.to_string()])
            .map_err(write_error)?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Workout set {}", id)));
        }

        Ok(())
    }

    fn delete_sets_by_workout(&self, workout_id: Uuid) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM workout_sets WHERE workout_id = ?1",
                params![workout_id.to_string()],
            )
            .map_err(write_error)
    }

    fn max_estimated_1rm(&self, user_id: Uuid, exercise_id: Uuid) -> Result<f64, DatabaseError> {
        self.conn
            .query_row(
                "SELECT COALESCE(MAX(s.estimated_1rm), 0.0)
                 FROM workout_sets s
                 JOIN workouts w ON w.id = s.workout_id
                 WHERE w.user_id = ?1 AND s.exercise_id = ?2",
                params![user_id.to_string(), exercise_id.to_string()],
                |row| row.get(0),
            )
            .map_err(query_error)
    }

    fn weight_progression(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<WeightProgressionPoint>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT w.date, MAX(s.estimated_1rm)
                 FROM workout_sets s
                 JOIN workouts w ON w.id = s.workout_id
                 WHERE w.user_id = ?1 AND s.exercise_id = ?2
                 GROUP BY w.date
                 ORDER BY w.date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![user_id.to_string(), exercise_id.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(query_error)?;

        let mut points = Vec::new();
        for row in rows {
            let (date, max_1rm) = row.map_err(query_error)?;
            points.push(WeightProgressionPoint {
                date: parse_date(&date)?,
                max_1rm,
            });
        }

        Ok(points)
    }
}

impl ExerciseRepository for Database {
    fn get_exercise(&self, id: Uuid) -> Result<Option<Exercise>, DatabaseError> {
        let result = self.conn.query_row(
            "SELECT id, name, description, body_part, created_at, updated_at
             FROM exercises WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok(ExerciseRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    body_part: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_exercise()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(query_error(e)),
        }
    }
}

fn query_error(e: rusqlite::Error) -> DatabaseError {
    DatabaseError::QueryFailed(e.to_string())
}

/// Classify a failed write, keeping constraint failures distinguishable.
fn write_error(e: rusqlite::Error) -> DatabaseError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(e.to_string())
        }
        other => DatabaseError::QueryFailed(other.to_string()),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid {} UUID: {}", field, e)))
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid {}: {}", field, e)))
}

/// Internal row type for workout queries.
struct WorkoutRow {
    id: String,
    user_id: String,
    date: String,
    daily_score: i32,
    memo: Option<String>,
    created_at: String,
    updated_at: String,
}

impl WorkoutRow {
    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            daily_score: row.get(3)?,
            memo: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_workout(self) -> Result<Workout, DatabaseError> {
        Ok(Workout::restore(
            parse_uuid(&self.id, "workout")?,
            parse_uuid(&self.user_id, "user")?,
            parse_date(&self.date)?,
            self.daily_score,
            self.memo,
            parse_timestamp(&self.created_at, "created_at")?,
            parse_timestamp(&self.updated_at, "updated_at")?,
        ))
    }
}

/// Internal row type for workout set queries.
struct WorkoutSetRow {
    id: String,
    workout_id: String,
    exercise_id: String,
    set_number: i32,
    reps: i32,
    weight: f64,
    estimated_1rm: f64,
    duration_seconds: Option<i32>,
    notes: Option<String>,
    created_at: String,
}

impl WorkoutSetRow {
    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            workout_id: row.get(1)?,
            exercise_id: row.get(2)?,
            set_number: row.get(3)?,
            reps: row.get(4)?,
            weight: row.get(5)?,
            estimated_1rm: row.get(6)?,
            duration_seconds: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn into_workout_set(self) -> Result<WorkoutSet, DatabaseError> {
        Ok(WorkoutSet::restore(
            parse_uuid(&self.id, "set")?,
            parse_uuid(&self.workout_id, "workout")?,
            parse_uuid(&self.exercise_id, "exercise")?,
            self.set_number,
            self.reps,
            self.weight,
            self.estimated_1rm,
            self.duration_seconds,
            self.notes,
            parse_timestamp(&self.created_at, "created_at")?,
        ))
    }
}

/// Internal row type for exercise queries.
struct ExerciseRow {
    id: String,
    name: String,
    description: Option<String>,
    body_part: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ExerciseRow {
    fn into_exercise(self) -> Result<Exercise, DatabaseError> {
        let body_part = match self.body_part {
            Some(value) => Some(BodyPart::parse(&value).ok_or_else(|| {
                DatabaseError::DeserializationError(format!("Unknown body part: {}", value))
            })?),
            None => None,
        };

        Ok(Exercise {
            id: parse_uuid(&self.id, "exercise")?,
            name: self.name,
            description: self.description,
            body_part,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
