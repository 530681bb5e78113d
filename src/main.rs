//! RustLift - Strength Training Log
//!
//! Read-only reports over the workout database, printed as JSON.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rustlift::storage::config::load_config;
use rustlift::storage::Database;
use rustlift::workouts::WorkoutUsecase;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

const USAGE: &str = "usage:
  rustlift workouts <user-id> [<start> <end>]
  rustlift contributions <user-id> <start> <end>
  rustlift progression <user-id> <exercise-id>";

fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting RustLift v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("missing command\n{}", USAGE);
    };

    let db = Database::open(&config.database_path())
        .with_context(|| format!("Failed to open {}", config.database_path().display()))?;
    let usecase = WorkoutUsecase::with_store(&db);

    let output = match (command.as_str(), &args[1..]) {
        ("workouts", [user]) => {
            serde_json::to_string_pretty(&usecase.get_user_workouts(parse_id(user)?, None, None)?)?
        }
        ("workouts", [user, start, end]) => serde_json::to_string_pretty(
            &usecase.get_user_workouts(parse_id(user)?, Some(parse_date(start)?), Some(parse_date(end)?))?,
        )?,
        ("contributions", [user, start, end]) => serde_json::to_string_pretty(
            &usecase.get_contribution_data(parse_id(user)?, parse_date(start)?, parse_date(end)?)?,
        )?,
        ("progression", [user, exercise]) => serde_json::to_string_pretty(
            &usecase.get_weight_progression(parse_id(user)?, parse_id(exercise)?)?,
        )?,
        _ => bail!("unrecognized arguments\n{}", USAGE),
    };

    println!("{}", output);
    Ok(())
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid id: {}", value))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", value))
}
