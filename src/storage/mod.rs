//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod memory;
pub mod schema;

pub use config::{AppConfig, ConfigError, DatabaseSettings, LoggingSettings};
pub use database::{Database, DatabaseError};
pub use memory::MemoryStore;
