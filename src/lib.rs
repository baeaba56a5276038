//! # Careerlog - people and their employment history
//!
//! Careerlog provides:
//! - Plain data types for persons and the jobs they hold
//! - Validation of birth dates and job date ranges
//! - SQLite-backed storage with foreign-key integrity between jobs and persons
//! - The date-range overlap query over a person's jobs
//! - An axum REST API and a small CLI over the same store

pub mod dates;
pub mod person;
pub mod job;
pub mod storage;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use person::{NewPerson, Person, PersonRecord};
pub use job::{DateRange, Job, NewJob};
pub use storage::SqliteStore;

/// Result type alias for Careerlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Careerlog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input that is malformed or breaks a model constraint.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
