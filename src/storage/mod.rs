//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - persons(id, firstname, lastname, birthdate, created_at, updated_at)
//! - jobs(id, company, position, start_date, end_date, person_id -> persons.id)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
