//! Database schema definitions

/// Foreign keys are off by default in SQLite and must be enabled per connection.
pub const ENABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = ON";

/// SQL to create the persons table
pub const CREATE_PERSONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS persons (
    id TEXT PRIMARY KEY,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL,
    birthdate TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create the jobs table
/// Dates are ISO `YYYY-MM-DD` text so lexical comparison is date comparison.
pub const CREATE_JOBS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    company TEXT NOT NULL,
    position TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    person_id TEXT NOT NULL REFERENCES persons(id),
    CHECK (end_date IS NULL OR end_date >= start_date)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_jobs_person ON jobs(person_id)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_PERSONS_TABLE, CREATE_JOBS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
