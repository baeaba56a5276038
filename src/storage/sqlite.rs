//! SQLite storage implementation

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use uuid::Uuid;

use super::schema;
use crate::job::{DateRange, Job};
use crate::person::{Person, PersonRecord};
use crate::{Error, Result};

const PERSON_COLUMNS: &str = "id, firstname, lastname, birthdate, created_at, updated_at";
const JOB_COLUMNS: &str = "id, company, position, start_date, end_date, person_id";

/// SQLite-backed storage for persons and their jobs
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::ENABLE_FOREIGN_KEYS)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Person Operations ==========

    /// Insert a validated person
    pub fn insert_person(&self, person: &Person) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO persons (id, firstname, lastname, birthdate, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    person.id.to_string(),
                    person.firstname,
                    person.lastname,
                    person.birthdate,
                    person.created_at,
                    person.updated_at,
                ],
            )
            .map_err(constraint_as_validation)?;
        Ok(())
    }

    /// Get a person by id, without jobs
    pub fn get_person(&self, id: &Uuid) -> Result<Option<Person>> {
        self.conn
            .query_row(
                &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
                [id.to_string()],
                row_to_person,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a person with all of their jobs nested
    pub fn get_person_record(&self, id: &Uuid) -> Result<Option<PersonRecord>> {
        let Some(person) = self.get_person(id)? else {
            return Ok(None);
        };
        let jobs = self.jobs_for_person(id)?;
        Ok(Some(PersonRecord::new(person, jobs)))
    }

    /// All persons with their jobs, in insertion order
    pub fn list_person_records(&self) -> Result<Vec<PersonRecord>> {
        let persons = self.query_persons(
            &format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY rowid"),
            params![],
        )?;
        let jobs = self.query_jobs(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY rowid"), params![])?;
        Ok(nest_jobs(persons, jobs))
    }

    /// Persons with at least one job at `company` (exact match).
    ///
    /// Each record carries only the jobs at that company.
    pub fn find_persons_by_company(&self, company: &str) -> Result<Vec<PersonRecord>> {
        let persons = self.query_persons(
            &format!(
                "SELECT {PERSON_COLUMNS} FROM persons
                 WHERE id IN (SELECT person_id FROM jobs WHERE company = ?1)
                 ORDER BY rowid"
            ),
            [company],
        )?;
        let jobs = self.query_jobs(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE company = ?1 ORDER BY rowid"),
            [company],
        )?;
        Ok(nest_jobs(persons, jobs))
    }

    /// Count all persons
    pub fn count_persons(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM persons", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Job Operations ==========

    /// Insert a validated job.
    ///
    /// A missing owner surfaces as [`Error::Validation`] through the foreign key.
    pub fn insert_job(&self, job: &Job) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO jobs (id, company, position, start_date, end_date, person_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    job.id.to_string(),
                    job.company,
                    job.position,
                    job.start_date,
                    job.end_date,
                    job.person_id.to_string(),
                ],
            )
            .map_err(constraint_as_validation)?;
        Ok(())
    }

    /// All jobs owned by a person, in insertion order
    pub fn jobs_for_person(&self, person_id: &Uuid) -> Result<Vec<Job>> {
        self.query_jobs(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE person_id = ?1 ORDER BY rowid"),
            [person_id.to_string()],
        )
    }

    /// Jobs of a person overlapping an inclusive date range.
    ///
    /// Same predicate as [`DateRange::overlaps`], with a NULL end date
    /// standing for an ongoing job.
    pub fn find_jobs_in_range(&self, person_id: &Uuid, range: &DateRange) -> Result<Vec<Job>> {
        self.query_jobs(
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs
                 WHERE person_id = ?1
                   AND start_date <= ?3
                   AND (end_date >= ?2 OR end_date IS NULL)
                 ORDER BY rowid"
            ),
            params![person_id.to_string(), range.start, range.end],
        )
    }

    /// Count all jobs
    pub fn count_jobs(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Stats ==========

    pub fn stats(&self) -> Result<DbStats> {
        let ongoing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE end_date IS NULL",
            [],
            |row| row.get(0),
        )?;
        let companies: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT company) FROM jobs",
            [],
            |row| row.get(0),
        )?;

        Ok(DbStats {
            persons: self.count_persons()?,
            jobs: self.count_jobs()?,
            ongoing_jobs: ongoing as usize,
            companies: companies as usize,
        })
    }

    fn query_persons<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Person>> {
        let mut stmt = self.conn.prepare(sql)?;
        let persons = stmt
            .query_map(params, row_to_person)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(persons)
    }

    fn query_jobs<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Job>> {
        let mut stmt = self.conn.prepare(sql)?;
        let jobs = stmt
            .query_map(params, row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(jobs)
    }
}

/// Constraint failures are caused by the caller's data, not by the store.
fn constraint_as_validation(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Error::Validation(message.clone().unwrap_or_else(|| failure.to_string()))
        }
        _ => Error::Storage(err),
    }
}

/// Attach each job to its owner, keeping both orders intact.
fn nest_jobs(persons: Vec<Person>, jobs: Vec<Job>) -> Vec<PersonRecord> {
    let mut by_person: HashMap<Uuid, Vec<Job>> = HashMap::new();
    for job in jobs {
        by_person.entry(job.person_id).or_default().push(job);
    }

    persons
        .into_iter()
        .map(|person| {
            let jobs = by_person.remove(&person.id).unwrap_or_default();
            PersonRecord::new(person, jobs)
        })
        .collect()
}

fn parse_uuid(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_person(row: &rusqlite::Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: parse_uuid(row, 0)?,
        firstname: row.get(1)?,
        lastname: row.get(2)?,
        birthdate: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
    Ok(Job {
        id: parse_uuid(row, 0)?,
        company: row.get(1)?,
        position: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        person_id: parse_uuid(row, 5)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub persons: usize,
    pub jobs: usize,
    pub ongoing_jobs: usize,
    pub companies: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Persons: {}", self.persons)?;
        writeln!(f, "  Jobs: {}", self.jobs)?;
        writeln!(f, "  Ongoing jobs: {}", self.ongoing_jobs)?;
        writeln!(f, "  Companies: {}", self.companies)
    }
}
