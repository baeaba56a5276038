//! Job types and the date-range overlap predicate

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::check_storable;
use crate::{Error, Result};

/// An employment record owned by exactly one person.
///
/// `end_date` of `None` means the job is ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub person_id: Uuid,
}

impl Job {
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Request payload for creating a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub company: String,
    pub position: String,
    #[serde(deserialize_with = "crate::dates::deserialize_date")]
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "crate::dates::deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
    pub person_id: Uuid,
}

impl NewJob {
    pub fn new(
        company: impl Into<String>,
        position: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        person_id: Uuid,
    ) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            start_date,
            end_date,
            person_id,
        }
    }

    /// Validate the date span and assign a fresh id.
    pub fn into_job(self) -> Result<Job> {
        check_storable(self.start_date)?;
        if let Some(end) = self.end_date {
            check_storable(end)?;
            if end < self.start_date {
                return Err(Error::Validation(
                    "End date cannot be earlier than start date.".to_string(),
                ));
            }
        }

        Ok(Job {
            id: Uuid::new_v4(),
            company: self.company,
            position: self.position,
            start_date: self.start_date,
            end_date: self.end_date,
            person_id: self.person_id,
        })
    }
}

/// Inclusive calendar range used by the overlap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A job overlaps when it starts on or before the range end and either
    /// ends on or after the range start or has no end at all.
    ///
    /// Must stay in sync with the `WHERE` clause of
    /// [`SqliteStore::find_jobs_in_range`](crate::storage::SqliteStore::find_jobs_in_range).
    pub fn overlaps(&self, job: &Job) -> bool {
        job.start_date <= self.end && job.end_date.is_none_or(|end| end >= self.start)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
