//! Person types
//!
//! A `Person` is the identity row. A `PersonRecord` is a person together with
//! the jobs they own, which is what the list and lookup endpoints return.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::check_storable;
use crate::job::Job;
use crate::{Error, Result};

/// Oldest accepted birth date, counted back from today.
pub const MAX_AGE_YEARS: u32 = 150;

/// An individual tracked by the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub birthdate: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Request payload for creating a person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    pub firstname: String,
    pub lastname: String,
    #[serde(deserialize_with = "crate::dates::deserialize_date")]
    pub birthdate: NaiveDate,
}

impl NewPerson {
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        birthdate: NaiveDate,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            birthdate,
        }
    }

    /// Validate and turn the payload into a person with a fresh id.
    ///
    /// `now` decides both the timestamps and the birth date bound.
    pub fn into_person(self, now: DateTime<Utc>) -> Result<Person> {
        check_storable(self.birthdate)?;
        validate_birthdate(self.birthdate, now.date_naive())?;

        Ok(Person {
            id: Uuid::new_v4(),
            firstname: self.firstname,
            lastname: self.lastname,
            birthdate: self.birthdate,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Reject birth dates more than [`MAX_AGE_YEARS`] before `today`.
pub fn validate_birthdate(birthdate: NaiveDate, today: NaiveDate) -> Result<()> {
    let oldest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN);

    if birthdate < oldest {
        return Err(Error::Validation("Birth date is too far in the past.".to_string()));
    }
    Ok(())
}

/// A person with their jobs nested, as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(flatten)]
    pub person: Person,
    pub jobs: Vec<Job>,
}

impl PersonRecord {
    pub fn new(person: Person, jobs: Vec<Job>) -> Self {
        Self { person, jobs }
    }

    /// Jobs without an end date, in insertion order.
    pub fn ongoing_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|job| job.is_ongoing())
    }
}
