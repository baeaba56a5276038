//! Calendar date parsing shared by request bodies, query strings and the CLI.
//!
//! Dates travel as `YYYY-MM-DD`. Full RFC 3339 timestamps are tolerated and
//! reduced to their UTC calendar date.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Years whose `YYYY-MM-DD` text sorts the same way the dates do.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Parse a calendar date, normalizing timestamps to UTC.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date = match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => date,
        Err(_) => DateTime::parse_from_rfc3339(trimmed)
            .map(|ts| ts.with_timezone(&Utc).date_naive())
            .map_err(|_| Error::InvalidDate(input.to_string()))?,
    };
    check_storable(date)
}

/// Reject dates outside four-digit years; the store compares dates as text.
pub fn check_storable(date: NaiveDate) -> Result<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(Error::InvalidDate(format!(
            "{date} (year must be between {MIN_YEAR} and {MAX_YEAR})"
        )));
    }
    Ok(date)
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_date(&raw).map(Some).map_err(serde::de::Error::custom),
    }
}
