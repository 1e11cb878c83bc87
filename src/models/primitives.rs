//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around identifiers and the
//! validated [`DateRange`] used by video queries.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::{Error, Result};

/// Wire format of dates in query bodies.
const DATE_FORMAT: &str = "%Y%m%d";

/// A TikTok username (the handle, not the display name).
///
/// # Example
///
/// ```
/// use tiktok_research::Username;
///
/// let user = Username::new("tiktok");
/// assert_eq!(user.as_str(), "tiktok");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create a new username from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.0.trim().is_empty() {
            return Err(Error::InvalidInput("username must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A strongly-typed video ID (also called `item_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(i64);

impl VideoId {
    /// Create a new video ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw numeric ID.
    pub fn get(&self) -> i64 {
        self.0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.0 <= 0 {
            return Err(Error::InvalidInput(format!(
                "video id must be positive, got {}",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// An inclusive range of calendar dates.
///
/// The start is never after the end; this is checked when the range is built,
/// so a query holding a `DateRange` can't reach the network with an inverted
/// range.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use tiktok_research::DateRange;
///
/// let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
/// let range = DateRange::new(start, end).expect("valid range");
/// assert_eq!(range.days(), 5);
///
/// assert!(DateRange::new(end, start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a new range, validating that `start <= end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the start date is after the end date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// A range of `days` days ending on `end` (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `days` is zero or the start date
    /// would fall outside the supported calendar.
    pub fn ending_on(end: NaiveDate, days: u64) -> Result<Self> {
        if days == 0 {
            return Err(Error::InvalidInput("date range must span at least one day".to_string()));
        }
        let start = end
            .checked_sub_days(Days::new(days - 1))
            .ok_or_else(|| Error::InvalidInput(format!("{} days before {} is out of range", days, end)))?;
        Self::new(start, end)
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Check whether a date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..={}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Serialize a date the way the query endpoints expect it (`YYYYMMDD`).
pub(crate) fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
}
