//! Calendar (month, day) key for seasonally-varying thresholds.

use chrono::{DateTime, Datelike, Utc};

use crate::error::BackendError;

/// Maximum day for each month (index 0 unused, index 1 = January, ...).
///
/// February allows 29 so that observations timestamped on leap days can
/// resolve day-keyed thresholds.
const DAYS_PER_MONTH: [u8; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A calendar day within a year, ignoring which year.
///
/// Used to key seasonally-varying threshold cutoffs (e.g. day-of-year
/// percentiles): a threshold record for (3, 15) applies to every observation
/// timestamped on March 15, whatever the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day {
    month: u8,
    day: u8,
}

impl Day {
    /// Creates a new `Day` from a (month, day) pair.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDay`] if `month` is not in 1..=12 or
    /// `day` is not valid for the given month.
    pub fn new(month: u8, day: u8) -> Result<Self, BackendError> {
        if !(1..=12).contains(&month) {
            return Err(BackendError::InvalidDay { month, day });
        }
        let max_day = DAYS_PER_MONTH[month as usize];
        if !(1..=max_day).contains(&day) {
            return Err(BackendError::InvalidDay { month, day });
        }
        Ok(Self { month, day })
    }

    /// Derives the `Day` key from a timestamp.
    pub fn from_datetime(timestamp: &DateTime<Utc>) -> Self {
        Self {
            month: timestamp.month() as u8,
            day: timestamp.day() as u8,
        }
    }

    /// Parses `"MM-DD"` or `"MM/DD"` text.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidDay`] when the text is not a valid
    /// month-day pair.
    pub fn parse(text: &str) -> Result<Self, BackendError> {
        let mut parts = text.splitn(2, ['-', '/']);
        let month = parts.next().and_then(|p| p.trim().parse::<u8>().ok());
        let day = parts.next().and_then(|p| p.trim().parse::<u8>().ok());
        match (month, day) {
            (Some(month), Some(day)) => Self::new(month, day),
            _ => Err(BackendError::InvalidDay { month: 0, day: 0 }),
        }
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Returns the day within the month.
    pub fn day(self) -> u8 {
        self.day
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}
