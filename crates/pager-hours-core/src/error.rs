//! Error types for pager-hours-core.
//!
//! The variants fall into three groups: configuration gaps (unknown
//! regions, unmapped timezones, bad windows), calendar data gaps, and
//! violations of the aggregator's input ordering.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for pager-hours operations.
#[derive(Debug, Error)]
pub enum PagerHoursError {
    /// Region name that has no holiday calendar.
    #[error("Region not supported: {0}")]
    UnsupportedRegion(String),

    /// Provider timezone name with no office region mapped to it.
    #[error("No office known for timezone: {0}")]
    UnmappedTimezone(String),

    /// Invalid IANA timezone name.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The Orthodox Easter table has no entry for this year.
    #[error("Don't know orthodox easter for year {year}")]
    MissingOrthodoxEaster { year: i32 },

    /// A schedule segment references a user missing from the roster.
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// An hour event went back to a day that was already flushed.
    #[error("Hour stream went back in time: day {day} arrived after {open_day} was opened")]
    OutOfOrder { open_day: NaiveDate, day: NaiveDate },

    /// An hour-of-day window that is empty or exceeds 24 hours.
    #[error("Invalid hour window: {start}..{end}")]
    InvalidWindow { start: u32, end: u32 },

    /// A date that cannot be constructed or parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// CSV encoding or I/O failure while emitting the report.
    #[error("Report error: {0}")]
    Report(String),
}

impl PagerHoursError {
    /// Whether this error stems from configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PagerHoursError::UnsupportedRegion(_)
                | PagerHoursError::UnmappedTimezone(_)
                | PagerHoursError::InvalidTimezone(_)
                | PagerHoursError::UnknownUser(_)
                | PagerHoursError::InvalidWindow { .. }
        )
    }
}

/// Result type alias for pager-hours operations.
pub type Result<T> = std::result::Result<T, PagerHoursError>;
