//! Core data types for pager-hours.
//!
//! This module defines the primary types used throughout the library:
//! - [`Region`] - Office region selecting a holiday calendar
//! - [`Bucket`] - Category an on-call hour is classified into
//! - [`Holiday`] - A named public holiday
//! - [`HourWindow`] / [`ReportConfig`] - Office-hours and night windows
//! - [`ScheduleSegment`] / [`Incident`] / [`UserDetails`] - Provider data
//! - [`Worker`] - A user with a resolved timezone and region
//! - [`Workload`] / [`ReportRow`] - Aggregated counts

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PagerHoursError, Result};

/// Office region. Each region has its own holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Berlin,
    Bulgaria,
    California,
    /// Shares the US calendar with [`Region::California`].
    #[serde(rename = "New York")]
    NewYork,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Berlin,
        Region::Bulgaria,
        Region::California,
        Region::NewYork,
    ];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Berlin => write!(f, "Berlin"),
            Region::Bulgaria => write!(f, "Bulgaria"),
            Region::California => write!(f, "California"),
            Region::NewYork => write!(f, "New York"),
        }
    }
}

impl FromStr for Region {
    type Err = PagerHoursError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "berlin" => Ok(Region::Berlin),
            "bulgaria" => Ok(Region::Bulgaria),
            "california" => Ok(Region::California),
            "newyork" => Ok(Region::NewYork),
            _ => Err(PagerHoursError::UnsupportedRegion(s.to_string())),
        }
    }
}

/// The category of an on-call hour.
///
/// Variants are declared in classification priority order, which is
/// also the order rows of one user and day appear in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Holiday,
    Sunday,
    Saturday,
    OfficeHours,
    Weekday,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Holiday => write!(f, "holiday"),
            Bucket::Sunday => write!(f, "sunday"),
            Bucket::Saturday => write!(f, "saturday"),
            Bucket::OfficeHours => write!(f, "officehours"),
            Bucket::Weekday => write!(f, "weekday"),
        }
    }
}

/// A public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub name: &'static str,
}

/// Half-open range of hours of the day, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourWindow {
    pub start: u32,
    pub end: u32,
}

impl HourWindow {
    /// Office hours used when nothing else is configured.
    pub const OFFICE_HOURS: HourWindow = HourWindow { start: 10, end: 18 };
    /// Night hours used when nothing else is configured.
    pub const NIGHT: HourWindow = HourWindow { start: 0, end: 8 };

    /// Build a window, rejecting empty windows and hours past 24.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start >= end || end > 24 {
            return Err(PagerHoursError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour < self.end
    }
}

/// Windows controlling classification and the day/night incident split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportConfig {
    /// Local hours counted as office hours on regular workdays.
    pub office_hours: HourWindow,
    /// UTC hours in which an incident counts as a night incident.
    pub night: HourWindow,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            office_hours: HourWindow::OFFICE_HOURS,
            night: HourWindow::NIGHT,
        }
    }
}

/// One user's on-call shift, `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSegment {
    pub user_id: String,
    pub user_email: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScheduleSegment {
    /// Hourly steps of the segment, beginning at `start` and stopping before `end`.
    pub fn hours(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        std::iter::successors(Some(self.start), |current| {
            Some(*current + Duration::hours(1))
        })
        .take_while(|current| *current < self.end)
    }
}

/// An incident as seen by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub created_at: DateTime<Utc>,
    pub escalation_policy_id: String,
}

/// A user record from the provider's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Provider timezone name, either a display name ("Berlin") or IANA name.
    pub time_zone: String,
}

/// A user resolved to a concrete timezone and office region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    pub id: String,
    pub email: String,
    pub name: String,
    pub time_zone: Tz,
    pub region: Region,
}

/// Hour counts for one (user, bucket) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub oncall: u32,
    pub incidents_day: u32,
    pub incidents_night: u32,
}

impl Workload {
    pub fn is_empty(&self) -> bool {
        self.oncall == 0 && self.incidents_day == 0 && self.incidents_night == 0
    }
}

/// A flushed (day, user, bucket) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub email: String,
    /// IANA name of the user's timezone.
    pub time_zone: String,
    pub region: Region,
    pub bucket: Bucket,
    #[serde(flatten)]
    pub workload: Workload,
}
