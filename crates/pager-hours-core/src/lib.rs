//! # pager-hours-core
//!
//! On-call hour bucketing with regional holiday calendars.
//!
//! This library turns a rotation's schedule segments into per-user,
//! per-day hour counts, split by the kind of hour that was spent on call.
//!
//! ## Features
//!
//! - **Holiday Calendars**: Berlin, Bulgaria and the US (California, New York),
//!   with Easter-relative movable feasts and nth-weekday rules.
//! - **Local Classification**: Every hour is classified on the user's own wall
//!   clock into holiday, Sunday, Saturday, office hours or weekday.
//! - **Incident Split**: Hours with incidents are counted separately for day
//!   and night.
//! - **CSV Output**: A stable ten-column report layout.
//!
//! ## Example
//!
//! ```rust
//! use pager_hours_core::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let users = vec![UserDetails {
//!     id: "P1".to_string(),
//!     email: "anna@example.com".to_string(),
//!     name: "Anna".to_string(),
//!     time_zone: "Berlin".to_string(),
//! }];
//! let roster = Roster::resolve(&users, &RegionTable::default()).unwrap();
//!
//! let segments = vec![ScheduleSegment {
//!     user_id: "P1".to_string(),
//!     user_email: "anna@example.com".to_string(),
//!     start: Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).single().unwrap(),
//!     end: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).single().unwrap(),
//! }];
//!
//! let rows = aggregate_segments(
//!     &segments,
//!     &roster,
//!     &IncidentIndex::default(),
//!     &HolidayCalendar::default(),
//!     &ReportConfig::default(),
//! )
//! .unwrap();
//!
//! let csv = render_report(&rows).unwrap();
//! println!("{}", String::from_utf8_lossy(&csv));
//! ```

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod holidays;
pub mod models;
pub mod report;
pub mod tz;

// Re-export commonly used types at the crate root
pub use aggregate::{HourAggregator, HourEvent, IncidentIndex, Roster, aggregate_segments};
pub use classify::BucketClassifier;
pub use error::{PagerHoursError, Result};
pub use holidays::{HolidayCalendar, gregorian_easter};
pub use models::{
    Bucket, Holiday, HourWindow, Incident, Region, ReportConfig, ReportRow, ScheduleSegment,
    UserDetails, Worker, Workload,
};
pub use report::{CSV_HEADERS, render_report, write_report};
pub use tz::RegionTable;

/// Prelude module for convenient imports.
///
/// ```
/// use pager_hours_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::{HourAggregator, HourEvent, IncidentIndex, Roster, aggregate_segments};
    pub use crate::classify::BucketClassifier;
    pub use crate::error::{PagerHoursError, Result};
    pub use crate::holidays::{HolidayCalendar, gregorian_easter};
    pub use crate::models::*;
    pub use crate::report::{CSV_HEADERS, render_report, write_report};
    pub use crate::tz::{RegionTable, parse_tz};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user(id: &str, email: &str, tz: &str) -> UserDetails {
        UserDetails {
            id: id.to_string(),
            email: email.to_string(),
            name: id.to_string(),
            time_zone: tz.to_string(),
        }
    }

    #[test]
    fn full_workflow_to_csv() {
        let users = vec![user("P1", "anna@example.com", "Berlin")];
        let roster = Roster::resolve(&users, &RegionTable::default()).unwrap();

        // Unity Day 2024 was a Thursday
        let segments = vec![ScheduleSegment {
            user_id: "P1".to_string(),
            user_email: "anna@example.com".to_string(),
            start: Utc.with_ymd_and_hms(2024, 10, 2, 22, 0, 0).single().unwrap(),
            end: Utc.with_ymd_and_hms(2024, 10, 3, 2, 0, 0).single().unwrap(),
        }];
        let rows = aggregate_segments(
            &segments,
            &roster,
            &IncidentIndex::default(),
            &HolidayCalendar::default(),
            &ReportConfig::default(),
        )
        .unwrap();

        let csv = String::from_utf8(render_report(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        // 22:00 UTC is already midnight of the 3rd in Berlin (UTC+2)
        assert_eq!(
            lines[1..],
            [
                "2024-10-02,anna@example.com,Europe/Berlin,Berlin,holiday,2,0,0,0,0",
                "2024-10-03,anna@example.com,Europe/Berlin,Berlin,holiday,2,0,0,0,0",
            ]
        );
    }

    #[test]
    fn unmapped_user_stops_the_run() {
        let users = vec![
            user("P1", "anna@example.com", "Berlin"),
            user("P2", "kenji@example.com", "Osaka"),
        ];
        let err = Roster::resolve(&users, &RegionTable::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn prelude_exports() {
        use crate::prelude::*;

        let _tz = parse_tz("Europe/Berlin").unwrap();
        let _bucket = Bucket::Weekday;
        let _config = ReportConfig::default();
    }
}
