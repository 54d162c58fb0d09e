//! Bucket classification of on-call hours.
//!
//! Classification happens on the user's local wall clock. The first
//! matching rule wins:
//!
//! 1. holiday in the user's region (even on a Sunday)
//! 2. Sunday
//! 3. Saturday
//! 4. local hour inside the office-hours window
//! 5. any other weekday hour

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};

use crate::error::Result;
use crate::holidays::HolidayCalendar;
use crate::models::{Bucket, HourWindow, Region, Worker};
use crate::tz::utc_to_local;

/// Assigns each localized hour to exactly one [`Bucket`].
#[derive(Debug, Clone)]
pub struct BucketClassifier {
    calendar: HolidayCalendar,
    office_hours: HourWindow,
}

impl Default for BucketClassifier {
    fn default() -> Self {
        Self::new(HolidayCalendar::default(), HourWindow::OFFICE_HOURS)
    }
}

impl BucketClassifier {
    pub fn new(calendar: HolidayCalendar, office_hours: HourWindow) -> Self {
        Self {
            calendar,
            office_hours,
        }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// Classify a local timestamp for a user in `region`.
    ///
    /// Fails only when the holiday calendar has no data for the date's
    /// year in that region.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::TimeZone;
    /// use chrono_tz::Europe::Berlin;
    /// use pager_hours_core::classify::BucketClassifier;
    /// use pager_hours_core::models::{Bucket, Region};
    ///
    /// let classifier = BucketClassifier::default();
    /// // Monday 2024-03-04, 11:00 in Berlin
    /// let local = Berlin.with_ymd_and_hms(2024, 3, 4, 11, 0, 0).single().unwrap();
    /// assert_eq!(classifier.bucket_for(&local, Region::Berlin).unwrap(), Bucket::OfficeHours);
    /// ```
    pub fn bucket_for<T: TimeZone>(&self, local: &DateTime<T>, region: Region) -> Result<Bucket> {
        if self.calendar.holiday(local.date_naive(), region)?.is_some() {
            return Ok(Bucket::Holiday);
        }

        let bucket = match local.weekday() {
            Weekday::Sun => Bucket::Sunday,
            Weekday::Sat => Bucket::Saturday,
            _ if self.office_hours.contains(local.hour()) => Bucket::OfficeHours,
            _ => Bucket::Weekday,
        };
        Ok(bucket)
    }

    /// Localize a UTC hour into the worker's timezone and classify it.
    pub fn bucket_for_worker(&self, instant: DateTime<Utc>, worker: &Worker) -> Result<Bucket> {
        let local = utc_to_local(instant, worker.time_zone);
        self.bucket_for(&local, worker.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    use crate::error::PagerHoursError;

    fn berlin(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        Tz::Europe__Berlin
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn office_hours_window_is_half_open() {
        let classifier = BucketClassifier::default();
        // Monday 2024-03-04
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 9), Region::Berlin).unwrap(),
            Bucket::Weekday
        );
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 10), Region::Berlin).unwrap(),
            Bucket::OfficeHours
        );
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 17), Region::Berlin).unwrap(),
            Bucket::OfficeHours
        );
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 18), Region::Berlin).unwrap(),
            Bucket::Weekday
        );
    }

    #[test]
    fn weekend_days_ignore_office_hours() {
        let classifier = BucketClassifier::default();
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 9, 11), Region::Berlin).unwrap(),
            Bucket::Saturday
        );
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 10, 11), Region::Berlin).unwrap(),
            Bucket::Sunday
        );
    }

    #[test]
    fn holiday_wins_over_sunday() {
        // 2022-12-25 was a Sunday
        let classifier = BucketClassifier::default();
        let local = berlin(2022, 12, 25, 3);
        assert_eq!(local.weekday(), Weekday::Sun);
        assert_eq!(
            classifier.bucket_for(&local, Region::Berlin).unwrap(),
            Bucket::Holiday
        );
    }

    #[test]
    fn holiday_wins_over_office_hours() {
        let classifier = BucketClassifier::default();
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 10, 3, 12), Region::Berlin).unwrap(),
            Bucket::Holiday
        );
    }

    #[test]
    fn holiday_depends_on_region() {
        let classifier = BucketClassifier::default();
        let local = Tz::America__Los_Angeles
            .with_ymd_and_hms(2024, 10, 3, 12, 0, 0)
            .single()
            .unwrap();
        assert_eq!(
            classifier.bucket_for(&local, Region::California).unwrap(),
            Bucket::OfficeHours
        );
    }

    #[test]
    fn custom_office_hours() {
        let classifier =
            BucketClassifier::new(HolidayCalendar::default(), HourWindow::new(8, 16).unwrap());
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 8), Region::Berlin).unwrap(),
            Bucket::OfficeHours
        );
        assert_eq!(
            classifier.bucket_for(&berlin(2024, 3, 4, 16), Region::Berlin).unwrap(),
            Bucket::Weekday
        );
    }

    #[test]
    fn worker_hour_uses_local_day() {
        // Friday 2024-03-08 23:00 UTC is Saturday 01:00 in Sofia
        let classifier = BucketClassifier::default();
        let worker = Worker {
            id: "P1".to_string(),
            email: "ivan@example.com".to_string(),
            name: "Ivan".to_string(),
            time_zone: Tz::Europe__Sofia,
            region: Region::Bulgaria,
        };
        let instant = Utc.with_ymd_and_hms(2024, 3, 8, 23, 0, 0).single().unwrap();
        assert_eq!(
            classifier.bucket_for_worker(instant, &worker).unwrap(),
            Bucket::Saturday
        );
    }

    #[test]
    fn calendar_gap_propagates() {
        let classifier = BucketClassifier::default();
        let local = Tz::Europe__Sofia
            .with_ymd_and_hms(2040, 3, 5, 12, 0, 0)
            .single()
            .unwrap();
        assert!(matches!(
            classifier.bucket_for(&local, Region::Bulgaria),
            Err(PagerHoursError::MissingOrthodoxEaster { year: 2040 })
        ));
    }
}
