//! Regional public holiday calendars.
//!
//! Every query works on a calendar day that the caller has already
//! localized; the time of day plays no part. Fixed holidays come from
//! per-region tables, movable feasts are offsets from Easter. Western
//! Easter is computed, Orthodox Easter is looked up in a table carried
//! by the [`HolidayCalendar`].

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{PagerHoursError, Result};
use crate::models::{Holiday, Region};

/// (month, day, name)
type FixedHoliday = (u32, u32, &'static str);
/// (days relative to Easter Sunday, name)
type EasterHoliday = (i64, &'static str);

const BERLIN_FIXED: &[FixedHoliday] = &[
    (1, 1, "New Year's Day"),
    (5, 1, "Labour Day"),
    (10, 3, "German Unity Day"),
    (12, 25, "Christmas Day"),
    (12, 26, "St. Stephen's Day"),
];

const BERLIN_EASTER: &[EasterHoliday] = &[
    (0, "Easter"),
    (-2, "Good Friday"),
    (1, "Easter Monday"),
    (39, "Ascension Day"),
    (50, "Whit Monday"),
];

const USA_FIXED: &[FixedHoliday] = &[
    (1, 1, "New Year's Day"),
    (7, 4, "Independence Day"),
    (12, 25, "Christmas Day"),
];

const BULGARIA_EASTER: &[EasterHoliday] = &[
    (0, "Easter"),
    (-2, "Good Friday"),
    (-1, "Easter Saturday"),
    (1, "Easter Monday"),
];

const BULGARIA_FIXED: &[FixedHoliday] = &[
    (1, 1, "New Year's Day"),
    (1, 2, "Day after New Year's Day"),
    (3, 3, "Liberation Day"),
    (5, 1, "Labour Day"),
    (5, 6, "St. George's Day"),
    (
        5,
        24,
        "Bulgarian Education and Culture and Slavonic Literature Day",
    ),
    (9, 6, "Unification Day"),
    (9, 22, "Independence Day"),
    (11, 1, "Day of the Bulgarian Enlighteners"),
    (12, 24, "Christmas Eve"),
    (12, 25, "Christmas Day"),
    (12, 26, "Second Day of Christmas"),
];

/// Orthodox Easter Sunday (Gregorian date) for the years the calendar knows.
const ORTHODOX_EASTER: &[(i32, u32, u32)] = &[
    (2013, 5, 5),
    (2014, 4, 20),
    (2015, 4, 12),
    (2016, 5, 1),
    (2017, 4, 16),
    (2018, 4, 8),
    (2019, 4, 28),
    (2020, 4, 19),
    (2021, 5, 2),
    (2022, 4, 24),
    (2023, 4, 16),
    (2024, 5, 5),
    (2025, 4, 20),
    (2026, 4, 12),
    (2027, 5, 2),
    (2028, 4, 16),
    (2029, 4, 8),
    (2030, 4, 28),
    (2031, 4, 13),
    (2032, 5, 2),
    (2033, 4, 24),
    (2034, 4, 9),
    (2035, 4, 29),
];

/// Holiday lookup for the supported regions.
///
/// The calendar is immutable once built. The Orthodox Easter table
/// defaults to the built-in years and can be replaced with
/// [`HolidayCalendar::with_orthodox_easter`].
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    orthodox_easter: BTreeMap<i32, NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        let orthodox_easter = ORTHODOX_EASTER
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).map(|date| (y, date)))
            .collect();
        Self { orthodox_easter }
    }
}

impl HolidayCalendar {
    /// Build a calendar with a custom Orthodox Easter table (year -> Easter Sunday).
    pub fn with_orthodox_easter(orthodox_easter: BTreeMap<i32, NaiveDate>) -> Self {
        Self { orthodox_easter }
    }

    /// First and last year covered by the Orthodox Easter table.
    pub fn orthodox_years(&self) -> Option<(i32, i32)> {
        let first = self.orthodox_easter.keys().next()?;
        let last = self.orthodox_easter.keys().next_back()?;
        Some((*first, *last))
    }

    /// Orthodox Easter Sunday for `year`.
    ///
    /// Years outside the table are a data gap, not a computed fallback.
    pub fn orthodox_easter(&self, year: i32) -> Result<NaiveDate> {
        self.orthodox_easter
            .get(&year)
            .copied()
            .ok_or(PagerHoursError::MissingOrthodoxEaster { year })
    }

    /// Look up the holiday falling on `date` in `region`.
    ///
    /// Returns `Ok(None)` for ordinary days. Fails only when the
    /// region's calendar lacks data for the year.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pager_hours_core::holidays::HolidayCalendar;
    /// use pager_hours_core::models::Region;
    ///
    /// let calendar = HolidayCalendar::default();
    /// let date = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();
    /// let holiday = calendar.holiday(date, Region::Berlin).unwrap().unwrap();
    /// assert_eq!(holiday.name, "German Unity Day");
    /// ```
    pub fn holiday(&self, date: NaiveDate, region: Region) -> Result<Option<Holiday>> {
        match region {
            Region::Berlin => holiday_berlin(date),
            Region::Bulgaria => self.holiday_bulgaria(date),
            Region::California | Region::NewYork => Ok(holiday_usa(date)),
        }
    }

    /// All holidays of `year` in `region`, in calendar order.
    pub fn holidays_in_year(&self, year: i32, region: Region) -> Result<Vec<(NaiveDate, Holiday)>> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| PagerHoursError::InvalidDate(format!("year {}", year)))?;

        let mut out = Vec::new();
        for date in first.iter_days().take_while(|d| d.year() == year) {
            if let Some(holiday) = self.holiday(date, region)? {
                out.push((date, holiday));
            }
        }
        Ok(out)
    }

    fn holiday_bulgaria(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let easter = self.orthodox_easter(date.year())?;

        Ok(easter_holiday(date, easter, BULGARIA_EASTER)
            .or_else(|| fixed_holiday(date, BULGARIA_FIXED)))
    }
}

fn holiday_berlin(date: NaiveDate) -> Result<Option<Holiday>> {
    if let Some(holiday) = fixed_holiday(date, BERLIN_FIXED) {
        return Ok(Some(holiday));
    }

    let easter = gregorian_easter(date.year())?;
    Ok(easter_holiday(date, easter, BERLIN_EASTER))
}

fn holiday_usa(date: NaiveDate) -> Option<Holiday> {
    if let Some(holiday) = fixed_holiday(date, USA_FIXED) {
        return Some(holiday);
    }

    let name = match (date.month(), date.weekday()) {
        (9, Weekday::Mon) if nth_weekday(date) == 1 => "Labor Day",
        (11, Weekday::Thu) if nth_weekday(date) == 4 => "Thanksgiving Day",
        (11, Weekday::Fri) if is_fourth_thursday_of_november(date - Duration::days(1)) => {
            "Day after Thanksgiving"
        }
        (5, Weekday::Mon) if nth_weekday_rev(date) == 1 => "Memorial Day",
        (1, Weekday::Mon) if nth_weekday(date) == 3 => "Martin Luther King Jr. Day",
        _ => return None,
    };
    Some(Holiday { name })
}

fn is_fourth_thursday_of_november(date: NaiveDate) -> bool {
    date.month() == 11 && date.weekday() == Weekday::Thu && nth_weekday(date) == 4
}

fn fixed_holiday(date: NaiveDate, table: &[FixedHoliday]) -> Option<Holiday> {
    table
        .iter()
        .find(|(m, d, _)| date.month() == *m && date.day() == *d)
        .map(|&(_, _, name)| Holiday { name })
}

fn easter_holiday(date: NaiveDate, easter: NaiveDate, table: &[EasterHoliday]) -> Option<Holiday> {
    table
        .iter()
        .find(|(offset, _)| date == easter + Duration::days(*offset))
        .map(|&(_, name)| Holiday { name })
}

/// Which occurrence of its weekday `date` is, counting from the 1st of the month.
///
/// The first Monday of a month yields 1, the second 2, and so on.
pub fn nth_weekday(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// Which occurrence of its weekday `date` is, counting back from the last day of the month.
///
/// A result of 1 means `date` is the last such weekday in its month.
pub fn nth_weekday_rev(date: NaiveDate) -> u32 {
    (days_in_month(date) - date.day()) / 7 + 1
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Western (Gregorian) Easter Sunday for `year`.
///
/// Integer-only closed form; every division truncates and every
/// modulo is normalized to a non-negative result.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pager_hours_core::holidays::gregorian_easter;
///
/// assert_eq!(gregorian_easter(2024).unwrap(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
/// ```
pub fn gregorian_easter(year: i32) -> Result<NaiveDate> {
    let y = year;
    let c = y / 100;
    let n = y.rem_euclid(19);
    let mut i = (c - c / 4 - (c - (c - 17) / 25) / 3 + 19 * n + 15).rem_euclid(30);
    i -= (i / 28) * (1 - (i / 28) * (29 / (i + 1)) * ((21 - n) / 11));
    let l = i - (y + y / 4 + i + 2 - c + c / 4).rem_euclid(7);
    let month = 3 + (l + 40) / 44;
    let day = l + 28 - 31 * (month / 4);

    u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .ok_or_else(|| PagerHoursError::InvalidDate(format!("easter of year {}", year)))
}
