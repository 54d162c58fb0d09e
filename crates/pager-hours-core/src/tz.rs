//! Timezone handling utilities.
//!
//! This module provides functions for parsing timezone names and the
//! table that maps provider timezone names onto office regions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::{PagerHoursError, Result};
use crate::models::{Region, UserDetails, Worker};

/// Parse an IANA timezone name into a [`chrono_tz::Tz`].
///
/// # Examples
///
/// ```
/// use pager_hours_core::tz::parse_tz;
///
/// let tz = parse_tz("Europe/Berlin").unwrap();
/// assert_eq!(tz.to_string(), "Europe/Berlin");
/// ```
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| PagerHoursError::InvalidTimezone(name.to_string()))
}

/// Convert a UTC datetime to local time in the specified timezone.
pub fn utc_to_local(utc: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    utc.with_timezone(&tz)
}

/// Static mapping from provider timezone names to (IANA zone, office region).
///
/// Providers report either display names ("Pacific Time (US & Canada)")
/// or IANA names ("America/Los_Angeles"); the default table knows both
/// for every office. Users in any other timezone cannot be reported on.
#[derive(Debug, Clone)]
pub struct RegionTable {
    entries: HashMap<String, (Tz, Region)>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::empty()
            .with("Berlin", Tz::Europe__Berlin, Region::Berlin)
            .with("Europe/Berlin", Tz::Europe__Berlin, Region::Berlin)
            .with("Sofia", Tz::Europe__Sofia, Region::Bulgaria)
            .with("Europe/Sofia", Tz::Europe__Sofia, Region::Bulgaria)
            .with(
                "Pacific Time (US & Canada)",
                Tz::America__Los_Angeles,
                Region::California,
            )
            .with("America/Los_Angeles", Tz::America__Los_Angeles, Region::California)
            .with(
                "Eastern Time (US & Canada)",
                Tz::America__New_York,
                Region::NewYork,
            )
            .with("America/New_York", Tz::America__New_York, Region::NewYork)
    }
}

impl RegionTable {
    /// A table without any entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add a mapping, returning the extended table.
    pub fn with(mut self, name: &str, tz: Tz, region: Region) -> Self {
        self.entries.insert(name.to_string(), (tz, region));
        self
    }

    /// Look up the zone and region for a provider timezone name.
    pub fn lookup(&self, name: &str) -> Result<(Tz, Region)> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| PagerHoursError::UnmappedTimezone(name.to_string()))
    }

    /// Resolve a directory entry into a [`Worker`].
    pub fn resolve(&self, user: &UserDetails) -> Result<Worker> {
        let (time_zone, region) = self.lookup(&user.time_zone)?;
        Ok(Worker {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            time_zone,
            region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_valid_timezone() {
        let tz = parse_tz("Europe/Sofia").unwrap();
        assert_eq!(tz.to_string(), "Europe/Sofia");
    }

    #[test]
    fn parse_invalid_timezone() {
        let result = parse_tz("Invalid/Timezone");
        if let Err(PagerHoursError::InvalidTimezone(name)) = result {
            assert_eq!(name, "Invalid/Timezone");
        } else {
            panic!("Expected InvalidTimezone error");
        }
    }

    #[test]
    fn utc_to_local_crosses_midnight() {
        // 23:30 UTC on a Friday is already Saturday in Sofia
        let utc = Utc
            .with_ymd_and_hms(2024, 3, 8, 23, 30, 0)
            .single()
            .unwrap();
        let local = utc_to_local(utc, parse_tz("Europe/Sofia").unwrap());
        assert_eq!(
            local.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-09 01:30"
        );
    }

    #[test]
    fn default_table_knows_display_and_iana_names() {
        let table = RegionTable::default();
        assert_eq!(
            table.lookup("Berlin").unwrap(),
            (Tz::Europe__Berlin, Region::Berlin)
        );
        assert_eq!(
            table.lookup("Pacific Time (US & Canada)").unwrap(),
            (Tz::America__Los_Angeles, Region::California)
        );
        assert_eq!(
            table.lookup("America/New_York").unwrap().1,
            Region::NewYork
        );
    }

    #[test]
    fn unmapped_timezone_fails() {
        let table = RegionTable::default();
        match table.lookup("Tokyo") {
            Err(PagerHoursError::UnmappedTimezone(name)) => assert_eq!(name, "Tokyo"),
            other => panic!("Expected UnmappedTimezone, got {:?}", other),
        }
    }

    #[test]
    fn resolve_user() {
        let user = UserDetails {
            id: "PABC".to_string(),
            email: "ivan@example.com".to_string(),
            name: "Ivan".to_string(),
            time_zone: "Sofia".to_string(),
        };
        let worker = RegionTable::default().resolve(&user).unwrap();
        assert_eq!(worker.region, Region::Bulgaria);
        assert_eq!(worker.time_zone, Tz::Europe__Sofia);
        assert_eq!(worker.email, "ivan@example.com");
    }
}
