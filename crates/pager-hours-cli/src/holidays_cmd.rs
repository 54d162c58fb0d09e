use std::process::ExitCode;

use chrono::NaiveDate;
use pager_hours_core::{HolidayCalendar, Region};
use serde::Serialize;

use crate::cli::HolidaysArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::parse_region;

#[derive(Debug, Serialize)]
struct HolidayEntry {
    date: NaiveDate,
    name: &'static str,
}

pub fn run_holidays(args: HolidaysArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let region = parse_region(&args.region)?;
    let entries = holidays_of(&HolidayCalendar::default(), region, args.year)?;

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for entry in &entries {
                println!("{} {}", entry.date.format("%Y-%m-%d"), entry.name);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn holidays_of(calendar: &HolidayCalendar, region: Region, year: i32) -> CliResult<Vec<HolidayEntry>> {
    Ok(calendar
        .holidays_in_year(year, region)?
        .into_iter()
        .map(|(date, holiday)| HolidayEntry {
            date,
            name: holiday.name,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn bulgaria_2016_starts_with_new_year() {
        let entries = holidays_of(&HolidayCalendar::default(), Region::Bulgaria, 2016).unwrap();
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());

        let easter = entries
            .iter()
            .find(|e| e.date == NaiveDate::from_ymd_opt(2016, 5, 1).unwrap())
            .unwrap();
        assert_eq!(easter.name, "Easter");
    }

    #[test]
    fn json_entries_use_iso_dates() {
        let entries = holidays_of(&HolidayCalendar::default(), Region::Berlin, 2024).unwrap();
        let value = serde_json::to_value(&entries).unwrap();
        assert_eq!(value[0]["date"], "2024-01-01");
    }

    #[test]
    fn calendar_gap_is_input_error() {
        let err = holidays_of(&HolidayCalendar::default(), Region::Bulgaria, 2050).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.to_string(), "Don't know orthodox easter for year 2050");
    }
}
