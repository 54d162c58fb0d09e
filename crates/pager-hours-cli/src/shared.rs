use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use pager_hours_core::{HourWindow, Region, ReportConfig};

use crate::cli::{ReportArgs, SourceArgs};
use crate::error::{CliError, CliResult};
use crate::pagerduty::PagerDutyClient;
use crate::provider::OnCallProvider;
use crate::snapshot::Snapshot;

pub fn parse_date(s: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        CliError::input(format!(
            "Invalid date '{}': {}. Expected format: YYYY-MM-DD",
            s, e
        ))
    })
}

/// The report range `[from, to)`, defaulting to the previous calendar month.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> CliResult<(NaiveDate, NaiveDate)> {
    let month_start = today.with_day(1).ok_or_else(|| {
        CliError::runtime(format!("Cannot compute start of month for {}", today))
    })?;

    let to = match to {
        Some(s) => parse_date(s)?,
        None => month_start,
    };
    let from = match from {
        Some(s) => parse_date(s)?,
        None => month_start
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| CliError::runtime("Cannot compute start of previous month"))?,
    };

    if from >= to {
        return Err(CliError::input(format!(
            "Invalid range: from '{}' must be earlier than to '{}'",
            from, to
        )));
    }
    Ok((from, to))
}

/// Midnight UTC at the start of `date`.
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn parse_region(s: &str) -> CliResult<Region> {
    s.parse::<Region>().map_err(|_| {
        CliError::input(format!(
            "Invalid region '{}'. Expected: berlin, bulgaria, california, new-york",
            s
        ))
    })
}

pub fn report_config(args: &ReportArgs) -> CliResult<ReportConfig> {
    let office_hours = HourWindow::new(args.office_start, args.office_end)
        .map_err(|e| CliError::input(format!("Invalid office hours: {}", e)))?;
    let night = HourWindow::new(args.night_start, args.night_end)
        .map_err(|e| CliError::input(format!("Invalid night hours: {}", e)))?;
    Ok(ReportConfig {
        office_hours,
        night,
    })
}

/// Open the snapshot if one is given, otherwise connect to PagerDuty.
pub fn open_provider(source: &SourceArgs) -> CliResult<Box<dyn OnCallProvider>> {
    if let Some(path) = &source.snapshot {
        let snapshot = Snapshot::load(path).map_err(|e| CliError::input(format!("{:#}", e)))?;
        return Ok(Box::new(snapshot));
    }

    let token = source.pd_token.clone().ok_or_else(|| {
        CliError::input("A PagerDuty token is required (--pd-token or PAGERDUTY_TOKEN)")
    })?;
    let client = PagerDutyClient::new_with_base_url(token, source.pd_api_url.clone())
        .map_err(CliError::collaborator)?;
    Ok(Box::new(client))
}
