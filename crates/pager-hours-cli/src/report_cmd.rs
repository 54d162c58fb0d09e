use std::collections::HashSet;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use pager_hours_core::{
    HolidayCalendar, IncidentIndex, RegionTable, ReportConfig, ReportRow, Roster, UserDetails,
    aggregate_segments, render_report,
};
use tracing::{debug, info};

use crate::cli::{DriveArgs, ReportArgs};
use crate::error::{CliError, CliResult, EXIT_SUCCESS};
use crate::gdrive::{DriveCredentials, GoogleDrive, authorization_url};
use crate::provider::{EscalationPolicy, OnCallProvider};
use crate::shared::{midnight_utc, open_provider, report_config, resolve_range};
use crate::sink::{DriveSink, report_title, write_output};

pub fn run_report(args: ReportArgs) -> CliResult<ExitCode> {
    let today = Utc::now().date_naive();
    let (from, to) = resolve_range(args.from.as_deref(), args.to.as_deref(), today)?;
    let config = report_config(&args)?;
    let drive = drive_credentials(&args.gdrive)?;
    let provider = open_provider(&args.source)?;

    let report = build_report(
        provider.as_ref(),
        &args.policy,
        from,
        to,
        &config,
        &RegionTable::default(),
        &HolidayCalendar::default(),
    )?;
    let csv = render_report(&report.rows)?;

    if let Some(credentials) = drive {
        let drive = GoogleDrive::connect(&credentials)
            .context("Couldn't connect to Google Drive")
            .map_err(CliError::collaborator)?;
        DriveSink::new(drive, args.gdrive.directory.clone())
            .publish(&report.policy.name, &report_title(from, to), &csv)
            .map_err(CliError::collaborator)?;
    }

    write_output(&args.output, &csv).map_err(CliError::collaborator)?;
    Ok(ExitCode::from(EXIT_SUCCESS))
}

/// Aggregated rows together with the policy they were computed for.
#[derive(Debug)]
pub struct Report {
    pub policy: EscalationPolicy,
    pub rows: Vec<ReportRow>,
}

/// Fetch everything for `policy_id` over `[from, to)` and aggregate it.
///
/// All users are resolved before the first hour is counted, so an
/// unmapped timezone aborts the run without partial output.
pub fn build_report(
    provider: &dyn OnCallProvider,
    policy_id: &str,
    from: NaiveDate,
    to: NaiveDate,
    config: &ReportConfig,
    table: &RegionTable,
    calendar: &HolidayCalendar,
) -> CliResult<Report> {
    let since = midnight_utc(from);
    let until = midnight_utc(to);

    let policy = provider
        .escalation_policy(policy_id)
        .with_context(|| format!("Couldn't get escalation policy {}", policy_id))
        .map_err(CliError::collaborator)?;
    info!(
        "Calculating hours for {} between {} and {}",
        policy.name, since, until
    );

    let schedule_id = policy.primary_schedule().ok_or_else(|| {
        CliError::input(format!(
            "Escalation policy {} ({}) has no schedule",
            policy.name, policy.id
        ))
    })?;
    info!("- Using schedule {}", schedule_id);
    for service in &policy.services {
        info!("-- service {}", service.name);
    }

    info!("- Getting all incidents for services");
    let incidents = provider
        .incidents(since, until, &policy.service_ids())
        .context("Couldn't get incidents")
        .map_err(CliError::collaborator)?;
    let index = IncidentIndex::new(&incidents, &policy.id);
    debug!(
        incidents = incidents.len(),
        hours = index.len(),
        "indexed incidents of the policy"
    );

    info!("- Getting entries for schedule");
    let mut segments = provider
        .schedule_entries(schedule_id, since, until)
        .with_context(|| format!("Couldn't get schedule entries for {}", schedule_id))
        .map_err(CliError::collaborator)?;

    let users = fetch_users(provider, segments.iter().map(|s| s.user_id.as_str()))?;
    let roster = Roster::resolve(&users, table)?;
    for segment in &mut segments {
        if segment.user_email.is_empty() {
            segment.user_email = roster.get(&segment.user_id)?.email.clone();
        }
    }

    let rows = aggregate_segments(&segments, &roster, &index, calendar, config)?;
    debug!(rows = rows.len(), "aggregated report");
    Ok(Report { policy, rows })
}

/// Look up every distinct user once, in order of first appearance.
fn fetch_users<'a>(
    provider: &dyn OnCallProvider,
    ids: impl Iterator<Item = &'a str>,
) -> CliResult<Vec<UserDetails>> {
    let mut seen = HashSet::new();
    let mut users = Vec::new();
    for id in ids {
        if !seen.insert(id) {
            continue;
        }
        let user = provider
            .user(id)
            .with_context(|| format!("Couldn't get user {}", id))
            .map_err(CliError::collaborator)?;
        users.push(user);
    }
    Ok(users)
}

/// Drive credentials when an upload was requested, i.e. a client secret is set.
fn drive_credentials(args: &DriveArgs) -> CliResult<Option<DriveCredentials>> {
    let Some(client_secret) = args.client_secret.clone() else {
        debug!("no drive client secret, skipping upload");
        return Ok(None);
    };

    let client_id = args.client_id.clone().ok_or_else(|| {
        CliError::input("Drive upload needs a client id (--gdrive-client-id or GDRIVE_CLIENT_ID)")
    })?;

    if args.refresh_token.is_none() && args.code.is_none() {
        let url = authorization_url(&client_id).map_err(CliError::collaborator)?;
        return Err(CliError::input(format!(
            "Drive upload needs --gdrive-token or --gdrive-code. For a new code, visit: {}",
            url
        )));
    }

    Ok(Some(DriveCredentials {
        client_id,
        client_secret,
        refresh_token: args.refresh_token.clone(),
        code: args.code.clone(),
    }))
}
