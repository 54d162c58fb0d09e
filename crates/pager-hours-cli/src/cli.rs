use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::pagerduty::DEFAULT_API_URL;

/// On-call hours report for PagerDuty rotations
#[derive(Parser, Debug)]
#[command(name = "pager-hours", version)]
#[command(about = "On-call hours report for PagerDuty rotations")]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute on-call hours of an escalation policy as CSV
    Report(ReportArgs),
    /// List escalation policies
    Policies(PoliciesArgs),
    /// List the public holidays of a region
    Holidays(HolidaysArgs),
}

/// Where provider data comes from.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// PagerDuty API token
    #[arg(long = "pd-token", env = "PAGERDUTY_TOKEN", hide_env_values = true)]
    pub pd_token: Option<String>,

    /// PagerDuty API base URL
    #[arg(long = "pd-api-url", default_value = DEFAULT_API_URL)]
    pub pd_api_url: String,

    /// Read provider data from a JSON snapshot instead of PagerDuty
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Escalation policy to get on-call hours and incidents from
    #[arg(long)]
    pub policy: String,

    /// Calculate hours from this date on (YYYY-MM-DD, default: first of last month)
    #[arg(long)]
    pub from: Option<String>,

    /// Calculate hours before this date (YYYY-MM-DD, default: first of this month)
    #[arg(long)]
    pub to: Option<String>,

    /// First local hour of office hours
    #[arg(long, default_value_t = 10)]
    pub office_start: u32,

    /// Local hour office hours end (exclusive)
    #[arg(long, default_value_t = 18)]
    pub office_end: u32,

    /// First UTC hour counted as night for incidents
    #[arg(long, default_value_t = 0)]
    pub night_start: u32,

    /// UTC hour the night ends (exclusive)
    #[arg(long, default_value_t = 8)]
    pub night_end: u32,

    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: String,

    #[command(flatten)]
    pub gdrive: DriveArgs,
}

#[derive(clap::Args, Debug)]
pub struct DriveArgs {
    /// Google Drive OAuth client id
    #[arg(long = "gdrive-client-id", env = "GDRIVE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Google Drive OAuth client secret (enables the upload)
    #[arg(long = "gdrive-secret", env = "GDRIVE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Google Drive OAuth refresh token
    #[arg(long = "gdrive-token", env = "GDRIVE_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Google Drive authorization code (only needed for a new token)
    #[arg(long = "gdrive-code")]
    pub code: Option<String>,

    /// Google Drive directory where spreadsheets are stored
    #[arg(long = "gdrive-directory", default_value = "On-Call Hours")]
    pub directory: String,
}

#[derive(clap::Args, Debug)]
pub struct PoliciesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct HolidaysArgs {
    /// Region: berlin, bulgaria, california, new-york
    #[arg(short, long)]
    pub region: String,

    /// Calendar year
    #[arg(short, long)]
    pub year: i32,

    /// Output format: json, text
    #[arg(long, default_value = "text")]
    pub output_format: String,
}
