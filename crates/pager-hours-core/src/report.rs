//! CSV rendering of aggregated rows.
//!
//! The column layout is a contract with downstream spreadsheets: ten
//! columns, the last two reserved and always zero.

use std::io::Write;

use crate::error::{PagerHoursError, Result};
use crate::models::ReportRow;

/// Header row of every report.
pub const CSV_HEADERS: [&str; 10] = [
    "Date",
    "User",
    "Time Zone",
    "Location",
    "Type",
    "Hours On-Call",
    "Hours with Incidents/Day",
    "Hours with Incidents/Night",
    "Additional Hours/Day",
    "Additional Hours/Night",
];

/// The CSV fields of one row, in header order.
pub fn record(row: &ReportRow) -> [String; 10] {
    [
        row.date.format("%Y-%m-%d").to_string(),
        row.email.clone(),
        row.time_zone.clone(),
        row.region.to_string(),
        row.bucket.to_string(),
        row.workload.oncall.to_string(),
        row.workload.incidents_day.to_string(),
        row.workload.incidents_night.to_string(),
        "0".to_string(),
        "0".to_string(),
    ]
}

/// Write the header and one record per row to `writer`.
pub fn write_report<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADERS).map_err(report_error)?;
    for row in rows {
        csv.write_record(record(row)).map_err(report_error)?;
    }
    csv.flush()
        .map_err(|e| PagerHoursError::Report(e.to_string()))
}

/// Render the report into an in-memory CSV document.
pub fn render_report(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_report(rows, &mut buf)?;
    Ok(buf)
}

fn report_error(e: csv::Error) -> PagerHoursError {
    PagerHoursError::Report(e.to_string())
}
