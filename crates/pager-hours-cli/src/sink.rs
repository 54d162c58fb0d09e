use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::gdrive::{DriveFile, GoogleDrive, ROOT_FOLDER};

/// Write the rendered report to `path`, or to stdout for `-`.
pub fn write_output(path: &str, csv: &[u8]) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(csv).context("Failed to write report to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        return Ok(());
    }

    fs::write(path, csv).with_context(|| format!("Failed to write report: {}", path))?;
    info!(path, bytes = csv.len(), "report written");
    Ok(())
}

/// Spreadsheet title for a report covering `[from, to)`.
pub fn report_title(from: NaiveDate, to: NaiveDate) -> String {
    format!("{} - {}.csv", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
}

/// Publishes reports under `<root directory>/<policy name>` in Drive.
pub struct DriveSink {
    drive: GoogleDrive,
    root_directory: String,
}

impl DriveSink {
    pub fn new(drive: GoogleDrive, root_directory: String) -> Self {
        Self {
            drive,
            root_directory,
        }
    }

    pub fn publish(&self, policy_name: &str, title: &str, csv: &[u8]) -> Result<DriveFile> {
        info!("Exporting to Google Drive");

        let root = self
            .drive
            .get_or_create_directory(&self.root_directory, ROOT_FOLDER)
            .with_context(|| {
                format!(
                    "Couldn't find or create directory '{}'",
                    self.root_directory
                )
            })?;
        info!("- Root directory {} ({})", root.name, root.id);

        let parent = self
            .drive
            .get_or_create_directory(policy_name, &root.id)
            .with_context(|| {
                format!(
                    "Couldn't find or create directory '{}' in '{}'",
                    policy_name, root.name
                )
            })?;
        info!("- Policy directory {}/{}", root.name, parent.name);

        let file = self
            .drive
            .upload_csv(csv, &parent.id, title)
            .with_context(|| format!("Couldn't upload '{}'", title))?;
        info!("- Uploaded {} ({})", file.name, file.id);
        Ok(file)
    }
}
