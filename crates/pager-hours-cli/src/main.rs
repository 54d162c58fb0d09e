use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod gdrive;
mod holidays_cmd;
mod pagerduty;
mod policies_cmd;
mod provider;
mod report_cmd;
mod shared;
mod sink;
mod snapshot;

use cli::{Cli, Commands};
use error::{OutputFormat, output_format_hint, parse_output_format, render_error};
use holidays_cmd::run_holidays;
use policies_cmd::run_policies;
use report_cmd::run_report;

/// Log to stderr so the report on stdout stays clean. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report(args) => match run_report(args) {
            Ok(code) => code,
            Err(err) => render_error(&err, OutputFormat::Text),
        },
        Commands::Policies(args) => {
            let fallback = output_format_hint(&args.output_format);
            let output_format = match parse_output_format(&args.output_format) {
                Ok(format) => format,
                Err(err) => return render_error(&err, fallback),
            };

            match run_policies(args, output_format) {
                Ok(code) => code,
                Err(err) => render_error(&err, output_format),
            }
        }
        Commands::Holidays(args) => {
            let fallback = output_format_hint(&args.output_format);
            let output_format = match parse_output_format(&args.output_format) {
                Ok(format) => format,
                Err(err) => return render_error(&err, fallback),
            };

            match run_holidays(args, output_format) {
                Ok(code) => code,
                Err(err) => render_error(&err, output_format),
            }
        }
    }
}
