use std::process::ExitCode;

use crate::cli::PoliciesArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::provider::{EscalationPolicy, OnCallProvider};
use crate::shared::open_provider;

pub fn run_policies(args: PoliciesArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let provider = open_provider(&args.source)?;
    let policies = list_policies(provider.as_ref())?;

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&policies)
                .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for line in policy_lines(&policies) {
                println!("{}", line);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

fn list_policies(provider: &dyn OnCallProvider) -> CliResult<Vec<EscalationPolicy>> {
    provider
        .escalation_policies()
        .map_err(|e| CliError::collaborator(e.context("Couldn't get policies")))
}

fn policy_lines(policies: &[EscalationPolicy]) -> Vec<String> {
    policies
        .iter()
        .map(|p| format!("- {} {}", p.id, p.name))
        .collect()
}
