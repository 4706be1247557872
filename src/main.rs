mod client;
mod config;
mod logging;
mod meraki;
mod output;
mod prompt;
mod report;
mod validate;

use crate::client::ApiClient;
use crate::config::Config;
use crate::meraki::Organization;
use crate::output::{Table, create_progressbar};
use crate::prompt::prompt;
use crate::report::{COLUMNS, ReportRow, appliance_networks, build_report};
use crate::validate::{ParameterError, validate_api_key, validate_org_id};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "merakifw",
    version,
    about = "Get Meraki MX Firewall Appliance Services configuration - ICMP, SNMP, web (Local Status Page)."
)]
struct Cli {
    #[arg(
        long,
        env = "APIKEY",
        hide_env_values = true,
        value_name = "KEY",
        help = "Meraki Dashboard API key (prompted for when missing)"
    )]
    apikey: Option<String>,

    #[arg(
        long,
        env = "ORGID",
        value_name = "ID",
        help = "Organization ID (prompted for when missing)"
    )]
    orgid: Option<String>,

    #[arg(
        long,
        env = "MERAKI_BASE_URL",
        value_name = "URL",
        help = "Base URL for the Dashboard API (defaults to https://api.meraki.com/api/v1)"
    )]
    base_url: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Pretty,
        help = "Output format"
    )]
    output: OutputFormat,

    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "HTTP request timeout"
    )]
    timeout: Option<u64>,

    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = config::config_path()?;
    let effective = config::resolve(
        &path,
        Config {
            api_key: cli.apikey,
            org_id: cli.orgid,
            base_url: cli.base_url,
            timeout_secs: cli.timeout,
        },
    )?;

    let api_key = match effective.api_key {
        Some(key) => key,
        None => prompt("Meraki Dashboard API Key", "--apikey")?,
    };
    let client = ApiClient::new(&effective.base_url, &api_key, effective.timeout)?;
    debug!(base_url = %client.base_url(), "using Dashboard API");
    validate_api_key(&client)?;

    let org_id = match effective.org_id {
        Some(id) => id,
        None => prompt("Organization ID", "--orgid")?,
    };
    let networks = match validate_org_id(&client, &org_id) {
        Ok(networks) => networks,
        Err(err) => {
            if let Some(ParameterError::InvalidOrgId { organizations }) =
                err.downcast_ref::<ParameterError>()
            {
                print_organizations(organizations, cli.output)?;
            }
            return Err(err);
        }
    };

    let networks = appliance_networks(networks);
    if networks.is_empty() {
        info!("No appliance networks found in organization {}", org_id);
    }
    let progress = create_progressbar(networks.len() as u64, "Processing networks...");
    let rows = build_report(&client, &networks, &progress);
    progress.finish_and_clear();

    print_report(&rows?, cli.output)
}

fn print_organizations(organizations: &[Organization], output: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(organizations)?)?;
        }
        OutputFormat::Pretty => {
            let mut table = Table::new(&["ORGANIZATION ID", "ORGANIZATION NAME"]);
            for org in organizations {
                table.add_row(vec![org.id.clone(), org.name.clone()]);
            }
            table
                .render(&mut out, io::stdout().is_terminal())
                .context("writing organization table")?;
        }
    }
    Ok(())
}

fn print_report(rows: &[ReportRow], output: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?;
        }
        OutputFormat::Pretty => {
            let mut table = Table::new(&COLUMNS);
            for row in rows {
                table.add_row(row.cells());
            }
            table
                .render(&mut out, io::stdout().is_terminal())
                .context("writing report table")?;
        }
    }
    Ok(())
}

fn report_error(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ParameterError>() {
        Some(param) => {
            eprintln!("Try 'merakifw --help' for help.");
            eprintln!();
            match param {
                ParameterError::MissingValue { option } => {
                    eprintln!("Error: Missing option '{}'.", option)
                }
                _ => eprintln!("Error: Invalid value for '{}': {}", param.option(), param),
            }
            ExitCode::from(2)
        }
        None => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
