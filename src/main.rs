//! sumc CLI entry point.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use sumc::{DriverError, Outcome, lower_to_c, read_unit, tags_json, write_output};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // stdout carries emitted C; logs go to stderr.
    if let Ok(filter) = EnvFilter::try_from_env("SUMC_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the run produced output.
fn run(command: Command) -> Result<bool, DriverError> {
    match command {
        Command::Lower {
            input,
            output,
            target,
        } => {
            let unit = read_unit(&input)?;
            let outcome = lower_to_c(unit, target.config());
            finish(outcome, |text| write_output(output.as_deref(), text))
        }
        Command::Tags { input, target } => {
            let unit = read_unit(&input)?;
            let outcome = tags_json(unit, target.config())?;
            finish(outcome, |text| write_output(None, &format!("{text}\n")))
        }
    }
}

fn finish(
    outcome: Outcome<String>,
    write: impl FnOnce(&str) -> Result<(), DriverError>,
) -> Result<bool, DriverError> {
    for diag in &outcome.diagnostics {
        eprintln!("{diag}");
    }
    match outcome.output {
        Some(text) => {
            write(&text)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
