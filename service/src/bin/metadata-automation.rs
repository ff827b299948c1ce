//! `metadata-automation` command-line tool

use std::process::ExitCode;

use anyhow::Context;
use metadata_automation::cli;

fn run() -> anyhow::Result<bool> {
    let summary = cli::run().context("metadata-automation failed")?;
    Ok(summary.is_success())
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
