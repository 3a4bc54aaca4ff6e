//! spec0-bot - SPEC-0 dependency freshness bot CLI
//!
//! Checks requirements.txt, pyproject.toml and setup.py in a project
//! directory, bumps minimum versions older than the support window and opens
//! a pull request with the change.

use clap::Parser;
use spec0_bot::cli::CliArgs;
use spec0_bot::error::{AppError, ConfigError};
use spec0_bot::logging;
use spec0_bot::orchestrator::Orchestrator;
use spec0_bot::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose, args.quiet);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.path.exists() && !args.path.is_dir() {
        let error = AppError::from(ConfigError::InvalidPath {
            path: args.path.clone(),
            message: "not a directory".to_string(),
        });
        return Err(error.into());
    }

    if args.verbose {
        eprintln!("spec0-bot v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.path.display());
        eprintln!("Window: {} years", args.window.years());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let orchestrator = Orchestrator::new(args.clone())?;
    let report = orchestrator.run().await;

    let formatter = create_formatter(OutputConfig::for_args(&args, io::stdout().is_terminal()));

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // Print errors in verbose mode
    if args.verbose && !report.errors.is_empty() {
        eprintln!();
        eprintln!("Errors encountered:");
        for error in &report.errors {
            eprintln!("  - {}", error);
        }
    }

    // Lookup, parse and publish failures are reported, never fatal
    Ok(ExitCode::SUCCESS)
}
