//! CLI entry point for the paper renamer.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use renamer_core::{BatchReport, FileOutcome, RenameEngine};
use tracing::{debug, info};

mod app_config;
mod cli;
mod config_runtime;

/// Process outcome mapped to an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// The batch ran to completion (per-file failures included).
    Success,
    /// Invalid invocation, unreadable root, or invalid configuration.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, cli_sources) = match config_runtime::try_parse_cli_with_sources(std::env::args_os())
    {
        Ok(parsed) => parsed,
        Err(error) => return Ok(report_clap_error(&error)),
    };

    let file_config = app_config::load_file_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > CLI flags > config verbosity > default (info)
    let default_level =
        config_runtime::default_log_level(&args, &cli_sources, file_config.as_ref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = config_runtime::apply_config_defaults(args, &cli_sources, file_config.as_ref());
    debug!(?args, "CLI arguments resolved");
    info!(root = %args.root.display(), dry_run = args.dry_run, "Paper renamer starting");

    let engine = RenameEngine::new(config_runtime::rename_config(&args))
        .context("Invalid configuration")?;
    let report = engine
        .run(&args.root)
        .await
        .with_context(|| format!("Cannot process '{}'", args.root.display()))?;

    if !args.quiet {
        print_summary(&report, args.dry_run);
    }
    Ok(ProcessExit::Success)
}

/// Prints clap's message and maps it to an exit status.
///
/// Help and version exit successfully; every usage error exits with 1.
fn report_clap_error(error: &clap::Error) -> ProcessExit {
    // Printing to a closed stdout/stderr is not worth failing over
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ProcessExit::Success,
        _ => ProcessExit::Failure,
    }
}

fn print_summary(report: &BatchReport, dry_run: bool) {
    if dry_run {
        for outcome in &report.outcomes {
            if let FileOutcome::Planned { from, to } = outcome {
                println!("{} -> {}", from.display(), to.display());
            }
        }
    }
    println!(
        "Processed {} file(s): {} renamed, {} planned, {} skipped, {} failed",
        report.total(),
        report.renamed(),
        report.planned(),
        report.skipped(),
        report.failed()
    );
    println!("Total time: {:.2}s", report.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clap_error(argv: &[&str]) -> clap::Error {
        config_runtime::try_parse_cli_with_sources(argv.iter().copied())
            .expect_err("parse should fail")
    }

    #[test]
    fn test_help_and_version_exit_success() {
        assert_eq!(
            report_clap_error(&clap_error(&["paper-renamer", "--help"])),
            ProcessExit::Success
        );
        assert_eq!(
            report_clap_error(&clap_error(&["paper-renamer", "--version"])),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_usage_errors_exit_failure() {
        assert_eq!(
            report_clap_error(&clap_error(&["paper-renamer"])),
            ProcessExit::Failure
        );
        assert_eq!(
            report_clap_error(&clap_error(&["paper-renamer", "a", "b"])),
            ProcessExit::Failure
        );
    }
}
