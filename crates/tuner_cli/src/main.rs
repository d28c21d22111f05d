mod cli;
mod logging;

use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tuner_core::{run_sweep, CancellationToken, SweepConfig, SweepError, TracingObserver};

use crate::cli::Cli;

/// Exit code for bad inputs or settings caught before any job runs.
const EXIT_INVALID_INPUT: i32 = 2;

fn main() {
    if let Err(err) = run_app() {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
        exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SweepError>() {
        Some(SweepError::InputValidation(_) | SweepError::Range { .. } | SweepError::Config { .. }) => {
            EXIT_INVALID_INPUT
        }
        _ => 1,
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
    debug!(?cli, "parsed arguments");

    let base = match &cli.config {
        Some(path) => SweepConfig::from_toml_file(path)?,
        None => SweepConfig::default(),
    };
    let config = cli.apply_to(base);

    info!(
        working_dir = %config.working_dir.display(),
        grid_points = config.grid.len()?,
        "starting sweep"
    );
    // Never cancelled here: cancellation is for library callers. Ctrl-C ends
    // the process, and solvers run under a timeout sit in their own process
    // group, so they keep running until that timeout kills them.
    let cancel = CancellationToken::new();
    let report = run_sweep(&config, &TracingObserver, &cancel)?;

    let best = report
        .best()
        .context("sweep finished without a best solution")?;
    println!("best configuration: {}", best.label());
    println!(
        "accepted {} of {} solutions ({} cached, {} launched, {} failed)",
        report.counters.accepted,
        report.counters.total,
        report.counters.cached,
        report.counters.launched,
        report.counters.failed
    );
    println!("report: {}", report.paths.table.display());
    println!("best network: {}", report.paths.best_network.display());
    if let Some(summary) = &report.paths.summary {
        println!("summary: {}", summary.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_exit_with_two() {
        let err = anyhow::Error::new(SweepError::InputValidation("missing prize file".into()));
        assert_eq!(exit_code(&err), EXIT_INVALID_INPUT);

        let err = anyhow::Error::new(SweepError::NoAcceptedSolution {
            executed: 4,
            failed: 0,
        });
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn context_does_not_hide_validation_errors() {
        let err = anyhow::Error::new(SweepError::NoJobs).context("while sweeping");
        assert_eq!(exit_code(&err), 1);
        let err = anyhow::Error::new(SweepError::InputValidation("x".into())).context("while sweeping");
        assert_eq!(exit_code(&err), EXIT_INVALID_INPUT);
    }
}
