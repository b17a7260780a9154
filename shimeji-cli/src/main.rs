//! CLI entry point for the shimeji clustering engine.
//!
//! Parses command-line arguments with clap, executes the clustering
//! pipeline, renders the labelling to stdout, and maps errors to appropriate
//! exit codes. Logging is initialised eagerly so subsequent operations can
//! emit structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use shimeji_cli::{
    cli::{render_labelling, run_cli, Cli, CliError},
    logging::{self, LoggingError},
};
use shimeji_core::ShimejiError;
use tracing::error;

/// Parse CLI arguments, execute the command, render the labelling, and flush
/// the output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_labelling(&summary.labelling, &mut writer).context("failed to render labelling")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(cli_error) = err.downcast_ref::<CliError>() {
                log_cli_error(cli_error);
            } else {
                error!(error = %err, "command execution failed");
            }
            ExitCode::FAILURE
        }
    }
}

fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}

fn log_cli_error(err: &CliError) {
    match err {
        CliError::Core(core) => log_core_error(core),
        CliError::Points(points) => error!(
            error = %points,
            code = %points.code(),
            "command execution failed"
        ),
    }
}

fn log_core_error(err: &ShimejiError) {
    match err.graph_code() {
        Some(graph_code) => error!(
            error = %err,
            code = %err.code(),
            graph_code = %graph_code,
            "command execution failed"
        ),
        None => error!(
            error = %err,
            code = %err.code(),
            "command execution failed"
        ),
    }
}
