//! Command-line interface orchestration for the shimeji engine.
//!
//! The CLI offers a `run` command that loads a whitespace-delimited point
//! file, executes the clustering pipeline, and emits one labelled record per
//! point.

mod commands;

pub use commands::{
    render_labelling, run_cli, Cli, CliError, Command, EncodingArg, KernelArg, RunCommand,
    RunSummary,
};

#[cfg(test)]
mod tests;
