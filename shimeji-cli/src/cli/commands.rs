//! Command implementations and argument parsing for the shimeji CLI.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{info, instrument};

use shimeji_core::{DistanceKernel, Labelling, ShimejiBuilder, ShimejiError, StagingEncoding};
use shimeji_providers_points::PointsSourceError;

const DEFAULT_MIN_PTS: usize = 4;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "shimeji", about = "Cluster two-dimensional point sets with DBSCAN.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Execute the clustering pipeline.
    Run(RunCommand),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Run(_) => "run",
        }
    }
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to a whitespace-delimited point file: a count `N`, then `N`
    /// records of `index x y`.
    pub input: PathBuf,

    /// Neighbourhood radius.
    #[arg(long)]
    pub eps: f32,

    /// Neighbour count at which a point becomes Core.
    #[arg(long = "min-pts", default_value_t = DEFAULT_MIN_PTS)]
    pub min_pts: usize,

    /// Worker pool size; defaults to the host parallelism.
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    /// Staging encoding for the neighbourhood build.
    #[arg(long, value_enum, default_value_t = EncodingArg::Dense)]
    pub encoding: EncodingArg,

    /// Distance kernel for the neighbourhood build.
    #[arg(long, value_enum, default_value_t = KernelArg::Auto)]
    pub kernel: KernelArg,
}

/// Staging encodings selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodingArg {
    /// One growable neighbour list per node.
    Dense,
    /// One fixed-stride bit row per node.
    Bitset,
}

impl EncodingArg {
    fn label(self) -> &'static str {
        match self {
            EncodingArg::Dense => "dense",
            EncodingArg::Bitset => "bitset",
        }
    }
}

impl From<EncodingArg> for StagingEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Dense => StagingEncoding::Dense,
            EncodingArg::Bitset => StagingEncoding::Bitset,
        }
    }
}

/// Distance kernels selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KernelArg {
    /// Pick the widest kernel the host supports.
    Auto,
    /// Compare one candidate at a time.
    Scalar,
    /// Compare eight candidates per step with 256-bit SIMD.
    Wide,
}

impl KernelArg {
    fn label(self) -> &'static str {
        match self {
            KernelArg::Auto => "auto",
            KernelArg::Scalar => "scalar",
            KernelArg::Wide => "wide",
        }
    }
}

impl From<KernelArg> for DistanceKernel {
    fn from(arg: KernelArg) -> Self {
        match arg {
            KernelArg::Auto => DistanceKernel::Auto,
            KernelArg::Scalar => DistanceKernel::Scalar,
            KernelArg::Wide => DistanceKernel::Wide,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Point-file loading failed.
    #[error(transparent)]
    Points(#[from] PointsSourceError),
    /// Core pipeline execution failed.
    #[error(transparent)]
    Core(#[from] ShimejiError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Labelled input path.
    pub input: PathBuf,
    /// Labelling produced by the pipeline.
    pub labelling: Labelling,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or execution fails.
#[instrument(name = "cli.run", err, skip(cli), fields(command = %cli.command.name()))]
pub fn run_cli(cli: Cli) -> Result<RunSummary, CliError> {
    match cli.command {
        Command::Run(run) => run_command(run),
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        input = %path_label(&command.input),
        eps = command.eps,
        min_pts = command.min_pts,
        threads = command.threads,
        encoding = command.encoding.label(),
        kernel = command.kernel.label(),
    ),
)]
fn run_command(command: RunCommand) -> Result<RunSummary, CliError> {
    let shimeji = ShimejiBuilder::new()
        .with_eps(command.eps)
        .with_min_pts(command.min_pts)
        .with_threads(command.threads)
        .with_encoding(command.encoding.into())
        .with_kernel(command.kernel.into())
        .build()?;

    let dataset = shimeji_providers_points::load_path(&command.input)?;
    let labelling = shimeji.run(&dataset)?;

    info!(
        points = labelling.len(),
        clusters = labelling.cluster_count(),
        "command completed"
    );
    Ok(RunSummary {
        input: command.input,
        labelling,
    })
}

/// Renders `labelling` to `writer`, one record per point.
///
/// Each line holds the point index, its cluster id
/// ([`UNCLUSTERED`](shimeji_core::UNCLUSTERED) for Noise) and its membership,
/// tab-separated, preceded by two summary lines.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_labelling(labelling: &Labelling, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "points: {}", labelling.len())?;
    writeln!(writer, "clusters: {}", labelling.cluster_count())?;
    for (index, (&role, &cluster)) in labelling
        .membership()
        .iter()
        .zip(labelling.cluster_ids())
        .enumerate()
    {
        writeln!(writer, "{index}\t{cluster}\t{role}")?;
    }
    Ok(())
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Produce a redacted label for a path that avoids leaking absolute
/// directories.
fn path_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<unknown>".to_owned())
}
