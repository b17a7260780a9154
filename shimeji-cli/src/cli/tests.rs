//! Tests for CLI argument parsing and command execution.

use std::io::Cursor;
use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use shimeji_core::Membership;
use shimeji_providers_points::PointsSourceErrorCode;

use super::{render_labelling, run_cli, Cli, CliError, Command, EncodingArg, KernelArg, RunCommand};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args.iter().copied()).expect("arguments must parse")
}

fn write_points(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("points.txt");
    std::fs::write(&path, contents).expect("file is writable");
    path
}

fn run_args(path: &PathBuf, rest: &[&str]) -> Cli {
    let mut args = vec!["shimeji", "run", path.to_str().expect("path is UTF-8")];
    args.extend_from_slice(rest);
    parse(&args)
}

#[test]
fn run_arguments_parse_with_defaults() {
    let cli = parse(&["shimeji", "run", "points.txt", "--eps", "1.5"]);
    let Command::Run(run) = cli.command;
    assert_eq!(run.input, PathBuf::from("points.txt"));
    assert_eq!(run.eps, 1.5);
    assert_eq!(run.min_pts, 4);
    assert!(run.threads >= 1);
    assert_eq!(run.encoding, EncodingArg::Dense);
    assert_eq!(run.kernel, KernelArg::Auto);
}

#[rstest]
#[case::dense("dense", EncodingArg::Dense)]
#[case::bitset("bitset", EncodingArg::Bitset)]
fn encoding_flag_parses_both_variants(#[case] flag: &str, #[case] expected: EncodingArg) {
    let cli = parse(&[
        "shimeji", "run", "points.txt", "--eps", "1.0", "--encoding", flag,
    ]);
    let Command::Run(run) = cli.command;
    assert_eq!(run.encoding, expected);
}

#[rstest]
#[case::auto("auto", KernelArg::Auto)]
#[case::scalar("scalar", KernelArg::Scalar)]
#[case::wide("wide", KernelArg::Wide)]
fn kernel_flag_parses_all_variants(#[case] flag: &str, #[case] expected: KernelArg) {
    let cli = parse(&[
        "shimeji", "run", "points.txt", "--eps", "1.0", "--kernel", flag,
    ]);
    let Command::Run(run) = cli.command;
    assert_eq!(run.kernel, expected);
}

#[test]
fn missing_eps_is_a_parse_error() {
    let err = Cli::try_parse_from(["shimeji", "run", "points.txt"])
        .expect_err("eps is required");
    assert!(err.to_string().contains("--eps"));
}

#[test]
fn run_labels_a_point_file_end_to_end() {
    let dir = TempDir::new().expect("temp dir is available");
    let path = write_points(
        &dir,
        "6\n0 0.0 0.0\n1 0.0 1.0\n2 1.0 0.0\n3 10.0 10.0\n4 10.0 11.0\n5 11.0 10.0\n",
    );
    let cli = run_args(&path, &["--eps", "1.5", "--min-pts", "2", "--threads", "2"]);

    let summary = run_cli(cli).expect("run must succeed");
    assert_eq!(summary.labelling.len(), 6);
    assert_eq!(summary.labelling.cluster_count(), 2);
    assert!(summary
        .labelling
        .membership()
        .iter()
        .all(|&role| role == Membership::Core));
}

#[test]
fn run_surfaces_loader_failures() {
    let dir = TempDir::new().expect("temp dir is available");
    let path = write_points(&dir, "2\n0 0.0 0.0\n");
    let cli = run_args(&path, &["--eps", "1.0"]);

    let err = run_cli(cli).expect_err("a record is missing");
    match err {
        CliError::Points(points) => {
            assert_eq!(points.code(), PointsSourceErrorCode::MissingIndex);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn run_surfaces_configuration_failures() {
    let dir = TempDir::new().expect("temp dir is available");
    let path = write_points(&dir, "1\n0 0.0 0.0\n");
    let cli = run_args(&path, &["--eps=-2.0"]);

    let err = run_cli(cli).expect_err("eps must be positive");
    assert!(matches!(err, CliError::Core(_)));
}

#[test]
fn render_emits_one_record_per_point() {
    let dir = TempDir::new().expect("temp dir is available");
    let path = write_points(&dir, "4\n0 0.0 0.0\n1 0.0 1.0\n2 0.0 2.0\n3 9.0 9.0\n");
    let cli = run_args(&path, &["--eps", "1.1", "--min-pts", "2"]);
    let summary = run_cli(cli).expect("run must succeed");

    let mut buffer = Cursor::new(Vec::new());
    render_labelling(&summary.labelling, &mut buffer).expect("rendering must succeed");
    let rendered = String::from_utf8(buffer.into_inner()).expect("output is UTF-8");
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "points: 4");
    assert_eq!(lines[1], "clusters: 1");
    assert_eq!(lines[2], "0\t0\tborder");
    assert_eq!(lines[3], "1\t0\tcore");
    assert_eq!(lines[4], "2\t0\tborder");
    assert_eq!(lines[5], "3\t-1\tnoise");
}

#[test]
fn command_structs_can_be_assembled_directly() {
    let cli = Cli {
        command: Command::Run(RunCommand {
            input: PathBuf::from("points.txt"),
            eps: 0.5,
            min_pts: 3,
            threads: 1,
            encoding: EncodingArg::Bitset,
            kernel: KernelArg::Scalar,
        }),
    };
    let Command::Run(run) = cli.command;
    assert_eq!(run.min_pts, 3);
    assert_eq!(run.encoding, EncodingArg::Bitset);
}
