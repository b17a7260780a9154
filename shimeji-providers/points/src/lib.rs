//! Whitespace-delimited point-file loader.
//!
//! The format is a stream of ASCII/UTF-8 tokens: an initial point count `N`,
//! followed by `N` records of three tokens each, `index x y`, in any order.
//! The loader is strict where the engine is permissive: every index must
//! fall in `[0, N)` and appear exactly once, and every malformed token is
//! reported with its record number. The engine itself tolerates any
//! coordinate configuration, including coincident points.

use std::{
    fmt, fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, instrument};

use shimeji_core::Dataset;

/// Stable codes describing [`PointsSourceError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum PointsSourceErrorCode {
    /// The file or stream could not be read.
    Io,
    /// The stream held no point count.
    MissingCount,
    /// A token could not be parsed as what its position requires.
    MalformedToken,
    /// A record was cut short by the end of the stream.
    TruncatedRecord,
    /// A record named an index at or beyond the point count.
    IndexOutOfRange,
    /// Two records named the same index.
    DuplicateIndex,
    /// An index in `[0, N)` had no record.
    MissingIndex,
}

impl PointsSourceErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "POINTS_IO",
            Self::MissingCount => "POINTS_MISSING_COUNT",
            Self::MalformedToken => "POINTS_MALFORMED_TOKEN",
            Self::TruncatedRecord => "POINTS_TRUNCATED_RECORD",
            Self::IndexOutOfRange => "POINTS_INDEX_OUT_OF_RANGE",
            Self::DuplicateIndex => "POINTS_DUPLICATE_INDEX",
            Self::MissingIndex => "POINTS_MISSING_INDEX",
        }
    }
}

impl fmt::Display for PointsSourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced while loading a point file.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PointsSourceError {
    /// The file or stream could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The stream held no point count.
    #[error("input holds no point count")]
    MissingCount,
    /// A token could not be parsed as what its position requires.
    #[error("record {record}: `{token}` is not a valid {expected}")]
    MalformedToken {
        record: usize,
        token: String,
        expected: &'static str,
    },
    /// A record was cut short by the end of the stream.
    #[error("record {record} is truncated; each record is `index x y`")]
    TruncatedRecord { record: usize },
    /// A record named an index at or beyond the point count.
    #[error("record {record}: index {index} is out of range for {count} points")]
    IndexOutOfRange {
        record: usize,
        index: usize,
        count: usize,
    },
    /// Two records named the same index.
    #[error("record {record}: index {index} appears more than once")]
    DuplicateIndex { record: usize, index: usize },
    /// An index in `[0, N)` had no record.
    #[error("no record for index {index}")]
    MissingIndex { index: usize },
}

impl PointsSourceError {
    /// Retrieve the stable [`PointsSourceErrorCode`] for this error.
    pub const fn code(&self) -> PointsSourceErrorCode {
        match self {
            Self::Io { .. } => PointsSourceErrorCode::Io,
            Self::MissingCount => PointsSourceErrorCode::MissingCount,
            Self::MalformedToken { .. } => PointsSourceErrorCode::MalformedToken,
            Self::TruncatedRecord { .. } => PointsSourceErrorCode::TruncatedRecord,
            Self::IndexOutOfRange { .. } => PointsSourceErrorCode::IndexOutOfRange,
            Self::DuplicateIndex { .. } => PointsSourceErrorCode::DuplicateIndex,
            Self::MissingIndex { .. } => PointsSourceErrorCode::MissingIndex,
        }
    }
}

/// Loads a point file from `path`.
///
/// # Errors
/// Returns [`PointsSourceError::Io`] when the file cannot be read and any of
/// the parse errors described on [`load_str`].
#[instrument(name = "points.load_path", err, skip(path))]
pub fn load_path(path: impl AsRef<Path>) -> Result<Dataset, PointsSourceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| PointsSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_str(&text)
}

/// Loads a point file from an open reader.
///
/// # Errors
/// As for [`load_path`]; read failures are reported without a path.
pub fn load_reader(mut reader: impl Read) -> Result<Dataset, PointsSourceError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| PointsSourceError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
    load_str(&text)
}

/// Parses point records out of `text`.
///
/// # Errors
/// Returns [`PointsSourceError::MissingCount`] for an empty stream,
/// [`PointsSourceError::MalformedToken`] and
/// [`PointsSourceError::TruncatedRecord`] for token-level damage, and the
/// index coverage errors when the records do not name every index in
/// `[0, N)` exactly once.
///
/// # Examples
/// ```
/// let dataset = shimeji_providers_points::load_str("2\n0 1.0 2.0\n1 3.0 4.0\n")
///     .expect("input is well-formed");
/// assert_eq!(dataset.len(), 2);
/// assert_eq!(dataset.xs(), [1.0, 3.0]);
/// ```
pub fn load_str(text: &str) -> Result<Dataset, PointsSourceError> {
    let mut tokens = text.split_whitespace();
    let count_token = tokens.next().ok_or(PointsSourceError::MissingCount)?;
    let count: usize = count_token
        .parse()
        .map_err(|_| PointsSourceError::MalformedToken {
            record: 0,
            token: count_token.to_owned(),
            expected: "point count",
        })?;

    let mut xs = vec![0.0f32; count];
    let mut ys = vec![0.0f32; count];
    let mut seen = vec![false; count];
    let mut record = 0;
    while let Some(index_token) = tokens.next() {
        record += 1;
        let index: usize =
            index_token
                .parse()
                .map_err(|_| PointsSourceError::MalformedToken {
                    record,
                    token: index_token.to_owned(),
                    expected: "point index",
                })?;
        if index >= count {
            return Err(PointsSourceError::IndexOutOfRange {
                record,
                index,
                count,
            });
        }
        if seen[index] {
            return Err(PointsSourceError::DuplicateIndex { record, index });
        }
        let x = parse_coordinate(&mut tokens, record, "x coordinate")?;
        let y = parse_coordinate(&mut tokens, record, "y coordinate")?;
        seen[index] = true;
        xs[index] = x;
        ys[index] = y;
    }

    if let Some(index) = seen.iter().position(|&present| !present) {
        return Err(PointsSourceError::MissingIndex { index });
    }

    info!(points = count, "point file loaded");
    let dataset = Dataset::from_columns(xs, ys).expect("columns were built with equal lengths");
    Ok(dataset)
}

fn parse_coordinate<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    record: usize,
    expected: &'static str,
) -> Result<f32, PointsSourceError> {
    let token = tokens
        .next()
        .ok_or(PointsSourceError::TruncatedRecord { record })?;
    token.parse().map_err(|_| PointsSourceError::MalformedToken {
        record,
        token: token.to_owned(),
        expected,
    })
}
