//! Error types for the Shimeji core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`DatasetError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum DatasetErrorCode {
    /// A record carried an index outside the declared point count.
    IndexOutOfBounds,
    /// The coordinate columns had different lengths.
    ColumnLengthMismatch,
}

impl DatasetErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IndexOutOfBounds => "DATASET_INDEX_OUT_OF_BOUNDS",
            Self::ColumnLengthMismatch => "DATASET_COLUMN_LENGTH_MISMATCH",
        }
    }
}

impl fmt::Display for DatasetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced while constructing a [`Dataset`](crate::Dataset).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DatasetError {
    /// A record carried an index outside the declared point count.
    #[error("point index {index} is out of bounds for {len} points")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The coordinate columns had different lengths.
    #[error("coordinate columns differ in length: x has {xs}, y has {ys}")]
    ColumnLengthMismatch { xs: usize, ys: usize },
}

impl DatasetError {
    /// Retrieve the stable [`DatasetErrorCode`] for this error.
    pub const fn code(&self) -> DatasetErrorCode {
        match self {
            Self::IndexOutOfBounds { .. } => DatasetErrorCode::IndexOutOfBounds,
            Self::ColumnLengthMismatch { .. } => DatasetErrorCode::ColumnLengthMismatch,
        }
    }
}

/// Stable codes describing [`GraphError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GraphErrorCode {
    /// An edge operation named a node outside the graph.
    NodeOutOfBounds,
    /// A bit-row insertion named a word beyond the row stride.
    WordOutOfBounds,
    /// An edge operation did not match the staging encoding.
    EncodingMismatch,
    /// The adjacency fill wrote a different number of neighbours than the
    /// degree pass counted.
    DegreeMismatch,
}

impl GraphErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NodeOutOfBounds => "GRAPH_NODE_OUT_OF_BOUNDS",
            Self::WordOutOfBounds => "GRAPH_WORD_OUT_OF_BOUNDS",
            Self::EncodingMismatch => "GRAPH_ENCODING_MISMATCH",
            Self::DegreeMismatch => "GRAPH_DEGREE_MISMATCH",
        }
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by neighbourhood-graph operations.
///
/// `NodeOutOfBounds` and `WordOutOfBounds` indicate a programming error in
/// the caller; the diagnostic names the failing precondition and the
/// offending indices. `DegreeMismatch` indicates an internal invariant
/// violation.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// An edge operation named a node outside the graph.
    #[error("node {node} is out of bounds for a graph of {nodes} nodes")]
    NodeOutOfBounds { node: usize, nodes: usize },
    /// A bit-row insertion named a word beyond the row stride.
    #[error("word {word} is out of bounds for a bit row of {words} words (node {node})")]
    WordOutOfBounds {
        node: usize,
        word: usize,
        words: usize,
    },
    /// An edge operation did not match the staging encoding.
    #[error("operation `{operation}` requires the {required} staging encoding")]
    EncodingMismatch {
        operation: &'static str,
        required: &'static str,
    },
    /// The adjacency fill wrote a different number of neighbours than the
    /// degree pass counted.
    #[error("node {node} wrote {written} neighbours but its degree is {expected}")]
    DegreeMismatch {
        node: usize,
        expected: usize,
        written: usize,
    },
}

impl GraphError {
    /// Retrieve the stable [`GraphErrorCode`] for this error.
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::NodeOutOfBounds { .. } => GraphErrorCode::NodeOutOfBounds,
            Self::WordOutOfBounds { .. } => GraphErrorCode::WordOutOfBounds,
            Self::EncodingMismatch { .. } => GraphErrorCode::EncodingMismatch,
            Self::DegreeMismatch { .. } => GraphErrorCode::DegreeMismatch,
        }
    }
}

/// Stable codes describing [`ShimejiError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ShimejiErrorCode {
    /// The radius must be positive and finite.
    InvalidEps,
    /// The neighbour threshold must be at least one.
    InvalidMinPts,
    /// The worker count must be at least one.
    InvalidThreads,
    /// The worker pool could not be created.
    ThreadPoolFailure,
    /// A graph operation failed while running the pipeline.
    GraphFailure,
}

impl ShimejiErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEps => "SHIMEJI_INVALID_EPS",
            Self::InvalidMinPts => "SHIMEJI_INVALID_MIN_PTS",
            Self::InvalidThreads => "SHIMEJI_INVALID_THREADS",
            Self::ThreadPoolFailure => "SHIMEJI_THREAD_POOL_FAILURE",
            Self::GraphFailure => "SHIMEJI_GRAPH_FAILURE",
        }
    }
}

impl fmt::Display for ShimejiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when configuring or running [`Shimeji`](crate::Shimeji).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ShimejiError {
    /// The radius must be positive and finite.
    #[error("eps must be positive and finite (got {got})")]
    InvalidEps { got: f32 },
    /// The neighbour threshold must be at least one.
    #[error("min_pts must be at least 1 (got {got})")]
    InvalidMinPts { got: usize },
    /// The worker count must be at least one.
    #[error("threads must be at least 1 (got {got})")]
    InvalidThreads { got: usize },
    /// The worker pool could not be created.
    #[error("failed to build the worker pool: {source}")]
    ThreadPool {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
    /// A graph operation failed while running the pipeline.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ShimejiError {
    /// Retrieve the stable [`ShimejiErrorCode`] for this error.
    pub const fn code(&self) -> ShimejiErrorCode {
        match self {
            Self::InvalidEps { .. } => ShimejiErrorCode::InvalidEps,
            Self::InvalidMinPts { .. } => ShimejiErrorCode::InvalidMinPts,
            Self::InvalidThreads { .. } => ShimejiErrorCode::InvalidThreads,
            Self::ThreadPool { .. } => ShimejiErrorCode::ThreadPoolFailure,
            Self::Graph(_) => ShimejiErrorCode::GraphFailure,
        }
    }

    /// Retrieve the inner [`GraphErrorCode`] when the error originated in the
    /// neighbourhood graph.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ShimejiError>;
