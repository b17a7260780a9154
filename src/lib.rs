//! Shimeji library facade.
//!
//! Re-exports the public surface of `shimeji-core` so applications can depend
//! on a single crate. The engine clusters two-dimensional point sets with
//! DBSCAN over a brute-force ε-neighbourhood graph; see `shimeji-core` for
//! the full API documentation.

pub use shimeji_core::{
    CsrGraph, Dataset, DatasetError, DatasetErrorCode, DistanceKernel, EdgeStaging, GraphError,
    GraphErrorCode, Labelling, Membership, Result, Shimeji, ShimejiBuilder, ShimejiError,
    ShimejiErrorCode, StagingEncoding, UNCLUSTERED,
};
