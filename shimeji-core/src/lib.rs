//! Shimeji core library.
//!
//! A parallel, brute-force DBSCAN engine for two-dimensional point sets.
//! Given `N` points, a radius `eps` and a neighbour threshold `min_pts`, the
//! engine labels every point Core, Border or Noise and assigns Core and
//! Border points to connected clusters (Ester et al., 1996).
//!
//! The pipeline follows the graph formulation of Andrade et al. (2013):
//!
//! 1. build the ε-neighbourhood graph by comparing every pair of points under
//!    the squared-distance predicate, staging edges into either per-node
//!    lists or a bit matrix ([`EdgeStaging`]);
//! 2. freeze the staging area into an immutable compressed sparse row
//!    adjacency ([`CsrGraph`]);
//! 3. classify nodes by degree and expand clusters with a level-synchronous
//!    parallel breadth-first search.
//!
//! Both stages partition work across a fixed-size thread pool. The distance
//! kernel optionally processes eight points per step with 256-bit SIMD on
//! `x86_64`; every kernel and staging-encoding combination produces the same
//! labelling.

mod builder;
mod dataset;
mod engine;
mod error;
mod graph;
mod kernel;
mod labelling;
mod neighbours;
mod shimeji;

pub use crate::{
    builder::{DistanceKernel, ShimejiBuilder, StagingEncoding},
    dataset::Dataset,
    error::{
        DatasetError, DatasetErrorCode, GraphError, GraphErrorCode, Result, ShimejiError,
        ShimejiErrorCode,
    },
    graph::{CsrGraph, EdgeStaging},
    labelling::{Labelling, Membership, UNCLUSTERED},
    shimeji::Shimeji,
};
