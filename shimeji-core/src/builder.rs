//! Builder utilities for configuring clustering runs.
//!
//! Exposes the staging-encoding and distance-kernel selection surface and the
//! parameter validation performed before constructing [`Shimeji`] instances.

use std::num::NonZeroUsize;

use crate::{error::ShimejiError, shimeji::Shimeji, Result};

/// Row encoding used while staging neighbourhood edges.
///
/// `Dense` stores one growable neighbour list per node, using memory
/// proportional to the edge count. `Bitset` stores one fixed-stride bit row
/// per node, using `N · ⌈N/64⌉` bits regardless of density. Both encodings
/// freeze to identical adjacency and produce identical labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingEncoding {
    /// One growable neighbour list per node.
    Dense,
    /// One fixed-stride bit row per node.
    Bitset,
}

/// Distance-kernel selection for the neighbourhood build.
///
/// `Auto` resolves deterministically at run time: the eight-lane 256-bit
/// kernel when the host supports it, the scalar kernel otherwise. Requesting
/// `Wide` on a host without 256-bit SIMD degrades to the scalar kernel with
/// a logged notice; every kernel yields the same labelling because the lanes
/// evaluate independent comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceKernel {
    /// Let the library pick the widest kernel the host supports.
    Auto,
    /// Compare one candidate at a time.
    Scalar,
    /// Compare eight candidates per step with 256-bit SIMD.
    Wide,
}

/// Configures and constructs [`Shimeji`] instances.
///
/// # Examples
/// ```
/// use shimeji_core::{DistanceKernel, ShimejiBuilder, StagingEncoding};
///
/// let shimeji = ShimejiBuilder::new()
///     .with_eps(1.5)
///     .with_min_pts(4)
///     .with_threads(2)
///     .with_encoding(StagingEncoding::Bitset)
///     .with_kernel(DistanceKernel::Scalar)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(shimeji.min_pts().get(), 4);
/// assert_eq!(shimeji.threads().get(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ShimejiBuilder {
    eps: f32,
    min_pts: usize,
    threads: usize,
    encoding: StagingEncoding,
    kernel: DistanceKernel,
}

impl Default for ShimejiBuilder {
    fn default() -> Self {
        Self {
            eps: 1.0,
            min_pts: 4,
            threads: 1,
            encoding: StagingEncoding::Dense,
            kernel: DistanceKernel::Auto,
        }
    }
}

impl ShimejiBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the neighbourhood radius.
    #[must_use]
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Returns the configured neighbourhood radius.
    #[must_use]
    pub fn eps(&self) -> f32 {
        self.eps
    }

    /// Sets the neighbour count at which a point becomes Core.
    #[must_use]
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Returns the configured Core threshold.
    #[must_use]
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Sets the worker pool size.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Returns the configured worker pool size.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Sets the staging row encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: StagingEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Returns the configured staging row encoding.
    #[must_use]
    pub fn encoding(&self) -> StagingEncoding {
        self.encoding
    }

    /// Sets the distance kernel.
    #[must_use]
    pub fn with_kernel(mut self, kernel: DistanceKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Returns the configured distance kernel.
    #[must_use]
    pub fn kernel(&self) -> DistanceKernel {
        self.kernel
    }

    /// Validates the configuration and constructs a [`Shimeji`] instance.
    ///
    /// The radius is squared here, once; the pipeline never rematerialises
    /// it, so no square root is taken per comparison.
    ///
    /// # Errors
    /// Returns [`ShimejiError::InvalidEps`] unless the radius is positive and
    /// finite, [`ShimejiError::InvalidMinPts`] when the Core threshold is
    /// zero and [`ShimejiError::InvalidThreads`] when the pool size is zero.
    pub fn build(self) -> Result<Shimeji> {
        if !(self.eps > 0.0 && self.eps.is_finite()) {
            return Err(ShimejiError::InvalidEps { got: self.eps });
        }
        let min_pts = NonZeroUsize::new(self.min_pts)
            .ok_or(ShimejiError::InvalidMinPts { got: self.min_pts })?;
        let threads = NonZeroUsize::new(self.threads)
            .ok_or(ShimejiError::InvalidThreads { got: self.threads })?;

        Ok(Shimeji::new(
            self.eps,
            min_pts,
            threads,
            self.encoding,
            self.kernel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_reported_back() {
        let builder = ShimejiBuilder::new();
        assert_eq!(builder.eps(), 1.0);
        assert_eq!(builder.min_pts(), 4);
        assert_eq!(builder.threads(), 1);
        assert_eq!(builder.encoding(), StagingEncoding::Dense);
        assert_eq!(builder.kernel(), DistanceKernel::Auto);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.0)]
    #[case::nan(f32::NAN)]
    #[case::infinite(f32::INFINITY)]
    fn build_rejects_unusable_radii(#[case] eps: f32) {
        let err = ShimejiBuilder::new()
            .with_eps(eps)
            .build()
            .expect_err("radius must be positive and finite");
        assert!(matches!(err, ShimejiError::InvalidEps { .. }));
    }

    #[test]
    fn build_rejects_zero_min_pts() {
        let err = ShimejiBuilder::new()
            .with_min_pts(0)
            .build()
            .expect_err("threshold must be at least one");
        assert!(matches!(err, ShimejiError::InvalidMinPts { got: 0 }));
    }

    #[test]
    fn build_rejects_zero_threads() {
        let err = ShimejiBuilder::new()
            .with_threads(0)
            .build()
            .expect_err("pool must hold at least one worker");
        assert!(matches!(err, ShimejiError::InvalidThreads { got: 0 }));
    }
}
