//! Pipeline orchestration.

use std::{num::NonZeroUsize, time::Instant};

use tracing::{info, instrument};

use crate::{
    builder::{DistanceKernel, StagingEncoding},
    dataset::Dataset,
    engine::ClusterEngine,
    error::ShimejiError,
    graph::CsrGraph,
    kernel::LaneKernel,
    labelling::Labelling,
    neighbours, Result,
};

/// Entry point for running the clustering pipeline.
///
/// Holds the validated configuration; one instance can label any number of
/// datasets. A run is single-shot and linear: build the ε-neighbourhood
/// graph, freeze it, classify nodes by degree, then identify clusters. The
/// worker pool is created per run with exactly the configured thread count,
/// and every stage joins it before the next stage reads what was written.
///
/// # Examples
/// ```
/// use shimeji_core::{Dataset, Membership, ShimejiBuilder};
///
/// let dataset = Dataset::from_records(
///     4,
///     [(0, 0.0, 0.0), (1, 0.0, 1.0), (2, 1.0, 0.0), (3, 9.0, 9.0)],
/// )
/// .expect("indices are in bounds");
/// let shimeji = ShimejiBuilder::new()
///     .with_eps(1.5)
///     .with_min_pts(2)
///     .build()
///     .expect("configuration is valid");
/// let labelling = shimeji.run(&dataset).expect("run succeeds");
/// assert_eq!(labelling.cluster_count(), 1);
/// assert_eq!(labelling.membership()[3], Membership::Noise);
/// ```
#[derive(Debug, Clone)]
pub struct Shimeji {
    eps: f32,
    eps_sq: f32,
    min_pts: NonZeroUsize,
    threads: NonZeroUsize,
    encoding: StagingEncoding,
    kernel: DistanceKernel,
}

impl Shimeji {
    pub(crate) fn new(
        eps: f32,
        min_pts: NonZeroUsize,
        threads: NonZeroUsize,
        encoding: StagingEncoding,
        kernel: DistanceKernel,
    ) -> Self {
        Self {
            eps,
            eps_sq: eps * eps,
            min_pts,
            threads,
            encoding,
            kernel,
        }
    }

    /// Returns the neighbourhood radius.
    #[must_use]
    pub fn eps(&self) -> f32 {
        self.eps
    }

    /// Returns the neighbour count at which a point becomes Core.
    #[must_use]
    pub fn min_pts(&self) -> NonZeroUsize {
        self.min_pts
    }

    /// Returns the worker pool size.
    #[must_use]
    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    /// Returns the staging row encoding.
    #[must_use]
    pub fn encoding(&self) -> StagingEncoding {
        self.encoding
    }

    /// Returns the configured distance kernel.
    #[must_use]
    pub fn kernel(&self) -> DistanceKernel {
        self.kernel
    }

    /// Labels every point of `dataset` and identifies its clusters.
    ///
    /// Running twice over the same dataset produces identical labelling, and
    /// the labelling does not depend on the worker count.
    ///
    /// # Errors
    /// Returns [`ShimejiError::ThreadPool`] when the worker pool cannot be
    /// created and propagates graph failures as [`ShimejiError::Graph`].
    #[instrument(
        name = "core.run",
        err,
        skip(self, dataset),
        fields(
            points = dataset.len(),
            eps = self.eps,
            min_pts = self.min_pts.get(),
            threads = self.threads.get(),
        ),
    )]
    pub fn run(&self, dataset: &Dataset) -> Result<Labelling> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.get())
            .build()
            .map_err(|source| ShimejiError::ThreadPool { source })?;

        let graph = pool.install(|| self.build_graph_inner(dataset))?;
        Ok(pool.install(|| self.label_graph(&graph)))
    }

    /// Builds and freezes the ε-neighbourhood graph of `dataset`.
    ///
    /// Exposed so callers can inspect the adjacency the labelling ran over.
    ///
    /// # Errors
    /// As for [`Shimeji::run`].
    pub fn build_graph(&self, dataset: &Dataset) -> Result<CsrGraph> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.get())
            .build()
            .map_err(|source| ShimejiError::ThreadPool { source })?;
        pool.install(|| self.build_graph_inner(dataset))
    }

    fn build_graph_inner(&self, dataset: &Dataset) -> Result<CsrGraph> {
        let kernel = LaneKernel::resolve(self.kernel);
        if self.kernel == DistanceKernel::Wide && kernel == LaneKernel::Scalar {
            info!("wide kernel unavailable on this host, using the scalar kernel");
        }

        let started = Instant::now();
        let graph = neighbours::build_graph(
            dataset,
            self.eps_sq,
            self.encoding,
            kernel,
            self.threads.get(),
        )?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            edges = graph.edge_count(),
            "neighbourhood graph frozen"
        );
        Ok(graph)
    }

    fn label_graph(&self, graph: &CsrGraph) -> Labelling {
        let started = Instant::now();
        let mut engine = ClusterEngine::new(graph, self.threads.get());
        let cores = engine.classify(self.min_pts.get());
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            cores, "nodes classified"
        );

        let started = Instant::now();
        let clusters = engine.identify();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            clusters, "clusters identified"
        );
        engine.into_labelling(clusters)
    }
}
