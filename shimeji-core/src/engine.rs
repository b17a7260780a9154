//! Core/Noise classification and parallel cluster expansion.
//!
//! Classification is a serial degree-threshold pass. Cluster identification
//! walks nodes in index order and, for each unclustered Core node, claims a
//! fresh cluster id and expands it with a level-synchronous breadth-first
//! search: the frontier is split into contiguous per-worker ranges, workers
//! collect partial next-level frontiers, and the level barrier concatenates
//! them in worker order. Cluster ids are therefore a function of iteration
//! order alone.
//!
//! Frontier workers claim a neighbour's cluster id with a compare-exchange,
//! so every node is enqueued exactly once across the whole run. That also
//! leaves each membership cell with at most one BFS writer: the Noise to
//! Border relabel of a node that was enqueued.

use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

use rayon::prelude::*;
use tracing::debug;

use crate::{
    graph::CsrGraph,
    labelling::{Labelling, Membership, UNCLUSTERED},
};

pub(crate) struct ClusterEngine<'a> {
    graph: &'a CsrGraph,
    threads: usize,
    membership: Vec<AtomicU8>,
    cluster_ids: Vec<AtomicI64>,
}

impl<'a> ClusterEngine<'a> {
    pub(crate) fn new(graph: &'a CsrGraph, threads: usize) -> Self {
        let nodes = graph.node_count();
        Self {
            graph,
            threads,
            membership: (0..nodes)
                .map(|_| AtomicU8::new(Membership::Noise as u8))
                .collect(),
            cluster_ids: (0..nodes).map(|_| AtomicI64::new(UNCLUSTERED)).collect(),
        }
    }

    /// Marks every node with at least `min_pts` neighbours as Core.
    ///
    /// Border is not assigned here; reachable Noise nodes are relabelled
    /// during expansion.
    pub(crate) fn classify(&mut self, min_pts: usize) -> usize {
        let mut cores = 0;
        for node in 0..self.graph.node_count() {
            if self.graph.degree_unchecked(node) >= min_pts {
                *self.membership[node].get_mut() = Membership::Core as u8;
                cores += 1;
            }
        }
        cores
    }

    /// Assigns cluster ids by repeated expansion, returning the cluster count.
    pub(crate) fn identify(&mut self) -> usize {
        let mut cluster = 0i64;
        for node in 0..self.graph.node_count() {
            if *self.cluster_ids[node].get_mut() == UNCLUSTERED
                && *self.membership[node].get_mut() == Membership::Core as u8
            {
                *self.cluster_ids[node].get_mut() = cluster;
                debug!(seed = node, cluster, "expanding cluster");
                self.expand(node, cluster);
                cluster += 1;
            }
        }
        cluster as usize
    }

    /// Level-synchronous breadth-first expansion from `seed`.
    fn expand(&self, seed: usize, cluster: i64) {
        let mut frontier = vec![seed];
        while !frontier.is_empty() {
            let chunk = frontier.len().div_ceil(self.threads);
            let partials: Vec<Vec<usize>> = frontier
                .par_chunks(chunk)
                .map(|range| self.visit_range(range, cluster))
                .collect();
            frontier = partials.into_iter().flatten().collect();
        }
    }

    fn visit_range(&self, range: &[usize], cluster: i64) -> Vec<usize> {
        let mut next = Vec::new();
        for &node in range {
            // A reachable Noise node joins the cluster as Border but is not
            // itself dense enough to expand from.
            if self.membership[node].load(Ordering::Relaxed) == Membership::Noise as u8 {
                self.membership[node].store(Membership::Border as u8, Ordering::Relaxed);
                continue;
            }
            for &neighbour in self.graph.neighbours_unchecked(node) {
                if self.cluster_ids[neighbour]
                    .compare_exchange(UNCLUSTERED, cluster, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
                {
                    next.push(neighbour);
                }
            }
        }
        next
    }

    pub(crate) fn into_labelling(self, cluster_count: usize) -> Labelling {
        let membership = self
            .membership
            .into_iter()
            .map(|cell| Membership::from_raw(cell.into_inner()))
            .collect();
        let cluster_ids = self
            .cluster_ids
            .into_iter()
            .map(AtomicI64::into_inner)
            .collect();
        Labelling::new(membership, cluster_ids, cluster_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeStaging;

    fn chain_graph(nodes: usize) -> CsrGraph {
        let mut staging = EdgeStaging::dense(nodes);
        for node in 0..nodes {
            if node > 0 {
                staging.insert_edge(node, node - 1).expect("in bounds");
            }
            if node + 1 < nodes {
                staging.insert_edge(node, node + 1).expect("in bounds");
            }
        }
        staging.freeze().expect("staging is consistent")
    }

    #[test]
    fn classification_applies_the_degree_threshold() {
        let graph = chain_graph(5);
        // Interior nodes have degree two, the endpoints degree one.
        assert_eq!(ClusterEngine::new(&graph, 1).classify(2), 3);
        assert_eq!(ClusterEngine::new(&graph, 1).classify(1), 5);
        assert_eq!(ClusterEngine::new(&graph, 1).classify(3), 0);
    }

    #[test]
    fn expansion_relabels_reachable_endpoints_as_border() {
        let graph = chain_graph(5);
        let mut engine = ClusterEngine::new(&graph, 2);
        engine.classify(2);
        let clusters = engine.identify();
        let labelling = engine.into_labelling(clusters);

        assert_eq!(clusters, 1);
        assert_eq!(labelling.cluster_ids(), [0, 0, 0, 0, 0]);
        assert_eq!(labelling.membership()[0], Membership::Border);
        assert_eq!(labelling.membership()[4], Membership::Border);
        assert_eq!(labelling.membership()[2], Membership::Core);
    }

    #[test]
    fn isolated_nodes_stay_noise_and_unclustered() {
        let graph = EdgeStaging::dense(3)
            .freeze()
            .expect("staging is consistent");
        let mut engine = ClusterEngine::new(&graph, 1);
        engine.classify(1);
        let clusters = engine.identify();
        let labelling = engine.into_labelling(clusters);

        assert_eq!(clusters, 0);
        assert!(labelling
            .membership()
            .iter()
            .all(|&role| role == Membership::Noise));
        assert!(labelling
            .cluster_ids()
            .iter()
            .all(|&id| id == UNCLUSTERED));
    }
}
