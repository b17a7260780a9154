//! Property tests for the clustering pipeline invariants.

use proptest::prelude::*;
use shimeji_core::{
    Dataset, DistanceKernel, Membership, ShimejiBuilder, StagingEncoding, UNCLUSTERED,
};

fn dataset(points: &[(f32, f32)]) -> Dataset {
    let xs = points.iter().map(|p| p.0).collect();
    let ys = points.iter().map(|p| p.1).collect();
    Dataset::from_columns(xs, ys).expect("columns have equal length")
}

fn build(eps: f32, min_pts: usize, threads: usize, encoding: StagingEncoding) -> shimeji_core::Shimeji {
    ShimejiBuilder::new()
        .with_eps(eps)
        .with_min_pts(min_pts)
        .with_threads(threads)
        .with_encoding(encoding)
        .with_kernel(DistanceKernel::Scalar)
        .build()
        .expect("configuration is valid")
}

fn points_strategy() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((-5.0f32..5.0, -5.0f32..5.0), 0..48)
}

proptest! {
    #[test]
    fn adjacency_layout_and_symmetry_hold(
        points in points_strategy(),
        eps in 0.1f32..4.0,
    ) {
        let shimeji = build(eps, 2, 2, StagingEncoding::Dense);
        let graph = shimeji
            .build_graph(&dataset(&points))
            .expect("build succeeds");

        // Offsets are the exclusive prefix sum of the degrees and the degree
        // sum matches the edge array.
        let mut running = 0;
        for node in 0..graph.node_count() {
            prop_assert_eq!(graph.index()[node * 2], running);
            running += graph.index()[node * 2 + 1];
        }
        prop_assert_eq!(running, graph.edge_count());

        let eps_sq = eps * eps;
        for u in 0..graph.node_count() {
            for &v in graph.neighbours(u).expect("node exists") {
                prop_assert_ne!(u, v);
                let dx = points[u].0 - points[v].0;
                let dy = points[u].1 - points[v].1;
                prop_assert!(dx * dx + dy * dy <= eps_sq);
                prop_assert!(graph.neighbours(v).expect("node exists").contains(&u));
            }
        }
    }

    #[test]
    fn labelling_partitions_points_consistently(
        points in points_strategy(),
        eps in 0.1f32..4.0,
        min_pts in 1usize..6,
    ) {
        let shimeji = build(eps, min_pts, 2, StagingEncoding::Dense);
        let labelling = shimeji.run(&dataset(&points)).expect("run succeeds");

        prop_assert_eq!(labelling.len(), points.len());
        for point in 0..labelling.len() {
            let role = labelling.membership()[point];
            let id = labelling.cluster_ids()[point];
            prop_assert_eq!(id == UNCLUSTERED, role == Membership::Noise);
            if id != UNCLUSTERED {
                prop_assert!((id as usize) < labelling.cluster_count());
            }
        }
    }

    #[test]
    fn encodings_and_worker_counts_agree_on_the_labelling(
        points in points_strategy(),
        eps in 0.1f32..4.0,
        min_pts in 1usize..6,
        threads in 1usize..5,
    ) {
        let data = dataset(&points);
        let reference = build(eps, min_pts, 1, StagingEncoding::Dense)
            .run(&data)
            .expect("run succeeds");
        let bitset = build(eps, min_pts, threads, StagingEncoding::Bitset)
            .run(&data)
            .expect("run succeeds");
        prop_assert_eq!(reference, bitset);
    }
}
