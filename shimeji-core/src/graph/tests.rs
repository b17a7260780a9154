//! Unit tests for the two-phase neighbourhood graph.

use rstest::rstest;

use crate::{builder::StagingEncoding, error::GraphError, graph::EdgeStaging};

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn freeze_lays_out_exclusive_prefix_offsets(#[case] encoding: StagingEncoding) {
    let mut staging = EdgeStaging::with_encoding(encoding, 4);
    for (u, v) in [(0, 1), (0, 2), (1, 0), (2, 0), (2, 3), (3, 2)] {
        staging.insert_edge(u, v).expect("endpoints are in bounds");
    }
    let graph = staging.freeze().expect("staging is consistent");

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.index(), [0, 2, 2, 1, 3, 2, 5, 1]);
    assert_eq!(graph.edges(), [1, 2, 0, 0, 3, 2]);
    assert_eq!(graph.edge_count(), 6);
}

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn degree_sum_matches_edge_array_length(#[case] encoding: StagingEncoding) {
    let mut staging = EdgeStaging::with_encoding(encoding, 5);
    for (u, v) in [(0, 4), (4, 0), (2, 1), (1, 2), (2, 3), (3, 2)] {
        staging.insert_edge(u, v).expect("endpoints are in bounds");
    }
    let graph = staging.freeze().expect("staging is consistent");

    let degree_sum: usize = (0..graph.node_count())
        .map(|node| graph.degree(node).expect("node exists"))
        .sum();
    assert_eq!(degree_sum, graph.edge_count());
    let offsets: Vec<usize> = graph.index().chunks_exact(2).map(|pair| pair[0]).collect();
    let mut running = 0;
    for (node, offset) in offsets.iter().enumerate() {
        assert_eq!(*offset, running, "offset of node {node}");
        running += graph.degree(node).expect("node exists");
    }
}

#[test]
fn bitset_rows_decode_in_ascending_order_across_words() {
    // Neighbours straddle the first and second 64-bit words of the row.
    let mut staging = EdgeStaging::bitset(70);
    for v in [68, 2, 65, 0, 63, 64] {
        staging.insert_edge(1, v).expect("endpoints are in bounds");
    }
    let graph = staging.freeze().expect("staging is consistent");
    assert_eq!(
        graph.neighbours(1).expect("node 1 exists"),
        [0, 2, 63, 64, 65, 68]
    );
}

#[test]
fn bitset_insertion_is_idempotent() {
    let mut staging = EdgeStaging::bitset(3);
    staging.insert_edge(0, 2).expect("endpoints are in bounds");
    staging.insert_edge(0, 2).expect("endpoints are in bounds");
    staging
        .insert_edge_mask(0, 0, 1 << 2)
        .expect("word 0 is within the stride");
    let graph = staging.freeze().expect("staging is consistent");
    assert_eq!(graph.neighbours(0).expect("node 0 exists"), [2]);
}

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn out_of_bounds_endpoints_are_rejected(#[case] encoding: StagingEncoding) {
    let mut staging = EdgeStaging::with_encoding(encoding, 3);
    let err = staging.insert_edge(3, 0).expect_err("node 3 is out of bounds");
    assert_eq!(err, GraphError::NodeOutOfBounds { node: 3, nodes: 3 });
    let err = staging.insert_edge(0, 7).expect_err("node 7 is out of bounds");
    assert_eq!(err, GraphError::NodeOutOfBounds { node: 7, nodes: 3 });
}

#[test]
fn mask_insertion_rejects_words_beyond_the_stride() {
    let mut staging = EdgeStaging::bitset(70);
    let err = staging
        .insert_edge_mask(0, 2, 1)
        .expect_err("the row holds two words");
    assert_eq!(
        err,
        GraphError::WordOutOfBounds {
            node: 0,
            word: 2,
            words: 2
        }
    );
}

#[test]
fn mask_insertion_rejects_dense_staging() {
    let mut staging = EdgeStaging::dense(2);
    let err = staging
        .insert_edge_mask(0, 0, 1)
        .expect_err("dense rows take no masks");
    assert!(matches!(err, GraphError::EncodingMismatch { .. }));
}

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn empty_staging_freezes_to_an_empty_graph(#[case] encoding: StagingEncoding) {
    let graph = EdgeStaging::with_encoding(encoding, 0)
        .freeze()
        .expect("nothing to lay out");
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.index().is_empty());
    assert!(graph.edges().is_empty());
}

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn edgeless_nodes_freeze_to_zero_degrees(#[case] encoding: StagingEncoding) {
    let graph = EdgeStaging::with_encoding(encoding, 3)
        .freeze()
        .expect("nothing to lay out");
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.index(), [0, 0, 0, 0, 0, 0]);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn frozen_reads_reject_out_of_bounds_nodes() {
    let graph = EdgeStaging::dense(2).freeze().expect("nothing to lay out");
    let err = graph.degree(2).expect_err("node 2 is out of bounds");
    assert_eq!(err, GraphError::NodeOutOfBounds { node: 2, nodes: 2 });
    let err = graph.neighbours(5).expect_err("node 5 is out of bounds");
    assert_eq!(err, GraphError::NodeOutOfBounds { node: 5, nodes: 2 });
}

#[rstest]
#[case::dense(StagingEncoding::Dense)]
#[case::bitset(StagingEncoding::Bitset)]
fn encoding_reports_construction_choice(#[case] encoding: StagingEncoding) {
    let staging = EdgeStaging::with_encoding(encoding, 1);
    assert_eq!(staging.encoding(), encoding);
    assert_eq!(staging.node_count(), 1);
}
