//! Parallel brute-force ε-neighbourhood construction.
//!
//! Source nodes are split into contiguous per-worker ranges; each worker
//! compares its sources against every point under the squared-distance
//! predicate and records edges into the staging rows it exclusively owns, so
//! the build phase needs no synchronisation. Both directions of every
//! neighbour pair are enumerated because every source scans all candidates;
//! self-edges are excluded.
//!
//! The wide paths probe eight candidates per step through the lane kernel
//! and commit each set mask bit after guarding the candidate index against
//! the point count, which is what makes the padded tail loads harmless.

use rayon::prelude::*;

use crate::{
    builder::StagingEncoding,
    dataset::Dataset,
    error::GraphError,
    graph::{CsrGraph, EdgeStaging, RowsMut, WORD_BITS},
    kernel::{fill_lane_masks, LaneKernel, LANES},
};

/// Builds the frozen ε-neighbourhood graph of `dataset`.
pub(crate) fn build_graph(
    dataset: &Dataset,
    eps_sq: f32,
    encoding: StagingEncoding,
    kernel: LaneKernel,
    threads: usize,
) -> Result<CsrGraph, GraphError> {
    let nodes = dataset.len();
    let mut staging = EdgeStaging::with_encoding(encoding, nodes);
    if nodes == 0 {
        return staging.freeze();
    }

    let chunk = nodes.div_ceil(threads);
    match staging.rows_mut() {
        RowsMut::Dense(rows) => {
            rows.par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(slot, rows)| {
                    let first = slot * chunk;
                    match kernel {
                        LaneKernel::Scalar => dense_range_scalar(dataset, eps_sq, first, rows),
                        #[cfg(target_arch = "x86_64")]
                        LaneKernel::Avx => dense_range_wide(dataset, eps_sq, kernel, first, rows),
                    }
                });
        }
        RowsMut::Bits { words, stride } => {
            words
                .par_chunks_mut(chunk * stride)
                .enumerate()
                .for_each(|(slot, words)| {
                    let first = slot * chunk;
                    match kernel {
                        LaneKernel::Scalar => {
                            bit_range_scalar(dataset, eps_sq, first, words, stride);
                        }
                        #[cfg(target_arch = "x86_64")]
                        LaneKernel::Avx => {
                            bit_range_wide(dataset, eps_sq, kernel, first, words, stride);
                        }
                    }
                });
        }
    }
    staging.freeze()
}

fn dense_range_scalar(dataset: &Dataset, eps_sq: f32, first: usize, rows: &mut [Vec<usize>]) {
    let xs = dataset.xs();
    let ys = dataset.ys();
    for (offset, row) in rows.iter_mut().enumerate() {
        let u = first + offset;
        let (ux, uy) = (xs[u], ys[u]);
        for v in 0..xs.len() {
            let dx = ux - xs[v];
            let dy = uy - ys[v];
            if v != u && dx * dx + dy * dy <= eps_sq {
                row.push(v);
            }
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn dense_range_wide(
    dataset: &Dataset,
    eps_sq: f32,
    kernel: LaneKernel,
    first: usize,
    rows: &mut [Vec<usize>],
) {
    let xs = dataset.xs_padded();
    let ys = dataset.ys_padded();
    let nodes = dataset.len();
    let mut masks = vec![0u8; xs.len() / LANES];
    for (offset, row) in rows.iter_mut().enumerate() {
        let u = first + offset;
        fill_lane_masks(kernel, xs, ys, xs[u], ys[u], eps_sq, &mut masks);
        for (group, &mask) in masks.iter().enumerate() {
            let mut bits = mask;
            while bits != 0 {
                let lane = bits.trailing_zeros() as usize;
                let v = group * LANES + lane;
                if v < nodes && v != u {
                    row.push(v);
                }
                bits &= bits - 1;
            }
        }
    }
}

fn bit_range_scalar(dataset: &Dataset, eps_sq: f32, first: usize, words: &mut [u64], stride: usize) {
    let xs = dataset.xs();
    let ys = dataset.ys();
    let nodes = xs.len();
    for (offset, row) in words.chunks_exact_mut(stride).enumerate() {
        let u = first + offset;
        let (ux, uy) = (xs[u], ys[u]);
        for (outer, word) in row.iter_mut().enumerate() {
            let base = outer * WORD_BITS;
            for inner in 0..WORD_BITS {
                let v = base + inner;
                if v >= nodes {
                    break;
                }
                let dx = ux - xs[v];
                let dy = uy - ys[v];
                if v != u && dx * dx + dy * dy <= eps_sq {
                    *word |= 1u64 << inner;
                }
            }
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn bit_range_wide(
    dataset: &Dataset,
    eps_sq: f32,
    kernel: LaneKernel,
    first: usize,
    words: &mut [u64],
    stride: usize,
) {
    let xs = dataset.xs_padded();
    let ys = dataset.ys_padded();
    let nodes = dataset.len();
    let mut masks = vec![0u8; xs.len() / LANES];
    for (offset, row) in words.chunks_exact_mut(stride).enumerate() {
        let u = first + offset;
        fill_lane_masks(kernel, xs, ys, xs[u], ys[u], eps_sq, &mut masks);
        for (group, &mask) in masks.iter().enumerate() {
            let mut bits = mask;
            while bits != 0 {
                let lane = bits.trailing_zeros() as usize;
                let v = group * LANES + lane;
                if v < nodes && v != u {
                    row[v / WORD_BITS] |= 1u64 << (v % WORD_BITS);
                }
                bits &= bits - 1;
            }
        }
    }
}
