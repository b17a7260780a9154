//! Mutable staging phase of the neighbourhood graph.

use rayon::prelude::*;

use crate::{
    builder::StagingEncoding,
    error::GraphError,
    graph::{csr::CsrGraph, WORD_BITS},
};

/// Mutable edge-staging area for the neighbourhood graph.
///
/// Two row encodings are supported. The dense encoding keeps one growable
/// neighbour list per node and stores memory proportional to the edge count.
/// The bitset encoding keeps one fixed-stride bit row per node, storing
/// `N · ⌈N/64⌉` bits regardless of density; its insertions are idempotent
/// OR-merges, which keeps the wide distance kernel free of divergent appends
/// and lets the degree pass run on popcounts.
///
/// Workers may mutate disjoint row ranges concurrently through
/// [`EdgeStaging::rows_mut`]; the single-edge insertion methods serve
/// single-threaded callers and tests.
///
/// # Examples
/// ```
/// use shimeji_core::EdgeStaging;
///
/// let mut staging = EdgeStaging::dense(3);
/// staging.insert_edge(0, 1).expect("nodes are in bounds");
/// staging.insert_edge(1, 0).expect("nodes are in bounds");
/// let graph = staging.freeze().expect("staging is consistent");
/// assert_eq!(graph.neighbours(0).expect("node 0 exists"), [1]);
/// assert_eq!(graph.degree(2).expect("node 2 exists"), 0);
/// ```
#[derive(Clone, Debug)]
pub struct EdgeStaging {
    nodes: usize,
    rows: Rows,
}

#[derive(Clone, Debug)]
enum Rows {
    Dense(Vec<Vec<usize>>),
    Bits { words: Vec<u64>, stride: usize },
}

/// Mutable view over the staging rows, for partitioned parallel writers.
pub(crate) enum RowsMut<'a> {
    Dense(&'a mut [Vec<usize>]),
    Bits { words: &'a mut [u64], stride: usize },
}

impl EdgeStaging {
    /// Creates a staging area with one empty neighbour list per node.
    #[must_use]
    pub fn dense(nodes: usize) -> Self {
        Self {
            nodes,
            rows: Rows::Dense(vec![Vec::new(); nodes]),
        }
    }

    /// Creates a staging area with one zeroed bit row per node.
    #[must_use]
    pub fn bitset(nodes: usize) -> Self {
        let stride = nodes.div_ceil(WORD_BITS);
        Self {
            nodes,
            rows: Rows::Bits {
                words: vec![0; nodes * stride],
                stride,
            },
        }
    }

    /// Creates a staging area with the requested row encoding.
    #[must_use]
    pub fn with_encoding(encoding: StagingEncoding, nodes: usize) -> Self {
        match encoding {
            StagingEncoding::Dense => Self::dense(nodes),
            StagingEncoding::Bitset => Self::bitset(nodes),
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Returns the row encoding chosen at construction.
    #[must_use]
    pub fn encoding(&self) -> StagingEncoding {
        match self.rows {
            Rows::Dense(_) => StagingEncoding::Dense,
            Rows::Bits { .. } => StagingEncoding::Bitset,
        }
    }

    /// Records the directed edge `u → v`.
    ///
    /// In the dense encoding the builder never proposes the same pair twice;
    /// a duplicate insertion duplicates the neighbour and corrupts cluster
    /// degrees downstream. In the bitset encoding insertion is idempotent.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when either endpoint is out of
    /// bounds.
    pub fn insert_edge(&mut self, u: usize, v: usize) -> Result<(), GraphError> {
        let nodes = self.nodes;
        if u >= nodes {
            return Err(GraphError::NodeOutOfBounds { node: u, nodes });
        }
        if v >= nodes {
            return Err(GraphError::NodeOutOfBounds { node: v, nodes });
        }
        match &mut self.rows {
            Rows::Dense(rows) => rows[u].push(v),
            Rows::Bits { words, stride } => {
                words[u * *stride + v / WORD_BITS] |= 1u64 << (v % WORD_BITS);
            }
        }
        Ok(())
    }

    /// OR-merges `mask` into word `word` of node `u`'s bit row.
    ///
    /// # Errors
    /// Returns [`GraphError::EncodingMismatch`] on a dense staging area,
    /// [`GraphError::NodeOutOfBounds`] when `u` is out of bounds and
    /// [`GraphError::WordOutOfBounds`] when `word` is at or beyond the row
    /// stride.
    pub fn insert_edge_mask(&mut self, u: usize, word: usize, mask: u64) -> Result<(), GraphError> {
        let nodes = self.nodes;
        match &mut self.rows {
            Rows::Dense(_) => Err(GraphError::EncodingMismatch {
                operation: "insert_edge_mask",
                required: "bitset",
            }),
            Rows::Bits { words, stride } => {
                if u >= nodes {
                    return Err(GraphError::NodeOutOfBounds { node: u, nodes });
                }
                if word >= *stride {
                    return Err(GraphError::WordOutOfBounds {
                        node: u,
                        word,
                        words: *stride,
                    });
                }
                words[u * *stride + word] |= mask;
                Ok(())
            }
        }
    }

    /// Exposes the staging rows for partitioned parallel writers.
    ///
    /// Callers split the returned view into disjoint per-worker chunks; row
    /// ownership is what makes the build phase race-free.
    pub(crate) fn rows_mut(&mut self) -> RowsMut<'_> {
        match &mut self.rows {
            Rows::Dense(rows) => RowsMut::Dense(rows),
            Rows::Bits { words, stride } => RowsMut::Bits {
                words,
                stride: *stride,
            },
        }
    }

    /// Consumes the staging area and lays the edges out as a [`CsrGraph`].
    ///
    /// Two passes. The first walks nodes in order, fusing an exclusive prefix
    /// scan of the degrees with the degree count itself: dense degrees are
    /// list lengths, bitset degrees are row popcounts. The second fills the
    /// concatenated neighbour array in parallel, one disjoint slice per node;
    /// bit rows are decoded by lowest-set-bit iteration so each row yields
    /// its neighbours in ascending order.
    ///
    /// # Errors
    /// Returns [`GraphError::DegreeMismatch`] when a row yields a different
    /// neighbour count than the degree pass recorded.
    pub fn freeze(self) -> Result<CsrGraph, GraphError> {
        match self.rows {
            Rows::Dense(rows) => freeze_dense(rows),
            Rows::Bits { words, stride } => freeze_bits(self.nodes, words, stride),
        }
    }
}

fn freeze_dense(rows: Vec<Vec<usize>>) -> Result<CsrGraph, GraphError> {
    let mut index = vec![0usize; rows.len() * 2];
    let mut offset = 0;
    for (node, row) in rows.iter().enumerate() {
        index[node * 2] = offset;
        index[node * 2 + 1] = row.len();
        offset += row.len();
    }
    if offset == 0 {
        return Ok(CsrGraph::new(index, Vec::new()));
    }

    let mut edges = vec![0usize; offset];
    split_per_node(&mut edges, &index)
        .into_par_iter()
        .zip(rows.par_iter())
        .enumerate()
        .try_for_each(|(node, (slot, row))| {
            if slot.len() != row.len() {
                return Err(GraphError::DegreeMismatch {
                    node,
                    expected: slot.len(),
                    written: row.len(),
                });
            }
            slot.copy_from_slice(row);
            Ok(())
        })?;
    Ok(CsrGraph::new(index, edges))
}

fn freeze_bits(nodes: usize, words: Vec<u64>, stride: usize) -> Result<CsrGraph, GraphError> {
    let mut index = vec![0usize; nodes * 2];
    let mut offset = 0;
    for node in 0..nodes {
        let row = &words[node * stride..(node + 1) * stride];
        let degree: usize = row.iter().map(|word| word.count_ones() as usize).sum();
        index[node * 2] = offset;
        index[node * 2 + 1] = degree;
        offset += degree;
    }
    if offset == 0 {
        return Ok(CsrGraph::new(index, Vec::new()));
    }

    let mut edges = vec![0usize; offset];
    split_per_node(&mut edges, &index)
        .into_par_iter()
        .zip(words.par_chunks(stride.max(1)))
        .enumerate()
        .try_for_each(|(node, (slot, row))| {
            let mut written = 0;
            for (word_idx, &word) in row.iter().enumerate() {
                let mut value = word;
                while value != 0 {
                    let bit = value.trailing_zeros() as usize;
                    if written == slot.len() {
                        return Err(GraphError::DegreeMismatch {
                            node,
                            expected: slot.len(),
                            written: written + 1,
                        });
                    }
                    slot[written] = word_idx * WORD_BITS + bit;
                    written += 1;
                    // Clearing the bit just read bounds the walk at `degree`
                    // iterations.
                    value &= value - 1;
                }
            }
            if written != slot.len() {
                return Err(GraphError::DegreeMismatch {
                    node,
                    expected: slot.len(),
                    written,
                });
            }
            Ok(())
        })?;
    Ok(CsrGraph::new(index, edges))
}

/// Splits `edges` into one mutable slice per node, sized by the degree entry.
fn split_per_node<'a>(edges: &'a mut [usize], index: &[usize]) -> Vec<&'a mut [usize]> {
    let nodes = index.len() / 2;
    let mut slots = Vec::with_capacity(nodes);
    let mut rest = edges;
    for node in 0..nodes {
        let (slot, tail) = rest.split_at_mut(index[node * 2 + 1]);
        slots.push(slot);
        rest = tail;
    }
    slots
}
