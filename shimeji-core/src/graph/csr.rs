//! Frozen compressed-sparse-row phase of the neighbourhood graph.

use crate::error::GraphError;

/// Immutable adjacency produced by [`EdgeStaging::freeze`].
///
/// Two arrays describe the graph. `index` interleaves one `(offset, degree)`
/// pair per node: `index[2k]` is the exclusive prefix sum of the degrees
/// below `k` and `index[2k + 1]` is node `k`'s degree. `edges` concatenates
/// every node's neighbour list in node order, so node `k`'s neighbours
/// occupy `edges[index[2k] .. index[2k] + index[2k + 1]]`.
///
/// [`EdgeStaging::freeze`]: crate::EdgeStaging::freeze
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CsrGraph {
    index: Vec<usize>,
    edges: Vec<usize>,
}

impl CsrGraph {
    pub(crate) fn new(index: Vec<usize>, edges: Vec<usize>) -> Self {
        debug_assert_eq!(index.len() % 2, 0);
        debug_assert_eq!(
            edges.len(),
            index.chunks_exact(2).map(|pair| pair[1]).sum::<usize>(),
        );
        Self { index, edges }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.index.len() / 2
    }

    /// Returns the number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the degree of `node`.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when `node` is out of bounds.
    pub fn degree(&self, node: usize) -> Result<usize, GraphError> {
        self.check_node(node)?;
        Ok(self.index[node * 2 + 1])
    }

    /// Returns the neighbours of `node` in the order the staging rows held
    /// them.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when `node` is out of bounds.
    pub fn neighbours(&self, node: usize) -> Result<&[usize], GraphError> {
        self.check_node(node)?;
        Ok(self.neighbours_unchecked(node))
    }

    /// Returns the interleaved `(offset, degree)` index.
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Returns the concatenated neighbour array.
    #[must_use]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Neighbour slice without the bound check, for traversals over node ids
    /// that came out of the graph itself.
    pub(crate) fn neighbours_unchecked(&self, node: usize) -> &[usize] {
        let offset = self.index[node * 2];
        let degree = self.index[node * 2 + 1];
        &self.edges[offset..offset + degree]
    }

    pub(crate) fn degree_unchecked(&self, node: usize) -> usize {
        self.index[node * 2 + 1]
    }

    fn check_node(&self, node: usize) -> Result<(), GraphError> {
        let nodes = self.node_count();
        if node >= nodes {
            return Err(GraphError::NodeOutOfBounds { node, nodes });
        }
        Ok(())
    }
}
