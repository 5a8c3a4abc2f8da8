//! Adjacency-list graph container.
//!
//! Neighbour lists keep edges in insertion order and may contain repeated
//! entries, so configuration-model graphs with parallel edges or self-loops are
//! represented faithfully. Graphs are only mutated while they are being
//! generated; every analysis routine borrows them immutably.

use crate::error::{GraphError, Result};

/// An undirected or directed graph stored as per-node neighbour lists.
///
/// # Examples
/// ```
/// use epigraph_core::Graph;
///
/// let mut graph = Graph::new(3, false)?;
/// graph.add_edge(0, 1)?;
/// graph.add_edge(2, 1)?;
/// assert_eq!(graph.neighbors(1)?, &[0, 2]);
/// assert_eq!(graph.edge_list(), vec![(0, 1), (1, 2)]);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    num_nodes: usize,
    directed: bool,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Creates an edgeless graph with `num_nodes` nodes.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeCount`] when `num_nodes` is zero.
    pub fn new(num_nodes: usize, directed: bool) -> Result<Self> {
        if num_nodes == 0 {
            return Err(GraphError::InvalidNodeCount {
                got: num_nodes,
                min: 1,
            });
        }
        Ok(Self {
            num_nodes,
            directed,
            adjacency: vec![Vec::new(); num_nodes],
        })
    }

    /// Rebuilds a graph from stored neighbour lists. The node count is the
    /// number of lists.
    ///
    /// Undirected lists must be symmetric: node `i` lists `j` exactly as many
    /// times as `j` lists `i`. Self-loops satisfy this trivially.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidNodeCount`] for an empty adjacency,
    /// [`GraphError::NodeOutOfRange`] when a neighbour index is not a node and
    /// [`GraphError::AsymmetricAdjacency`] when an undirected edge is stored in
    /// one direction only.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>, directed: bool) -> Result<Self> {
        let num_nodes = adjacency.len();
        if num_nodes == 0 {
            return Err(GraphError::InvalidNodeCount { got: 0, min: 1 });
        }
        if let Some(&node) = adjacency.iter().flatten().find(|&&node| node >= num_nodes) {
            return Err(GraphError::NodeOutOfRange { node, num_nodes });
        }
        if !directed {
            check_symmetric(&adjacency)?;
        }
        Ok(Self {
            num_nodes,
            directed,
            adjacency,
        })
    }

    /// Returns the number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn num_nodes(&self) -> usize { self.num_nodes }

    /// Returns whether edges are directed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_directed(&self) -> bool { self.directed }

    /// Returns the raw neighbour lists, indexed by node.
    #[must_use]
    #[rustfmt::skip]
    pub const fn adjacency(&self) -> &[Vec<usize>] { self.adjacency.as_slice() }

    /// Inserts an edge from `i` to `j` (and from `j` to `i` when undirected).
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] when either endpoint is not a
    /// node of the graph. The graph is unchanged on error.
    pub fn add_edge(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_node(i)?;
        self.check_node(j)?;
        self.push_neighbor(i, j)?;
        if !self.directed {
            self.push_neighbor(j, i)?;
        }
        Ok(())
    }

    /// Returns the neighbours of `i` in the order their edges were added.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] when `i` is not a node.
    pub fn neighbors(&self, i: usize) -> Result<&[usize]> {
        self.adjacency
            .get(i)
            .map(Vec::as_slice)
            .ok_or(GraphError::NodeOutOfRange {
                node: i,
                num_nodes: self.num_nodes,
            })
    }

    /// Returns the number of neighbour entries of `i`.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] when `i` is not a node.
    pub fn degree(&self, i: usize) -> Result<usize> {
        self.neighbors(i).map(<[usize]>::len)
    }

    /// Lists edges as `(source, target)` pairs, scanning nodes in index order.
    ///
    /// For undirected graphs only pairs with `source < target` are kept, which
    /// collapses the symmetric storage to one entry per insertion and omits
    /// self-loops. Directed graphs report every stored arc.
    #[must_use]
    pub fn edge_list(&self) -> Vec<(usize, usize)> {
        let directed = self.directed;
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(source, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |&&target| directed || source < target)
                    .map(move |&target| (source, target))
            })
            .collect()
    }

    const fn check_node(&self, node: usize) -> Result<()> {
        if node < self.num_nodes {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                num_nodes: self.num_nodes,
            })
        }
    }

    fn push_neighbor(&mut self, node: usize, neighbor: usize) -> Result<()> {
        let num_nodes = self.num_nodes;
        self.adjacency
            .get_mut(node)
            .map(|list| list.push(neighbor))
            .ok_or(GraphError::NodeOutOfRange { node, num_nodes })
    }
}

/// Compares the multiset of stored arcs with its reverse. The first sorted
/// position where they differ names an arc whose reverse is under-counted.
fn check_symmetric(adjacency: &[Vec<usize>]) -> Result<()> {
    let mut forward: Vec<(usize, usize)> = adjacency
        .iter()
        .enumerate()
        .flat_map(|(node, neighbors)| {
            neighbors
                .iter()
                .filter(move |&&neighbor| neighbor != node)
                .map(move |&neighbor| (node, neighbor))
        })
        .collect();
    let mut reversed: Vec<(usize, usize)> = forward.iter().map(|&(a, b)| (b, a)).collect();
    forward.sort_unstable();
    reversed.sort_unstable();

    match forward.iter().zip(&reversed).find(|(arc, rev)| arc != rev) {
        None => Ok(()),
        Some((&arc, &rev)) => {
            let (node, neighbor) = if arc < rev { arc } else { (rev.1, rev.0) };
            Err(GraphError::AsymmetricAdjacency { node, neighbor })
        }
    }
}
