//! Structural statistics over generated graphs.
//!
//! Covers degree distributions, breadth-first reachability, edge counting and
//! the "friendship paradox" estimators comparing a node's degree with the
//! degree of its neighbours.

use std::{
    collections::{BTreeSet, VecDeque},
    str::FromStr,
};

use rand::{Rng, seq::SliceRandom};

use crate::{
    Graph,
    error::{GraphError, Result},
};

/// Returns the number of neighbour entries of every node, indexed by node.
#[must_use]
pub fn degree_distribution(graph: &Graph) -> Vec<usize> {
    graph.adjacency().iter().map(Vec::len).collect()
}

/// Returns every node reachable from `start`, including `start`.
///
/// Nodes are recorded when queued, so each node is enqueued at most once.
///
/// # Errors
/// Returns [`GraphError::NodeOutOfRange`] when `start` is not a node.
///
/// # Examples
/// ```
/// use epigraph_core::{Graph, stats::reachable_set};
///
/// let mut graph = Graph::new(4, false)?;
/// graph.add_edge(0, 1)?;
/// graph.add_edge(1, 2)?;
/// let reached = reachable_set(&graph, 2)?;
/// assert_eq!(reached.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
pub fn reachable_set(graph: &Graph, start: usize) -> Result<BTreeSet<usize>> {
    graph.neighbors(start)?;
    let mut reached = BTreeSet::from([start]);
    let mut pending = VecDeque::from([start]);

    while let Some(node) = pending.pop_front() {
        for &neighbor in graph.neighbors(node)? {
            if reached.insert(neighbor) {
                pending.push_back(neighbor);
            }
        }
    }
    Ok(reached)
}

/// Edge counting strategy for [`count_edges`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EdgeCountMethod {
    /// Enumerate the edge list.
    #[default]
    Naive,
}

impl FromStr for EdgeCountMethod {
    type Err = GraphError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "naive" => Ok(Self::Naive),
            other => Err(GraphError::UnsupportedMethod {
                kind: "edge count",
                name: other.to_owned(),
            }),
        }
    }
}

/// Counts the edges of `graph` as reported by [`Graph::edge_list`].
#[must_use]
pub fn count_edges(graph: &Graph, method: EdgeCountMethod) -> usize {
    match method {
        EdgeCountMethod::Naive => graph.edge_list().len(),
    }
}

/// Estimation mode for [`friend_degree_distribution`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FriendDegreeMethod {
    /// Monte Carlo: random node with a neighbour, then a random neighbour.
    Sample,
    /// Exact mean neighbour degree of every node with a neighbour.
    Iterate,
}

impl FromStr for FriendDegreeMethod {
    type Err = GraphError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sample" => Ok(Self::Sample),
            "iterate" => Ok(Self::Iterate),
            other => Err(GraphError::UnsupportedMethod {
                kind: "friend degree",
                name: other.to_owned(),
            }),
        }
    }
}

/// Estimates the degree distribution of "a random neighbour of a random node".
///
/// With [`FriendDegreeMethod::Sample`] the result holds `sample_count`
/// neighbour degrees (empty when no node has a neighbour). With
/// [`FriendDegreeMethod::Iterate`] it holds the second component of
/// [`friend_degree_pairs`]; `sample_count` is ignored.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "degrees are bounded by the number of neighbour entries"
)]
pub fn friend_degree_distribution<R: Rng + ?Sized>(
    rng: &mut R,
    graph: &Graph,
    method: FriendDegreeMethod,
    sample_count: usize,
) -> Vec<f64> {
    match method {
        FriendDegreeMethod::Sample => {
            let adjacency = graph.adjacency();
            let connected: Vec<&Vec<usize>> = adjacency
                .iter()
                .filter(|neighbors| !neighbors.is_empty())
                .collect();
            if connected.is_empty() {
                return Vec::new();
            }
            (0..sample_count)
                .filter_map(|_| {
                    let neighbors = connected.choose(rng)?;
                    let friend = neighbors.choose(rng)?;
                    adjacency.get(*friend).map(|list| list.len() as f64)
                })
                .collect()
        }
        FriendDegreeMethod::Iterate => friend_degree_pairs(graph)
            .into_iter()
            .map(|(_, friend_mean)| friend_mean)
            .collect(),
    }
}

/// Pairs the degree of each node that has a neighbour, in index order, with
/// the mean degree of its neighbours.
///
/// Nodes without neighbours have no friend degree and are skipped, so the
/// pairs stay aligned when the caller needs the per-node difference.
///
/// # Examples
/// ```
/// use epigraph_core::{Graph, stats::friend_degree_pairs};
///
/// let mut graph = Graph::new(4, false)?;
/// graph.add_edge(0, 1)?;
/// graph.add_edge(0, 2)?;
/// assert_eq!(friend_degree_pairs(&graph), vec![(2, 1.0), (1, 2.0), (1, 2.0)]);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "degrees are bounded by the number of neighbour entries"
)]
pub fn friend_degree_pairs(graph: &Graph) -> Vec<(usize, f64)> {
    let degrees = degree_distribution(graph);
    graph
        .adjacency()
        .iter()
        .filter(|neighbors| !neighbors.is_empty())
        .map(|neighbors| {
            let friend_mean = mean(
                neighbors
                    .iter()
                    .filter_map(|&friend| degrees.get(friend))
                    .map(|&degree| degree as f64),
            );
            (neighbors.len(), friend_mean)
        })
        .collect()
}

/// Returns, for each node with a neighbour in index order, the mean infection
/// probability of its neighbours.
///
/// # Errors
/// Returns [`GraphError::LengthMismatch`] when `probabilities` does not hold
/// one value per node.
pub fn friend_infection_estimate(graph: &Graph, probabilities: &[f64]) -> Result<Vec<f64>> {
    if probabilities.len() != graph.num_nodes() {
        return Err(GraphError::LengthMismatch {
            expected: graph.num_nodes(),
            got: probabilities.len(),
        });
    }
    Ok(graph
        .adjacency()
        .iter()
        .filter(|neighbors| !neighbors.is_empty())
        .map(|neighbors| {
            mean(
                neighbors
                    .iter()
                    .filter_map(|&friend| probabilities.get(friend).copied()),
            )
        })
        .collect())
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the arithmetic mean is defined over floating-point samples"
)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (len, sum) = values.fold((0_usize, 0.0), |(count, total), value| {
        (count + 1, total + value)
    });
    sum / len as f64
}

/// Mean, population standard deviation and coefficient of variation of a
/// sample.
///
/// # Examples
/// ```
/// use epigraph_core::stats::Summary;
///
/// let summary = Summary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])?;
/// assert_eq!(summary.mean(), 5.0);
/// assert_eq!(summary.std_dev(), 2.0);
/// assert_eq!(summary.coefficient_of_variation(), 0.4);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    count: usize,
    mean: f64,
    std_dev: f64,
}

impl Summary {
    /// Summarises `samples`.
    ///
    /// # Errors
    /// Returns [`GraphError::EmptySample`] when `samples` is empty.
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(GraphError::EmptySample);
        }
        let centre = mean(samples.iter().copied());
        Ok(Self {
            count: samples.len(),
            mean: centre,
            std_dev: variance(samples, centre).sqrt(),
        })
    }

    /// Number of samples summarised.
    #[must_use]
    #[rustfmt::skip]
    pub const fn count(&self) -> usize { self.count }

    /// Sample mean.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mean(&self) -> f64 { self.mean }

    /// Population standard deviation.
    #[must_use]
    #[rustfmt::skip]
    pub const fn std_dev(&self) -> f64 { self.std_dev }

    /// `std_dev / mean`; infinite or NaN when the mean is zero.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "ratio of two statistics")]
    pub fn coefficient_of_variation(&self) -> f64 {
        self.std_dev / self.mean
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "population variance is defined over floating-point samples"
)]
fn variance(samples: &[f64], centre: f64) -> f64 {
    mean(samples.iter().map(|value| (value - centre).powi(2)))
}
