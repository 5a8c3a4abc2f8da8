//! Outbreak analysis through bond percolation.
//!
//! An SIR epidemic with per-edge transmission probability `rate` reaches
//! exactly the nodes connected to its seed once every edge has been kept
//! independently with probability `rate`. Cluster sizes can therefore be
//! sampled without simulating the time dynamics.

mod union_find;

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::{
    Graph,
    error::{GraphError, SimulationError, check_closed_probability},
};

use self::union_find::DisjointSet;

type SimResult<T> = core::result::Result<T, SimulationError>;

/// Largest per-node change at which the fixed-point sweep counts as settled.
pub const CONVERGENCE_TOLERANCE: f64 = 0.01;

/// Sweeps attempted before [`non_infected_fixed_point`] gives up.
pub const MAX_FIXED_POINT_ITERATIONS: usize = 10_000;

/// Samples `repeat` outbreak sizes on `graph` under bond percolation.
///
/// Each trial keeps every edge independently with probability `rate`,
/// skipping edges with a vaccinated endpoint when `vaccinated` is supplied,
/// then records the component size of one uniformly chosen node.
///
/// # Errors
/// Returns a validation error when `rate` lies outside `[0, 1]` or the mask
/// length differs from the node count, and
/// [`SimulationError::InvalidRepeat`] when `repeat` is zero.
///
/// # Examples
/// ```
/// use epigraph_core::{Graph, percolation::outbreak_cluster_sizes};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = Graph::new(3, false)?;
/// graph.add_edge(0, 1)?;
/// graph.add_edge(1, 2)?;
/// let mut rng = SmallRng::seed_from_u64(7);
/// let sizes = outbreak_cluster_sizes(&mut rng, &graph, 1.0, 5, None)?;
/// assert_eq!(sizes, vec![3; 5]);
/// # Ok::<(), epigraph_core::SimulationError>(())
/// ```
#[instrument(
    name = "percolation.outbreak",
    err,
    skip(rng, graph, vaccinated),
    fields(num_nodes = graph.num_nodes(), masked = vaccinated.is_some()),
)]
pub fn outbreak_cluster_sizes<R: Rng + ?Sized>(
    rng: &mut R,
    graph: &Graph,
    rate: f64,
    repeat: usize,
    vaccinated: Option<&[bool]>,
) -> SimResult<Vec<usize>> {
    let checked = check_closed_probability("transmission rate", rate)?;
    if repeat == 0 {
        return Err(SimulationError::InvalidRepeat { got: repeat });
    }
    let num_nodes = graph.num_nodes();
    if let Some(mask) = vaccinated {
        if mask.len() != num_nodes {
            return Err(GraphError::LengthMismatch {
                expected: num_nodes,
                got: mask.len(),
            }
            .into());
        }
    }

    let is_vaccinated = |node: usize| vaccinated.is_some_and(|mask| mask.get(node) == Some(&true));
    let edges: Vec<(usize, usize)> = graph
        .edge_list()
        .into_iter()
        .filter(|&(i, j)| !is_vaccinated(i) && !is_vaccinated(j))
        .collect();

    let sizes: Vec<usize> = (0..repeat)
        .map(|_| {
            let mut components = DisjointSet::new(num_nodes);
            for &(i, j) in &edges {
                if rng.gen_bool(checked) {
                    components.union(i, j);
                }
            }
            components.component_size(rng.gen_range(0..num_nodes))
        })
        .collect();
    debug!(trials = repeat, edges = edges.len(), "sampled outbreak sizes");
    Ok(sizes)
}

/// Per-node non-infection probabilities produced by
/// [`non_infected_fixed_point`].
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPoint {
    probabilities: Vec<f64>,
    iterations: usize,
}

impl FixedPoint {
    /// Probability that each node is never infected, indexed by node.
    #[must_use]
    #[rustfmt::skip]
    pub const fn probabilities(&self) -> &[f64] { self.probabilities.as_slice() }

    /// Number of sweeps that moved some node by more than
    /// [`CONVERGENCE_TOLERANCE`] before the vector settled.
    #[must_use]
    #[rustfmt::skip]
    pub const fn iterations(&self) -> usize { self.iterations }

    /// Expected number of nodes that are never infected.
    #[must_use]
    pub fn expected_non_infected(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Consumes the result, returning the probability vector.
    #[must_use]
    pub fn into_probabilities(self) -> Vec<f64> {
        self.probabilities
    }
}

/// Iterates `p_i <- prod_j (1 - rate + rate * p_j)` over the neighbours `j`
/// of every node until no entry moves by more than [`CONVERGENCE_TOLERANCE`].
///
/// Updates are synchronous: each sweep reads only the previous vector. The
/// recurrence treats neighbours as independent, which holds on locally
/// tree-like graphs; on graphs with many short cycles the result is an
/// approximation. Isolated nodes evaluate to the empty product, 1.
///
/// # Errors
/// Returns a validation error when `rate` or an entry of `initial` lies
/// outside `[0, 1]` or `initial` does not hold one entry per node, and
/// [`SimulationError::NotConverged`] when [`MAX_FIXED_POINT_ITERATIONS`]
/// sweeps do not settle the vector.
#[instrument(
    name = "percolation.fixed_point",
    err,
    skip(graph, initial),
    fields(num_nodes = graph.num_nodes()),
)]
#[expect(
    clippy::float_arithmetic,
    reason = "the recurrence is a product of floating-point probabilities"
)]
pub fn non_infected_fixed_point(
    graph: &Graph,
    rate: f64,
    initial: &[f64],
) -> SimResult<FixedPoint> {
    let checked = check_closed_probability("transmission rate", rate)?;
    let num_nodes = graph.num_nodes();
    if initial.len() != num_nodes {
        return Err(GraphError::LengthMismatch {
            expected: num_nodes,
            got: initial.len(),
        }
        .into());
    }
    for &value in initial {
        check_closed_probability("initial probability", value)?;
    }

    let mut current = initial.to_vec();
    let mut next = vec![0.0; num_nodes];
    let mut delta = f64::INFINITY;
    for iterations in 0..MAX_FIXED_POINT_ITERATIONS {
        delta = 0.0;
        let rows = next.iter_mut().zip(graph.adjacency()).zip(&current);
        for ((slot, neighbors), &previous) in rows {
            *slot = neighbors
                .iter()
                .filter_map(|&neighbor| current.get(neighbor))
                .map(|&p| 1.0 - checked + checked * p)
                .product();
            delta = f64::max(delta, (*slot - previous).abs());
        }
        std::mem::swap(&mut current, &mut next);
        if delta <= CONVERGENCE_TOLERANCE {
            debug!(iterations, delta, "fixed point settled");
            return Ok(FixedPoint {
                probabilities: current,
                iterations,
            });
        }
    }

    warn!(
        iterations = MAX_FIXED_POINT_ITERATIONS,
        delta, "fixed point did not settle"
    );
    Err(SimulationError::NotConverged {
        iterations: MAX_FIXED_POINT_ITERATIONS,
        delta,
    })
}
