//! Random graph generation.
//!
//! Four edge-generation strategies are supported:
//!
//! - `naive` draws one Bernoulli trial per unordered node pair (`O(n²)`).
//! - `two-step` draws the edge count from the matching binomial distribution
//!   and then places that many distinct edges uniformly at random. Its edge
//!   count distribution equals the naive one, but sparse graphs are produced
//!   in expected `O(n + m)` time.
//! - `geometric` and `poisson` are configuration models: every node draws a
//!   number of degree stubs, the stubs are shuffled and paired off. The
//!   pairing does not avoid self-loops or parallel edges.

mod configuration;
mod two_step;

use std::{fmt, str::FromStr};

use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    Graph,
    error::{GraphError, Result, check_closed_probability},
    sampling::{bernoulli, geometric_stubs, poisson_stubs},
};

/// Edge-generation strategy used by [`generate`].
///
/// # Examples
/// ```
/// use epigraph_core::GenerationMethod;
///
/// let method: GenerationMethod = "two-step".parse()?;
/// assert_eq!(method, GenerationMethod::TwoStep);
/// assert!("barabasi".parse::<GenerationMethod>().is_err());
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GenerationMethod {
    /// One Bernoulli trial per node pair.
    Naive,
    /// Binomial edge count followed by uniform placement of distinct edges.
    TwoStep,
    /// Configuration model with geometric stub counts.
    Geometric,
    /// Configuration model with Poisson stub counts.
    Poisson,
}

impl GenerationMethod {
    /// Returns the name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::TwoStep => "two-step",
            Self::Geometric => "geometric",
            Self::Poisson => "poisson",
        }
    }

    /// Returns whether the strategy is parameterised by the mean degree
    /// rather than the edge probability.
    #[must_use]
    pub const fn uses_mean_degree(self) -> bool {
        matches!(self, Self::Geometric | Self::Poisson)
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMethod {
    type Err = GraphError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "naive" => Ok(Self::Naive),
            "two-step" => Ok(Self::TwoStep),
            "geometric" => Ok(Self::Geometric),
            "poisson" => Ok(Self::Poisson),
            other => Err(GraphError::UnsupportedMethod {
                kind: "generation",
                name: other.to_owned(),
            }),
        }
    }
}

/// Parameters shared by all generation strategies.
///
/// `edge_probability` drives `naive` and `two-step`; `mean_degree` drives the
/// configuration models. The edge probability is validated for every method.
///
/// # Examples
/// ```
/// use epigraph_core::GeneratorParams;
///
/// let params = GeneratorParams::new()
///     .with_edge_probability(0.1)
///     .with_directed(true);
/// assert_eq!(params.edge_probability(), 0.1);
/// assert!(params.directed());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeneratorParams {
    edge_probability: f64,
    mean_degree: f64,
    directed: bool,
}

impl GeneratorParams {
    /// Creates parameters with zero edge probability, zero mean degree and
    /// undirected edges.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edge_probability: 0.0,
            mean_degree: 0.0,
            directed: false,
        }
    }

    /// Overrides the per-pair edge probability.
    #[must_use]
    pub const fn with_edge_probability(mut self, p: f64) -> Self {
        self.edge_probability = p;
        self
    }

    /// Overrides the configuration-model mean degree.
    #[must_use]
    pub const fn with_mean_degree(mut self, mean_degree: f64) -> Self {
        self.mean_degree = mean_degree;
        self
    }

    /// Selects directed or undirected edges.
    #[must_use]
    pub const fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Returns the per-pair edge probability.
    #[must_use]
    #[rustfmt::skip]
    pub const fn edge_probability(&self) -> f64 { self.edge_probability }

    /// Returns the configuration-model mean degree.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mean_degree(&self) -> f64 { self.mean_degree }

    /// Returns whether generated edges are directed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn directed(&self) -> bool { self.directed }
}

/// Generates a random graph with `num_nodes` nodes using `method`.
///
/// # Errors
/// Returns [`GraphError::InvalidNodeCount`] when `num_nodes <= 1`,
/// [`GraphError::InvalidProbability`] when the edge probability lies outside
/// `[0, 1]`, and [`GraphError::InvalidMeanDegree`] when a configuration model
/// receives an unusable mean degree. Validation happens before any sampling.
///
/// # Examples
/// ```
/// use epigraph_core::{GenerationMethod, GeneratorParams, generate};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let params = GeneratorParams::new().with_edge_probability(1.0);
/// let graph = generate(&mut rng, 5, GenerationMethod::Naive, &params)?;
/// assert_eq!(graph.edge_list().len(), 10);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
#[instrument(
    name = "core.generate",
    err,
    skip(rng, params),
    fields(
        method = %method,
        p = params.edge_probability(),
        mean_degree = params.mean_degree(),
    ),
)]
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    num_nodes: usize,
    method: GenerationMethod,
    params: &GeneratorParams,
) -> Result<Graph> {
    if num_nodes <= 1 {
        return Err(GraphError::InvalidNodeCount {
            got: num_nodes,
            min: 2,
        });
    }
    let p = check_closed_probability("edge probability", params.edge_probability())?;
    let mut graph = Graph::new(num_nodes, params.directed())?;

    match method {
        GenerationMethod::Naive => naive(rng, &mut graph, p)?,
        GenerationMethod::TwoStep => two_step::populate(rng, &mut graph, p)?,
        GenerationMethod::Geometric => {
            let mean_degree = params.mean_degree();
            if !(mean_degree.is_finite() && mean_degree >= 1.0) {
                return Err(GraphError::InvalidMeanDegree {
                    value: mean_degree,
                    method: "geometric",
                });
            }
            let success = mean_degree.recip();
            configuration::populate(rng, &mut graph, |rng| geometric_stubs(rng, success))?;
        }
        GenerationMethod::Poisson => {
            let mean_degree = params.mean_degree();
            if !(mean_degree.is_finite() && mean_degree > 0.0) {
                return Err(GraphError::InvalidMeanDegree {
                    value: mean_degree,
                    method: "poisson",
                });
            }
            configuration::populate(rng, &mut graph, |rng| poisson_stubs(rng, mean_degree))?;
        }
    }

    debug!(
        num_nodes,
        edges = graph.edge_list().len(),
        "graph generated"
    );
    Ok(graph)
}

fn naive<R: Rng + ?Sized>(rng: &mut R, graph: &mut Graph, p: f64) -> Result<()> {
    let num_nodes = graph.num_nodes();
    for i in 0..num_nodes {
        for j in 0..i {
            if bernoulli(rng, p)? {
                graph.add_edge(i, j)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
