//! Sampling primitives shared by the graph generators.
//!
//! Every sampler takes the random source explicitly so trials stay
//! reproducible under a fixed seed.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Geometric, Poisson};

use crate::error::{GraphError, Result, check_closed_probability};

/// Draws a single Bernoulli trial with success probability `p`.
///
/// # Errors
/// Returns [`GraphError::InvalidProbability`] when `p` lies outside `[0, 1]`.
///
/// # Examples
/// ```
/// use epigraph_core::sampling::bernoulli;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// assert!(bernoulli(&mut rng, 1.0)?);
/// assert!(!bernoulli(&mut rng, 0.0)?);
/// # Ok::<(), epigraph_core::GraphError>(())
/// ```
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Result<bool> {
    let checked = check_closed_probability("bernoulli probability", p)?;
    Ok(rng.gen_bool(checked))
}

/// Number of unordered node pairs in a simple graph on `num_nodes` nodes.
#[must_use]
#[expect(
    clippy::integer_division,
    reason = "one of n and n - 1 is even, so the halving is exact"
)]
pub const fn pair_count(num_nodes: usize) -> u64 {
    let n = num_nodes as u64;
    n * n.saturating_sub(1) / 2
}

/// Samples a total edge count from `Binomial(n(n - 1) / 2, p)`.
///
/// # Errors
/// Returns [`GraphError::InvalidNodeCount`] when `num_nodes <= 1` and
/// [`GraphError::InvalidProbability`] when `p` lies outside `[0, 1]`.
pub fn edge_count<R: Rng + ?Sized>(rng: &mut R, num_nodes: usize, p: f64) -> Result<u64> {
    if num_nodes <= 1 {
        return Err(GraphError::InvalidNodeCount {
            got: num_nodes,
            min: 2,
        });
    }
    let checked = check_closed_probability("edge probability", p)?;
    let binomial = Binomial::new(pair_count(num_nodes), checked).map_err(|_| {
        GraphError::InvalidProbability {
            name: "edge probability",
            value: checked,
            interval: "[0, 1]",
        }
    })?;
    Ok(binomial.sample(rng))
}

/// Samples the number of failures before the first success of a geometric
/// distribution with success probability `p` (support starts at 0).
///
/// # Errors
/// Returns [`GraphError::InvalidProbability`] when `p` lies outside `(0, 1]`.
pub fn geometric_stubs<R: Rng + ?Sized>(rng: &mut R, p: f64) -> Result<u64> {
    let invalid = || GraphError::InvalidProbability {
        name: "geometric probability",
        value: p,
        interval: "(0, 1]",
    };
    if !(p > 0.0 && p <= 1.0) {
        return Err(invalid());
    }
    let geometric = Geometric::new(p).map_err(|_| invalid())?;
    Ok(geometric.sample(rng))
}

/// Samples a Poisson-distributed stub count with the given mean.
///
/// # Errors
/// Returns [`GraphError::InvalidMeanDegree`] when `mean` is not a positive
/// finite number.
pub fn poisson_stubs<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> Result<u64> {
    let invalid = || GraphError::InvalidMeanDegree {
        value: mean,
        method: "poisson",
    };
    if !(mean.is_finite() && mean > 0.0) {
        return Err(invalid());
    }
    let poisson = Poisson::new(mean).map_err(|_| invalid())?;
    let draw: f64 = poisson.sample(rng);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Poisson draws are non-negative integral values"
    )]
    let stubs = draw as u64;
    Ok(stubs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn bernoulli_rejects_out_of_range(#[case] p: f64) {
        let mut rng = SmallRng::seed_from_u64(1);
        let err = bernoulli(&mut rng, p).expect_err("probability must be rejected");
        assert!(matches!(err, GraphError::InvalidProbability { .. }));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(5, 10)]
    fn pair_count_matches_binomial_coefficient(#[case] n: usize, #[case] expected: u64) {
        assert_eq!(pair_count(n), expected);
    }

    #[test]
    fn edge_count_is_bounded_by_pair_count() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let m = edge_count(&mut rng, 10, 0.5).expect("valid parameters");
            assert!(m <= 45);
        }
        assert_eq!(edge_count(&mut rng, 10, 1.0).expect("valid"), 45);
        assert_eq!(edge_count(&mut rng, 10, 0.0).expect("valid"), 0);
    }

    #[test]
    fn edge_count_rejects_single_node() {
        let mut rng = SmallRng::seed_from_u64(3);
        let err = edge_count(&mut rng, 1, 0.5).expect_err("one node is too few");
        assert!(matches!(err, GraphError::InvalidNodeCount { got: 1, .. }));
    }

    #[test]
    fn geometric_with_certain_success_has_no_failures() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..32 {
            assert_eq!(geometric_stubs(&mut rng, 1.0).expect("valid"), 0);
        }
    }

    #[test]
    fn geometric_sample_mean_tracks_failure_count() {
        // Mean failures before success is (1 - p) / p.
        let mut rng = SmallRng::seed_from_u64(11);
        let p = 0.25;
        let draws = 20_000;
        let total: u64 = (0..draws)
            .map(|_| geometric_stubs(&mut rng, p).expect("valid"))
            .sum();
        let mean = total as f64 / f64::from(draws);
        assert!((mean - 3.0).abs() < 0.2, "mean was {mean}");
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn poisson_rejects_non_positive_means(#[case] mean: f64) {
        let mut rng = SmallRng::seed_from_u64(5);
        let err = poisson_stubs(&mut rng, mean).expect_err("mean must be rejected");
        assert!(matches!(err, GraphError::InvalidMeanDegree { .. }));
    }
}
