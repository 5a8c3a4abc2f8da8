//! Unit tests for the random graph generators.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use super::{GenerationMethod, GeneratorParams, generate};
use crate::{Graph, GraphError};

fn is_symmetric(graph: &Graph) -> bool {
    (0..graph.num_nodes()).all(|i| {
        graph
            .neighbors(i)
            .expect("in range")
            .iter()
            .all(|&j| graph.neighbors(j).expect("in range").contains(&i))
    })
}

fn edge_count_moments(method: GenerationMethod, num_nodes: usize, p: f64, trials: u32) -> (f64, f64) {
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let params = GeneratorParams::new().with_edge_probability(p);
    let counts: Vec<f64> = (0..trials)
        .map(|_| {
            let graph = generate(&mut rng, num_nodes, method, &params).expect("valid parameters");
            graph.edge_list().len() as f64
        })
        .collect();
    let n = f64::from(trials);
    let mean = counts.iter().sum::<f64>() / n;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

#[rstest]
#[case("naive", GenerationMethod::Naive)]
#[case("two-step", GenerationMethod::TwoStep)]
#[case("geometric", GenerationMethod::Geometric)]
#[case("poisson", GenerationMethod::Poisson)]
fn method_names_round_trip(#[case] name: &str, #[case] method: GenerationMethod) {
    assert_eq!(name.parse::<GenerationMethod>().expect("known name"), method);
    assert_eq!(method.to_string(), name);
}

#[test]
fn rejects_unknown_method_name() {
    let err = "erdos".parse::<GenerationMethod>().expect_err("unknown method");
    assert_eq!(
        err,
        GraphError::UnsupportedMethod {
            kind: "generation",
            name: "erdos".to_owned(),
        }
    );
}

#[rstest]
#[case(0)]
#[case(1)]
fn rejects_too_few_nodes(#[case] num_nodes: usize) {
    let mut rng = SmallRng::seed_from_u64(1);
    let params = GeneratorParams::new().with_edge_probability(0.5);
    let err = generate(&mut rng, num_nodes, GenerationMethod::Naive, &params)
        .expect_err("node count must be rejected");
    assert!(matches!(err, GraphError::InvalidNodeCount { .. }));
}

#[rstest]
#[case(GenerationMethod::Naive, -0.01)]
#[case(GenerationMethod::TwoStep, 1.01)]
#[case(GenerationMethod::Geometric, 2.0)]
fn rejects_invalid_edge_probability(#[case] method: GenerationMethod, #[case] p: f64) {
    let mut rng = SmallRng::seed_from_u64(1);
    let params = GeneratorParams::new()
        .with_edge_probability(p)
        .with_mean_degree(4.0);
    let err = generate(&mut rng, 10, method, &params).expect_err("probability must be rejected");
    assert!(matches!(err, GraphError::InvalidProbability { .. }));
}

#[rstest]
#[case(GenerationMethod::Geometric, 0.5)]
#[case(GenerationMethod::Geometric, f64::NAN)]
#[case(GenerationMethod::Poisson, 0.0)]
fn rejects_invalid_mean_degree(#[case] method: GenerationMethod, #[case] mean_degree: f64) {
    let mut rng = SmallRng::seed_from_u64(1);
    let params = GeneratorParams::new().with_mean_degree(mean_degree);
    let err = generate(&mut rng, 10, method, &params).expect_err("mean degree must be rejected");
    assert!(matches!(err, GraphError::InvalidMeanDegree { .. }));
}

#[rstest]
#[case(GenerationMethod::Naive)]
#[case(GenerationMethod::TwoStep)]
fn certain_edges_produce_complete_graph(#[case] method: GenerationMethod) {
    let mut rng = SmallRng::seed_from_u64(9);
    let params = GeneratorParams::new().with_edge_probability(1.0);
    let graph = generate(&mut rng, 12, method, &params).expect("valid parameters");
    assert_eq!(graph.edge_list().len(), 66);
    for node in 0..12 {
        assert_eq!(graph.degree(node).expect("in range"), 11);
    }
}

#[rstest]
#[case(GenerationMethod::Naive)]
#[case(GenerationMethod::TwoStep)]
fn impossible_edges_produce_empty_graph(#[case] method: GenerationMethod) {
    let mut rng = SmallRng::seed_from_u64(9);
    let params = GeneratorParams::new();
    let graph = generate(&mut rng, 12, method, &params).expect("valid parameters");
    assert!(graph.edge_list().is_empty());
}

#[test]
fn two_step_dense_targets_terminate_without_duplicates() {
    let mut rng = SmallRng::seed_from_u64(21);
    let params = GeneratorParams::new().with_edge_probability(0.95);
    for _ in 0..20 {
        let graph = generate(&mut rng, 15, GenerationMethod::TwoStep, &params).expect("valid");
        let edges = graph.edge_list();
        let distinct: HashSet<(usize, usize)> = edges.iter().copied().collect();
        assert_eq!(distinct.len(), edges.len(), "two-step must not repeat edges");
        assert!(is_symmetric(&graph));
    }
}

#[rstest]
#[case(GenerationMethod::Naive)]
#[case(GenerationMethod::TwoStep)]
fn edge_count_moments_match_binomial(#[case] method: GenerationMethod) {
    let (num_nodes, p) = (30, 0.3);
    let pairs = 435.0;
    let (mean, variance) = edge_count_moments(method, num_nodes, p, 400);
    let expected_mean = p * pairs;
    let expected_variance = p * (1.0 - p) * pairs;
    assert!(
        (mean - expected_mean).abs() < 3.0,
        "{method}: mean {mean} vs {expected_mean}"
    );
    assert!(
        (variance - expected_variance).abs() < 0.3 * expected_variance,
        "{method}: variance {variance} vs {expected_variance}"
    );
}

#[test]
fn configuration_model_keeps_self_loops_and_parallel_edges() {
    // Stub pairing may join a node to itself or repeat a pair. Such graphs are
    // accepted; this test only records that they occur at high mean degree.
    let mut rng = SmallRng::seed_from_u64(77);
    let params = GeneratorParams::new().with_mean_degree(12.0);
    let mut saw_loop = false;
    let mut saw_parallel = false;
    for _ in 0..10 {
        let graph = generate(&mut rng, 10, GenerationMethod::Geometric, &params).expect("valid");
        for node in 0..graph.num_nodes() {
            let neighbors = graph.neighbors(node).expect("in range");
            saw_loop |= neighbors.contains(&node);
            let mut sorted = neighbors.to_vec();
            sorted.sort_unstable();
            saw_parallel |= sorted.windows(2).any(|w| w[0] == w[1] && w[0] != node);
        }
        assert!(is_symmetric(&graph));
    }
    assert!(saw_loop, "expected at least one self-loop");
    assert!(saw_parallel, "expected at least one parallel edge");
}

#[test]
fn geometric_mean_degree_of_one_yields_no_edges() {
    let mut rng = SmallRng::seed_from_u64(3);
    let params = GeneratorParams::new().with_mean_degree(1.0);
    let graph = generate(&mut rng, 50, GenerationMethod::Geometric, &params).expect("valid");
    assert!(graph.adjacency().iter().all(Vec::is_empty));
}

#[test]
fn poisson_model_tracks_mean_degree() {
    let mut rng = SmallRng::seed_from_u64(13);
    let params = GeneratorParams::new().with_mean_degree(6.0);
    let graph = generate(&mut rng, 2_000, GenerationMethod::Poisson, &params).expect("valid");
    let total: usize = graph.adjacency().iter().map(Vec::len).sum();
    let mean = total as f64 / 2_000.0;
    assert!((mean - 6.0).abs() < 0.5, "mean degree was {mean}");
}

#[test]
fn directed_naive_graph_stores_one_direction() {
    let mut rng = SmallRng::seed_from_u64(4);
    let params = GeneratorParams::new()
        .with_edge_probability(1.0)
        .with_directed(true);
    let graph = generate(&mut rng, 4, GenerationMethod::Naive, &params).expect("valid");
    assert!(graph.is_directed());
    assert_eq!(graph.neighbors(0).expect("in range"), &[] as &[usize]);
    assert_eq!(graph.neighbors(3).expect("in range"), &[0, 1, 2]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_graphs_are_symmetric_and_sized(
        num_nodes in 2_usize..40,
        p in 0.0_f64..=1.0,
        mean_degree in 1.0_f64..8.0,
        method_index in 0_usize..4,
        seed in any::<u64>(),
    ) {
        let method = [
            GenerationMethod::Naive,
            GenerationMethod::TwoStep,
            GenerationMethod::Geometric,
            GenerationMethod::Poisson,
        ][method_index];
        let mut rng = SmallRng::seed_from_u64(seed);
        let params = GeneratorParams::new()
            .with_edge_probability(p)
            .with_mean_degree(mean_degree);
        let graph = generate(&mut rng, num_nodes, method, &params).expect("valid parameters");
        prop_assert_eq!(graph.num_nodes(), num_nodes);
        prop_assert!(is_symmetric(&graph));
        prop_assert!(graph.adjacency().iter().flatten().all(|&n| n < num_nodes));
    }
}
