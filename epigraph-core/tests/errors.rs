//! Error type display, code and source behaviour.

use std::{io, path::PathBuf};

use epigraph_core::{
    GraphError, GraphErrorCode, SimulationError, SimulationErrorCode, StoreError, StoreErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(GraphError::InvalidNodeCount { got: 0, min: 1 }, GraphErrorCode::InvalidNodeCount)]
#[case(
    GraphError::NodeOutOfRange { node: 4, num_nodes: 3 },
    GraphErrorCode::NodeOutOfRange,
)]
#[case(
    GraphError::InvalidProbability { name: "edge probability", value: 1.5, interval: "[0, 1]" },
    GraphErrorCode::InvalidProbability,
)]
#[case(
    GraphError::InvalidMeanDegree { value: 0.5, method: "geometric" },
    GraphErrorCode::InvalidMeanDegree,
)]
#[case(
    GraphError::UnsupportedMethod { kind: "generation", name: "lattice".into() },
    GraphErrorCode::UnsupportedMethod,
)]
#[case(GraphError::LengthMismatch { expected: 3, got: 2 }, GraphErrorCode::LengthMismatch)]
#[case(GraphError::EmptySample, GraphErrorCode::EmptySample)]
#[case(
    GraphError::AsymmetricAdjacency { node: 0, neighbor: 1 },
    GraphErrorCode::AsymmetricAdjacency,
)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
}

#[rstest]
#[case(
    SimulationError::from(GraphError::EmptySample),
    SimulationErrorCode::Validation,
    Some(GraphErrorCode::EmptySample),
)]
#[case(SimulationError::InvalidRepeat { got: 0 }, SimulationErrorCode::InvalidRepeat, None)]
#[case(
    SimulationError::MissingSeedProbability,
    SimulationErrorCode::MissingSeedProbability,
    None,
)]
#[case(
    SimulationError::NotConverged { iterations: 10, delta: 0.5 },
    SimulationErrorCode::NotConverged,
    None,
)]
#[case(
    SimulationError::InvariantViolation { invariant: "active set matches states", node: 2 },
    SimulationErrorCode::InvariantViolation,
    None,
)]
fn returns_expected_simulation_code(
    #[case] error: SimulationError,
    #[case] expected: SimulationErrorCode,
    #[case] validation_code: Option<GraphErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
    assert_eq!(error.validation_code(), validation_code);
}

#[test]
fn store_codes_are_stable() {
    let io = StoreError::Io {
        path: PathBuf::from("graphs/a.json"),
        source: io::Error::from(io::ErrorKind::NotFound),
    };
    assert_eq!(io.code(), StoreErrorCode::Io);
    assert_eq!(io.code().as_str(), "STORE_IO");

    let graph = StoreError::Graph {
        path: PathBuf::from("graphs/a.json"),
        source: GraphError::InvalidNodeCount { got: 0, min: 1 },
    };
    assert_eq!(graph.code().as_str(), "STORE_INVALID_GRAPH");
}

#[test]
fn codes_display_as_their_string_form() {
    assert_eq!(
        GraphErrorCode::InvalidProbability.to_string(),
        "GRAPH_INVALID_PROBABILITY"
    );
    assert_eq!(
        SimulationErrorCode::NotConverged.to_string(),
        "SIM_NOT_CONVERGED"
    );
}
