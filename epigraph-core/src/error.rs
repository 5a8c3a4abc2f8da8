//! Error types for the epigraph core library.
//!
//! Validation failures are reported before any state is touched. Each enum
//! carries a stable machine-readable code so drivers can log and match on
//! failures without parsing messages.

use std::{fmt, path::PathBuf};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Validation errors raised by graph construction, sampling, generation and
/// statistics.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// Graphs need at least the requested minimum number of nodes.
    #[error("node count must be at least {min} (got {got})")]
    InvalidNodeCount {
        /// Node count supplied by the caller.
        got: usize,
        /// Smallest node count accepted by the operation.
        min: usize,
    },
    /// A node index fell outside `[0, num_nodes)`.
    #[error("node {node} is out of range for a graph with {num_nodes} nodes")]
    NodeOutOfRange {
        /// The offending node index.
        node: usize,
        /// Number of nodes in the graph.
        num_nodes: usize,
    },
    /// A probability or rate fell outside its admissible interval.
    #[error("{name} must lie in {interval} (got {value})")]
    InvalidProbability {
        /// Parameter name as exposed by the operation.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Human-readable admissible interval, e.g. `[0, 1]`.
        interval: &'static str,
    },
    /// The configuration-model mean degree was not usable.
    #[error("mean degree {value} is invalid for the {method} degree model")]
    InvalidMeanDegree {
        /// Rejected mean degree.
        value: f64,
        /// Degree model that rejected it.
        method: &'static str,
    },
    /// A method name did not match any supported strategy.
    #[error("{kind} method `{name}` is not supported")]
    UnsupportedMethod {
        /// What kind of method was requested (generation, statistics, ...).
        kind: &'static str,
        /// The unrecognised name.
        name: String,
    },
    /// A per-node vector did not have one entry per node.
    #[error("expected {expected} per-node values but got {got}")]
    LengthMismatch {
        /// Number of nodes in the graph.
        expected: usize,
        /// Length of the supplied vector.
        got: usize,
    },
    /// A summary statistic was requested over an empty sample.
    #[error("cannot summarise an empty sample")]
    EmptySample,
    /// Undirected neighbour lists disagree about an edge.
    #[error("node {node} lists {neighbor} more often than {neighbor} lists {node}")]
    AsymmetricAdjacency {
        /// Node holding the unmatched entry.
        node: usize,
        /// Neighbour whose reverse entry is missing.
        neighbor: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Graphs need at least the requested minimum number of nodes.
        InvalidNodeCount => InvalidNodeCount { .. } => "GRAPH_INVALID_NODE_COUNT",
        /// A node index fell outside the graph.
        NodeOutOfRange => NodeOutOfRange { .. } => "GRAPH_NODE_OUT_OF_RANGE",
        /// A probability or rate fell outside its admissible interval.
        InvalidProbability => InvalidProbability { .. } => "GRAPH_INVALID_PROBABILITY",
        /// The configuration-model mean degree was not usable.
        InvalidMeanDegree => InvalidMeanDegree { .. } => "GRAPH_INVALID_MEAN_DEGREE",
        /// A method name did not match any supported strategy.
        UnsupportedMethod => UnsupportedMethod { .. } => "GRAPH_UNSUPPORTED_METHOD",
        /// A per-node vector did not have one entry per node.
        LengthMismatch => LengthMismatch { .. } => "GRAPH_LENGTH_MISMATCH",
        /// A summary statistic was requested over an empty sample.
        EmptySample => EmptySample => "GRAPH_EMPTY_SAMPLE",
        /// Undirected neighbour lists disagree about an edge.
        AsymmetricAdjacency => AsymmetricAdjacency { .. } => "GRAPH_ASYMMETRIC_ADJACENCY",
    }
}

/// Errors raised by the SIR simulator and the percolation analyser.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    /// An argument failed validation.
    #[error(transparent)]
    Validation {
        /// Underlying validation failure.
        #[from]
        source: GraphError,
    },
    /// Monte Carlo estimators need at least one trial.
    #[error("repeat count must be at least 1 (got {got})")]
    InvalidRepeat {
        /// Trial count supplied by the caller.
        got: usize,
    },
    /// No seeding probability was configured before estimating infections.
    #[error("no initial seeding probability has been configured")]
    MissingSeedProbability,
    /// The fixed-point iteration did not settle within the iteration cap.
    #[error("fixed-point iteration did not converge after {iterations} sweeps (last change {delta})")]
    NotConverged {
        /// Number of sweeps performed.
        iterations: usize,
        /// Largest per-node change in the final sweep.
        delta: f64,
    },
    /// Internal bookkeeping diverged from the state mapping.
    #[error("simulation invariant violated: {invariant} (node {node})")]
    InvariantViolation {
        /// Name of the violated invariant.
        invariant: &'static str,
        /// Node at which the violation was detected.
        node: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`SimulationError`] variants.
    enum SimulationErrorCode for SimulationError {
        /// An argument failed validation.
        Validation => Validation { .. } => "SIM_VALIDATION",
        /// Monte Carlo estimators need at least one trial.
        InvalidRepeat => InvalidRepeat { .. } => "SIM_INVALID_REPEAT",
        /// No seeding probability was configured.
        MissingSeedProbability => MissingSeedProbability => "SIM_MISSING_SEED_PROBABILITY",
        /// The fixed-point iteration did not settle.
        NotConverged => NotConverged { .. } => "SIM_NOT_CONVERGED",
        /// Internal bookkeeping diverged from the state mapping.
        InvariantViolation => InvariantViolation { .. } => "SIM_INVARIANT_VIOLATION",
    }
}

impl SimulationError {
    /// Retrieve the inner [`GraphErrorCode`] when the error is a validation failure.
    #[must_use]
    pub const fn validation_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Validation { source } => Some(source.code()),
            _ => None,
        }
    }
}

/// Errors raised while persisting or restoring graphs.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// File that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: std::io::Error,
    },
    /// The stored payload could not be encoded or decoded.
    #[error("malformed graph payload in `{path}`: {source}")]
    Decode {
        /// File holding the payload.
        path: PathBuf,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// The stored adjacency does not describe a valid graph.
    #[error("stored graph in `{path}` is invalid: {source}")]
    Graph {
        /// File holding the payload.
        path: PathBuf,
        /// Validation failure for the reconstructed graph.
        #[source]
        source: GraphError,
    },
}

define_error_codes! {
    /// Stable codes describing [`StoreError`] variants.
    enum StoreErrorCode for StoreError {
        /// Reading or writing the backing file failed.
        Io => Io { .. } => "STORE_IO",
        /// The stored payload could not be encoded or decoded.
        Decode => Decode { .. } => "STORE_DECODE",
        /// The stored adjacency does not describe a valid graph.
        Graph => Graph { .. } => "STORE_INVALID_GRAPH",
    }
}

/// Convenient alias for results of graph-level operations.
pub type Result<T> = core::result::Result<T, GraphError>;

/// Validates a probability on the closed interval `[0, 1]`.
pub(crate) fn check_closed_probability(name: &'static str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GraphError::InvalidProbability {
            name,
            value,
            interval: "[0, 1]",
        })
    }
}

/// Validates a probability on the open interval `(0, 1)`.
pub(crate) fn check_open_probability(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(GraphError::InvalidProbability {
            name,
            value,
            interval: "(0, 1)",
        })
    }
}
