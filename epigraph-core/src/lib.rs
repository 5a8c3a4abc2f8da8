//! Epigraph core library.
//!
//! Random graph generation, discrete-time SIR epidemics and percolation-based
//! outbreak analysis over immutable adjacency-list graphs. Every stochastic
//! routine takes the random generator as an argument, so runs are
//! reproducible from a seed.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
mod graph;
pub mod percolation;
pub mod sampling;
mod sir;
pub mod stats;
pub mod store;
pub mod sweep;

pub use crate::{
    error::{
        GraphError, GraphErrorCode, Result, SimulationError, SimulationErrorCode, StoreError,
        StoreErrorCode,
    },
    generator::{GenerationMethod, GeneratorParams, generate},
    graph::Graph,
    percolation::{FixedPoint, non_infected_fixed_point, outbreak_cluster_sizes},
    sir::{NodeState, RunOutcome, SirSimulator, StateCounts, StepReport},
    store::GraphStore,
};
