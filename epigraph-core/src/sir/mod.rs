//! Discrete-time SIR epidemics with optional pre-emptive vaccination.
//!
//! A [`SirSimulator`] borrows an immutable [`Graph`] and owns only the
//! epidemic state: one [`NodeState`] per node and the set of currently
//! infectious nodes. All label changes go through a single transition function
//! that keeps the two in agreement.
//!
//! Steps are synchronous. Every transition within a step is decided from the
//! state at the start of the step and applied afterwards, so a node infected
//! during a step cannot transmit until the next one.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    Graph,
    error::{
        GraphError, SimulationError, check_closed_probability, check_open_probability,
    },
};

type SimResult<T> = core::result::Result<T, SimulationError>;

/// Epidemic label of a single node.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NodeState {
    /// Can be infected.
    #[default]
    Susceptible,
    /// Currently transmitting; recovers after one step.
    Infectious,
    /// Was infected and is now immune.
    Recovered,
    /// Immunised before the epidemic started.
    Vaccinated,
}

/// Number of nodes carrying each label.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StateCounts {
    /// Susceptible nodes.
    pub susceptible: usize,
    /// Infectious nodes.
    pub infectious: usize,
    /// Recovered nodes.
    pub recovered: usize,
    /// Vaccinated nodes.
    pub vaccinated: usize,
}

impl StateCounts {
    fn tally(states: &[NodeState]) -> Self {
        states.iter().fold(Self::default(), |mut counts, state| {
            match state {
                NodeState::Susceptible => counts.susceptible += 1,
                NodeState::Infectious => counts.infectious += 1,
                NodeState::Recovered => counts.recovered += 1,
                NodeState::Vaccinated => counts.vaccinated += 1,
            }
            counts
        })
    }
}

/// Transitions applied by a single [`SirSimulator::advance`] call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StepReport {
    /// Nodes that became infectious.
    pub newly_infected: usize,
    /// Nodes that recovered.
    pub recovered: usize,
}

/// Final state of a completed epidemic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunOutcome {
    states: Vec<NodeState>,
    transient_time: usize,
}

impl RunOutcome {
    /// Label of every node once no node is infectious.
    #[must_use]
    #[rustfmt::skip]
    pub const fn states(&self) -> &[NodeState] { self.states.as_slice() }

    /// Number of steps taken until no node was infectious.
    #[must_use]
    #[rustfmt::skip]
    pub const fn transient_time(&self) -> usize { self.transient_time }

    /// Label counts of the final state.
    #[must_use]
    pub fn counts(&self) -> StateCounts {
        StateCounts::tally(&self.states)
    }
}

/// Stateful SIR epidemic over a borrowed graph.
///
/// # Examples
/// ```
/// use epigraph_core::{Graph, NodeState, SirSimulator};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = Graph::new(3, false)?;
/// graph.add_edge(0, 1)?;
/// graph.add_edge(1, 2)?;
///
/// let mut rng = SmallRng::seed_from_u64(1);
/// let mut sir = SirSimulator::new(&graph);
/// sir.set_initial_state(&mut rng, 0.5)?;
/// let outcome = sir.run(&mut rng, 0.5)?;
/// assert!(outcome.transient_time() <= graph.num_nodes());
/// assert!(!outcome.states().contains(&NodeState::Infectious));
/// # Ok::<(), epigraph_core::SimulationError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SirSimulator<'g> {
    graph: &'g Graph,
    states: Vec<NodeState>,
    active: BTreeSet<usize>,
    recovered: usize,
    seed_probability: Option<f64>,
}

impl<'g> SirSimulator<'g> {
    /// Creates a simulator with every node susceptible and no seeding
    /// probability configured.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            states: vec![NodeState::Susceptible; graph.num_nodes()],
            active: BTreeSet::new(),
            recovered: 0,
            seed_probability: None,
        }
    }

    /// Creates a simulator that seeds epidemics with probability `p` in
    /// [`Self::infected_estimate`]. No node is infected yet.
    ///
    /// # Errors
    /// Returns a validation error when `p` lies outside `(0, 1)`.
    pub fn with_seed_probability(graph: &'g Graph, p: f64) -> SimResult<Self> {
        let checked = check_open_probability("seed probability", p)?;
        let mut simulator = Self::new(graph);
        simulator.seed_probability = Some(checked);
        Ok(simulator)
    }

    /// Returns the graph the epidemic runs on.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graph(&self) -> &'g Graph { self.graph }

    /// Returns the label of every node.
    #[must_use]
    #[rustfmt::skip]
    pub const fn states(&self) -> &[NodeState] { self.states.as_slice() }

    /// Returns the configured seeding probability, if any.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed_probability(&self) -> Option<f64> { self.seed_probability }

    /// Returns the label of `node`.
    ///
    /// # Errors
    /// Returns a validation error when `node` is not a node of the graph.
    pub fn node_state(&self, node: usize) -> SimResult<NodeState> {
        self.states.get(node).copied().ok_or_else(|| {
            GraphError::NodeOutOfRange {
                node,
                num_nodes: self.graph.num_nodes(),
            }
            .into()
        })
    }

    /// Returns whether any node is currently infectious.
    #[must_use]
    pub fn has_infected(&self) -> bool {
        !self.active.is_empty()
    }

    /// Returns the current label counts.
    #[must_use]
    pub fn counts(&self) -> StateCounts {
        StateCounts::tally(&self.states)
    }

    /// Returns `true` for every vaccinated node, indexed by node.
    #[must_use]
    pub fn vaccination_mask(&self) -> Vec<bool> {
        self.states
            .iter()
            .map(|state| *state == NodeState::Vaccinated)
            .collect()
    }

    /// Resets every non-vaccinated node to susceptible and infects each of
    /// them independently with probability `p`.
    ///
    /// `p` becomes the seeding probability used by
    /// [`Self::infected_estimate`].
    ///
    /// # Errors
    /// Returns a validation error when `p` lies outside `(0, 1)`; the state is
    /// left untouched in that case.
    pub fn set_initial_state<R: Rng + ?Sized>(&mut self, rng: &mut R, p: f64) -> SimResult<()> {
        let checked = check_open_probability("seed probability", p)?;
        self.seed_probability = Some(checked);
        self.reset();
        for node in 0..self.states.len() {
            if self.node_state(node)? == NodeState::Susceptible && rng.gen_bool(checked) {
                self.transition(node, NodeState::Infectious)?;
            }
        }
        Ok(())
    }

    /// Vaccinates each currently susceptible node independently with
    /// probability `rate` and returns how many were vaccinated.
    ///
    /// Infectious and recovered nodes are unaffected, so vaccination is only
    /// meaningful before the epidemic is seeded.
    ///
    /// # Errors
    /// Returns a validation error when `rate` lies outside `[0, 1]`.
    pub fn vaccinate<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) -> SimResult<usize> {
        let checked = check_closed_probability("vaccination rate", rate)?;
        let mut vaccinated = 0;
        for node in 0..self.states.len() {
            if self.node_state(node)? == NodeState::Susceptible && rng.gen_bool(checked) {
                self.transition(node, NodeState::Vaccinated)?;
                vaccinated += 1;
            }
        }
        Ok(vaccinated)
    }

    /// Performs one synchronous step with per-edge transmission probability
    /// `rate`.
    ///
    /// Every infectious node recovers and makes one transmission attempt per
    /// edge to each neighbour that was susceptible at the start of the step.
    ///
    /// # Errors
    /// Returns a validation error when `rate` lies outside `(0, 1)` and
    /// [`SimulationError::InvariantViolation`] if the bookkeeping diverges.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) -> SimResult<StepReport> {
        let checked = check_open_probability("transmission rate", rate)?;
        self.step(rng, checked)
    }

    /// Advances until no node is infectious.
    ///
    /// # Errors
    /// Returns a validation error when `rate` lies outside `(0, 1)` and
    /// [`SimulationError::InvariantViolation`] if the bookkeeping diverges.
    #[instrument(
        name = "sir.run",
        err,
        skip(self, rng),
        fields(num_nodes = self.graph.num_nodes()),
    )]
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) -> SimResult<RunOutcome> {
        self.run_inner(rng, rate, None)
    }

    /// Like [`Self::run`], additionally returning the label counts observed
    /// after every step.
    ///
    /// # Errors
    /// See [`Self::run`].
    pub fn run_with_trace<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rate: f64,
    ) -> SimResult<(RunOutcome, Vec<StateCounts>)> {
        let mut trace = Vec::new();
        let outcome = self.run_inner(rng, rate, Some(&mut trace))?;
        Ok((outcome, trace))
    }

    /// Estimates, per node, the probability of being infected at some point.
    ///
    /// Runs `repeat` independent epidemics, each re-seeded with the configured
    /// seeding probability, and returns the fraction of runs in which each
    /// node ended recovered. Vaccinated nodes stay vaccinated across runs.
    ///
    /// # Errors
    /// Returns [`SimulationError::MissingSeedProbability`] when no seeding
    /// probability has been configured, [`SimulationError::InvalidRepeat`]
    /// when `repeat` is zero, and a validation error when `rate` lies outside
    /// `(0, 1)`.
    #[instrument(
        name = "sir.infected_estimate",
        err,
        skip(self, rng),
        fields(num_nodes = self.graph.num_nodes()),
    )]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "per-node frequencies are ratios of trial counts"
    )]
    pub fn infected_estimate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rate: f64,
        repeat: usize,
    ) -> SimResult<Vec<f64>> {
        let checked = check_open_probability("transmission rate", rate)?;
        if repeat == 0 {
            return Err(SimulationError::InvalidRepeat { got: repeat });
        }
        let seed_probability = self
            .seed_probability
            .ok_or(SimulationError::MissingSeedProbability)?;

        let mut infected = vec![0_usize; self.states.len()];
        for _ in 0..repeat {
            self.set_initial_state(rng, seed_probability)?;
            let outcome = self.run_inner(rng, checked, None)?;
            for (tally, state) in infected.iter_mut().zip(outcome.states()) {
                if *state == NodeState::Recovered {
                    *tally += 1;
                }
            }
        }
        let trials = repeat as f64;
        Ok(infected
            .into_iter()
            .map(|count| count as f64 / trials)
            .collect())
    }

    fn run_inner<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        rate: f64,
        mut trace: Option<&mut Vec<StateCounts>>,
    ) -> SimResult<RunOutcome> {
        let checked = check_open_probability("transmission rate", rate)?;
        let mut transient_time = 0;
        while self.has_infected() {
            self.step(rng, checked)?;
            transient_time += 1;
            if let Some(steps) = trace.as_deref_mut() {
                steps.push(self.counts());
            }
            if transient_time > self.states.len() {
                return Err(SimulationError::InvariantViolation {
                    invariant: "transient time must not exceed the node count",
                    node: self.active.first().copied().unwrap_or_default(),
                });
            }
        }
        self.check_active_matches_states()?;
        debug!(transient_time, recovered = self.recovered, "epidemic ended");
        Ok(RunOutcome {
            states: self.states.clone(),
            transient_time,
        })
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R, rate: f64) -> SimResult<StepReport> {
        let infectious: Vec<usize> = self.active.iter().copied().collect();
        let mut exposed = BTreeSet::new();
        for &node in &infectious {
            for &friend in self.graph.neighbors(node)? {
                if self.node_state(friend)? == NodeState::Susceptible && rng.gen_bool(rate) {
                    exposed.insert(friend);
                }
            }
        }

        for &node in &infectious {
            self.transition(node, NodeState::Recovered)?;
        }
        for &node in &exposed {
            self.transition(node, NodeState::Infectious)?;
        }
        Ok(StepReport {
            newly_infected: exposed.len(),
            recovered: infectious.len(),
        })
    }

    /// Returns every non-vaccinated node to susceptible.
    fn reset(&mut self) {
        for state in &mut self.states {
            if *state != NodeState::Vaccinated {
                *state = NodeState::Susceptible;
            }
        }
        self.active.clear();
        self.recovered = 0;
    }

    /// Applies a single label change, keeping the active set and the recovered
    /// count consistent with the labels.
    fn transition(&mut self, node: usize, to: NodeState) -> SimResult<()> {
        let from = self.node_state(node)?;
        match (from, to) {
            (NodeState::Susceptible, NodeState::Infectious) => {
                if !self.active.insert(node) {
                    return Err(SimulationError::InvariantViolation {
                        invariant: "susceptible node was already in the active set",
                        node,
                    });
                }
            }
            (NodeState::Infectious, NodeState::Recovered) => {
                if !self.active.remove(&node) {
                    return Err(SimulationError::InvariantViolation {
                        invariant: "infectious node was missing from the active set",
                        node,
                    });
                }
                self.recovered += 1;
                if self.recovered > self.states.len() {
                    return Err(SimulationError::InvariantViolation {
                        invariant: "recovered count must not exceed the node count",
                        node,
                    });
                }
            }
            (NodeState::Susceptible, NodeState::Vaccinated) => {}
            _ => {
                return Err(SimulationError::InvariantViolation {
                    invariant: "only S->I, I->R and S->V transitions are allowed",
                    node,
                });
            }
        }
        if let Some(state) = self.states.get_mut(node) {
            *state = to;
        }
        Ok(())
    }

    fn check_active_matches_states(&self) -> SimResult<()> {
        for (node, state) in self.states.iter().enumerate() {
            if (*state == NodeState::Infectious) != self.active.contains(&node) {
                return Err(SimulationError::InvariantViolation {
                    invariant: "active set must equal the infectious nodes",
                    node,
                });
            }
        }
        Ok(())
    }
}
