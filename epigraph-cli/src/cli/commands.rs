//! Command implementations and argument parsing for the epigraph CLI.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use epigraph_core::{
    GenerationMethod, GeneratorParams, Graph, GraphError, GraphStore, SimulationError,
    SirSimulator, StateCounts, StoreError, generate, non_infected_fixed_point,
    outbreak_cluster_sizes, sampling,
    stats::{self, EdgeCountMethod, FriendDegreeMethod, Summary},
    sweep::run_trials,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_NODES: usize = 1_000;
const DEFAULT_REPEAT: usize = 100;
const DEFAULT_FRIEND_SAMPLES: usize = 10_000;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "epigraph",
    about = "Generate random graphs and study SIR epidemics on them."
)]
pub struct Cli {
    /// Base seed for every random stream used by the command.
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: u64,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate a graph and store it.
    Generate(GenerateCommand),
    /// Compare sampled edge counts with the binomial expectation.
    Edges(EdgesCommand),
    /// Average the size of the set reachable from node 0.
    Reach(ReachCommand),
    /// Compare node degrees with the degrees of their neighbours.
    Degrees(DegreesCommand),
    /// Run a single SIR epidemic.
    Sir(SirCommand),
    /// Sample outbreak sizes through bond percolation.
    Outbreak(OutbreakCommand),
    /// Estimate the expected number of never-infected nodes.
    FixedPoint(FixedPointCommand),
}

impl Command {
    /// Subcommand name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generate(_) => "generate",
            Self::Edges(_) => "edges",
            Self::Reach(_) => "reach",
            Self::Degrees(_) => "degrees",
            Self::Sir(_) => "sir",
            Self::Outbreak(_) => "outbreak",
            Self::FixedPoint(_) => "fixed-point",
        }
    }
}

/// Random graph parameters.
#[derive(Debug, Args, Clone)]
pub struct GraphArgs {
    /// Number of nodes.
    #[arg(long, default_value_t = DEFAULT_NODES)]
    pub nodes: usize,

    /// Generation method: `naive`, `two-step`, `geometric` or `poisson`.
    #[arg(long, default_value = "two-step")]
    pub method: GenerationMethod,

    /// Edge probability used by `naive` and `two-step`.
    #[arg(long, default_value_t = 0.0)]
    pub probability: f64,

    /// Mean degree used by `geometric` and `poisson`.
    #[arg(long = "mean-degree", default_value_t = 1.0)]
    pub mean_degree: f64,

    /// Store edges in one direction only.
    #[arg(long)]
    pub directed: bool,
}

impl GraphArgs {
    const fn params(&self) -> GeneratorParams {
        GeneratorParams::new()
            .with_edge_probability(self.probability)
            .with_mean_degree(self.mean_degree)
            .with_directed(self.directed)
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Graph, GraphError> {
        generate(rng, self.nodes, self.method, &self.params())
    }
}

/// Where a simulation command takes its graph from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Load a stored graph instead of generating one.
    #[arg(long, value_name = "DIR/NAME")]
    pub load: Option<PathBuf>,

    /// Parameters used when no graph is loaded.
    #[command(flatten)]
    pub graph: GraphArgs,
}

impl SourceArgs {
    fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Graph, CliError> {
        let Some(path) = &self.load else {
            return Ok(self.graph.generate(rng)?);
        };
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| CliError::InvalidGraphPath { path: path.clone() })?;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Ok(GraphStore::new(dir).load(name)?)
    }
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Graph parameters.
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Directory receiving the snapshot.
    #[arg(long)]
    pub store: PathBuf,

    /// Snapshot name; `.json` is appended when it has no extension.
    #[arg(long)]
    pub name: String,
}

/// Options accepted by the `edges` command.
#[derive(Debug, Args, Clone)]
pub struct EdgesCommand {
    /// Graph parameters.
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Number of graphs to sample.
    #[arg(long, default_value_t = DEFAULT_REPEAT)]
    pub repeat: usize,
}

/// Options accepted by the `reach` command.
#[derive(Debug, Args, Clone)]
pub struct ReachCommand {
    /// Graph parameters.
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Number of graphs to sample.
    #[arg(long, default_value_t = DEFAULT_REPEAT)]
    pub repeat: usize,
}

/// Options accepted by the `degrees` command.
#[derive(Debug, Args, Clone)]
pub struct DegreesCommand {
    /// Graph parameters.
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Friend degree estimator: `sample` or `iterate`.
    #[arg(long = "friend-method", default_value = "sample")]
    pub friend_method: FriendDegreeMethod,

    /// Number of neighbour draws for the `sample` estimator.
    #[arg(long, default_value_t = DEFAULT_FRIEND_SAMPLES)]
    pub samples: usize,
}

/// Options accepted by the `sir` command.
#[derive(Debug, Args, Clone)]
pub struct SirCommand {
    /// Graph source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Probability that a node is infectious at the start.
    #[arg(long = "seed-probability")]
    pub seed_probability: f64,

    /// Per-edge transmission probability per step.
    #[arg(long)]
    pub rate: f64,

    /// Vaccinate each node with this probability before seeding.
    #[arg(long)]
    pub vaccinate: Option<f64>,

    /// Report the label counts after every step.
    #[arg(long)]
    pub trace: bool,
}

/// Options accepted by the `outbreak` command.
#[derive(Debug, Args, Clone)]
pub struct OutbreakCommand {
    /// Graph source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Per-edge transmission probability.
    #[arg(long)]
    pub rate: f64,

    /// Number of percolation trials.
    #[arg(long, default_value_t = DEFAULT_REPEAT)]
    pub repeat: usize,

    /// Vaccinate each node with this probability before sampling.
    #[arg(long)]
    pub vaccinate: Option<f64>,
}

/// Options accepted by the `fixed-point` command.
#[derive(Debug, Args, Clone)]
pub struct FixedPointCommand {
    /// Graph source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Per-edge transmission probability.
    #[arg(long)]
    pub rate: f64,

    /// Starting probability for every node; drawn uniformly per node when
    /// omitted.
    #[arg(long)]
    pub initial: Option<f64>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// `--load` did not end in a file name.
    #[error("`{path}` does not name a stored graph")]
    InvalidGraphPath {
        /// Path supplied by the user.
        path: PathBuf,
    },
    /// Graph generation or statistics failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A simulation rejected its inputs or failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// Loading or saving a graph failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    /// Returns the stable code of the underlying core error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidGraphPath { .. } => None,
            Self::Graph(err) => Some(err.code().as_str()),
            Self::Simulation(err) => Some(err.code().as_str()),
            Self::Store(err) => Some(err.code().as_str()),
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// A graph was generated and written to disk.
    Generated {
        /// File holding the snapshot.
        path: PathBuf,
        /// Number of nodes.
        nodes: usize,
        /// Number of edges reported by the edge list.
        edges: usize,
    },
    /// Edge counts over repeated generation.
    EdgeCounts {
        /// Observed counts.
        observed: Summary,
        /// Binomial mean `p * n(n-1)/2`.
        expected_mean: f64,
        /// Binomial standard deviation.
        expected_std_dev: f64,
    },
    /// Reachable-set sizes from node 0 over repeated generation.
    Reach {
        /// Observed sizes, including node 0 itself.
        reachable: Summary,
    },
    /// Degree and friend degree distributions of one graph.
    Degrees {
        /// Node degrees.
        degree: Summary,
        /// Degrees seen from a random neighbour; `None` when no node has a
        /// neighbour.
        friend_degree: Option<Summary>,
        /// Mean neighbour degree minus own degree, per node with a neighbour.
        /// Only the `iterate` estimator pairs the two.
        friend_excess: Option<Summary>,
    },
    /// A single SIR epidemic.
    Epidemic {
        /// Steps until no node was infectious.
        transient_time: usize,
        /// Final label counts.
        counts: StateCounts,
        /// Counts after every step, when requested.
        trace: Vec<StateCounts>,
    },
    /// Outbreak sizes under bond percolation.
    Outbreak {
        /// Nodes removed by vaccination.
        vaccinated: usize,
        /// Sampled cluster sizes.
        sizes: Summary,
    },
    /// Fixed point of the non-infection recurrence.
    FixedPoint {
        /// Number of nodes.
        nodes: usize,
        /// Sum of the per-node non-infection probabilities.
        expected_non_infected: f64,
        /// Sweeps needed to settle.
        iterations: usize,
    },
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the arguments are rejected or execution fails.
///
/// # Examples
/// ```
/// # use epigraph_cli::cli::{Cli, Command, EdgesCommand, ExecutionSummary, GraphArgs, run_cli};
/// # use epigraph_core::GenerationMethod;
/// let cli = Cli {
///     seed: 7,
///     command: Command::Edges(EdgesCommand {
///         graph: GraphArgs {
///             nodes: 10,
///             method: GenerationMethod::TwoStep,
///             probability: 1.0,
///             mean_degree: 1.0,
///             directed: false,
///         },
///         repeat: 3,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// let ExecutionSummary::EdgeCounts { observed, .. } = summary else {
///     unreachable!();
/// };
/// assert_eq!(observed.mean(), 45.0);
/// # Ok::<(), epigraph_cli::cli::CliError>(())
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty, seed = cli.seed),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    Span::current().record("command", field::display(cli.command.name()));
    let seed = cli.seed;
    let summary = match &cli.command {
        Command::Generate(command) => run_generate(seed, command)?,
        Command::Edges(command) => run_edges(seed, command)?,
        Command::Reach(command) => run_reach(seed, command)?,
        Command::Degrees(command) => run_degrees(seed, command)?,
        Command::Sir(command) => run_sir(seed, command)?,
        Command::Outbreak(command) => run_outbreak(seed, command)?,
        Command::FixedPoint(command) => run_fixed_point(seed, command)?,
    };
    info!(command = cli.command.name(), "command completed");
    Ok(summary)
}

#[instrument(name = "cli.generate", err, skip(command), fields(method = %command.graph.method))]
pub(super) fn run_generate(
    seed: u64,
    command: &GenerateCommand,
) -> Result<ExecutionSummary, CliError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = command.graph.generate(&mut rng)?;
    let path = GraphStore::new(&command.store).save(&graph, &command.name)?;
    Ok(ExecutionSummary::Generated {
        path,
        nodes: graph.num_nodes(),
        edges: stats::count_edges(&graph, EdgeCountMethod::Naive),
    })
}

#[instrument(name = "cli.edges", err, skip(command), fields(repeat = command.repeat))]
#[expect(
    clippy::float_arithmetic,
    reason = "binomial moments are floating-point expressions"
)]
pub(super) fn run_edges(seed: u64, command: &EdgesCommand) -> Result<ExecutionSummary, CliError> {
    let counts = run_trials(seed, command.repeat, |_, rng| {
        command
            .graph
            .generate(rng)
            .map(|graph| stats::count_edges(&graph, EdgeCountMethod::Naive))
    })
    .into_iter()
    .collect::<Result<Vec<_>, _>>()?;

    #[expect(
        clippy::cast_precision_loss,
        reason = "pair counts of practical graphs stay far below 2^52"
    )]
    let pairs = sampling::pair_count(command.graph.nodes) as f64;
    let p = command.graph.probability;
    Ok(ExecutionSummary::EdgeCounts {
        observed: Summary::from_samples(&to_samples(counts))?,
        expected_mean: p * pairs,
        expected_std_dev: (p * (1.0 - p) * pairs).sqrt(),
    })
}

#[instrument(name = "cli.reach", err, skip(command), fields(repeat = command.repeat))]
pub(super) fn run_reach(seed: u64, command: &ReachCommand) -> Result<ExecutionSummary, CliError> {
    let sizes = run_trials(seed, command.repeat, |_, rng| {
        let graph = command.graph.generate(rng)?;
        stats::reachable_set(&graph, 0).map(|reached| reached.len())
    })
    .into_iter()
    .collect::<Result<Vec<_>, _>>()?;
    Ok(ExecutionSummary::Reach {
        reachable: Summary::from_samples(&to_samples(sizes))?,
    })
}

#[instrument(name = "cli.degrees", err, skip(command))]
pub(super) fn run_degrees(
    seed: u64,
    command: &DegreesCommand,
) -> Result<ExecutionSummary, CliError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = command.graph.generate(&mut rng)?;
    let degrees = to_samples(stats::degree_distribution(&graph));
    let friends =
        stats::friend_degree_distribution(&mut rng, &graph, command.friend_method, command.samples);
    let friend_excess = match command.friend_method {
        FriendDegreeMethod::Iterate => summarise_non_empty(&friend_degree_excess(&graph))?,
        FriendDegreeMethod::Sample => None,
    };
    Ok(ExecutionSummary::Degrees {
        degree: Summary::from_samples(&degrees)?,
        friend_degree: summarise_non_empty(&friends)?,
        friend_excess,
    })
}

/// Edgeless graphs leave nothing to summarise, which is not an error here.
fn summarise_non_empty(samples: &[f64]) -> Result<Option<Summary>, GraphError> {
    if samples.is_empty() {
        return Ok(None);
    }
    Summary::from_samples(samples).map(Some)
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "degree differences are reported as floating-point samples"
)]
fn friend_degree_excess(graph: &Graph) -> Vec<f64> {
    stats::friend_degree_pairs(graph)
        .into_iter()
        .map(|(degree, friend_mean)| friend_mean - degree as f64)
        .collect()
}

#[instrument(name = "cli.sir", err, skip(command), fields(rate = command.rate))]
pub(super) fn run_sir(seed: u64, command: &SirCommand) -> Result<ExecutionSummary, CliError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = command.source.resolve(&mut rng)?;
    let mut sim = SirSimulator::new(&graph);
    if let Some(rate) = command.vaccinate {
        sim.vaccinate(&mut rng, rate)?;
    }
    sim.set_initial_state(&mut rng, command.seed_probability)?;
    let (outcome, trace) = if command.trace {
        sim.run_with_trace(&mut rng, command.rate)?
    } else {
        (sim.run(&mut rng, command.rate)?, Vec::new())
    };
    Ok(ExecutionSummary::Epidemic {
        transient_time: outcome.transient_time(),
        counts: outcome.counts(),
        trace,
    })
}

#[instrument(name = "cli.outbreak", err, skip(command), fields(rate = command.rate))]
pub(super) fn run_outbreak(
    seed: u64,
    command: &OutbreakCommand,
) -> Result<ExecutionSummary, CliError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = command.source.resolve(&mut rng)?;
    let (vaccinated, mask) = match command.vaccinate {
        Some(rate) => {
            let mut sim = SirSimulator::new(&graph);
            let vaccinated = sim.vaccinate(&mut rng, rate)?;
            (vaccinated, Some(sim.vaccination_mask()))
        }
        None => (0, None),
    };
    let sizes = outbreak_cluster_sizes(
        &mut rng,
        &graph,
        command.rate,
        command.repeat,
        mask.as_deref(),
    )?;
    Ok(ExecutionSummary::Outbreak {
        vaccinated,
        sizes: Summary::from_samples(&to_samples(sizes))?,
    })
}

#[instrument(name = "cli.fixed_point", err, skip(command), fields(rate = command.rate))]
pub(super) fn run_fixed_point(
    seed: u64,
    command: &FixedPointCommand,
) -> Result<ExecutionSummary, CliError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let graph = command.source.resolve(&mut rng)?;
    let initial: Vec<f64> = match command.initial {
        Some(value) => vec![value; graph.num_nodes()],
        None => (0..graph.num_nodes()).map(|_| rng.gen_range(0.0..=1.0)).collect(),
    };
    let result = non_infected_fixed_point(&graph, command.rate, &initial)?;
    Ok(ExecutionSummary::FixedPoint {
        nodes: graph.num_nodes(),
        expected_non_infected: result.expected_non_infected(),
        iterations: result.iterations(),
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::io::Cursor;
/// # use std::path::PathBuf;
/// # use epigraph_cli::cli::{ExecutionSummary, render_summary};
/// let summary = ExecutionSummary::Generated {
///     path: PathBuf::from("graphs/ring.json"),
///     nodes: 4,
///     edges: 4,
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8_lossy(&buffer.into_inner()),
///     "path: graphs/ring.json\nnodes: 4\nedges: 4\n"
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Generated { path, nodes, edges } => {
            writeln!(writer, "path: {}", path.display())?;
            writeln!(writer, "nodes: {nodes}")?;
            writeln!(writer, "edges: {edges}")?;
        }
        ExecutionSummary::EdgeCounts {
            observed,
            expected_mean,
            expected_std_dev,
        } => {
            write_stats(&mut writer, "edges", observed)?;
            writeln!(writer, "expected mean: {expected_mean:.4}")?;
            writeln!(writer, "expected std dev: {expected_std_dev:.4}")?;
        }
        ExecutionSummary::Reach { reachable } => write_stats(&mut writer, "reachable", reachable)?,
        ExecutionSummary::Degrees {
            degree,
            friend_degree,
            friend_excess,
        } => {
            write_stats(&mut writer, "degree", degree)?;
            match friend_degree {
                Some(friends) => write_stats(&mut writer, "friend degree", friends)?,
                None => writeln!(writer, "friend degree: no nodes with neighbours")?,
            }
            if let Some(excess) = friend_excess {
                write_stats(&mut writer, "friend degree excess", excess)?;
            }
        }
        ExecutionSummary::Epidemic {
            transient_time,
            counts,
            trace,
        } => {
            writeln!(writer, "transient time: {transient_time}")?;
            write_counts(&mut writer, "final", counts)?;
            for (step, step_counts) in trace.iter().enumerate() {
                write_counts(&mut writer, &format!("step {}", step + 1), step_counts)?;
            }
        }
        ExecutionSummary::Outbreak { vaccinated, sizes } => {
            writeln!(writer, "vaccinated: {vaccinated}")?;
            write_stats(&mut writer, "cluster size", sizes)?;
            writeln!(
                writer,
                "cluster size cv: {:.4}",
                sizes.coefficient_of_variation()
            )?;
        }
        ExecutionSummary::FixedPoint {
            nodes,
            expected_non_infected,
            iterations,
        } => {
            writeln!(writer, "nodes: {nodes}")?;
            writeln!(writer, "expected non-infected: {expected_non_infected:.4}")?;
            writeln!(writer, "iterations: {iterations}")?;
        }
    }
    Ok(())
}

fn write_stats(writer: &mut impl Write, label: &str, summary: &Summary) -> io::Result<()> {
    writeln!(
        writer,
        "{label}: mean {:.4} std dev {:.4} over {} samples",
        summary.mean(),
        summary.std_dev(),
        summary.count()
    )
}

fn write_counts(writer: &mut impl Write, label: &str, counts: &StateCounts) -> io::Result<()> {
    writeln!(
        writer,
        "{label}: S={} I={} R={} V={}",
        counts.susceptible, counts.infectious, counts.recovered, counts.vaccinated
    )
}

#[expect(
    clippy::cast_precision_loss,
    reason = "node and edge counts stay far below 2^52"
)]
fn to_samples(values: impl IntoIterator<Item = usize>) -> Vec<f64> {
    values.into_iter().map(|value| value as f64).collect()
}
