//! Command-line interface for generating graphs and running epidemic
//! experiments on them.
//!
//! Each subcommand builds or loads a graph, runs one experiment and returns an
//! [`ExecutionSummary`] that [`render_summary`] prints as plain text.

mod commands;

pub use commands::{
    Cli, CliError, Command, DegreesCommand, EdgesCommand, ExecutionSummary, FixedPointCommand,
    GenerateCommand, GraphArgs, OutbreakCommand, ReachCommand, SirCommand, SourceArgs,
    render_summary, run_cli,
};
