//! # adjudications CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adj_cli::repair::{run_repair, RepairArgs};
use adj_cli::report::{run_report, ReportArgs};
use adj_cli::transitions::{run_transitions, TransitionsArgs};

/// Adjudications lifecycle tooling.
///
/// Inspects the status transition graph, queries punishments held in a JSON
/// store file, and runs the activation repair job against it.
#[derive(Parser, Debug)]
#[command(name = "adjudications", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON store file holding the adjudications.
    #[arg(long, global = true, default_value = "adjudications.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect the status transition graph.
    Transitions(TransitionsArgs),

    /// Read-only charge and punishment queries.
    Report(ReportArgs),

    /// Move legacy activation copies onto their origin punishments.
    RepairActivations(RepairArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(store = %cli.store.display(), "adjudications CLI starting");

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Transitions(args) => run_transitions(args),
        Commands::Report(args) => run_report(args, &cli.store, config),
        Commands::RepairActivations(args) => run_repair(args, &cli.store, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
