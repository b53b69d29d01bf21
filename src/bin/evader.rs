//! Evader CLI - Train and inspect a Q-learning agent that flees a pursuer
//!
//! This CLI provides a unified interface for:
//! - Training a Q-table on a grid world
//! - Evaluating the greedy policy of a trained table
//! - Inspecting what the table has learned per state

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "evader")]
#[command(version, about = "Tabular Q-learning for pursuit-evasion on grids", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-table, resuming from an existing snapshot
    Train(Box<evader::cli::commands::train::TrainArgs>),

    /// Play greedy episodes with a trained table
    Evaluate(evader::cli::commands::evaluate::EvaluateArgs),

    /// Print greedy actions and values per state
    Inspect(evader::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => evader::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => evader::cli::commands::evaluate::execute(args),
        Commands::Inspect(args) => evader::cli::commands::inspect::execute(args),
    }
}
