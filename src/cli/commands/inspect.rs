//! Inspect command - Show what a Q-table has learned

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::CsvTableRepository,
    cli::output::{print_kv, print_section, print_subsection},
    ports::TableRepository,
    q_learning::{QTable, StateEncoder},
    types::Action,
};

#[derive(Parser, Debug)]
#[command(about = "Print greedy actions and values of a Q-table")]
pub struct InspectArgs {
    /// Path to the Q-table CSV
    #[arg(long, short = 't')]
    pub table: PathBuf,

    /// Include states that were never updated
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let (table, report) = CsvTableRepository
        .load(&args.table, Action::COUNT, StateEncoder::NUM_STATES)
        .with_context(|| format!("failed to load {}", args.table.display()))?;

    print_section("Q-table");
    print_kv("File", &args.table.display().to_string());
    print_kv("Records loaded", &report.applied.to_string());
    print_kv("Records skipped", &report.skipped.to_string());
    print_kv(
        "Entries set",
        &format!("{} of {}", table.visited_count(), Action::COUNT * table.num_states()),
    );

    print_subsection("Greedy policy");
    println!(
        "  {:>5}  {:<28} {:>9} {:>9} {:>9} {:>9}  best",
        "state", "features", "north", "east", "south", "west"
    );
    let encoder = StateEncoder::new();
    for state in 0..table.num_states() {
        if !args.all && !state_visited(&table, state)? {
            continue;
        }
        let features = encoder.decode(state)?;
        let values = table.action_values(state)?;
        let best = table
            .best_actions(state)?
            .into_iter()
            .map(|index| Action::try_from(index).map(Action::name))
            .collect::<crate::Result<Vec<_>>>()?
            .join("/");
        println!(
            "  {:>5}  {:<28} {:>9.3} {:>9.3} {:>9.3} {:>9.3}  {}",
            state,
            features.to_string(),
            values[0],
            values[1],
            values[2],
            values[3],
            best
        );
    }

    Ok(())
}

fn state_visited(table: &QTable, state: usize) -> crate::Result<bool> {
    for action in 0..table.num_actions() {
        if table.is_visited(action, state)? {
            return Ok(true);
        }
    }
    Ok(false)
}
