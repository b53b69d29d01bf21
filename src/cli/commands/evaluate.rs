//! Evaluate command - Play greedy episodes with a trained table

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    adapters::{BfsPathfinder, CsvTableRepository},
    cli::{
        config::WorldArgs,
        output::{print_kv, print_result, print_section},
    },
    pipeline::{TrainingLoop, TrainingParams, TrainingPipeline},
    ports::TableRepository,
    q_learning::StateEncoder,
    types::Action,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained Q-table")]
pub struct EvaluateArgs {
    /// Path to the trained Q-table CSV
    #[arg(long, short = 't')]
    pub table: PathBuf,

    #[command(flatten)]
    pub world: WorldArgs,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 100)]
    pub episodes: usize,

    /// Step cap per episode
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    /// End episodes once the enemy is this far away
    #[arg(long)]
    pub escape_distance: Option<u32>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let repository = CsvTableRepository;
    if !repository.exists(&args.table) {
        bail!("no Q-table at {}", args.table.display());
    }
    let (table, report) = repository
        .load(&args.table, Action::COUNT, StateEncoder::NUM_STATES)
        .with_context(|| format!("failed to load {}", args.table.display()))?;

    print_section("Evaluation");
    print_kv("Table", &args.table.display().to_string());
    print_kv(
        "Records",
        &format!("{} loaded, {} skipped", report.applied, report.skipped),
    );
    print_kv("World", &args.world.describe());

    let mut params = TrainingParams::default()
        .with_episodes(args.episodes)
        .with_constant_epsilon(0.0)
        .with_max_steps(args.max_steps);
    if let Some(distance) = args.escape_distance {
        params = params.with_escape_distance(distance);
    }
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }

    let world = args.world.build()?;
    let mut trainer = TrainingLoop::initialize_with_table(params, world, BfsPathfinder, table)
        .context("failed to set up evaluation")?;

    let result = TrainingPipeline::new().evaluate(&mut trainer, args.episodes)?;

    print_section("Evaluation Results");
    print_result(&result);
    let mean_steps = result.total_steps as f64 / result.total_episodes.max(1) as f64;
    print_kv("Mean length", &format!("{mean_steps:.1} steps"));

    if let Some(path) = &args.export {
        result
            .save(path)
            .with_context(|| format!("failed to export results to {}", path.display()))?;
        println!("\nResults exported to {}", path.display());
    }

    Ok(())
}
