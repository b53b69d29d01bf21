//! Train command - Learn a Q-table for the evader

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    adapters::BfsPathfinder,
    cli::{
        config::{WorldArgs, load_params},
        output::{print_kv, print_result, print_section},
    },
    pipeline::{
        JsonlObserver, LoggingObserver, ProgressObserver, TrainingLoop, TrainingParams,
        TrainingPipeline, TrainingResult,
    },
    q_learning::EpsilonSchedule,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    params: &'a TrainingParams,
    world: String,
    table: Option<&'a Path>,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train an evader with Q-learning")]
pub struct TrainArgs {
    #[command(flatten)]
    pub world: WorldArgs,

    /// JSON file with training parameters; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Step cap per episode
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Learning rate α (0.0-1.0]
    #[arg(long)]
    pub alpha: Option<f32>,

    /// Discount factor γ (0.0-1.0)
    #[arg(long)]
    pub gamma: Option<f32>,

    /// Initial exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f32>,

    /// Exploration rate reached at the end of the decay
    #[arg(long)]
    pub epsilon_floor: Option<f32>,

    /// Episodes over which ε decays (defaults to 80% of the episodes)
    #[arg(long)]
    pub decay_episodes: Option<usize>,

    /// Save the table every N episodes
    #[arg(long)]
    pub save_every: Option<usize>,

    /// End episodes once the enemy is this far away
    #[arg(long)]
    pub escape_distance: Option<u32>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Q-table CSV, resumed from when present and written during training
    #[arg(long, short = 't', default_value = "q_table.csv")]
    pub table: PathBuf,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL episode summaries
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Log progress every N episodes
    #[arg(long, default_value_t = 100)]
    pub log_every: usize,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Parameters from `--config`, with command-line overrides applied
    pub fn params(&self) -> Result<TrainingParams> {
        let mut params = load_params(self.config.as_deref())?;

        if let Some(episodes) = self.episodes {
            params = params.with_episodes(episodes);
        }
        if self.episodes.is_some()
            || self.epsilon.is_some()
            || self.epsilon_floor.is_some()
            || self.decay_episodes.is_some()
        {
            let schedule = &params.epsilon_schedule;
            let initial = self.epsilon.unwrap_or_else(|| schedule.initial());
            let floor = self.epsilon_floor.unwrap_or_else(|| schedule.floor()).min(initial);
            let decay = self
                .decay_episodes
                .unwrap_or(params.episodes * 4 / 5)
                .max(1)
                .min(params.episodes);
            params = params.with_schedule(EpsilonSchedule::Linear {
                initial,
                floor,
                decay_episodes: decay,
            });
        }
        if let Some(max_steps) = self.max_steps {
            params = params.with_max_steps(max_steps);
        }
        if let Some(alpha) = self.alpha {
            params = params.with_alpha(alpha);
        }
        if let Some(gamma) = self.gamma {
            params = params.with_gamma(gamma);
        }
        if let Some(save_every) = self.save_every {
            params = params.with_save_interval(save_every);
        }
        if let Some(distance) = self.escape_distance {
            params = params.with_escape_distance(distance);
        }
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        params = params.with_snapshot_path(&self.table);

        params.validate().context("invalid training parameters")?;
        Ok(params)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let world = args.world.build()?;
    let params = args.params()?;

    print_section("Training");
    print_kv("World", &args.world.describe());
    print_kv("Episodes", &params.episodes.to_string());
    print_kv("Max steps", &params.max_steps.to_string());
    print_kv(
        "Alpha / gamma",
        &format!("{} / {}", params.alpha, params.gamma),
    );
    print_kv(
        "Epsilon",
        &format!(
            "{} -> {}",
            params.epsilon_schedule.initial(),
            params.epsilon_schedule.floor()
        ),
    );
    print_kv("Table", &args.table.display().to_string());

    let mut trainer = TrainingLoop::initialize(params.clone(), world, BfsPathfinder)
        .context("failed to initialize training")?;

    let mut pipeline =
        TrainingPipeline::new().with_observer(Box::new(LoggingObserver::new(args.log_every)));
    if !args.no_progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        pipeline = pipeline.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let result = pipeline.run(&mut trainer).context("training failed")?;

    print_section("Training Results");
    print_result(&result);
    print_kv("Final epsilon", &format!("{:.3}", result.final_epsilon));
    print_kv(
        "States visited",
        &format!("{} entries", trainer.table().visited_count()),
    );

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let summary = TrainingSummaryFile {
            training: &result,
            params: &params,
            world: args.world.describe(),
            table: Some(args.table.as_path()),
        };
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create summary {}", path.display()))?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
