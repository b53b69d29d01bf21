//! Training and evaluation pipeline
//!
//! This module provides:
//! - [`TrainingLoop`]: the per-step episode state machine
//! - [`TrainingPipeline`]: runs whole sessions and feeds observers
//! - [`GreedyAgent`]: plays a trained table without learning
//! - Observers for progress bars, metrics, logs and JSONL export

pub mod evaluation;
pub mod observers;
pub mod params;
pub mod training;
pub mod training_loop;

pub use evaluation::GreedyAgent;
pub use observers::{
    JsonlObserver, LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver,
};
pub use params::TrainingParams;
pub use training::{TrainingPipeline, TrainingResult};
pub use training_loop::{
    EpisodeEvent, EpisodeSummary, Phase, StepReport, Termination, TrainingLoop,
};

pub use crate::ports::Observer;
