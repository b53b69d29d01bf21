//! Training pipeline driving a [`TrainingLoop`] for whole episodes

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::training_loop::{EpisodeEvent, EpisodeSummary, Termination, TrainingLoop};
use crate::{
    Error, Result,
    ports::{Observer, Pathfinder, World},
};

/// Result of a training or evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes completed
    pub total_episodes: usize,

    /// Steps taken across all episodes
    pub total_steps: usize,

    /// Episodes ending with the enemy on the agent
    pub captures: usize,

    /// Episodes ending at the step cap
    pub step_limits: usize,

    /// Episodes ending by escape distance
    pub escapes: usize,

    /// Share of episodes ending in capture
    pub capture_rate: f64,

    /// Arithmetic mean of episode returns
    pub mean_return: f64,

    /// Exponentially weighted average return reported by the loop
    pub average_return: f32,

    /// Exploration rate after the last episode
    pub final_epsilon: f32,

    /// Return of every episode, in order
    pub returns: Vec<f32>,
}

impl TrainingResult {
    /// Aggregate finished episodes
    pub fn from_summaries(
        summaries: &[EpisodeSummary],
        average_return: f32,
        final_epsilon: f32,
    ) -> Self {
        let count = |kind: Termination| {
            summaries
                .iter()
                .filter(|summary| summary.termination == kind)
                .count()
        };
        let total_episodes = summaries.len();
        let captures = count(Termination::Capture);
        let returns: Vec<f32> = summaries.iter().map(|s| s.episode_return).collect();
        let (capture_rate, mean_return) = if total_episodes > 0 {
            (
                captures as f64 / total_episodes as f64,
                returns.iter().map(|&r| r as f64).sum::<f64>() / total_episodes as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_episodes,
            total_steps: summaries.iter().map(|s| s.steps).sum(),
            captures,
            step_limits: count(Termination::StepLimit),
            escapes: count(Termination::Escaped),
            capture_rate,
            mean_return,
            average_return,
            final_epsilon,
            returns,
        }
    }

    /// Mean return over the episodes in `range`
    pub fn mean_return_over(&self, range: std::ops::Range<usize>) -> Option<f64> {
        let slice = self.returns.get(range)?;
        if slice.is_empty() {
            return None;
        }
        Some(slice.iter().map(|&r| r as f64).sum::<f64>() / slice.len() as f64)
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create summary {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open summary {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Runs episodes on a training loop and forwards its events to observers
#[derive(Default)]
pub struct TrainingPipeline {
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Train for `params.episodes` episodes, then write a final snapshot.
    pub fn run<W: World, P: Pathfinder>(
        &mut self,
        trainer: &mut TrainingLoop<W, P>,
    ) -> Result<TrainingResult> {
        let episodes = trainer.params().episodes;
        info!("training for {episodes} episodes");
        let result = self.run_episodes(trainer, episodes, true)?;

        if let Some(path) = trainer.save_table()? {
            for observer in &mut self.observers {
                observer.on_checkpoint(trainer.current_episode(), &path)?;
            }
        }
        Ok(result)
    }

    /// Play `episodes` greedy episodes without touching the table.
    pub fn evaluate<W: World, P: Pathfinder>(
        &mut self,
        trainer: &mut TrainingLoop<W, P>,
        episodes: usize,
    ) -> Result<TrainingResult> {
        info!("evaluating greedy policy over {episodes} episodes");
        self.run_episodes(trainer, episodes, false)
    }

    fn run_episodes<W: World, P: Pathfinder>(
        &mut self,
        trainer: &mut TrainingLoop<W, P>,
        episodes: usize,
        train: bool,
    ) -> Result<TrainingResult> {
        // Notify observers of training start
        for observer in &mut self.observers {
            observer.on_training_start(episodes)?;
        }

        let mut summaries = Vec::with_capacity(episodes);
        self.dispatch(trainer.drain_events(), &mut summaries, episodes)?;
        while summaries.len() < episodes {
            trainer.step(train)?;
            self.dispatch(trainer.drain_events(), &mut summaries, episodes)?;
        }

        // Notify observers of training end
        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result =
            TrainingResult::from_summaries(&summaries, trainer.average_return(), trainer.epsilon());
        info!(
            "{} episodes, {} captures ({:.1}%), mean return {:.2}",
            result.total_episodes,
            result.captures,
            result.capture_rate * 100.0,
            result.mean_return
        );
        Ok(result)
    }

    fn dispatch(
        &mut self,
        events: Vec<EpisodeEvent>,
        summaries: &mut Vec<EpisodeSummary>,
        episodes: usize,
    ) -> Result<()> {
        for event in events {
            match event {
                // The loop sets up the next episode right after the last one
                // ends; that episode is not part of this run.
                EpisodeEvent::Started { .. } if summaries.len() >= episodes => {}
                EpisodeEvent::Started {
                    episode,
                    agent,
                    enemy,
                } => {
                    for observer in &mut self.observers {
                        observer.on_episode_start(episode, agent, enemy)?;
                    }
                }
                EpisodeEvent::Finished(summary) => {
                    for observer in &mut self.observers {
                        observer.on_episode_end(&summary)?;
                    }
                    summaries.push(summary);
                }
                EpisodeEvent::Checkpoint { episode, path } => {
                    for observer in &mut self.observers {
                        observer.on_checkpoint(episode, &path)?;
                    }
                }
            }
        }
        Ok(())
    }
}
