//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing episode boundaries,
//! allowing composable data collection without coupling the training loop
//! to specific output formats or metrics.

use std::path::Path;

use crate::{Result, pipeline::EpisodeSummary, types::Cell};

/// Observer trait for monitoring training
///
/// Observers are handed to a [`crate::pipeline::TrainingPipeline`], which
/// drains the training loop's event queue after every step and calls the
/// matching method here.
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - once
/// 2. For each episode:
///    - `on_episode_start(episode, agent, enemy)`
///    - `on_episode_end(summary)`
///    - `on_checkpoint(episode, path)` - when a snapshot was written
/// 3. `on_training_end()` - once
///
/// # Examples
///
/// ```no_run
/// use evader::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct CaptureCounter {
///     captures: usize,
/// }
///
/// impl Observer for CaptureCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> evader::Result<()> {
///         if summary.termination.is_capture() {
///             self.captures += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer {
    /// Called once before the first step.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode has been placed and is ready to step.
    fn on_episode_start(&mut self, _episode: usize, _agent: Cell, _enemy: Cell) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches a terminal condition.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called after the table was persisted at an episode boundary.
    fn on_checkpoint(&mut self, _episode: usize, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
