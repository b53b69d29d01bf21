//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::{Deserialize, Serialize};

use super::training_loop::EpisodeSummary;
use crate::{Error, Result, ports::Observer};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    captures: usize,
    average_return: f32,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            captures: 0,
            average_return: 0.0,
        }
    }

    fn message(&self) -> String {
        format!("{} avg {:.2}", self.captures, self.average_return)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (captures:{msg})",
                )
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.termination.is_capture() {
            self.captures += 1;
        }
        self.average_return = summary.average_return;

        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Default)]
pub struct MetricsObserver {
    captures: usize,
    total_episodes: usize,
    returns: Vec<f32>,
    lengths: Vec<usize>,
    checkpoints: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current capture rate
    pub fn capture_rate(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.captures as f64 / self.total_episodes as f64
        }
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.lengths.is_empty() {
            0.0
        } else {
            self.lengths.iter().sum::<usize>() as f64 / self.lengths.len() as f64
        }
    }

    /// Mean return of the last `window` episodes
    pub fn recent_return(&self, window: usize) -> f64 {
        let start = self.returns.len().saturating_sub(window);
        let recent = &self.returns[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(|&r| r as f64).sum::<f64>() / recent.len() as f64
        }
    }

    /// Every episode return seen so far
    pub fn returns(&self) -> &[f32] {
        &self.returns
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            captures: self.captures,
            capture_rate: self.capture_rate(),
            avg_episode_length: self.avg_episode_length(),
            best_return: self.returns.iter().copied().reduce(f32::max),
            worst_return: self.returns.iter().copied().reduce(f32::min),
            checkpoints: self.checkpoints,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub captures: usize,
    pub capture_rate: f64,
    pub avg_episode_length: f64,
    pub best_return: Option<f32>,
    pub worst_return: Option<f32>,
    pub checkpoints: usize,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.total_episodes += 1;
        if summary.termination.is_capture() {
            self.captures += 1;
        }
        self.returns.push(summary.episode_return);
        self.lengths.push(summary.steps);
        Ok(())
    }

    fn on_checkpoint(&mut self, _episode: usize, _path: &Path) -> Result<()> {
        self.checkpoints += 1;
        Ok(())
    }
}

/// JSONL observer - Exports one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create episode log {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Logging observer - Reports progress through `log` every `interval` episodes
pub struct LoggingObserver {
    interval: usize,
    captures: usize,
}

impl LoggingObserver {
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            captures: 0,
        }
    }
}

impl Observer for LoggingObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.termination.is_capture() {
            self.captures += 1;
        }
        let completed = summary.episode + 1;
        if completed % self.interval == 0 {
            info!(
                "episode {completed}: avg return {:.2}, epsilon {:.3}, {} captures so far",
                summary.average_return, summary.epsilon, self.captures
            );
        }
        Ok(())
    }

    fn on_checkpoint(&mut self, episode: usize, path: &Path) -> Result<()> {
        info!("checkpoint after episode {episode}: {}", path.display());
        Ok(())
    }
}
