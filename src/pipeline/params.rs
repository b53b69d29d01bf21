//! Training configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::EpsilonSchedule, reward::RewardConfig};

/// Parameters for one training session.
///
/// `epsilon` is the live exploration rate. The training loop lowers it at
/// each episode boundary according to `epsilon_schedule`; every other field is
/// fixed for the session.
///
/// # Examples
///
/// ```
/// use evader::pipeline::TrainingParams;
///
/// let params = TrainingParams::default()
///     .with_episodes(500)
///     .with_linear_decay(1.0, 0.05, 400)
///     .with_seed(42);
/// params.validate()?;
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Learning rate α
    pub alpha: f32,
    /// Discount factor γ
    pub gamma: f32,
    /// Current exploration rate ε
    pub epsilon: f32,
    /// How ε decays over episodes
    pub epsilon_schedule: EpsilonSchedule,
    /// Step cap per episode
    pub max_steps: usize,
    /// Total training episodes
    pub episodes: usize,
    /// Persist the table every this many episodes
    pub episodes_between_saves: usize,
    /// End an episode early once the enemy is this far away (Manhattan)
    pub escape_distance: Option<u32>,
    /// Random seed
    pub seed: Option<u64>,
    /// Where table snapshots are read from and written to
    pub snapshot_path: Option<PathBuf>,
    /// Reward constants
    pub reward: RewardConfig,
}

impl Default for TrainingParams {
    fn default() -> Self {
        let epsilon_schedule = EpsilonSchedule::default();
        Self {
            alpha: 0.3,
            gamma: 0.9,
            epsilon: epsilon_schedule.initial(),
            epsilon_schedule,
            max_steps: 200,
            episodes: 1000,
            episodes_between_saves: 100,
            escape_distance: None,
            seed: None,
            snapshot_path: None,
            reward: RewardConfig::default(),
        }
    }
}

impl TrainingParams {
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Fixed exploration rate for the whole session.
    pub fn with_constant_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self.epsilon_schedule = EpsilonSchedule::Constant { value: epsilon };
        self
    }

    /// Linear decay from `initial` to `floor` over `decay_episodes`.
    pub fn with_linear_decay(mut self, initial: f32, floor: f32, decay_episodes: usize) -> Self {
        self.epsilon = initial;
        self.epsilon_schedule = EpsilonSchedule::Linear {
            initial,
            floor,
            decay_episodes,
        };
        self
    }

    pub fn with_schedule(mut self, schedule: EpsilonSchedule) -> Self {
        self.epsilon = schedule.initial();
        self.epsilon_schedule = schedule;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_save_interval(mut self, episodes_between_saves: usize) -> Self {
        self.episodes_between_saves = episodes_between_saves;
        self
    }

    pub fn with_escape_distance(mut self, distance: u32) -> Self {
        self.escape_distance = Some(distance);
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    /// Check every field is in its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!("alpha {} must be in (0, 1]", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::config(format!("gamma {} must be in [0, 1]", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::config(format!(
                "epsilon {} must be in [0, 1]",
                self.epsilon
            )));
        }
        if self.max_steps == 0 {
            return Err(Error::config("max_steps must be at least 1"));
        }
        if self.episodes_between_saves == 0 {
            return Err(Error::config("episodes_between_saves must be at least 1"));
        }
        if self.escape_distance == Some(0) {
            return Err(Error::config("escape_distance must be at least 1"));
        }
        self.epsilon_schedule.validate(self.episodes)?;
        self.reward.validate()
    }

    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Save parameters to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create config {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
