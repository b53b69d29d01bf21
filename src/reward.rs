//! Reward shaping for the evading agent.
//!
//! The scheme is capture penalty plus distance-delta shaping:
//!
//! | Transition | Reward |
//! |---|---|
//! | onto the enemy's cell | `capture` |
//! | into a wall or off the grid | `blocked` |
//! | farther from the enemy | `away` (+ `away_safe_bonus` at ≥ `safe_distance`) |
//! | closer to the enemy | `toward` (+ `toward_danger_penalty` at ≤ `danger_distance`) |
//! | same distance | `idle` |

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::Cell};

/// Tunable reward constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub capture: f32,
    pub blocked: f32,
    pub safe_distance: u32,
    pub danger_distance: u32,
    pub away: f32,
    pub away_safe_bonus: f32,
    pub toward: f32,
    pub toward_danger_penalty: f32,
    pub idle: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            capture: -100.0,
            blocked: -10.0,
            safe_distance: 6,
            danger_distance: 2,
            away: 1.0,
            away_safe_bonus: 2.0,
            toward: -1.0,
            toward_danger_penalty: -3.0,
            idle: -0.1,
        }
    }
}

impl RewardConfig {
    /// Every reward a non-capture transition can produce.
    pub fn non_capture_outcomes(&self) -> [f32; 6] {
        [
            self.blocked,
            self.away,
            self.away + self.away_safe_bonus,
            self.toward,
            self.toward + self.toward_danger_penalty,
            self.idle,
        ]
    }

    /// Check the capture penalty is the strict minimum and thresholds are ordered.
    pub fn validate(&self) -> Result<()> {
        let values = self.non_capture_outcomes();
        if let Some(bad) = values.iter().chain([&self.capture]).find(|v| !v.is_finite()) {
            return Err(Error::config(format!("reward {bad} is not finite")));
        }
        let lowest = values.iter().copied().fold(f32::INFINITY, f32::min);
        if self.capture >= lowest {
            return Err(Error::config(format!(
                "capture reward {} must be below every other reward (lowest is {lowest})",
                self.capture
            )));
        }
        if self.danger_distance >= self.safe_distance {
            return Err(Error::config(format!(
                "danger distance {} must be below safe distance {}",
                self.danger_distance, self.safe_distance
            )));
        }
        Ok(())
    }
}

/// Pure reward function over a proposed transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewardFunction {
    config: RewardConfig,
}

impl RewardFunction {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Score moving from `current` to `candidate` while the enemy sits on `enemy`.
    ///
    /// `candidate` is the attempted cell; a non-walkable candidate means the
    /// move was refused.
    pub fn reward(&self, current: &Cell, candidate: &Cell, enemy: &Cell) -> f32 {
        let cfg = &self.config;
        if candidate == enemy {
            return cfg.capture;
        }
        if !candidate.walkable {
            return cfg.blocked;
        }

        let before = current.manhattan(enemy);
        let after = candidate.manhattan(enemy);
        if after > before {
            if after >= cfg.safe_distance {
                cfg.away + cfg.away_safe_bonus
            } else {
                cfg.away
            }
        } else if after < before {
            if after <= cfg.danger_distance {
                cfg.toward + cfg.toward_danger_penalty
            } else {
                cfg.toward
            }
        } else {
            cfg.idle
        }
    }
}
