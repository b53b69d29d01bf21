//! Epsilon-greedy action selection and its decay schedule.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::QTable};

/// ε-greedy selector over a [`QTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Pick an action for `state`.
    ///
    /// With `exploring` set, a uniform draw below ε yields a random action;
    /// otherwise (and always when not exploring) the greedy action is used.
    pub fn select_action<R: Rng + ?Sized>(
        &self,
        table: &QTable,
        state: usize,
        exploring: bool,
        rng: &mut R,
    ) -> Result<usize> {
        let draw: f32 = rng.random();
        if exploring && draw < self.epsilon {
            // Explore: random action
            Ok(rng.random_range(0..table.num_actions()))
        } else {
            // Exploit: greedy action based on Q-values
            table.best_action(state, rng)
        }
    }
}

/// Exploration rate as a function of the episode index.
///
/// Every variant is deterministic and non-increasing in the episode index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// Fixed rate
    Constant { value: f32 },
    /// Straight line from `initial` at episode 0 to `floor` at `decay_episodes`
    Linear {
        initial: f32,
        floor: f32,
        decay_episodes: usize,
    },
    /// Linear interpolation between `(episode, epsilon)` points
    Piecewise { points: Vec<(usize, f32)> },
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        EpsilonSchedule::Linear {
            initial: 1.0,
            floor: 0.05,
            decay_episodes: 800,
        }
    }
}

impl EpsilonSchedule {
    /// ε for the given episode index.
    pub fn value(&self, episode: usize) -> f32 {
        match self {
            EpsilonSchedule::Constant { value } => *value,
            EpsilonSchedule::Linear {
                initial,
                floor,
                decay_episodes,
            } => {
                if *decay_episodes == 0 || episode >= *decay_episodes {
                    return *floor;
                }
                let progress = episode as f32 / *decay_episodes as f32;
                initial - (initial - floor) * progress
            }
            EpsilonSchedule::Piecewise { points } => piecewise_value(points, episode),
        }
    }

    /// Rate at episode 0.
    pub fn initial(&self) -> f32 {
        self.value(0)
    }

    /// Lowest rate the schedule reaches.
    pub fn floor(&self) -> f32 {
        match self {
            EpsilonSchedule::Constant { value } => *value,
            EpsilonSchedule::Linear { floor, .. } => *floor,
            EpsilonSchedule::Piecewise { points } => points.last().map_or(0.0, |(_, eps)| *eps),
        }
    }

    /// First episode at which the floor is reached.
    pub fn floor_episode(&self) -> usize {
        match self {
            EpsilonSchedule::Constant { .. } => 0,
            EpsilonSchedule::Linear { decay_episodes, .. } => *decay_episodes,
            EpsilonSchedule::Piecewise { points } => points.last().map_or(0, |(ep, _)| *ep),
        }
    }

    /// Check the schedule is in `[0, 1]`, non-increasing, and reaches its
    /// floor within `episodes`.
    pub fn validate(&self, episodes: usize) -> Result<()> {
        let in_unit = |eps: f32| (0.0..=1.0).contains(&eps);
        match self {
            EpsilonSchedule::Constant { value } => {
                if !in_unit(*value) {
                    return Err(Error::config(format!("epsilon {value} must be in [0, 1]")));
                }
            }
            EpsilonSchedule::Linear { initial, floor, .. } => {
                if !in_unit(*initial) || !in_unit(*floor) {
                    return Err(Error::config(format!(
                        "epsilon schedule {initial} -> {floor} must stay in [0, 1]"
                    )));
                }
                if floor > initial {
                    return Err(Error::config(format!(
                        "epsilon floor {floor} is above the initial value {initial}"
                    )));
                }
            }
            EpsilonSchedule::Piecewise { points } => {
                if points.is_empty() {
                    return Err(Error::config("piecewise epsilon schedule has no points"));
                }
                for pair in points.windows(2) {
                    let ((ep_a, eps_a), (ep_b, eps_b)) = (pair[0], pair[1]);
                    if ep_b <= ep_a {
                        return Err(Error::config(format!(
                            "piecewise epsilon episodes must increase ({ep_a} then {ep_b})"
                        )));
                    }
                    if eps_b > eps_a {
                        return Err(Error::config(format!(
                            "piecewise epsilon must not increase ({eps_a} then {eps_b})"
                        )));
                    }
                }
                if let Some((_, eps)) = points.iter().find(|(_, eps)| !in_unit(*eps)) {
                    return Err(Error::config(format!("epsilon {eps} must be in [0, 1]")));
                }
            }
        }
        if self.floor_episode() > episodes {
            return Err(Error::config(format!(
                "epsilon reaches its floor at episode {} but training stops after {episodes}",
                self.floor_episode()
            )));
        }
        Ok(())
    }
}

fn piecewise_value(points: &[(usize, f32)], episode: usize) -> f32 {
    let Some(&(first_ep, first_eps)) = points.first() else {
        return 0.0;
    };
    if episode <= first_ep {
        return first_eps;
    }
    for pair in points.windows(2) {
        let ((ep_a, eps_a), (ep_b, eps_b)) = (pair[0], pair[1]);
        if episode <= ep_b {
            let progress = (episode - ep_a) as f32 / (ep_b - ep_a) as f32;
            return eps_a + (eps_b - eps_a) * progress;
        }
    }
    points.last().map_or(first_eps, |(_, eps)| *eps)
}
