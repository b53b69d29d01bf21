//! Evader: tabular Q-learning for pursuit-evasion on grids
//!
//! This crate provides:
//! - A 144-state encoding of the agent's surroundings and the enemy's direction
//! - A dense Q-table with the Q-learning update and a CSV snapshot format
//! - Movement and reward rules for an evader on a 4-connected grid
//! - A step-driven training loop with episode events and periodic persistence
//! - Grid maps, a breadth-first pursuer, and a command-line front end

pub mod adapters;
pub mod cli;
pub mod error;
pub mod movement;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod reward;
pub mod types;

pub use error::{Error, Result};
