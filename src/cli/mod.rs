//! CLI infrastructure for the evader toolkit
//!
//! This module provides the command-line interface for training, evaluating,
//! and inspecting Q-tables.

pub mod commands;
pub mod config;
pub mod output;
