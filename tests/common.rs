//! Common test utilities for the evader test suite.
//!
//! Each integration test pulls this in with `mod common;`.

#![allow(dead_code)]

use std::path::Path;

use evader::{
    adapters::{BfsPathfinder, CsvTableRepository, GridMap},
    pipeline::{TrainingLoop, TrainingParams},
    ports::TableRepository,
    q_learning::QTable,
};

/// Fully walkable square grid.
pub fn open_world(size: i32) -> GridMap {
    GridMap::open(size, size).unwrap()
}

/// Short seeded session parameters.
pub fn quick_params(episodes: usize, seed: u64) -> TrainingParams {
    TrainingParams::default()
        .with_episodes(episodes)
        .with_linear_decay(1.0, 0.05, episodes * 4 / 5)
        .with_max_steps(50)
        .with_seed(seed)
}

/// Training loop with the breadth-first pursuer.
pub fn session(params: TrainingParams, world: GridMap) -> TrainingLoop<GridMap, BfsPathfinder> {
    TrainingLoop::initialize(params, world, BfsPathfinder).unwrap()
}

/// Load a snapshot written by the CSV repository.
pub fn load_snapshot(path: &Path) -> QTable {
    CsvTableRepository.load(path, 4, 144).unwrap().0
}

/// Entries that differ from the zero a fresh table starts with.
pub fn non_default_entries(table: &QTable) -> usize {
    table.iter().filter(|&(_, _, value)| value != 0.0).count()
}
