//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod bfs_pathfinder;
pub mod csv_repository;
pub mod grid_map;
pub mod in_memory_repository;

pub use bfs_pathfinder::BfsPathfinder;
pub use csv_repository::CsvTableRepository;
pub use grid_map::GridMap;
pub use in_memory_repository::InMemoryRepository;
