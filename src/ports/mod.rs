//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning core and its
//! collaborators. Following hexagonal architecture, these traits are owned by
//! the domain and implemented by adapters in the infrastructure layer.

pub mod observer;
pub mod pathfinder;
pub mod repository;
pub mod world;

pub use observer::Observer;
pub use pathfinder::Pathfinder;
pub use repository::TableRepository;
pub use world::World;
