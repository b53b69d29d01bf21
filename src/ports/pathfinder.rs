//! Pathfinder port - moves the pursuing enemy.

use crate::{ports::World, types::Cell};

/// Shortest-path provider for the pursuer.
///
/// The learning core treats the pursuer as a black box: each tick it asks for
/// the next cell on a path from the enemy toward the agent.
pub trait Pathfinder {
    /// Next cell on a path from `from` toward `toward`.
    ///
    /// Returns `from` unchanged when no improving step exists (unreachable
    /// target, or already there).
    fn next_step_toward(&self, world: &dyn World, from: Cell, toward: Cell) -> Cell;
}
