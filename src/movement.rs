//! Agent movement: turning a discrete action into a grid cell.

use crate::{
    ports::World,
    types::{Action, Cell},
};

/// Result of attempting an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Cell the action points at. Marked non-walkable when out of bounds.
    pub target: Cell,
    /// Cell the agent ends up in: `target` if enterable, otherwise the start cell.
    pub resolved: Cell,
}

impl Move {
    /// Whether the action was refused (wall or border).
    pub fn is_blocked(&self) -> bool {
        !self.target.walkable
    }
}

/// Stateless action-to-cell resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementResolver;

impl MovementResolver {
    pub fn new() -> Self {
        Self
    }

    /// Apply `action` from `current`, keeping both the attempted and the
    /// resulting cell.
    pub fn attempt(&self, action: Action, current: Cell, world: &dyn World) -> Move {
        let (dx, dy) = action.offset();
        let (x, y) = current.offset(dx, dy);
        let target = world
            .cell_at(x, y)
            .unwrap_or_else(|| Cell::new(x, y, false));
        let resolved = if target.walkable { target } else { current };
        Move { target, resolved }
    }

    /// Cell reached by `action`, or `current` when the move is not possible.
    pub fn resolve(&self, action: Action, current: Cell, world: &dyn World) -> Cell {
        self.attempt(action, current, world).resolved
    }
}
