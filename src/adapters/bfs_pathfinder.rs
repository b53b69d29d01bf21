//! Breadth-first pursuer.

use std::collections::{HashMap, VecDeque};

use crate::{
    ports::{Pathfinder, World},
    types::{Action, Cell},
};

/// Moves the pursuer one step along a shortest 4-connected path.
///
/// Neighbors are expanded in [`Action::ALL`] order, so ties between equally
/// short paths resolve the same way every time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPathfinder;

impl BfsPathfinder {
    pub fn new() -> Self {
        Self
    }
}

impl Pathfinder for BfsPathfinder {
    fn next_step_toward(&self, world: &dyn World, from: Cell, toward: Cell) -> Cell {
        if from == toward {
            return from;
        }

        let mut parents: HashMap<Cell, Cell> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parents.insert(from, from);

        while let Some(current) = queue.pop_front() {
            if current == toward {
                // Walk back to the cell right after `from`.
                let mut step = current;
                while let Some(&parent) = parents.get(&step) {
                    if parent == from {
                        return step;
                    }
                    step = parent;
                }
                return from;
            }
            for action in Action::ALL {
                let (dx, dy) = action.offset();
                let (x, y) = current.offset(dx, dy);
                let Some(next) = world.cell_at(x, y).filter(|cell| cell.walkable) else {
                    continue;
                };
                if !parents.contains_key(&next) {
                    parents.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::GridMap;

    #[test]
    fn test_step_reduces_path_length() {
        let world = GridMap::open(5, 5).unwrap();
        let from = Cell::open(0, 0);
        let toward = Cell::open(4, 4);
        let next = BfsPathfinder.next_step_toward(&world, from, toward);
        assert_eq!(next.manhattan(&from), 1);
        assert_eq!(next.manhattan(&toward), 7);
        assert!(next.walkable);
    }

    #[test]
    fn test_routes_around_walls() {
        // The direct route east is walled off; the path goes through the gap at the top.
        let world = GridMap::parse(
            "...\n\
             .#.\n\
             .#.",
        )
        .unwrap();
        let from = Cell::open(0, 0);
        let toward = Cell::open(2, 0);
        let mut position = from;
        let mut steps = 0;
        while position != toward {
            position = BfsPathfinder.next_step_toward(&world, position, toward);
            assert!(world.is_walkable(position.x, position.y));
            steps += 1;
            assert!(steps <= 6);
        }
        assert_eq!(steps, 6);
    }

    #[test]
    fn test_unreachable_target_keeps_position() {
        let world = GridMap::parse(".#.").unwrap();
        let from = Cell::open(0, 0);
        assert_eq!(BfsPathfinder.next_step_toward(&world, from, Cell::open(2, 0)), from);
    }

    #[test]
    fn test_already_there() {
        let world = GridMap::open(2, 2).unwrap();
        let cell = Cell::open(1, 1);
        assert_eq!(BfsPathfinder.next_step_toward(&world, cell, cell), cell);
    }
}
