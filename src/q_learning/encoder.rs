//! State discretization.
//!
//! A state combines the sign of the enemy's offset from the agent (9 values)
//! with a 4-bit mask of which cardinal neighbors of the agent can be entered
//! (16 values). The table size therefore does not depend on the world size.

use std::fmt;

use crate::{
    Error, Result,
    ports::World,
    types::{Action, Cell},
};

/// Maps `(agent, enemy, world)` to a state index in `[0, 144)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEncoder;

impl StateEncoder {
    pub const RELATIVE_POSITIONS: usize = 9;
    pub const ACCESS_MASKS: usize = 16;
    pub const NUM_STATES: usize = Self::RELATIVE_POSITIONS * Self::ACCESS_MASKS;

    pub fn new() -> Self {
        Self
    }

    pub fn num_states(&self) -> usize {
        Self::NUM_STATES
    }

    /// Encode the current situation.
    pub fn encode(&self, agent: &Cell, enemy: &Cell, world: &dyn World) -> usize {
        Self::relative_index(agent, enemy) * Self::ACCESS_MASKS
            + Self::accessibility_mask(agent, world) as usize
    }

    /// Enemy offset sign, `(dx + 1) * 3 + (dy + 1)` with each axis clamped to
    /// `-1..=1`.
    pub fn relative_index(agent: &Cell, enemy: &Cell) -> usize {
        let dx = (enemy.x - agent.x).clamp(-1, 1) + 1;
        let dy = (enemy.y - agent.y).clamp(-1, 1) + 1;
        (dx * 3 + dy) as usize
    }

    /// Bit `i` is set iff moving in `Action::ALL[i]` lands on a walkable cell.
    pub fn accessibility_mask(agent: &Cell, world: &dyn World) -> u8 {
        Action::ALL
            .iter()
            .enumerate()
            .filter(|(_, action)| {
                let (dx, dy) = action.offset();
                let (x, y) = agent.offset(dx, dy);
                world.is_walkable(x, y)
            })
            .fold(0u8, |mask, (bit, _)| mask | (1 << bit))
    }

    /// Split a state index back into its features.
    pub fn decode(&self, state: usize) -> Result<StateFeatures> {
        if state >= Self::NUM_STATES {
            return Err(Error::StateOutOfRange {
                state,
                num_states: Self::NUM_STATES,
            });
        }
        let relative = state / Self::ACCESS_MASKS;
        let mask = (state % Self::ACCESS_MASKS) as u8;
        Ok(StateFeatures {
            enemy_dx: (relative / 3) as i32 - 1,
            enemy_dy: (relative % 3) as i32 - 1,
            accessible: std::array::from_fn(|bit| mask & (1 << bit) != 0),
        })
    }
}

/// Decoded view of a state index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFeatures {
    /// Sign of the enemy's x offset
    pub enemy_dx: i32,
    /// Sign of the enemy's y offset
    pub enemy_dy: i32,
    /// Walkability of the neighbors, indexed like [`Action::ALL`]
    pub accessible: [bool; 4],
}

impl fmt::Display for StateFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open: String = Action::ALL
            .iter()
            .zip(self.accessible)
            .map(|(action, open)| {
                let c = action.name().chars().next().unwrap_or('?');
                if open { c.to_ascii_uppercase() } else { '-' }
            })
            .collect();
        write!(
            f,
            "enemy ({:+}, {:+}) open [{open}]",
            self.enemy_dx, self.enemy_dy
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::adapters::GridMap;

    #[test]
    fn test_state_space_size() {
        assert_eq!(StateEncoder::NUM_STATES, 144);
    }

    #[test]
    fn test_corner_cell_mask() {
        let world = GridMap::open(5, 5).unwrap();
        let corner = Cell::open(0, 0);
        // North and East only.
        assert_eq!(StateEncoder::accessibility_mask(&corner, &world), 0b0011);
        let center = Cell::open(2, 2);
        assert_eq!(StateEncoder::accessibility_mask(&center, &world), 0b1111);
    }

    #[test]
    fn test_walls_clear_mask_bits() {
        let world = GridMap::parse(
            "...\n\
             #..\n\
             .#.",
        )
        .unwrap();
        // Bottom row is y = 0; (0, 1) is the wall on the middle row.
        let agent = Cell::open(1, 1);
        // North open, East open, South wall, West wall.
        assert_eq!(StateEncoder::accessibility_mask(&agent, &world), 0b0011);
    }

    #[test]
    fn test_relative_position_only_keeps_sign() {
        let agent = Cell::open(10, 10);
        let near = StateEncoder::relative_index(&agent, &Cell::open(11, 9));
        let far = StateEncoder::relative_index(&agent, &Cell::open(40, -3));
        assert_eq!(near, far);
        assert_eq!(StateEncoder::relative_index(&agent, &agent), 4);
        assert_eq!(StateEncoder::relative_index(&agent, &Cell::open(0, 0)), 0);
        assert_eq!(StateEncoder::relative_index(&agent, &Cell::open(20, 20)), 8);
    }

    #[test]
    fn test_encode_is_deterministic_and_bounded() {
        let world = GridMap::parse(
            "..#...\n\
             .#..#.\n\
             ......\n\
             #..#..",
        )
        .unwrap();
        let encoder = StateEncoder::new();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let agent = world.random_cell(&mut rng);
            let enemy = Cell::open(rng.random_range(-3..9), rng.random_range(-3..7));
            let state = encoder.encode(&agent, &enemy, &world);
            assert!(state < StateEncoder::NUM_STATES);
            assert_eq!(state, encoder.encode(&agent, &enemy, &world));
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        let world = GridMap::open(5, 5).unwrap();
        let encoder = StateEncoder::new();
        let agent = Cell::open(0, 2);
        let enemy = Cell::open(3, 0);
        let state = encoder.encode(&agent, &enemy, &world);
        let features = encoder.decode(state).unwrap();
        assert_eq!(features.enemy_dx, 1);
        assert_eq!(features.enemy_dy, -1);
        assert_eq!(features.accessible, [true, true, true, false]);
        assert_eq!(features.to_string(), "enemy (+1, -1) open [NES-]");
        assert!(encoder.decode(144).is_err());
    }
}
