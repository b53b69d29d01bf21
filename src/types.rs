//! Core grid types: cells, actions, and distance metrics.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A grid cell.
///
/// Cells are owned by the world and are compared by coordinates only; the
/// walkability flag travels with the cell so that consumers can inspect it
/// without another world lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
}

impl Cell {
    pub fn new(x: i32, y: i32, walkable: bool) -> Self {
        Self { x, y, walkable }
    }

    /// Walkable cell at `(x, y)`.
    pub fn open(x: i32, y: i32) -> Self {
        Self::new(x, y, true)
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Coordinates shifted by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> (i32, i32) {
        (self.x + dx, self.y + dy)
    }

    pub fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal moves available to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    North,
    East,
    South,
    West,
}

impl Action {
    pub const COUNT: usize = 4;

    /// All actions in index order.
    pub const ALL: [Action; Self::COUNT] = [Action::North, Action::East, Action::South, Action::West];

    pub fn index(self) -> usize {
        match self {
            Action::North => 0,
            Action::East => 1,
            Action::South => 2,
            Action::West => 3,
        }
    }

    /// Unit offset for this action. North is `+y`.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Action::North => (0, 1),
            Action::East => (1, 0),
            Action::South => (0, -1),
            Action::West => (-1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::North => "north",
            Action::East => "east",
            Action::South => "south",
            Action::West => "west",
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Action::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidAction { index })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Distance metric used by [`crate::ports::World::distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Manhattan,
    Chebyshev,
    Euclidean,
}

impl Metric {
    pub fn between(self, a: &Cell, b: &Cell) -> f32 {
        let dx = a.x.abs_diff(b.x) as f32;
        let dy = a.y.abs_diff(b.y) as f32;
        match self {
            Metric::Manhattan => dx + dy,
            Metric::Chebyshev => dx.max(dy),
            Metric::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}
