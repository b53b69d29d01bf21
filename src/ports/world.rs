//! World port - the grid the agent and enemy move on.

use rand::rngs::StdRng;

use crate::types::{Cell, Metric};

/// Grid world consumed by the learning core.
///
/// Implementations own the cells; the core only queries them. Coordinates
/// outside `[0, width) x [0, height)` have no cell.
///
/// # Examples
///
/// ```
/// use evader::{adapters::GridMap, ports::World, types::Metric};
///
/// let world = GridMap::open(5, 5)?;
/// let a = world.cell_at(0, 0).unwrap();
/// let b = world.cell_at(4, 4).unwrap();
/// assert_eq!(world.distance(&a, &b, Metric::Manhattan), 8.0);
/// # Ok::<(), evader::Error>(())
/// ```
pub trait World {
    /// World dimensions as `(width, height)`.
    fn size(&self) -> (i32, i32);

    /// Cell at `(x, y)`, or `None` when the coordinate is out of bounds.
    fn cell_at(&self, x: i32, y: i32) -> Option<Cell>;

    /// Uniformly sampled walkable cell.
    fn random_cell(&self, rng: &mut StdRng) -> Cell;

    /// Distance between two cells under `metric`.
    fn distance(&self, a: &Cell, b: &Cell, metric: Metric) -> f32 {
        metric.between(a, b)
    }

    /// Whether `(x, y)` is in bounds and walkable.
    fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell_at(x, y).is_some_and(|cell| cell.walkable)
    }
}
