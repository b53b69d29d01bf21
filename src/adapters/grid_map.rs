//! Rectangular grid world backed by a walkability bitmap.

use std::{fs, path::Path};

use rand::{Rng, rngs::StdRng};

use crate::{Result, error::Error, ports::World, types::Cell};

/// Grid world with walls.
///
/// Text maps use `.` for floor and `#` for walls. The first line of text is
/// the top row, so it has the largest `y`; `y` grows northward to match
/// [`crate::types::Action::North`].
///
/// # Examples
///
/// ```
/// use evader::{adapters::GridMap, ports::World};
///
/// let world = GridMap::parse("
///     ..#
///     ...
/// ")?;
/// assert_eq!(world.size(), (3, 2));
/// assert!(!world.is_walkable(2, 1));
/// assert!(world.is_walkable(2, 0));
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
    open_cells: Vec<Cell>,
}

impl GridMap {
    /// Build from a row-major bitmap indexed `y * width + x`.
    pub fn from_bitmap(width: i32, height: i32, walkable: Vec<bool>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::config(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        if walkable.len() != (width * height) as usize {
            return Err(Error::config(format!(
                "bitmap has {} cells, expected {}",
                walkable.len(),
                width * height
            )));
        }
        let open_cells: Vec<Cell> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| walkable[(y * width + x) as usize])
            .map(|(x, y)| Cell::open(x, y))
            .collect();
        if open_cells.is_empty() {
            return Err(Error::NoWalkableCells);
        }
        Ok(Self {
            width,
            height,
            walkable,
            open_cells,
        })
    }

    /// Grid with every cell walkable.
    pub fn open(width: i32, height: i32) -> Result<Self> {
        let len = (width.max(0) * height.max(0)) as usize;
        Self::from_bitmap(width, height, vec![true; len])
    }

    /// Open grid with walls at the given coordinates.
    pub fn with_walls(width: i32, height: i32, walls: &[(i32, i32)]) -> Result<Self> {
        let len = (width.max(0) * height.max(0)) as usize;
        let mut walkable = vec![true; len];
        for &(x, y) in walls {
            if !(0..width).contains(&x) || !(0..height).contains(&y) {
                return Err(Error::config(format!("wall ({x}, {y}) is outside the grid")));
            }
            walkable[(y * width + x) as usize] = false;
        }
        Self::from_bitmap(width, height, walkable)
    }

    /// Parse a text map. Blank lines and surrounding whitespace are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        let Some(&(_, first)) = rows.first() else {
            return Err(Error::InvalidMap {
                line: 0,
                message: "map is empty".to_string(),
            });
        };

        let width = first.chars().count();
        let height = rows.len();
        let mut walkable = vec![false; width * height];
        for (row, (line_no, line)) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(Error::InvalidMap {
                    line: *line_no,
                    message: format!("expected {width} columns, got {}", line.chars().count()),
                });
            }
            let y = height - 1 - row;
            for (x, c) in line.chars().enumerate() {
                walkable[y * width + x] = match c {
                    '.' => true,
                    '#' => false,
                    other => {
                        return Err(Error::InvalidMap {
                            line: *line_no,
                            message: format!("unexpected character '{other}' (use '.' or '#')"),
                        });
                    }
                };
            }
        }
        Self::from_bitmap(width as i32, height as i32, walkable)
    }

    /// Read and parse a text map file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read map {path:?}"),
            source,
        })?;
        Self::parse(&text)
    }

    /// All walkable cells in row-major order.
    pub fn open_cells(&self) -> &[Cell] {
        &self.open_cells
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }
}

impl World for GridMap {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        self.in_bounds(x, y)
            .then(|| Cell::new(x, y, self.walkable[(y * self.width + x) as usize]))
    }

    fn random_cell(&self, rng: &mut StdRng) -> Cell {
        // Non-empty by construction.
        self.open_cells[rng.random_range(0..self.open_cells.len())]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_parse_orients_first_line_north() {
        let world = GridMap::parse("#..\n...").unwrap();
        assert_eq!(world.size(), (3, 2));
        assert_eq!(world.cell_at(0, 1).map(|c| c.walkable), Some(false));
        assert_eq!(world.cell_at(0, 0).map(|c| c.walkable), Some(true));
        assert_eq!(world.open_cells().len(), 5);
    }

    #[test]
    fn test_out_of_bounds_has_no_cell() {
        let world = GridMap::open(4, 3).unwrap();
        assert!(world.cell_at(-1, 0).is_none());
        assert!(world.cell_at(4, 0).is_none());
        assert!(world.cell_at(0, 3).is_none());
        assert!(!world.is_walkable(0, 3));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(GridMap::parse(""), Err(Error::InvalidMap { .. })));
        assert!(matches!(
            GridMap::parse("...\n..\n"),
            Err(Error::InvalidMap { line: 2, .. })
        ));
        assert!(matches!(
            GridMap::parse("..x"),
            Err(Error::InvalidMap { line: 1, .. })
        ));
        assert!(matches!(GridMap::parse("##\n##"), Err(Error::NoWalkableCells)));
    }

    #[test]
    fn test_random_cell_is_walkable() {
        let world = GridMap::with_walls(4, 4, &[(1, 1), (2, 2), (0, 3)]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let cell = world.random_cell(&mut rng);
            assert!(cell.walkable);
            assert!(world.is_walkable(cell.x, cell.y));
        }
    }

    #[test]
    fn test_walls_outside_grid_rejected() {
        assert!(GridMap::with_walls(3, 3, &[(3, 0)]).is_err());
    }
}
