//! Static cave topology.
//!
//! The grid is built once when a battle is loaded and never mutated
//! afterwards, so a single [`GridModel`] can be shared between many runs
//! of the same map.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate. `y` grows downward, `x` grows rightward.
///
/// Ordering is *reading order*: by row first, then by column. Every
/// tie-break in the engine relies on this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbors, in reading order (N, W, E, S).
    ///
    /// Neighbors that would fall off the top or left edge are omitted;
    /// bounds on the other side are the grid's concern.
    pub fn adjacent(self) -> impl Iterator<Item = Coord> {
        let north = self.y.checked_sub(1).map(|y| Coord::new(self.x, y));
        let west = self.x.checked_sub(1).map(|x| Coord::new(x, self.y));
        let east = Some(Coord::new(self.x + 1, self.y));
        let south = Some(Coord::new(self.x, self.y + 1));
        [north, west, east, south].into_iter().flatten()
    }

    /// Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True if `other` is one orthogonal step away.
    #[must_use]
    pub const fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cell types for the cave grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellType {
    /// Traversable floor.
    #[default]
    Open,
    /// Impassable rock.
    Wall,
}

impl CellType {
    /// Returns true if this cell can ever hold a unit.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Walkable-cell topology of a battle map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridModel {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Cell data stored in row-major order.
    cells: Vec<CellType>,
}

impl GridModel {
    /// Create a grid from row-major cell data.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len()` is not `width * height`.
    #[must_use]
    pub fn from_cells(width: u32, height: u32, cells: Vec<CellType>) -> Self {
        assert_eq!(
            cells.len(),
            (width as usize) * (height as usize),
            "GridModel cell count must match its dimensions"
        );
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn coords_to_index(&self, coord: Coord) -> usize {
        (coord.y as usize) * (self.width as usize) + (coord.x as usize)
    }

    /// Check if a coordinate is within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Get the cell type at a coordinate, `None` if out of bounds.
    #[must_use]
    pub fn get_cell(&self, coord: Coord) -> Option<CellType> {
        if self.in_bounds(coord) {
            Some(self.cells[self.coords_to_index(coord)])
        } else {
            None
        }
    }

    /// True if the coordinate is inside the grid and not a wall.
    ///
    /// Occupancy is not considered here; see
    /// [`UnitRegistry::occupant_at`](crate::units::UnitRegistry::occupant_at).
    #[must_use]
    pub fn is_open(&self, coord: Coord) -> bool {
        self.get_cell(coord).is_some_and(CellType::is_open)
    }

    /// Open orthogonal neighbors of a coordinate, in reading order.
    pub fn neighbors4(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        coord.adjacent().filter(move |&n| self.is_open(n))
    }

    /// Number of open cells.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_open()).count()
    }
}
