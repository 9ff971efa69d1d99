//! Breadth-first distance search over the cave.
//!
//! Every step costs one, so plain BFS yields exact shortest distances.
//! Units of either faction block movement; walls block everything.
//! Neighbors are expanded in reading order, which keeps the visit order
//! reproducible even though the distances do not depend on it.

use std::collections::{BTreeMap, VecDeque};

use crate::grid::{Coord, GridModel};
use crate::units::UnitRegistry;

/// Shortest step counts from one source cell.
///
/// Only reachable cells are present. The source itself is at distance 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    distances: BTreeMap<Coord, u32>,
}

impl DistanceMap {
    /// Distance to `coord`, or `None` if unreachable.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<u32> {
        self.distances.get(&coord).copied()
    }

    /// True if `coord` can be reached.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.distances.contains_key(&coord)
    }

    /// Number of reachable cells, including the source.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// True if nothing was reached (never the case for a built map).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Reachable cells with their distances, in reading order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, u32)> + '_ {
        self.distances.iter().map(|(&c, &d)| (c, d))
    }

    /// The nearest of `candidates`, ties broken by reading order.
    ///
    /// Unreachable candidates are ignored.
    pub fn nearest<I>(&self, candidates: I) -> Option<(Coord, u32)>
    where
        I: IntoIterator<Item = Coord>,
    {
        candidates
            .into_iter()
            .filter_map(|c| self.get(c).map(|d| (c, d)))
            .min_by(|(ca, da), (cb, db)| da.cmp(db).then(ca.cmp(cb)))
    }
}

/// Distances from `source` to every reachable free cell.
///
/// The source may itself be occupied (it usually holds the unit that is
/// looking for a path); every other occupied cell is an obstacle.
#[must_use]
pub fn distances_from(grid: &GridModel, units: &UnitRegistry, source: Coord) -> DistanceMap {
    let mut distances = BTreeMap::new();
    let mut frontier = VecDeque::new();

    if grid.is_open(source) {
        distances.insert(source, 0);
        frontier.push_back(source);
    }

    while let Some(current) = frontier.pop_front() {
        let next = distances[&current] + 1;
        for neighbor in grid.neighbors4(current) {
            if units.is_occupied(neighbor) || distances.contains_key(&neighbor) {
                continue;
            }
            distances.insert(neighbor, next);
            frontier.push_back(neighbor);
        }
    }

    DistanceMap { distances }
}

/// The first step from `source` along a shortest path to `target`.
///
/// Searches outward from `target` and picks, among the free neighbors of
/// `source` that are one step closer, the first in reading order. Returns
/// the step and the remaining distance from it to `target`.
#[must_use]
pub fn first_step(
    grid: &GridModel,
    units: &UnitRegistry,
    source: Coord,
    target: Coord,
) -> Option<(Coord, u32)> {
    // The source is normally occupied, so it never appears in the search
    // from the target; its neighbors carry the useful distances.
    let from_target = distances_from(grid, units, target);
    from_target.nearest(grid.neighbors4(source))
}
