//! Movement resolution for a single unit turn.
//!
//! A unit that is not already next to an enemy steps one cell toward the
//! nearest free cell adjacent to an enemy. Selection happens in two
//! separate passes:
//!
//! 1. pick the *destination*: the nearest in-range cell, ties broken by the
//!    reading order of the destination itself;
//! 2. pick the *step*: among the unit's free neighbors one step closer to
//!    that destination, the first in reading order.
//!
//! Collapsing the two passes into one global minimum can choose a
//! different, equally short path.

use std::collections::BTreeSet;

use tracing::trace;

use crate::error::Result;
use crate::factions::Faction;
use crate::grid::{Coord, GridModel};
use crate::pathfinding::{distances_from, first_step};
use crate::units::{UnitId, UnitRegistry};

/// A completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    /// The unit that moved.
    pub unit: UnitId,
    /// Cell before the step.
    pub from: Coord,
    /// Cell after the step.
    pub to: Coord,
}

/// True if any orthogonal neighbor of `coord` holds a unit of `enemy`.
#[must_use]
pub fn is_engaged(units: &UnitRegistry, coord: Coord, enemy: Faction) -> bool {
    coord
        .adjacent()
        .any(|n| units.occupant_at(n).is_some_and(|u| u.faction == enemy))
}

/// Free open cells adjacent to at least one living unit of `enemy`,
/// in reading order.
#[must_use]
pub fn in_range_squares(grid: &GridModel, units: &UnitRegistry, enemy: Faction) -> Vec<Coord> {
    units
        .faction_units(enemy)
        .flat_map(|unit| grid.neighbors4(unit.position()))
        .filter(|&c| !units.is_occupied(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The in-range cell the unit on `from` should head for, with its
/// distance. Nearest wins; equal distances go to the cell first in
/// reading order.
#[must_use]
pub fn choose_destination(
    grid: &GridModel,
    units: &UnitRegistry,
    from: Coord,
    in_range: &[Coord],
) -> Option<(Coord, u32)> {
    distances_from(grid, units, from).nearest(in_range.iter().copied())
}

/// Decide where the unit standing on `from` ends its move.
///
/// Returns `from` unchanged when there is no unit, when it is already
/// engaged, or when no in-range cell is reachable. Otherwise the unit is
/// moved one step in `units` and the new cell is returned.
pub fn resolve_move(grid: &GridModel, units: &mut UnitRegistry, from: Coord) -> Result<Coord> {
    Ok(advance(grid, units, from)?.map_or(from, |event| event.to))
}

/// Like [`resolve_move`] but reports the step taken, if any.
pub fn advance(
    grid: &GridModel,
    units: &mut UnitRegistry,
    from: Coord,
) -> Result<Option<MoveEvent>> {
    let Some(unit) = units.occupant_at(from) else {
        return Ok(None);
    };
    let unit_id = unit.id;
    let enemy = unit.faction.enemy();

    if is_engaged(units, from, enemy) {
        return Ok(None);
    }

    let in_range = in_range_squares(grid, units, enemy);
    if in_range.is_empty() {
        return Ok(None);
    }

    let Some((destination, distance)) = choose_destination(grid, units, from, &in_range) else {
        return Ok(None);
    };

    let Some((step, _)) = first_step(grid, units, from, destination) else {
        return Ok(None);
    };

    units.move_unit(from, step)?;
    trace!(
        unit = %unit_id,
        from = %from,
        to = %step,
        destination = %destination,
        distance,
        "Unit moved"
    );

    Ok(Some(MoveEvent {
        unit: unit_id,
        from,
        to: step,
    }))
}
