//! Unit registry.
//!
//! Units are owned by a single table keyed by a stable [`UnitId`]. A second
//! index maps each occupied coordinate to the id standing there, so a move
//! updates the unit's position field and re-keys the index in one place.
//! Both maps are ordered, which makes every iteration deterministic and
//! makes the position index iterate in reading order for free.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkirmishError};
use crate::factions::Faction;
use crate::grid::Coord;
use crate::map::Placement;

/// Stable identifier of a unit for the lifetime of one battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hit point pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current hit points.
    pub current: u32,
    /// Starting hit points.
    pub max: u32,
}

impl Health {
    /// Create a pool at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the unit is dead (no hit points left).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction so an overkill leaves zero.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }
}

/// A combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Stable identifier.
    pub id: UnitId,
    /// Owning faction.
    pub faction: Faction,
    /// Current cell. Only the registry moves units.
    position: Coord,
    /// Hit points.
    pub health: Health,
    /// Damage dealt per attack.
    pub attack_power: u32,
}

impl Unit {
    /// Current cell.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.health.current
    }
}

/// All living units of a battle.
///
/// Invariants: every unit's position appears exactly once in the position
/// index, no coordinate holds more than one unit, and dead units are
/// removed immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRegistry {
    units: BTreeMap<UnitId, Unit>,
    positions: BTreeMap<Coord, UnitId>,
    alive: [usize; 2],
}

impl UnitRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from map placements.
    ///
    /// Ids are handed out from 1 in placement order. Two placements on the
    /// same coordinate are rejected with [`SkirmishError::InvalidConfig`].
    pub fn from_placements<F>(
        placements: &[Placement],
        hit_points: u32,
        attack_power: F,
    ) -> Result<Self>
    where
        F: Fn(Faction) -> u32,
    {
        let mut registry = Self::new();
        for (index, placement) in placements.iter().enumerate() {
            let id = UnitId(index as u32 + 1);
            registry.insert(Unit {
                id,
                faction: placement.faction,
                position: placement.position,
                health: Health::new(hit_points),
                attack_power: attack_power(placement.faction),
            })?;
        }
        Ok(registry)
    }

    fn insert(&mut self, unit: Unit) -> Result<()> {
        if let Some(existing) = self.positions.get(&unit.position) {
            return Err(SkirmishError::InvalidConfig(format!(
                "units {existing} and {} both placed on {}",
                unit.id, unit.position
            )));
        }
        self.alive[unit.faction.index()] += 1;
        self.positions.insert(unit.position, unit.id);
        self.units.insert(unit.id, unit);
        Ok(())
    }

    /// Number of living units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True if no units are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// The unit standing on `coord`, if any.
    #[must_use]
    pub fn occupant_at(&self, coord: Coord) -> Option<&Unit> {
        self.positions.get(&coord).and_then(|id| self.units.get(id))
    }

    /// True if a unit of either faction stands on `coord`.
    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.positions.contains_key(&coord)
    }

    /// Relocate the unit on `from` to the adjacent cell `to`.
    ///
    /// Fails with [`SkirmishError::InvariantViolation`] if `from` is empty,
    /// `to` is occupied, or the cells are not orthogonal neighbors.
    pub fn move_unit(&mut self, from: Coord, to: Coord) -> Result<UnitId> {
        if !from.is_adjacent(to) {
            return Err(SkirmishError::InvariantViolation(format!(
                "move from {from} to {to} is not a single orthogonal step"
            )));
        }
        if self.positions.contains_key(&to) {
            return Err(SkirmishError::InvariantViolation(format!(
                "move from {from} onto occupied cell {to}"
            )));
        }
        let id = self.positions.remove(&from).ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("move from unoccupied cell {from}"))
        })?;
        let unit = self.units.get_mut(&id).ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("position index names missing unit {id}"))
        })?;
        unit.position = to;
        self.positions.insert(to, id);
        Ok(id)
    }

    /// Remove the unit on `coord`, returning it.
    pub fn remove(&mut self, coord: Coord) -> Result<Unit> {
        let id = self.positions.remove(&coord).ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("remove from unoccupied cell {coord}"))
        })?;
        let unit = self.units.remove(&id).ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("position index names missing unit {id}"))
        })?;
        self.alive[unit.faction.index()] -= 1;
        Ok(unit)
    }

    /// Deal damage to the unit on `coord`. Returns the damage actually
    /// applied and the unit's remaining hit points.
    pub(crate) fn damage(&mut self, coord: Coord, amount: u32) -> Result<(u32, u32)> {
        let id = self.positions.get(&coord).copied().ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("attack on unoccupied cell {coord}"))
        })?;
        let unit = self.units.get_mut(&id).ok_or_else(|| {
            SkirmishError::InvariantViolation(format!("position index names missing unit {id}"))
        })?;
        let dealt = unit.health.apply_damage(amount);
        Ok((dealt, unit.health.current))
    }

    /// Occupied coordinates of both factions, in reading order.
    #[must_use]
    pub fn units_in_reading_order(&self) -> Vec<Coord> {
        self.positions.keys().copied().collect()
    }

    /// Living units of both factions, in reading order of their positions.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.positions.values().filter_map(|id| self.units.get(id))
    }

    /// Living units of one faction, in reading order.
    pub fn faction_units(&self, faction: Faction) -> impl Iterator<Item = &Unit> + '_ {
        self.iter().filter(move |unit| unit.faction == faction)
    }

    /// Number of living units in a faction.
    #[must_use]
    pub const fn alive_count(&self, faction: Faction) -> usize {
        self.alive[faction.index()]
    }

    /// True once either faction has no units left.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        Faction::ALL
            .into_iter()
            .any(|faction| self.alive_count(faction) == 0)
    }

    /// The only faction with units left, if the other has been wiped out.
    #[must_use]
    pub fn winner(&self) -> Option<Faction> {
        match (
            self.alive_count(Faction::Elves),
            self.alive_count(Faction::Goblins),
        ) {
            (0, 0) => None,
            (_, 0) => Some(Faction::Elves),
            (0, _) => Some(Faction::Goblins),
            _ => None,
        }
    }

    /// Sum of hit points over every living unit.
    #[must_use]
    pub fn total_hit_points(&self) -> u64 {
        self.units.values().map(|u| u64::from(u.hit_points())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        let placements = [
            Placement {
                faction: Faction::Goblins,
                position: Coord::new(3, 1),
            },
            Placement {
                faction: Faction::Elves,
                position: Coord::new(1, 2),
            },
            Placement {
                faction: Faction::Goblins,
                position: Coord::new(1, 1),
            },
        ];
        UnitRegistry::from_placements(&placements, 200, |f| match f {
            Faction::Elves => 10,
            Faction::Goblins => 3,
        })
        .unwrap()
    }

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(10);
        assert_eq!(health.apply_damage(4), 4);
        assert_eq!(health.current, 6);
        assert_eq!(health.apply_damage(20), 6);
        assert!(health.is_dead());
    }

    #[test]
    fn test_from_placements() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.alive_count(Faction::Goblins), 2);
        assert_eq!(registry.alive_count(Faction::Elves), 1);

        let elf = registry.occupant_at(Coord::new(1, 2)).unwrap();
        assert_eq!(elf.id, UnitId(2));
        assert_eq!(elf.attack_power, 10);
        assert_eq!(elf.hit_points(), 200);
    }

    #[test]
    fn test_reading_order() {
        let registry = registry();
        assert_eq!(
            registry.units_in_reading_order(),
            vec![Coord::new(1, 1), Coord::new(3, 1), Coord::new(1, 2)]
        );
        let ids: Vec<_> = registry.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![UnitId(3), UnitId(1), UnitId(2)]);
    }

    #[test]
    fn test_move_unit_updates_index() {
        let mut registry = registry();
        let id = registry.move_unit(Coord::new(1, 2), Coord::new(2, 2)).unwrap();
        assert_eq!(id, UnitId(2));
        assert!(registry.occupant_at(Coord::new(1, 2)).is_none());
        assert_eq!(registry.get(id).unwrap().position(), Coord::new(2, 2));
        assert_eq!(registry.occupant_at(Coord::new(2, 2)).unwrap().id, id);
    }

    #[test]
    fn test_move_unit_rejects_bad_moves() {
        let mut registry = registry();
        assert!(matches!(
            registry.move_unit(Coord::new(2, 2), Coord::new(2, 3)),
            Err(SkirmishError::InvariantViolation(_))
        ));
        assert!(matches!(
            registry.move_unit(Coord::new(1, 2), Coord::new(1, 1)),
            Err(SkirmishError::InvariantViolation(_))
        ));
        assert!(matches!(
            registry.move_unit(Coord::new(1, 2), Coord::new(3, 2)),
            Err(SkirmishError::InvariantViolation(_))
        ));
        // Failed moves leave the registry untouched.
        assert_eq!(registry, self::registry());
    }

    #[test]
    fn test_remove_and_game_over() {
        let mut registry = registry();
        assert!(!registry.is_game_over());
        assert_eq!(registry.winner(), None);

        let removed = registry.remove(Coord::new(1, 2)).unwrap();
        assert_eq!(removed.faction, Faction::Elves);
        assert!(registry.is_game_over());
        assert_eq!(registry.winner(), Some(Faction::Goblins));
        assert!(registry.remove(Coord::new(1, 2)).is_err());
    }

    #[test]
    fn test_damage_and_totals() {
        let mut registry = registry();
        assert_eq!(registry.total_hit_points(), 600);
        let (dealt, left) = registry.damage(Coord::new(3, 1), 50).unwrap();
        assert_eq!((dealt, left), (50, 150));
        assert_eq!(registry.total_hit_points(), 550);
        assert!(registry.damage(Coord::new(5, 5), 1).is_err());
    }

    #[test]
    fn test_duplicate_placement_is_rejected() {
        let placements = [
            Placement {
                faction: Faction::Elves,
                position: Coord::new(1, 1),
            },
            Placement {
                faction: Faction::Goblins,
                position: Coord::new(1, 1),
            },
        ];
        let result = UnitRegistry::from_placements(&placements, 5, |_| 1);
        assert!(matches!(result, Err(SkirmishError::InvalidConfig(_))));
    }
}
