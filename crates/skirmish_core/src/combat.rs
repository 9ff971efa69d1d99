//! Melee combat between orthogonal neighbors.
//!
//! Attacks always land and always deal the attacker's full attack power.
//! Among adjacent enemies the weakest is struck; ties on hit points go to
//! the defender first in reading order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::grid::Coord;
use crate::units::{UnitId, UnitRegistry};

/// One resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// The unit that struck.
    pub attacker: UnitId,
    /// The unit that was struck.
    pub defender: UnitId,
    /// Cell the defender stood on.
    pub target: Coord,
    /// Hit points actually removed.
    pub damage: u32,
    /// True if the defender died and was removed.
    pub killed: bool,
}

/// Pick the defender for the unit on `attacker`: the adjacent enemy with
/// the fewest hit points, ties broken by reading order.
#[must_use]
pub fn select_target(units: &UnitRegistry, attacker: Coord) -> Option<Coord> {
    let enemy = units.occupant_at(attacker)?.faction.enemy();
    attacker
        .adjacent()
        .filter_map(|c| units.occupant_at(c))
        .filter(|unit| unit.faction == enemy)
        .min_by(|a, b| {
            a.hit_points()
                .cmp(&b.hit_points())
                .then(a.position().cmp(&b.position()))
        })
        .map(|unit| unit.position())
}

/// Attack from `attacker` if an enemy is adjacent.
///
/// Returns `false` when the cell is empty or no enemy is in reach.
pub fn resolve_attack(units: &mut UnitRegistry, attacker: Coord) -> Result<bool> {
    Ok(strike(units, attacker)?.is_some())
}

/// Like [`resolve_attack`] but reports what happened.
pub fn strike(units: &mut UnitRegistry, attacker: Coord) -> Result<Option<AttackEvent>> {
    let Some(unit) = units.occupant_at(attacker) else {
        return Ok(None);
    };
    let attacker_id = unit.id;
    let power = unit.attack_power;

    let Some(target) = select_target(units, attacker) else {
        return Ok(None);
    };
    let Some(defender_id) = units.occupant_at(target).map(|u| u.id) else {
        return Ok(None);
    };

    let (damage, remaining) = units.damage(target, power)?;
    let killed = remaining == 0;
    if killed {
        units.remove(target)?;
    }

    trace!(
        attacker = %attacker_id,
        defender = %defender_id,
        target = %target,
        damage,
        remaining,
        killed,
        "Unit attacked"
    );

    Ok(Some(AttackEvent {
        attacker: attacker_id,
        defender: defender_id,
        target,
        damage,
        killed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSymbols;
    use crate::factions::Faction;
    use crate::map::parse_map;

    fn registry(map: &str, hit_points: u32) -> UnitRegistry {
        let parsed = parse_map(map, &MapSymbols::default()).unwrap();
        UnitRegistry::from_placements(&parsed.placements, hit_points, |_| 3).unwrap()
    }

    #[test]
    fn test_equal_hit_points_use_reading_order() {
        let mut units = registry("######\n#....#\n#..G.#\n#..EG#\n######", 10);
        assert_eq!(select_target(&units, Coord::new(3, 3)), Some(Coord::new(3, 2)));

        let event = strike(&mut units, Coord::new(3, 3)).unwrap().unwrap();
        assert_eq!(event.target, Coord::new(3, 2));
        assert_eq!(event.damage, 3);
        assert!(!event.killed);
        assert_eq!(units.occupant_at(Coord::new(3, 2)).unwrap().hit_points(), 7);
        assert_eq!(units.occupant_at(Coord::new(4, 3)).unwrap().hit_points(), 10);
    }

    #[test]
    fn test_weakest_enemy_first() {
        let mut units = registry("######\n#....#\n#..G.#\n#..EG#\n######", 10);
        units.damage(Coord::new(4, 3), 5).unwrap();
        assert_eq!(select_target(&units, Coord::new(3, 3)), Some(Coord::new(4, 3)));
        assert!(resolve_attack(&mut units, Coord::new(3, 3)).unwrap());
        assert_eq!(units.occupant_at(Coord::new(4, 3)).unwrap().hit_points(), 2);
    }

    #[test]
    fn test_allies_are_ignored() {
        let mut units = registry("#####\n#EE.#\n#####", 10);
        assert_eq!(select_target(&units, Coord::new(1, 1)), None);
        assert!(!resolve_attack(&mut units, Coord::new(1, 1)).unwrap());
    }

    #[test]
    fn test_empty_cell_does_nothing() {
        let mut units = registry("#####\n#E.G#\n#####", 10);
        assert!(!resolve_attack(&mut units, Coord::new(2, 1)).unwrap());
    }

    #[test]
    fn test_kill_frees_cell() {
        let mut units = registry("####\n#EG#\n####", 3);
        let event = strike(&mut units, Coord::new(1, 1)).unwrap().unwrap();
        assert!(event.killed);
        assert_eq!(event.defender, UnitId(2));
        assert!(!units.is_occupied(Coord::new(2, 1)));
        assert_eq!(units.alive_count(Faction::Goblins), 0);
        assert!(units.is_game_over());
    }

    #[test]
    fn test_overkill_reports_actual_damage() {
        let mut units = registry("####\n#EG#\n####", 2);
        let event = strike(&mut units, Coord::new(2, 1)).unwrap().unwrap();
        assert_eq!(event.damage, 2);
        assert!(event.killed);
        assert_eq!(event.attacker, UnitId(2));
        assert_eq!(event.defender, UnitId(1));
    }
}
