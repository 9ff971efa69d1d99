//! Battle scoring.

use serde::{Deserialize, Serialize};

use crate::factions::Faction;
use crate::grid::Coord;
use crate::units::{UnitId, UnitRegistry};

/// A unit alive when the outcome was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survivor {
    /// Unit identifier.
    pub id: UnitId,
    /// Owning faction.
    pub faction: Faction,
    /// Final cell.
    pub position: Coord,
    /// Remaining hit points.
    pub hit_points: u32,
}

/// Result of a battle, or of a battle halted early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The faction left standing, `None` while both sides still have units.
    pub winner: Option<Faction>,
    /// Rounds that ran to completion.
    pub completed_rounds: u32,
    /// Sum of hit points over all survivors.
    pub remaining_hit_points: u64,
    /// `completed_rounds * remaining_hit_points`.
    pub value: u64,
    /// Survivors in reading order.
    pub survivors: Vec<Survivor>,
}

impl Outcome {
    /// Score the current state of `units`.
    #[must_use]
    pub fn from_registry(units: &UnitRegistry, completed_rounds: u32) -> Self {
        let remaining_hit_points = units.total_hit_points();
        Self {
            winner: units.winner(),
            completed_rounds,
            remaining_hit_points,
            value: score(completed_rounds, remaining_hit_points),
            survivors: units
                .iter()
                .map(|unit| Survivor {
                    id: unit.id,
                    faction: unit.faction,
                    position: unit.position(),
                    hit_points: unit.hit_points(),
                })
                .collect(),
        }
    }

    /// Survivors of one faction, in reading order.
    pub fn survivors_of(&self, faction: Faction) -> impl Iterator<Item = &Survivor> + '_ {
        self.survivors.iter().filter(move |s| s.faction == faction)
    }

    /// Final cells of every survivor, in reading order.
    #[must_use]
    pub fn survivor_positions(&self) -> Vec<Coord> {
        self.survivors.iter().map(|s| s.position).collect()
    }
}

/// The outcome value: completed rounds times remaining hit points.
#[must_use]
pub fn score(completed_rounds: u32, remaining_hit_points: u64) -> u64 {
    u64::from(completed_rounds) * remaining_hit_points
}
