//! Battle configuration.
//!
//! All fields carry defaults so scenario files only need to name what
//! they change.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkirmishError};
use crate::factions::Faction;

/// Default starting hit points for every unit.
pub const DEFAULT_HIT_POINTS: u32 = 200;

/// Default attack power for both factions.
pub const DEFAULT_ATTACK_POWER: u32 = 3;

/// Characters used to read and render battle maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSymbols {
    /// Impassable cell.
    pub wall: char,
    /// Empty floor.
    pub open: char,
    /// Elf unit standing on floor.
    pub elf: char,
    /// Goblin unit standing on floor.
    pub goblin: char,
}

impl Default for MapSymbols {
    fn default() -> Self {
        Self {
            wall: '#',
            open: '.',
            elf: 'E',
            goblin: 'G',
        }
    }
}

impl MapSymbols {
    /// Marker symbol for a faction.
    #[must_use]
    pub const fn marker(&self, faction: Faction) -> char {
        match faction {
            Faction::Elves => self.elf,
            Faction::Goblins => self.goblin,
        }
    }

    /// Faction whose marker is `symbol`, if any.
    #[must_use]
    pub fn faction_for(&self, symbol: char) -> Option<Faction> {
        Faction::ALL
            .into_iter()
            .find(|&faction| self.marker(faction) == symbol)
    }

    /// Reject symbol sets where two roles share a character.
    pub fn validate(&self) -> Result<()> {
        let all = [self.wall, self.open, self.elf, self.goblin];
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].contains(a) {
                return Err(SkirmishError::InvalidConfig(format!(
                    "map symbol {a:?} is used for more than one role"
                )));
            }
        }
        Ok(())
    }
}

/// Per-run battle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Starting hit points of every unit.
    pub hit_points: u32,
    /// Damage dealt by each elf attack.
    pub elf_attack_power: u32,
    /// Damage dealt by each goblin attack.
    pub goblin_attack_power: u32,
    /// Map symbol set.
    pub symbols: MapSymbols,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            hit_points: DEFAULT_HIT_POINTS,
            elf_attack_power: DEFAULT_ATTACK_POWER,
            goblin_attack_power: DEFAULT_ATTACK_POWER,
            symbols: MapSymbols::default(),
        }
    }
}

impl BattleConfig {
    /// Attack power of a faction.
    #[must_use]
    pub const fn attack_power(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Elves => self.elf_attack_power,
            Faction::Goblins => self.goblin_attack_power,
        }
    }

    /// Set the attack power of a faction.
    pub fn with_attack_power(mut self, faction: Faction, attack_power: u32) -> Self {
        match faction {
            Faction::Elves => self.elf_attack_power = attack_power,
            Faction::Goblins => self.goblin_attack_power = attack_power,
        }
        self
    }

    /// Set the starting hit points.
    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = hit_points;
        self
    }

    /// Check that the configuration can drive a battle.
    pub fn validate(&self) -> Result<()> {
        if self.hit_points == 0 {
            return Err(SkirmishError::InvalidConfig(
                "hit points must be positive".into(),
            ));
        }
        for faction in Faction::ALL {
            if self.attack_power(faction) == 0 {
                return Err(SkirmishError::InvalidConfig(format!(
                    "attack power for {faction} must be positive"
                )));
            }
        }
        self.symbols.validate()
    }
}
