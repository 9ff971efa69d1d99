//! Faction definitions and identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two opposing sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Faction A, marked `E` on the default map symbols.
    Elves,
    /// Faction B, marked `G` on the default map symbols.
    Goblins,
}

impl Faction {
    /// Both factions, in a fixed order.
    pub const ALL: [Faction; 2] = [Faction::Elves, Faction::Goblins];

    /// The opposing faction.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Elves => Self::Goblins,
            Self::Goblins => Self::Elves,
        }
    }

    /// Index into per-faction tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Elves => 0,
            Self::Goblins => 1,
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Elves => "Elves",
            Self::Goblins => "Goblins",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_is_involution() {
        for faction in Faction::ALL {
            assert_ne!(faction.enemy(), faction);
            assert_eq!(faction.enemy().enemy(), faction);
        }
    }

    #[test]
    fn test_indices_are_distinct() {
        assert_eq!(Faction::Elves.index(), 0);
        assert_eq!(Faction::Goblins.index(), 1);
    }
}
