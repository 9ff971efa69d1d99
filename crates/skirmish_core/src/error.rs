//! Error types for the battle engine.

use thiserror::Error;

use crate::factions::Faction;

/// Result type alias using [`SkirmishError`].
pub type Result<T> = std::result::Result<T, SkirmishError>;

/// Top-level error type for the battle engine.
///
/// Configuration errors are raised while a battle is being loaded and never
/// surface once rounds are running. [`SkirmishError::InvariantViolation`]
/// marks a defect in the engine itself and aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkirmishError {
    /// The map contains no rows.
    #[error("Map is empty")]
    EmptyMap,

    /// A map row differs in length from the first row.
    #[error("Map row {row} has length {found}, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A map cell holds a symbol outside the configured symbol set.
    #[error("Unknown map symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol {
        /// The offending character.
        symbol: char,
        /// Column of the cell.
        x: u32,
        /// Row of the cell.
        y: u32,
    },

    /// One of the factions has no units on the map.
    #[error("Map has no units for faction {0}")]
    MissingFaction(Faction),

    /// Battle configuration is unusable.
    #[error("Invalid battle configuration: {0}")]
    InvalidConfig(String),

    /// Engine state no longer satisfies its invariants.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The units returned to a layout already held since the last
    /// attack, so the battle can never end.
    #[error("Battle stalled after {completed_rounds} rounds: no unit can reach an enemy")]
    Stalemate {
        /// Rounds completed before the stall was detected.
        completed_rounds: u32,
    },
}

impl SkirmishError {
    /// Returns true for errors raised while loading a battle.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_) | Self::Stalemate { .. })
    }
}
