//! # Skirmish Core
//!
//! Deterministic turn-based grid combat between two factions.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering beyond plain text rows
//! - No IO
//! - No randomness
//! - No threads
//!
//! Loading files, searching attack powers and presenting results live in
//! `skirmish_headless`.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Static cave topology and reading-order coordinates
//! - [`map`] - Text map parsing and rendering
//! - [`units`] - Unit registry keyed by stable ids
//! - [`pathfinding`] - Breadth-first distances
//! - [`movement`] - One-step movement with two-pass tie-breaking
//! - [`combat`] - Target selection and damage
//! - [`simulation`] - Round scheduler
//! - [`outcome`] - Battle scoring

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod config;
pub mod error;
pub mod factions;
pub mod grid;
pub mod map;
pub mod movement;
pub mod outcome;
pub mod pathfinding;
pub mod simulation;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::AttackEvent;
    pub use crate::config::{BattleConfig, MapSymbols};
    pub use crate::error::{Result, SkirmishError};
    pub use crate::factions::Faction;
    pub use crate::grid::{Coord, GridModel};
    pub use crate::map::{parse_map, BattleMap, Placement};
    pub use crate::movement::MoveEvent;
    pub use crate::outcome::{Outcome, Survivor};
    pub use crate::simulation::{
        BattleEvent, RoundReport, RoundResult, Simulation, TrialOutcome, TurnResult,
    };
    pub use crate::units::{Unit, UnitId, UnitRegistry};
}
