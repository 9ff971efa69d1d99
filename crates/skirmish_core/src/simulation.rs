//! Round scheduler.
//!
//! A round starts by snapshotting every living unit in reading order. Units
//! then take their turns in snapshot order: move, then attack. Units killed
//! earlier in the round lose their turn; units that moved keep their place
//! in the snapshot, so nobody acts twice.
//!
//! Before each snapshot entry the scheduler checks whether a faction has
//! been wiped out. If so the battle ends there and the interrupted round
//! does not count. A round only counts once the whole snapshot has been
//! processed.
//!
//! # Determinism
//!
//! There is no randomness, no floating point and no unordered iteration:
//! the same map and configuration always produce the same battle.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::BattleConfig;
//! use skirmish_core::simulation::Simulation;
//!
//! let map = "#######\n#.G...#\n#...EG#\n#.#.#G#\n#..G#E#\n#.....#\n#######";
//! let mut sim = Simulation::from_map_str(map, BattleConfig::default()).unwrap();
//! let outcome = sim.run().unwrap();
//! assert_eq!(outcome.completed_rounds, 47);
//! assert_eq!(outcome.value, 27730);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::combat::{strike, AttackEvent};
use crate::config::BattleConfig;
use crate::error::{Result, SkirmishError};
use crate::factions::Faction;
use crate::grid::{Coord, GridModel};
use crate::map::{parse_map, render_map, BattleMap, Placement};
use crate::movement::{advance, MoveEvent};
use crate::outcome::Outcome;
use crate::units::{UnitId, UnitRegistry};

/// Something that happened during a unit's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleEvent {
    /// A unit stepped one cell.
    Moved(MoveEvent),
    /// A unit attacked a neighbor.
    Attacked(AttackEvent),
}

/// Transition produced by a single call to [`Simulation::take_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnResult {
    /// A snapshot entry was processed; more remain in this round.
    Continue,
    /// The snapshot is exhausted and the round counter advanced.
    RoundComplete,
    /// A faction has no units left. Terminal.
    GameOver,
}

/// How a call to [`Simulation::step_round`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    /// Every snapshot entry was processed.
    Complete,
    /// The battle ended before the snapshot was exhausted.
    GameOver,
}

/// One round's result and everything that happened in it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// How the round ended.
    pub result: RoundResult,
    /// Moves and attacks in execution order.
    pub events: Vec<BattleEvent>,
}

/// Result of [`Simulation::run_until_loss`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    /// The protected faction won without losing a unit.
    Flawless {
        /// Final outcome of the battle.
        outcome: Outcome,
    },
    /// A protected unit died; the battle was halted at that instant.
    Lost {
        /// The first protected unit to die.
        casualty: UnitId,
        /// State at the halt. `winner` is `None` unless the loss also
        /// ended the battle.
        outcome: Outcome,
    },
}

impl TrialOutcome {
    /// True if the protected faction won with no losses.
    #[must_use]
    pub const fn is_flawless(&self) -> bool {
        matches!(self, Self::Flawless { .. })
    }

    /// The outcome, whichever way the trial went.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        match self {
            Self::Flawless { outcome } | Self::Lost { outcome, .. } => outcome,
        }
    }
}

/// Detects battles that can no longer end.
///
/// Between attacks hit points are frozen, so unit positions can only
/// cycle through finitely many layouts. Seeing the same layout twice
/// without an attack in between means the battle will never finish.
#[derive(Debug, Default)]
struct StallDetector {
    layouts: HashSet<Vec<(UnitId, Coord)>>,
}

impl StallDetector {
    /// Record the layout at the end of a round. Returns true if the
    /// battle has stalled.
    fn observe(&mut self, units: &UnitRegistry, attacked: bool) -> bool {
        if attacked {
            self.layouts.clear();
        }
        let layout = units.iter().map(|unit| (unit.id, unit.position())).collect();
        !self.layouts.insert(layout)
    }
}

/// A battle in progress.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Arc<GridModel>,
    units: UnitRegistry,
    config: BattleConfig,
    completed_rounds: u32,
    /// Units still to act in the current round, `None` between rounds.
    pending: Option<VecDeque<UnitId>>,
    finished: bool,
}

impl Simulation {
    /// Start a battle on a parsed map.
    pub fn new(map: &BattleMap, config: BattleConfig) -> Result<Self> {
        Self::with_grid(Arc::new(map.grid.clone()), &map.placements, config)
    }

    /// Start a battle on a shared grid.
    ///
    /// Used when many battles run on the same map with different
    /// configurations.
    pub fn with_grid(
        grid: Arc<GridModel>,
        placements: &[Placement],
        config: BattleConfig,
    ) -> Result<Self> {
        config.validate()?;
        if let Some(placement) = placements.iter().find(|p| !grid.is_open(p.position)) {
            return Err(SkirmishError::InvalidConfig(format!(
                "unit placed on blocked cell {}",
                placement.position
            )));
        }
        for faction in Faction::ALL {
            if !placements.iter().any(|p| p.faction == faction) {
                return Err(SkirmishError::MissingFaction(faction));
            }
        }

        let units = UnitRegistry::from_placements(placements, config.hit_points, |faction| {
            config.attack_power(faction)
        })?;

        debug!(
            units = units.len(),
            hit_points = config.hit_points,
            elf_attack_power = config.elf_attack_power,
            goblin_attack_power = config.goblin_attack_power,
            "Battle created"
        );

        Ok(Self {
            grid,
            units,
            config,
            completed_rounds: 0,
            pending: None,
            finished: false,
        })
    }

    /// Parse `input` with the configured symbols and start a battle.
    pub fn from_map_str(input: &str, config: BattleConfig) -> Result<Self> {
        let map = parse_map(input, &config.symbols)?;
        Self::new(&map, config)
    }

    /// The static grid.
    #[must_use]
    pub fn grid(&self) -> &Arc<GridModel> {
        &self.grid
    }

    /// Living units.
    #[must_use]
    pub const fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Configuration the battle was created with.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Rounds that ran to completion.
    #[must_use]
    pub const fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// True once the battle has reached its terminal state.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Process the next snapshot entry.
    ///
    /// Starts a new round when none is in progress. Moves and attacks are
    /// appended to `events`.
    pub fn take_turn(&mut self, events: &mut Vec<BattleEvent>) -> Result<TurnResult> {
        if self.finished {
            return Ok(TurnResult::GameOver);
        }

        let units = &self.units;
        let pending = self
            .pending
            .get_or_insert_with(|| units.iter().map(|unit| unit.id).collect());

        let Some(id) = pending.pop_front() else {
            self.pending = None;
            self.completed_rounds += 1;
            debug!(
                round = self.completed_rounds,
                units = self.units.len(),
                "Round complete"
            );
            #[cfg(debug_assertions)]
            {
                let hash = self.state_hash();
                debug!(round = self.completed_rounds, state_hash = hash, "Battle state hash");
            }
            return Ok(TurnResult::RoundComplete);
        };

        if self.units.is_game_over() {
            self.pending = None;
            self.finished = true;
            debug!(
                completed_rounds = self.completed_rounds,
                winner = ?self.units.winner(),
                "Battle over"
            );
            return Ok(TurnResult::GameOver);
        }

        let Some(unit) = self.units.get(id) else {
            trace!(unit = %id, "Skipping dead unit");
            return Ok(TurnResult::Continue);
        };

        let mut position = unit.position();
        if let Some(step) = advance(&self.grid, &mut self.units, position)? {
            position = step.to;
            events.push(BattleEvent::Moved(step));
        }
        if let Some(attack) = strike(&mut self.units, position)? {
            events.push(BattleEvent::Attacked(attack));
        }

        Ok(TurnResult::Continue)
    }

    /// Run turns until the current round completes or the battle ends.
    pub fn step_round(&mut self) -> Result<RoundReport> {
        let mut events = Vec::new();
        loop {
            match self.take_turn(&mut events)? {
                TurnResult::Continue => {}
                TurnResult::RoundComplete => {
                    return Ok(RoundReport {
                        result: RoundResult::Complete,
                        events,
                    })
                }
                TurnResult::GameOver => {
                    return Ok(RoundReport {
                        result: RoundResult::GameOver,
                        events,
                    })
                }
            }
        }
    }

    /// Run the battle to the end.
    ///
    /// Fails with [`SkirmishError::Stalemate`] once the units settle into
    /// a layout they have already held since the last attack.
    pub fn run(&mut self) -> Result<Outcome> {
        let mut stalls = StallDetector::default();
        stalls.observe(&self.units, true);
        loop {
            let report = self.step_round()?;
            if report.result == RoundResult::GameOver {
                return Ok(self.outcome());
            }
            let attacked = report
                .events
                .iter()
                .any(|event| matches!(event, BattleEvent::Attacked(_)));
            if stalls.observe(&self.units, attacked) {
                return Err(self.stalemate());
            }
        }
    }

    /// Run the battle, halting the instant a unit of `protected` dies.
    ///
    /// The halted state is reported as is: the round in which the loss
    /// happened is not counted.
    pub fn run_until_loss(&mut self, protected: Faction) -> Result<TrialOutcome> {
        let mut stalls = StallDetector::default();
        stalls.observe(&self.units, true);
        let mut events = Vec::new();
        let mut round_attacked = false;
        loop {
            events.clear();
            let alive_before = self.units.alive_count(protected);
            let result = self.take_turn(&mut events)?;

            if self.units.alive_count(protected) < alive_before {
                let casualty = events
                    .iter()
                    .find_map(|event| match event {
                        BattleEvent::Attacked(attack) if attack.killed => Some(attack.defender),
                        _ => None,
                    })
                    .ok_or_else(|| {
                        SkirmishError::InvariantViolation(
                            "unit vanished without a killing blow".into(),
                        )
                    })?;
                debug!(
                    faction = %protected,
                    casualty = %casualty,
                    completed_rounds = self.completed_rounds,
                    "Protected unit lost, halting"
                );
                return Ok(TrialOutcome::Lost {
                    casualty,
                    outcome: self.outcome(),
                });
            }

            round_attacked |= events
                .iter()
                .any(|event| matches!(event, BattleEvent::Attacked(_)));
            match result {
                TurnResult::Continue => {}
                TurnResult::RoundComplete => {
                    if stalls.observe(&self.units, round_attacked) {
                        return Err(self.stalemate());
                    }
                    round_attacked = false;
                }
                TurnResult::GameOver => {
                    return Ok(TrialOutcome::Flawless {
                        outcome: self.outcome(),
                    })
                }
            }
        }
    }

    fn stalemate(&self) -> SkirmishError {
        debug!(
            completed_rounds = self.completed_rounds,
            "Battle stalled"
        );
        SkirmishError::Stalemate {
            completed_rounds: self.completed_rounds,
        }
    }

    /// Score the current state.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::from_registry(&self.units, self.completed_rounds)
    }

    /// Render the map with current unit positions.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        render_map(&self.grid, &self.units, &self.config.symbols)
    }

    /// Hash of the battle state for determinism checks.
    ///
    /// Covers the round counter and every living unit (id, faction,
    /// position, hit points) in reading order.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.completed_rounds.hash(&mut hasher);
        self.units.len().hash(&mut hasher);

        for unit in self.units.iter() {
            unit.id.hash(&mut hasher);
            unit.faction.hash(&mut hasher);
            unit.position().hash(&mut hasher);
            unit.health.current.hash(&mut hasher);
        }

        hasher.finish()
    }
}
