//! Attack-power threshold search.
//!
//! Fights the same map again and again, raising one faction's attack power
//! each time, until that faction wins without losing a single unit. Every
//! trial shares one parsed grid. Trials run one after another in ascending
//! order; the first flawless power is the answer.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_core::config::BattleConfig;
use skirmish_core::error::{Result, SkirmishError};
use skirmish_core::factions::Faction;
use skirmish_core::map::BattleMap;
use skirmish_core::outcome::Outcome;
use skirmish_core::simulation::{Simulation, TrialOutcome};
use skirmish_core::units::UnitId;

/// Lowest attack power tried by default. The base power is 3, so the
/// search starts one above it.
pub const DEFAULT_MIN_ATTACK: u32 = 4;

/// Configuration for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Faction whose attack power is raised and which must not lose a unit.
    pub protected: Faction,
    /// First attack power tried.
    pub min_attack: u32,
    /// Last attack power tried. `None` means the starting hit points:
    /// beyond that every hit already kills.
    pub max_attack: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            protected: Faction::Elves,
            min_attack: DEFAULT_MIN_ATTACK,
            max_attack: None,
        }
    }
}

impl SearchConfig {
    /// Search on behalf of `protected` with default bounds.
    #[must_use]
    pub fn new(protected: Faction) -> Self {
        Self {
            protected,
            ..Default::default()
        }
    }

    /// Set both bounds.
    #[must_use]
    pub fn with_range(mut self, min_attack: u32, max_attack: u32) -> Self {
        self.min_attack = min_attack;
        self.max_attack = Some(max_attack);
        self
    }

    /// The inclusive range of attack powers to try.
    pub fn attack_range(&self, battle: &BattleConfig) -> Result<(u32, u32)> {
        let max_attack = self.max_attack.unwrap_or(battle.hit_points);
        if self.min_attack == 0 {
            return Err(SkirmishError::InvalidConfig(
                "minimum attack power must be positive".into(),
            ));
        }
        if self.min_attack > max_attack {
            return Err(SkirmishError::InvalidConfig(format!(
                "attack range {}..={max_attack} is empty",
                self.min_attack
            )));
        }
        Ok((self.min_attack, max_attack))
    }
}

/// How one trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialStatus {
    /// Won with no losses.
    Flawless,
    /// Halted at the first loss.
    Lost,
    /// The battle could never end.
    Stalled,
}

/// Record of one trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Attack power tried.
    pub attack_power: u32,
    /// How the trial ended.
    pub status: TrialStatus,
    /// Completed rounds when the trial ended or halted.
    pub completed_rounds: u32,
    /// Remaining hit points when the trial ended or halted.
    pub remaining_hit_points: u64,
    /// First protected unit to die, if any.
    pub casualty: Option<UnitId>,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SearchResult {
    /// A flawless attack power exists in the range.
    Found {
        /// Lowest flawless attack power.
        attack_power: u32,
        /// Outcome of the battle at that power.
        outcome: Outcome,
        /// Every trial run, in order.
        trials: Vec<TrialRecord>,
    },
    /// Every power in the range loses at least one protected unit.
    NoSolutionInRange {
        /// Every trial run, in order.
        trials: Vec<TrialRecord>,
    },
}

impl SearchResult {
    /// The flawless attack power, if one was found.
    #[must_use]
    pub const fn attack_power(&self) -> Option<u32> {
        match self {
            Self::Found { attack_power, .. } => Some(*attack_power),
            Self::NoSolutionInRange { .. } => None,
        }
    }

    /// Every trial run.
    #[must_use]
    pub fn trials(&self) -> &[TrialRecord] {
        match self {
            Self::Found { trials, .. } | Self::NoSolutionInRange { trials } => trials,
        }
    }
}

/// A finished search with its inputs, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Scenario name.
    pub scenario: String,
    /// Base battle settings.
    pub battle: BattleConfig,
    /// Search settings.
    pub search: SearchConfig,
    /// What was found.
    pub result: SearchResult,
    /// Wall-clock time spent.
    pub duration_seconds: f64,
}

impl SearchReport {
    /// Save the report to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a report from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Find the lowest attack power for which `search.protected` wins without
/// losses.
///
/// Not finding one is a normal result, not an error. Errors are reserved
/// for bad settings and engine faults.
pub fn search_attack_power(
    map: &BattleMap,
    battle: &BattleConfig,
    search: &SearchConfig,
) -> Result<SearchResult> {
    let (min_attack, max_attack) = search.attack_range(battle)?;
    let grid = Arc::new(map.grid.clone());
    let mut trials = Vec::new();

    info!(
        faction = %search.protected,
        min_attack,
        max_attack,
        "Searching for flawless attack power"
    );

    for attack_power in min_attack..=max_attack {
        let config = battle.with_attack_power(search.protected, attack_power);
        let mut sim = Simulation::with_grid(Arc::clone(&grid), &map.placements, config)?;

        let record = match sim.run_until_loss(search.protected) {
            Ok(TrialOutcome::Flawless { outcome }) => {
                trials.push(record_for(attack_power, TrialStatus::Flawless, &outcome, None));
                info!(
                    attack_power,
                    completed_rounds = outcome.completed_rounds,
                    value = outcome.value,
                    "Flawless victory"
                );
                return Ok(SearchResult::Found {
                    attack_power,
                    outcome,
                    trials,
                });
            }
            Ok(TrialOutcome::Lost { casualty, outcome }) => {
                record_for(attack_power, TrialStatus::Lost, &outcome, Some(casualty))
            }
            Err(SkirmishError::Stalemate { completed_rounds }) => {
                warn!(attack_power, completed_rounds, "Trial stalled");
                TrialRecord {
                    attack_power,
                    status: TrialStatus::Stalled,
                    completed_rounds,
                    remaining_hit_points: sim.units().total_hit_points(),
                    casualty: None,
                }
            }
            Err(err) => return Err(err),
        };

        debug!(
            attack_power,
            status = ?record.status,
            completed_rounds = record.completed_rounds,
            "Trial failed"
        );
        trials.push(record);
    }

    info!(trials = trials.len(), "No flawless attack power in range");
    Ok(SearchResult::NoSolutionInRange { trials })
}

fn record_for(
    attack_power: u32,
    status: TrialStatus,
    outcome: &Outcome,
    casualty: Option<UnitId>,
) -> TrialRecord {
    TrialRecord {
        attack_power,
        status,
        completed_rounds: outcome.completed_rounds,
        remaining_hit_points: outcome.remaining_hit_points,
        casualty,
    }
}

/// Run a search and wrap it in a report.
pub fn run_search(
    scenario: &str,
    map: &BattleMap,
    battle: &BattleConfig,
    search: &SearchConfig,
) -> Result<SearchReport> {
    let start = Instant::now();
    let result = search_attack_power(map, battle, search)?;
    Ok(SearchReport {
        scenario: scenario.to_string(),
        battle: *battle,
        search: *search,
        result,
        duration_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::map::parse_map;
    use skirmish_test_utils::fixtures::{ARENA, CROSSROADS};

    fn map(text: &str) -> BattleMap {
        parse_map(text, &BattleConfig::default().symbols).unwrap()
    }

    #[test]
    fn test_finds_threshold() {
        let result = search_attack_power(
            &map(&ARENA.map()),
            &BattleConfig::default(),
            &SearchConfig::default(),
        )
        .unwrap();

        assert_eq!(result.attack_power(), Some(15));
        match &result {
            SearchResult::Found {
                outcome, trials, ..
            } => {
                assert_eq!(outcome.value, 4988);
                assert_eq!(trials.len(), 12);
                assert!(trials[..11].iter().all(|t| t.status == TrialStatus::Lost));
                assert_eq!(trials[11].status, TrialStatus::Flawless);
                assert_eq!(trials[0].attack_power, 4);
                assert_eq!(trials[0].completed_rounds, 22);
            }
            other => panic!("expected a threshold, got {other:?}"),
        }
    }

    #[test]
    fn test_first_power_may_succeed() {
        let result = search_attack_power(
            &map(&CROSSROADS.map()),
            &BattleConfig::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        assert_eq!(result.attack_power(), Some(4));
        assert_eq!(result.trials().len(), 1);
    }

    #[test]
    fn test_no_solution_in_range() {
        let result = search_attack_power(
            &map(&ARENA.map()),
            &BattleConfig::default(),
            &SearchConfig::default().with_range(4, 6),
        )
        .unwrap();
        assert_eq!(result.attack_power(), None);
        assert_eq!(result.trials().len(), 3);
        assert!(matches!(result, SearchResult::NoSolutionInRange { .. }));
    }

    #[test]
    fn test_stalled_trials_are_recorded() {
        let result = search_attack_power(
            &map("#######\n#E.#.G#\n#######"),
            &BattleConfig::default(),
            &SearchConfig::default().with_range(4, 5),
        )
        .unwrap();
        assert!(result
            .trials()
            .iter()
            .all(|t| t.status == TrialStatus::Stalled));
    }

    #[test]
    fn test_rejects_empty_range() {
        let err = SearchConfig::default()
            .with_range(10, 5)
            .attack_range(&BattleConfig::default())
            .unwrap_err();
        assert!(matches!(err, SkirmishError::InvalidConfig(_)));

        let (min, max) = SearchConfig::default()
            .attack_range(&BattleConfig::default())
            .unwrap();
        assert_eq!((min, max), (4, 200));
    }

    #[test]
    fn test_protect_goblins() {
        // A lone goblin against a lone elf: any power that kills first wins.
        let result = search_attack_power(
            &map("#####\n#GE.#\n#####"),
            &BattleConfig::default().with_hit_points(8),
            &SearchConfig::new(Faction::Goblins),
        )
        .unwrap();
        assert_eq!(result.attack_power(), Some(4));
    }

    #[test]
    fn test_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("search.json");
        let report = run_search(
            "crossroads",
            &map(&CROSSROADS.map()),
            &BattleConfig::default(),
            &SearchConfig::default(),
        )
        .unwrap();
        report.save(&path).unwrap();
        let loaded = SearchReport::load(&path).unwrap();
        assert_eq!(loaded.result, report.result);
        assert_eq!(loaded.scenario, "crossroads");
    }
}
