//! Battle reports.
//!
//! A report pairs the outcome of one battle with the settings it was fought
//! under and the final map, so a run can be archived and compared later.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use skirmish_core::config::BattleConfig;
use skirmish_core::outcome::Outcome;
use skirmish_core::simulation::Simulation;

/// Result of a single battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Scenario name.
    pub scenario: String,
    /// Settings the battle was fought under.
    pub config: BattleConfig,
    /// Final outcome.
    pub outcome: Outcome,
    /// Map rows at the end of the battle.
    pub final_map: Vec<String>,
}

impl BattleReport {
    /// Capture the current state of `sim`.
    #[must_use]
    pub fn capture(scenario: impl Into<String>, sim: &Simulation) -> Self {
        Self {
            scenario: scenario.into(),
            config: *sim.config(),
            outcome: sim.outcome(),
            final_map: sim.render(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Save the report to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved battle report");
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let winner = self
            .outcome
            .winner
            .map_or("Nobody", |faction| faction.display_name());
        format!(
            "{}: {} win after {} full rounds with {} total hit points left (outcome {})",
            self.scenario,
            winner,
            self.outcome.completed_rounds,
            self.outcome.remaining_hit_points,
            self.outcome.value
        )
    }
}
