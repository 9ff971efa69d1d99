//! Replay verification.
//!
//! Fights the same scenario several times, hashing the state after every
//! round, and checks that every run follows the same trace to the same
//! outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use skirmish_core::error::SkirmishError;
use skirmish_core::outcome::Outcome;
use skirmish_core::simulation::RoundResult;

use crate::scenario::{Scenario, ScenarioError};

/// Default cap on rounds per run.
pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

/// The per-round record of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleTrace {
    /// State hash before the first round and after every round.
    pub hashes: Vec<u64>,
    /// State when the run stopped.
    pub outcome: Outcome,
    /// False if the run hit the round cap before the battle ended.
    pub finished: bool,
}

impl BattleTrace {
    /// Fight `scenario` for at most `max_rounds` rounds.
    pub fn record(scenario: &Scenario, max_rounds: u32) -> Result<Self, ScenarioError> {
        let mut sim = scenario.simulation()?;
        let mut hashes = vec![sim.state_hash()];
        let mut finished = false;

        for _ in 0..max_rounds {
            let report = sim.step_round()?;
            hashes.push(sim.state_hash());
            if report.result == RoundResult::GameOver {
                finished = true;
                break;
            }
        }

        Ok(Self {
            hashes,
            outcome: sim.outcome(),
            finished,
        })
    }
}

/// Result of comparing several runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Number of runs compared.
    pub runs: u32,
    /// Index into the hash trace of the first disagreement, if any.
    /// Index 0 is the initial state; index n follows the n-th round.
    pub first_divergence: Option<usize>,
    /// Whether every run ended with the same outcome.
    pub outcomes_match: bool,
    /// Final state hash of each run.
    pub final_hashes: Vec<u64>,
}

impl VerifyReport {
    /// True if every run agreed at every round.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        self.first_divergence.is_none() && self.outcomes_match
    }
}

/// Index of the first entry where `a` and `b` differ, counting a length
/// mismatch as a difference.
fn divergence(a: &[u64], b: &[u64]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then_some(a.len().min(b.len())))
}

/// Fight `scenario` `runs` times and compare the traces.
///
/// At least one run is required.
pub fn verify_scenario(
    scenario: &Scenario,
    runs: u32,
    max_rounds: u32,
) -> Result<VerifyReport, ScenarioError> {
    let traces = (0..runs)
        .map(|_| BattleTrace::record(scenario, max_rounds))
        .collect::<Result<Vec<_>, _>>()?;

    let Some((first, rest)) = traces.split_first() else {
        let err = SkirmishError::InvalidConfig("verification needs at least one run".into());
        return Err(err.into());
    };
    if !first.finished {
        warn!(max_rounds, "Battle did not finish within the round cap");
    }

    let first_divergence = rest
        .iter()
        .filter_map(|trace| divergence(&first.hashes, &trace.hashes))
        .min();
    let outcomes_match = rest.iter().all(|trace| trace.outcome == first.outcome);

    debug!(
        runs = traces.len(),
        rounds = first.hashes.len() - 1,
        ?first_divergence,
        outcomes_match,
        "Compared battle traces"
    );

    Ok(VerifyReport {
        runs,
        first_divergence,
        outcomes_match,
        final_hashes: traces
            .iter()
            .filter_map(|trace| trace.hashes.last().copied())
            .collect(),
    })
}
