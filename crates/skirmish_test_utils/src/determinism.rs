//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a battle produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Battles must be fully reproducible: the outcome value is only
//! meaningful if every run of the same map agrees on it. Sources of
//! non-determinism guarded against:
//!
//! - **Hash map iteration order**: the engine only iterates ordered maps.
//! - **Tie-breaking**: every choice between equals falls back to reading
//!   order.
//! - **Randomness**: there is none.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: movement, combat and scheduling in isolation
//! 2. **Property tests**: random walled maps still replay identically
//! 3. **Integration tests**: sample battles reproduce their known results

use skirmish_core::simulation::{RoundResult, Simulation};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated per run.
    pub steps: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Advance a battle by one round, ignoring errors and finished battles.
fn advance_round(sim: &mut Simulation) {
    if !sim.is_finished() {
        let _ = sim.step_round();
    }
}

/// Run a battle `runs` times for up to `rounds` rounds each and compare
/// the final state hashes.
pub fn verify_battle_determinism<F>(setup_fn: F, runs: usize, rounds: u32) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    verify_determinism(runs, rounds, setup_fn, advance_round, Simulation::state_hash)
}

/// Compare two runs round by round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree for `rounds` rounds (or until the battle ends),
/// `Some(round)` for the first round after which the hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, rounds: u32) -> Option<u32>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for round in 1..=rounds {
        let r1 = sim1.step_round().ok().map(|report| report.result);
        let r2 = sim2.step_round().ok().map(|report| report.result);

        if r1 != r2 || sim1.state_hash() != sim2.state_hash() {
            return Some(round);
        }
        if r1 != Some(RoundResult::Complete) {
            break;
        }
    }

    None
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible battle maps and
/// configurations.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::config::BattleConfig;
    use skirmish_core::factions::Faction;

    /// Generate one interior map cell: mostly floor, some walls, a few
    /// units of each faction.
    pub fn arb_cell() -> impl Strategy<Value = char> {
        prop_oneof![
            3 => Just('#'),
            14 => Just('.'),
            2 => Just('E'),
            2 => Just('G'),
        ]
    }

    /// Generate a walled rectangular map with at least one unit per
    /// faction. The elf sits in the top-left interior corner and the
    /// goblin in the bottom-right one.
    ///
    /// Dimensions include the border walls.
    pub fn arb_battle_map(max_width: u32, max_height: u32) -> impl Strategy<Value = String> {
        (4..=max_width.max(4), 4..=max_height.max(4)).prop_flat_map(|(width, height)| {
            let inner_w = (width - 2) as usize;
            let inner_h = (height - 2) as usize;
            proptest::collection::vec(arb_cell(), inner_w * inner_h).prop_map(move |mut cells| {
                cells[0] = 'E';
                cells[inner_w * inner_h - 1] = 'G';

                let border = "#".repeat(width as usize);
                let mut rows = Vec::with_capacity(height as usize);
                rows.push(border.clone());
                for row in cells.chunks(inner_w) {
                    rows.push(format!("#{}#", row.iter().collect::<String>()));
                }
                rows.push(border);
                rows.join("\n")
            })
        })
    }

    /// Generate hit points (1-60), small enough for battles to end quickly.
    pub fn arb_hit_points() -> impl Strategy<Value = u32> {
        1u32..60u32
    }

    /// Generate attack power (1-20).
    pub fn arb_attack_power() -> impl Strategy<Value = u32> {
        1u32..20u32
    }

    /// Generate a valid battle configuration with default symbols.
    pub fn arb_battle_config() -> impl Strategy<Value = BattleConfig> {
        (arb_hit_points(), arb_attack_power(), arb_attack_power()).prop_map(
            |(hit_points, elves, goblins)| {
                BattleConfig::default()
                    .with_hit_points(hit_points)
                    .with_attack_power(Faction::Elves, elves)
                    .with_attack_power(Faction::Goblins, goblins)
            },
        )
    }
}
