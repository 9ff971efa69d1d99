//! Test fixtures and helpers.
//!
//! Sample battles with their known results, written as rows so they read
//! like the map they describe.

use skirmish_core::config::BattleConfig;
use skirmish_core::simulation::Simulation;

/// Join map rows into the newline-separated text the parser reads.
#[must_use]
pub fn map_text(rows: &[&str]) -> String {
    rows.join("\n")
}

/// Build a simulation from rows, panicking on malformed fixtures.
///
/// # Panics
///
/// Panics if the rows do not form a valid battle.
#[must_use]
pub fn simulation(rows: &[&str], config: BattleConfig) -> Simulation {
    Simulation::from_map_str(&map_text(rows), config)
        .unwrap_or_else(|err| panic!("invalid fixture map: {err}"))
}

/// A sample battle and its known results at default settings.
#[derive(Debug, Clone, Copy)]
pub struct SampleBattle {
    /// Short name used in test output.
    pub name: &'static str,
    /// Map rows.
    pub rows: &'static [&'static str],
    /// Completed rounds at default settings.
    pub completed_rounds: u32,
    /// Remaining hit points at default settings.
    pub remaining_hit_points: u64,
    /// Lowest elf attack power for a flawless elf win, with the outcome
    /// value of that battle. `None` where no result is recorded.
    pub flawless_elves: Option<(u32, u64)>,
}

impl SampleBattle {
    /// Map text.
    #[must_use]
    pub fn map(&self) -> String {
        map_text(self.rows)
    }

    /// Expected outcome value at default settings.
    #[must_use]
    pub fn outcome_value(&self) -> u64 {
        u64::from(self.completed_rounds) * self.remaining_hit_points
    }

    /// Fresh simulation with `config`.
    #[must_use]
    pub fn simulation(&self, config: BattleConfig) -> Simulation {
        simulation(self.rows, config)
    }
}

/// Goblins win after 47 rounds.
pub const ARENA: SampleBattle = SampleBattle {
    name: "arena",
    rows: &[
        "#######",
        "#.G...#",
        "#...EG#",
        "#.#.#G#",
        "#..G#E#",
        "#.....#",
        "#######",
    ],
    completed_rounds: 47,
    remaining_hit_points: 590,
    flawless_elves: Some((15, 4988)),
};

/// Elves win after 37 rounds.
pub const PILLARS: SampleBattle = SampleBattle {
    name: "pillars",
    rows: &[
        "#######",
        "#G..#E#",
        "#E#E.E#",
        "#G.##.#",
        "#...#E#",
        "#...E.#",
        "#######",
    ],
    completed_rounds: 37,
    remaining_hit_points: 982,
    flawless_elves: None,
};

/// Elves win after 46 rounds.
pub const CROSSROADS: SampleBattle = SampleBattle {
    name: "crossroads",
    rows: &[
        "#######",
        "#E..EG#",
        "#.#G.E#",
        "#E.##E#",
        "#G..#.#",
        "#..E#.#",
        "#######",
    ],
    completed_rounds: 46,
    remaining_hit_points: 859,
    flawless_elves: Some((4, 31284)),
};

/// Goblins win after 35 rounds.
pub const CORRIDORS: SampleBattle = SampleBattle {
    name: "corridors",
    rows: &[
        "#######",
        "#E.G#.#",
        "#.#G..#",
        "#G.#.G#",
        "#G..#.#",
        "#...E.#",
        "#######",
    ],
    completed_rounds: 35,
    remaining_hit_points: 793,
    flawless_elves: Some((15, 3478)),
};

/// Goblins win after 54 rounds.
pub const TUNNELS: SampleBattle = SampleBattle {
    name: "tunnels",
    rows: &[
        "#######",
        "#.E...#",
        "#.#..G#",
        "#.###.#",
        "#E#G#G#",
        "#...#G#",
        "#######",
    ],
    completed_rounds: 54,
    remaining_hit_points: 536,
    flawless_elves: Some((12, 6474)),
};

/// Goblins win after 20 rounds on a larger map.
pub const CAVERN: SampleBattle = SampleBattle {
    name: "cavern",
    rows: &[
        "#########",
        "#G......#",
        "#.E.#...#",
        "#..##..G#",
        "#...##..#",
        "#...#...#",
        "#.G...G.#",
        "#.....G.#",
        "#########",
    ],
    completed_rounds: 20,
    remaining_hit_points: 937,
    flawless_elves: Some((34, 1140)),
};

/// Every sample battle.
pub const SAMPLE_BATTLES: [SampleBattle; 6] =
    [ARENA, PILLARS, CROSSROADS, CORRIDORS, TUNNELS, CAVERN];

/// One elf surrounded by eight goblins; used to check movement only.
pub const SURROUNDED: &[&str] = &[
    "#########",
    "#G..G..G#",
    "#.......#",
    "#.......#",
    "#G..E..G#",
    "#.......#",
    "#.......#",
    "#G..G..G#",
    "#########",
];

/// [`SURROUNDED`] after each of its first three rounds.
pub const SURROUNDED_ROUNDS: [&[&str]; 3] = [
    &[
        "#########",
        "#.G...G.#",
        "#...G...#",
        "#...E..G#",
        "#.G.....#",
        "#.......#",
        "#G..G..G#",
        "#.......#",
        "#########",
    ],
    &[
        "#########",
        "#..G.G..#",
        "#...G...#",
        "#.G.E.G.#",
        "#.......#",
        "#G..G..G#",
        "#.......#",
        "#.......#",
        "#########",
    ],
    &[
        "#########",
        "#.......#",
        "#..GGG..#",
        "#..GEG..#",
        "#G..G...#",
        "#......G#",
        "#.......#",
        "#.......#",
        "#########",
    ],
];

/// Two elves and two goblins in a 3x3 room.
pub const SQUARE: &[&str] = &["#####", "#E.G#", "#...#", "#G.E#", "#####"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_maps_parse() {
        for battle in SAMPLE_BATTLES {
            let sim = battle.simulation(BattleConfig::default());
            assert_eq!(sim.render(), battle.rows, "{}", battle.name);
        }
    }

    #[test]
    fn test_outcome_value() {
        assert_eq!(ARENA.outcome_value(), 27730);
        assert_eq!(CAVERN.outcome_value(), 18740);
    }
}
