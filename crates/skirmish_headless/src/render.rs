//! Plain-text battle rendering for terminal review.
//!
//! Each map row is followed by the hit points of the units standing on it,
//! left to right.

use skirmish_core::simulation::Simulation;

/// Gap between a map row and its unit annotations.
const ANNOTATION_GAP: &str = "   ";

/// Render the battle as text, one string per map row.
///
/// Rows holding units are annotated, e.g. `#G.E#   G(200), E(131)`.
#[must_use]
pub fn render_state(sim: &Simulation) -> Vec<String> {
    let symbols = sim.config().symbols;
    let units = sim.units();

    sim.render()
        .into_iter()
        .enumerate()
        .map(|(y, mut row)| {
            let annotations: Vec<String> = units
                .iter()
                .filter(|unit| unit.position().y as usize == y)
                .map(|unit| format!("{}({})", symbols.marker(unit.faction), unit.hit_points()))
                .collect();
            if !annotations.is_empty() {
                row.push_str(ANNOTATION_GAP);
                row.push_str(&annotations.join(", "));
            }
            row
        })
        .collect()
}

/// Render the battle as one newline-separated block, headed by the round
/// counter.
#[must_use]
pub fn render_frame(sim: &Simulation) -> String {
    let mut frame = match sim.completed_rounds() {
        0 => "Initially:".to_string(),
        1 => "After 1 round:".to_string(),
        n => format!("After {n} rounds:"),
    };
    for row in render_state(sim) {
        frame.push('\n');
        frame.push_str(&row);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::config::BattleConfig;
    use skirmish_test_utils::fixtures::{simulation, ARENA};

    #[test]
    fn test_annotates_rows_with_units() {
        let sim = simulation(&["#####", "#G.E#", "#...#", "#####"], BattleConfig::default());
        assert_eq!(
            render_state(&sim),
            vec!["#####", "#G.E#   G(200), E(200)", "#...#", "#####"]
        );
    }

    #[test]
    fn test_final_arena_state() {
        let mut sim = ARENA.simulation(BattleConfig::default());
        sim.run().unwrap();
        assert_eq!(
            render_state(&sim),
            vec![
                "#######",
                "#G....#   G(200)",
                "#.G...#   G(131)",
                "#.#.#G#   G(59)",
                "#...#.#",
                "#....G#   G(200)",
                "#######",
            ]
        );
    }

    #[test]
    fn test_frame_heading() {
        let mut sim = simulation(&["#######", "#E..G.#", "#######"], BattleConfig::default());
        assert!(render_frame(&sim).starts_with("Initially:\n#######"));
        sim.step_round().unwrap();
        assert!(render_frame(&sim).starts_with("After 1 round:\n"));
        sim.step_round().unwrap();
        assert!(render_frame(&sim).starts_with("After 2 rounds:\n"));
    }
}
