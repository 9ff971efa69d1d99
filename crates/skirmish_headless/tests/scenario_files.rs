//! The bundled maps and scenarios load and fight as documented.

use std::path::PathBuf;

use skirmish_core::factions::Faction;
use skirmish_headless::scenario::Scenario;
use skirmish_headless::search::{search_attack_power, SearchConfig};
use skirmish_headless::verify::{verify_scenario, DEFAULT_MAX_ROUNDS};

fn workspace_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn test_arena_scenario_matches_map_file() {
    let scenario = Scenario::load(workspace_file("scenarios/arena.ron")).unwrap();
    let from_map = Scenario::from_map_file(workspace_file("maps/arena.txt")).unwrap();

    assert_eq!(scenario.battle, from_map.battle);
    assert_eq!(
        scenario.battle_map().unwrap(),
        from_map.battle_map().unwrap()
    );

    let outcome = scenario.simulation().unwrap().run().unwrap();
    assert_eq!(outcome.value, 27730);
}

#[test]
fn test_cavern_search() {
    let scenario = Scenario::from_map_file(workspace_file("maps/cavern.txt")).unwrap();
    let result = search_attack_power(
        &scenario.battle_map().unwrap(),
        &scenario.battle,
        &SearchConfig::new(Faction::Elves),
    )
    .unwrap();
    assert_eq!(result.attack_power(), Some(34));
}

#[test]
fn test_every_scenario_replays_identically() {
    let dir = workspace_file("scenarios");
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
            continue;
        }
        let scenario = Scenario::load(&path).unwrap();
        let report = verify_scenario(&scenario, 2, DEFAULT_MAX_ROUNDS).unwrap();
        assert!(report.is_deterministic(), "{}", path.display());
    }
}
