//! Scenario loading and configuration.
//!
//! A scenario bundles a battle map with the settings to fight it under.
//! Scenarios are RON files; a bare map text file also works and is fought
//! with default settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::config::BattleConfig;
use skirmish_core::error::SkirmishError;
use skirmish_core::factions::Faction;
use skirmish_core::map::{parse_map, BattleMap};
use skirmish_core::simulation::Simulation;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The map or settings are not a valid battle.
    #[error("Invalid battle: {0}")]
    Battle(#[from] SkirmishError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map text, one row per line.
    pub map: String,
    /// Battle settings.
    #[serde(default)]
    pub battle: BattleConfig,
}

impl Scenario {
    /// Create a scenario from map text with default settings.
    #[must_use]
    pub fn from_map(name: impl Into<String>, map: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            map: map.into(),
            battle: BattleConfig::default(),
        }
    }

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Load a bare map text file. The scenario is named after the file.
    pub fn from_map_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let map = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| "map".to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(Self::from_map(name, map))
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Apply command-line overrides to the battle settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BattleOverrides) -> Self {
        overrides.apply(&mut self.battle);
        self
    }

    /// Parse the map with this scenario's symbols.
    pub fn battle_map(&self) -> Result<BattleMap, ScenarioError> {
        Ok(parse_map(&self.map, &self.battle.symbols)?)
    }

    /// Build a fresh simulation.
    pub fn simulation(&self) -> Result<Simulation, ScenarioError> {
        Ok(Simulation::new(&self.battle_map()?, self.battle)?)
    }
}

/// Individual settings given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleOverrides {
    /// Starting hit points.
    pub hit_points: Option<u32>,
    /// Elf attack power.
    pub elf_attack: Option<u32>,
    /// Goblin attack power.
    pub goblin_attack: Option<u32>,
}

impl BattleOverrides {
    /// Overwrite the settings that were given.
    pub fn apply(&self, config: &mut BattleConfig) {
        if let Some(hit_points) = self.hit_points {
            config.hit_points = hit_points;
        }
        if let Some(power) = self.elf_attack {
            *config = config.with_attack_power(Faction::Elves, power);
        }
        if let Some(power) = self.goblin_attack {
            *config = config.with_attack_power(Faction::Goblins, power);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL_MAP: &str = "#######\n#E..G.#\n#...#.#\n#.G.#G#\n#######";

    #[test]
    fn test_parse_from_ron() {
        let ron = "Scenario(
            name: \"Test\",
            description: \"Test scenario\",
            map: \"#####\\n#E.G#\\n#####\",
            battle: BattleConfig(
                hit_points: 50,
                elf_attack_power: 7,
            ),
        )";
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.battle.hit_points, 50);
        assert_eq!(scenario.battle.elf_attack_power, 7);
        assert_eq!(scenario.battle.goblin_attack_power, 3);
        assert_eq!(scenario.battle.symbols.wall, '#');

        let sim = scenario.simulation().unwrap();
        assert_eq!(sim.units().len(), 2);
    }

    #[test]
    fn test_battle_defaults_when_omitted() {
        let ron = "Scenario(name: \"Bare\", map: \"####\\n#EG#\\n####\")";
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.battle, BattleConfig::default());
        assert!(scenario.description.is_empty());
    }

    #[test]
    fn test_ron_round_trip() {
        let scenario = Scenario::from_map("small", SMALL_MAP);
        let text = scenario.to_ron_string().unwrap();
        assert_eq!(Scenario::from_ron_str(&text).unwrap(), scenario);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Scenario::load("/nonexistent/battle.ron");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let map_path = dir.path().join("small.txt");
        std::fs::write(&map_path, SMALL_MAP).unwrap();
        let scenario = Scenario::from_map_file(&map_path).unwrap();
        assert_eq!(scenario.name, "small");
        assert_eq!(scenario.battle_map().unwrap().placements.len(), 4);

        let ron_path = dir.path().join("small.ron");
        let mut file = std::fs::File::create(&ron_path).unwrap();
        file.write_all(scenario.to_ron_string().unwrap().as_bytes())
            .unwrap();
        assert_eq!(Scenario::load(&ron_path).unwrap(), scenario);
    }

    #[test]
    fn test_invalid_map_is_reported() {
        let scenario = Scenario::from_map("broken", "####\n#E.#\n####");
        assert!(matches!(
            scenario.simulation(),
            Err(ScenarioError::Battle(SkirmishError::MissingFaction(
                Faction::Goblins
            )))
        ));
    }

    #[test]
    fn test_overrides() {
        let overrides = BattleOverrides {
            hit_points: Some(120),
            elf_attack: Some(10),
            goblin_attack: None,
        };
        let scenario = Scenario::from_map("small", SMALL_MAP).with_overrides(&overrides);
        assert_eq!(scenario.battle.hit_points, 120);
        assert_eq!(scenario.battle.elf_attack_power, 10);
        assert_eq!(scenario.battle.goblin_attack_power, 3);
    }
}
