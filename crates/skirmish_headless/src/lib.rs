//! Headless battle runner.
//!
//! Loads battles from map text or RON scenario files and fights them
//! without any interface beyond the terminal:
//!
//! - **Run**: fight one battle and report its outcome
//! - **Search**: find the lowest attack power that wins without losses
//! - **Verify**: fight a battle repeatedly and check every run agrees
//!
//! # Example
//!
//! ```bash
//! # Fight a map with default settings
//! cargo run -p skirmish_headless -- run --map maps/arena.txt
//!
//! # Find the flawless elf attack power and save the search
//! cargo run -p skirmish_headless -- search --map maps/arena.txt --output results/search.json
//!
//! # Check a scenario replays identically
//! cargo run -p skirmish_headless -- verify --scenario scenarios/arena.ron --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod render;
pub mod report;
pub mod scenario;
pub mod search;
pub mod verify;

pub use render::{render_frame, render_state};
pub use report::BattleReport;
pub use scenario::{BattleOverrides, Scenario, ScenarioError};
pub use search::{run_search, search_attack_power, SearchConfig, SearchReport, SearchResult};
pub use verify::{verify_scenario, BattleTrace, VerifyReport};
