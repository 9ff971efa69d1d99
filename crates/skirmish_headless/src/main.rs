//! Headless battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Fight a battle to the end
//! cargo run -p skirmish_headless -- run --map maps/arena.txt
//!
//! # Watch the first three rounds
//! cargo run -p skirmish_headless -- run --map maps/arena.txt --rounds 3
//!
//! # Find the lowest flawless elf attack power
//! cargo run -p skirmish_headless -- search --scenario scenarios/arena.ron
//!
//! # Verify determinism
//! cargo run -p skirmish_headless -- verify --map maps/arena.txt --runs 5
//! ```
//!
//! Results go to stdout; logs go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_core::error::SkirmishError;
use skirmish_core::factions::Faction;
use skirmish_core::simulation::{RoundResult, Simulation};
use skirmish_headless::{
    render::render_frame,
    report::BattleReport,
    scenario::{BattleOverrides, Scenario, ScenarioError},
    search::{run_search, SearchConfig, SearchResult},
    verify::{verify_scenario, DEFAULT_MAX_ROUNDS},
};

#[derive(Parser)]
#[command(name = "skirmish")]
#[command(about = "Headless grid battle runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the battle comes from and which settings to override.
#[derive(Args)]
struct SourceArgs {
    /// Map text file
    #[arg(short, long, conflicts_with = "scenario", required_unless_present = "scenario")]
    map: Option<PathBuf>,

    /// RON scenario file
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Starting hit points for every unit
    #[arg(long)]
    hit_points: Option<u32>,

    /// Elf attack power
    #[arg(long)]
    elf_attack: Option<u32>,

    /// Goblin attack power
    #[arg(long)]
    goblin_attack: Option<u32>,
}

impl SourceArgs {
    fn load(&self) -> Result<Scenario, ScenarioError> {
        let scenario = match (&self.scenario, &self.map) {
            (Some(path), _) => Scenario::load(path)?,
            (None, Some(path)) => Scenario::from_map_file(path)?,
            (None, None) => return Err(ScenarioError::FileNotFound("no map given".into())),
        };
        Ok(scenario.with_overrides(&BattleOverrides {
            hit_points: self.hit_points,
            elf_attack: self.elf_attack,
            goblin_attack: self.goblin_attack,
        }))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Elves,
    Goblins,
}

impl From<Side> for Faction {
    fn from(side: Side) -> Self {
        match side {
            Side::Elves => Faction::Elves,
            Side::Goblins => Faction::Goblins,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fight one battle
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Step at most this many rounds, showing the map after each
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Save the report to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the lowest attack power that wins without losses
    Search {
        #[command(flatten)]
        source: SourceArgs,

        /// Faction that must not lose a unit
        #[arg(short, long, value_enum, default_value = "elves")]
        faction: Side,

        /// First attack power to try
        #[arg(long, default_value = "4")]
        min: u32,

        /// Last attack power to try (default: starting hit points)
        #[arg(long)]
        max: Option<u32>,

        /// Save the search report to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by fighting the same battle several times
    Verify {
        #[command(flatten)]
        source: SourceArgs,

        /// Number of verification runs
        #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,

        /// Round cap per run
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            source,
            rounds,
            json,
            output,
        } => cmd_run(&source, rounds, json, output),
        Commands::Search {
            source,
            faction,
            min,
            max,
            output,
        } => cmd_search(&source, faction.into(), min, max, output),
        Commands::Verify {
            source,
            runs,
            max_rounds,
        } => cmd_verify(&source, runs, max_rounds),
    }
}

fn load_or_exit(source: &SourceArgs) -> Scenario {
    match source.load() {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load battle");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Fight one battle
fn cmd_run(source: &SourceArgs, rounds: Option<u32>, json: bool, output: Option<PathBuf>) {
    let scenario = load_or_exit(source);
    tracing::info!(scenario = %scenario.name, config = ?scenario.battle, "Starting battle");

    let mut sim = match scenario.simulation() {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let result = match rounds {
        Some(limit) => run_rounds(&mut sim, limit),
        None => sim.run().map(|_| ()),
    };
    if let Err(e) = result {
        let label = failure_label(&e);
        tracing::error!(error = %e, configuration = e.is_configuration_error(), "Battle failed");
        eprintln!("{label}: {e}");
        eprintln!("{}", render_frame(&sim));
        std::process::exit(1);
    }

    let report = BattleReport::capture(&scenario.name, &sim);
    if json {
        match report.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("FATAL: Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        if rounds.is_none() {
            println!("{}\n", render_frame(&sim));
        }
        println!("{}", report.summary());
    }

    if let Some(path) = output {
        if let Err(e) = report.save(&path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save report");
            eprintln!("FATAL: Failed to save report: {e}");
            std::process::exit(1);
        }
    }
}

/// `FATAL` for a battle that could not be set up, `FAIL` for one that
/// broke while running.
fn failure_label(error: &SkirmishError) -> &'static str {
    if error.is_configuration_error() {
        "FATAL"
    } else {
        "FAIL"
    }
}

/// Step at most `limit` rounds, printing the map after each one.
fn run_rounds(sim: &mut Simulation, limit: u32) -> skirmish_core::error::Result<()> {
    println!("{}\n", render_frame(sim));
    for _ in 0..limit {
        let report = sim.step_round()?;
        if report.result == RoundResult::GameOver {
            break;
        }
        tracing::debug!(events = report.events.len(), "Round finished");
        println!("{}\n", render_frame(sim));
    }
    Ok(())
}

/// Search for the flawless attack power
fn cmd_search(
    source: &SourceArgs,
    faction: Faction,
    min: u32,
    max: Option<u32>,
    output: Option<PathBuf>,
) {
    let scenario = load_or_exit(source);
    let map = match scenario.battle_map() {
        Ok(map) => map,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };
    let search = SearchConfig {
        protected: faction,
        min_attack: min,
        max_attack: max,
    };

    let report = match run_search(&scenario.name, &map, &scenario.battle, &search) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &output {
        if let Err(e) = report.save(path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {e}");
            std::process::exit(1);
        }
        tracing::info!(path = %path.display(), "Saved search report");
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("SEARCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Trials run: {}", report.result.trials().len());
    eprintln!("Time: {:.2}s", report.duration_seconds);

    match &report.result {
        SearchResult::Found {
            attack_power,
            outcome,
            ..
        } => {
            println!(
                "{faction} need attack power {attack_power}: {} full rounds, {} hit points left, outcome {}",
                outcome.completed_rounds, outcome.remaining_hit_points, outcome.value
            );
        }
        SearchResult::NoSolutionInRange { .. } => {
            println!("No attack power in range wins without losses for the {faction}");
            std::process::exit(1);
        }
    }
}

/// Verify determinism
fn cmd_verify(source: &SourceArgs, runs: u32, max_rounds: u32) {
    let scenario = load_or_exit(source);
    tracing::info!("Verifying determinism: {} ({} runs)", scenario.name, runs);

    match verify_scenario(&scenario, runs, max_rounds) {
        Ok(report) if report.is_deterministic() => {
            eprintln!("PASS: All {} runs produced identical results", report.runs);
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected!");
            if let Some(index) = report.first_divergence {
                eprintln!("  First divergence after round {index}");
            }
            eprintln!("  Final hashes: {:x?}", report.final_hashes);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}
