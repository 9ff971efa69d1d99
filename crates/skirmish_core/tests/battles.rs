//! Full battles with known results.

use skirmish_core::config::BattleConfig;
use skirmish_core::factions::Faction;
use skirmish_core::grid::Coord;
use skirmish_core::simulation::{BattleEvent, RoundResult, TrialOutcome, TurnResult};
use skirmish_test_utils::fixtures::{
    simulation, ARENA, PILLARS, SAMPLE_BATTLES, SQUARE, SURROUNDED, SURROUNDED_ROUNDS,
};

#[test]
fn test_sample_battle_outcomes() {
    for battle in SAMPLE_BATTLES {
        let mut sim = battle.simulation(BattleConfig::default());
        let outcome = sim.run().unwrap();
        assert_eq!(
            outcome.completed_rounds, battle.completed_rounds,
            "{}",
            battle.name
        );
        assert_eq!(
            outcome.remaining_hit_points, battle.remaining_hit_points,
            "{}",
            battle.name
        );
        assert_eq!(outcome.value, battle.outcome_value(), "{}", battle.name);
    }
}

#[test]
fn test_arena_final_state() {
    let mut sim = ARENA.simulation(BattleConfig::default());
    let outcome = sim.run().unwrap();

    assert_eq!(outcome.winner, Some(Faction::Goblins));
    assert_eq!(
        sim.render(),
        vec![
            "#######", "#G....#", "#.G...#", "#.#.#G#", "#...#.#", "#....G#", "#######",
        ]
    );
    let hit_points: Vec<u32> = outcome.survivors.iter().map(|s| s.hit_points).collect();
    assert_eq!(hit_points, vec![200, 131, 59, 200]);
}

#[test]
fn test_pillars_elves_win() {
    let outcome = PILLARS.simulation(BattleConfig::default()).run().unwrap();
    assert_eq!(outcome.winner, Some(Faction::Elves));
    assert_eq!(outcome.value, 36334);
}

#[test]
fn test_flawless_attack_powers() {
    for battle in SAMPLE_BATTLES {
        let Some((attack_power, value)) = battle.flawless_elves else {
            continue;
        };
        let config = BattleConfig::default().with_attack_power(Faction::Elves, attack_power);
        let trial = battle
            .simulation(config)
            .run_until_loss(Faction::Elves)
            .unwrap();
        assert!(trial.is_flawless(), "{}", battle.name);
        assert_eq!(trial.outcome().value, value, "{}", battle.name);

        let weaker =
            BattleConfig::default().with_attack_power(Faction::Elves, attack_power - 1);
        let trial = battle
            .simulation(weaker)
            .run_until_loss(Faction::Elves)
            .unwrap();
        assert!(!trial.is_flawless(), "{}", battle.name);
    }
}

#[test]
fn test_flawless_final_positions() {
    let config = BattleConfig::default().with_attack_power(Faction::Elves, 15);
    let trial = ARENA.simulation(config).run_until_loss(Faction::Elves).unwrap();
    let outcome = trial.outcome();
    assert_eq!(outcome.completed_rounds, 29);
    assert_eq!(outcome.remaining_hit_points, 172);
    assert_eq!(
        outcome.survivor_positions(),
        vec![Coord::new(3, 1), Coord::new(4, 2)]
    );
}

#[test]
fn test_loss_halts_mid_battle() {
    let config = BattleConfig::default().with_attack_power(Faction::Elves, 4);
    let trial = ARENA.simulation(config).run_until_loss(Faction::Elves).unwrap();
    match trial {
        TrialOutcome::Lost { outcome, .. } => {
            assert_eq!(outcome.completed_rounds, 22);
            assert_eq!(outcome.remaining_hit_points, 754);
            assert_eq!(outcome.winner, None);
        }
        other => panic!("expected a loss, got {other:?}"),
    }
}

#[test]
fn test_movement_rounds() {
    let mut sim = simulation(SURROUNDED, BattleConfig::default());
    for expected in SURROUNDED_ROUNDS {
        assert_eq!(sim.step_round().unwrap().result, RoundResult::Complete);
        assert_eq!(sim.render(), expected);
    }
}

#[test]
fn test_square_room() {
    let config = BattleConfig::default().with_hit_points(9);
    let mut sim = simulation(SQUARE, config);
    let outcome = sim.run().unwrap();

    assert_eq!(outcome.completed_rounds, 3);
    assert_eq!(outcome.remaining_hit_points, 3);
    assert_eq!(outcome.value, 9);
    assert_eq!(outcome.winner, Some(Faction::Elves));
    assert_eq!(outcome.survivor_positions(), vec![Coord::new(2, 2)]);
}

#[test]
fn test_acting_order_follows_reading_order() {
    let rows = [
        "#########",
        "#...G...#",
        "#.E.....#",
        "#......G#",
        "#G......#",
        "#...E...#",
        "#########",
    ];
    let mut sim = simulation(&rows, BattleConfig::default());
    let mut starts = Vec::new();
    let mut events = Vec::new();
    loop {
        events.clear();
        let result = sim.take_turn(&mut events).unwrap();
        if let Some(BattleEvent::Moved(step)) = events.first() {
            starts.push(step.from);
        }
        if result != TurnResult::Continue {
            break;
        }
    }

    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(starts.len(), 5);
    assert!(starts.windows(2).all(|w| (w[0].y, w[0].x) < (w[1].y, w[1].x)));
}

#[test]
fn test_round_ending_mid_snapshot_is_not_counted() {
    // Five units. The third to act kills the only goblin.
    let rows = ["#######", "#E.E..#", "#.EG..#", "#E....#", "#######"];
    let config = BattleConfig::default()
        .with_hit_points(3)
        .with_attack_power(Faction::Elves, 2);
    let mut sim = simulation(&rows, config);
    let mut events = Vec::new();

    assert_eq!(sim.take_turn(&mut events).unwrap(), TurnResult::Continue);
    assert_eq!(sim.take_turn(&mut events).unwrap(), TurnResult::Continue);
    assert_eq!(sim.take_turn(&mut events).unwrap(), TurnResult::Continue);
    assert!(sim.units().is_game_over());
    assert_eq!(sim.take_turn(&mut events).unwrap(), TurnResult::GameOver);
    assert_eq!(sim.completed_rounds(), 0);
    assert_eq!(sim.outcome().remaining_hit_points, 12);
    assert_eq!(sim.outcome().value, 0);
}
