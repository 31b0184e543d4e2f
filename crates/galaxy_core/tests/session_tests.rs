//! End-to-end session tests driven through the public API.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use galaxy_core::config::GameConfig;
use galaxy_core::data::{Catalog, PowerupKind};
use galaxy_core::events::{EventKind, GameEvent};
use galaxy_core::math::{seconds, Fixed, Vec2Fixed};
use galaxy_core::replay::Replay;
use galaxy_core::session::{Contact, Session};
use galaxy_core::spawn::DirectorPhase;
use galaxy_core::world::EntityKind;
use galaxy_test_utils::determinism::{
    find_first_divergence, run_parallel_sessions, verify_session_determinism,
};
use galaxy_test_utils::fixtures::{
    default_catalog, default_session, fixed, rng, session_with_rare_probability,
    single_powerup_catalog,
};
use galaxy_test_utils::scenario::{run_scenario, ScenarioConfig};

fn record_all(session: &mut Session) -> Rc<RefCell<Vec<GameEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session
        .bus_mut()
        .subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
    log
}

fn frame() -> Fixed {
    seconds(1.0 / 60.0)
}

#[test]
fn test_director_paces_enemies_and_powerups() {
    let mut session = default_session();
    let mut rng = rng(5);
    let log = record_all(&mut session);

    session.tick(frame(), &mut rng);
    assert_eq!(session.world().count(EntityKind::Enemy), 0, "idle director emits nothing");

    session.on_start_trigger();
    for _ in 0..(60 * 11) {
        session.tick(frame(), &mut rng);
    }

    let log = log.borrow();
    let enemies = log.iter().filter(|e| e.kind() == EventKind::EnemySpawned).count();
    let powerups = log.iter().filter(|e| e.kind() == EventKind::PowerupSpawned).count();
    // One at start, then at 5 s and 10 s.
    assert_eq!(enemies, 3);
    // Gaps of 3 to 7 seconds over 11 seconds.
    assert!((2..=4).contains(&powerups), "got {powerups} powerups");
}

#[test]
fn test_death_mid_cycle_stops_spawning_and_clears_field() {
    let mut session = default_session();
    let mut rng = rng(11);
    let log = record_all(&mut session);
    let enemies_spawned = |log: &Rc<RefCell<Vec<GameEvent>>>| {
        log.borrow()
            .iter()
            .filter(|e| e.kind() == EventKind::EnemySpawned)
            .count()
    };

    session.on_start_trigger();
    // Past the first re-armed emission at 5 s, into the next cycle.
    for _ in 0..(60 * 7) {
        session.tick(frame(), &mut rng);
    }
    assert_eq!(enemies_spawned(&log), 2);
    assert!(!session.world().is_empty());

    // Physics reports every laser hit twice; only the first one counts.
    for _ in 0..3 {
        let laser = session.spawn_enemy_laser(session.player().position());
        session.on_contact(Contact::Player(laser));
        session.on_contact(Contact::Player(laser));
        session.tick(frame(), &mut rng);
    }

    assert_eq!(session.player().lives(), 0);
    assert_eq!(session.director().phase(), DirectorPhase::Stopped);
    assert!(session.world().is_empty());

    // Well past the 10 s emission the dead cycle would have produced.
    for _ in 0..(60 * 10) {
        session.tick(frame(), &mut rng);
    }
    assert!(session.world().is_empty(), "a stopped director never emits again");
    assert_eq!(enemies_spawned(&log), 2);

    let log = log.borrow();
    let kinds: Vec<_> = log.iter().map(GameEvent::kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == EventKind::PlayerTerminal).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == EventKind::PlayerDestroyed).count(), 1);
    let terminal = kinds.iter().position(|k| *k == EventKind::PlayerTerminal);
    let stopped = kinds.iter().position(|k| *k == EventKind::SpawningStopped);
    assert!(terminal < stopped);
}

#[test]
fn test_rare_probability_picks_the_pool() {
    let spawned_kinds = |probability: f64| {
        let mut session = session_with_rare_probability(probability);
        let mut rng = rng(13);
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&kinds);
        session.bus_mut().subscribe(EventKind::PowerupSpawned, move |event| {
            if let GameEvent::PowerupSpawned { descriptor, .. } = event {
                sink.borrow_mut().push(descriptor.kind);
            }
        });
        session.on_start_trigger();
        for _ in 0..(60 * 40) {
            session.tick(frame(), &mut rng);
        }
        let kinds = kinds.borrow().clone();
        kinds
    };

    let always = spawned_kinds(1.0);
    assert!(always.len() >= 5);
    assert!(always.iter().all(|k| *k == PowerupKind::Mine));

    let never = spawned_kinds(0.0);
    assert!(never.len() >= 5);
    assert!(never.iter().all(|k| *k != PowerupKind::Mine));
}

#[test]
fn test_collected_powerup_changes_player() {
    let mut session =
        Session::new(GameConfig::default(), single_powerup_catalog(PowerupKind::TripleShot)).unwrap();
    let mut rng = rng(3);
    session.on_start_trigger();
    session.tick(frame(), &mut rng);

    let powerup = session
        .world()
        .iter_sorted()
        .find(|i| i.body.kind() == EntityKind::Powerup)
        .map(|i| i.id)
        .unwrap();
    session.on_contact(Contact::Player(powerup));
    assert!(!session.world().contains(powerup));

    let shots = session.fire();
    assert_eq!(shots.len(), 3);
    assert_eq!(session.player().ammo(), 14);
}

#[test]
fn test_mines_do_not_spend_ammo() {
    let mut session = Session::new(GameConfig::default(), single_powerup_catalog(PowerupKind::Mine)).unwrap();
    let mut rng = rng(8);
    session.on_start_trigger();
    session.tick(frame(), &mut rng);
    let powerup = session
        .world()
        .iter_sorted()
        .find(|i| i.body.kind() == EntityKind::Powerup)
        .map(|i| i.id)
        .unwrap();
    session.on_contact(Contact::Player(powerup));

    let mine = session.fire();
    assert_eq!(mine.len(), 1);
    assert_eq!(session.world().kind_of(mine[0]), Some(EntityKind::Mine));
    assert_eq!(session.player().ammo(), 15);
}

#[test]
fn test_laser_kill_scores_once() {
    let mut session = default_session();
    let mut rng = rng(21);
    session.on_start_trigger();
    session.tick(frame(), &mut rng);
    let enemy = session
        .world()
        .iter_sorted()
        .find(|i| i.body.kind() == EntityKind::Enemy)
        .map(|i| i.id)
        .unwrap();
    let laser = session.fire()[0];

    session.on_contact(Contact::Instances(laser, enemy));
    session.on_contact(Contact::Instances(laser, enemy));
    assert_eq!(session.player().score(), 10);
}

#[test]
fn test_movement_wraps_around_bounds() {
    let mut session = default_session();
    let bounds = session.config().world.player_bounds;
    session.move_player(Vec2Fixed::from_ints(1, 0), fixed(3));
    session.move_player(Vec2Fixed::from_ints(1, 0), fixed(3));
    let x = session.player().position().x;
    assert!(x >= bounds.min().x && x <= bounds.max().x);
}

#[test]
fn test_sessions_are_deterministic() {
    assert!(verify_session_determinism(default_session, 1234, 1200));
    assert_eq!(find_first_divergence(default_session, 99, 600), None);
    let hashes = run_parallel_sessions(default_session, 77, 3, 600);
    assert!(hashes.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_scenario_replay_survives_encoding() {
    let config = GameConfig::default();
    let scenario = ScenarioConfig {
        seed: 4,
        seconds: 30,
        ..ScenarioConfig::default()
    };
    let outcome = run_scenario(&config, default_catalog(), scenario).unwrap();
    assert_eq!(outcome.summary.ticks, 30 * 60);

    let bytes = outcome.replay.to_bytes().unwrap();
    let decoded = Replay::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, outcome.replay);
    assert_eq!(
        decoded.play(&config, default_catalog()).unwrap(),
        outcome.summary.state_hash
    );
}

#[test]
fn test_shipped_data_matches_defaults() {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data");
    let config = GameConfig::load(&data.join("game_config.ron")).unwrap();
    let catalog = Catalog::load(&data.join("catalog.ron")).unwrap();
    assert_eq!(config, GameConfig::default());
    assert_eq!(catalog, Catalog::default());
    assert!(Session::new(config, Arc::new(catalog)).is_ok());
}
