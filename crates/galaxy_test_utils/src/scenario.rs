//! Scripted headless scenarios.
//!
//! The rule engine expects a host to report collisions. Headless runs use
//! [`detect_contacts`] instead: a simple radius check between the ship and
//! every live instance. A [`Pilot`] then plays the game with a fixed
//! script: sweep side to side, fire on a cadence, burn the thruster in
//! bursts and let the lowest enemy shoot back now and then. Every input
//! goes through a [`RecordingSession`], so each run doubles as a replay.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use galaxy_core::config::GameConfig;
use galaxy_core::data::Catalog;
use galaxy_core::error::Result;
use galaxy_core::math::{Fixed, Vec2Fixed};
use galaxy_core::replay::{RecordingSession, Replay};
use galaxy_core::session::{Contact, Session, SessionInput, SessionSummary};
use galaxy_core::world::EntityKind;

/// Knobs for a scripted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Seed for the session's generator.
    pub seed: u64,
    /// Simulated seconds to run.
    pub seconds: u32,
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Fire every this many ticks.
    pub fire_every: u32,
    /// The lowest enemy fires every this many ticks (0 disables).
    pub enemy_fire_every: u32,
    /// Contact distance for the proximity check.
    pub contact_radius: Fixed,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            seconds: 60,
            tick_rate: 60,
            fire_every: 12,
            enemy_fire_every: 150,
            contact_radius: Fixed::from_num(0.75),
        }
    }
}

/// What a scripted run produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Final headline numbers.
    pub summary: SessionSummary,
    /// Published events per kind.
    pub event_counts: BTreeMap<String, u64>,
    /// Everything needed to reproduce the run.
    pub replay: Replay,
}

/// Contacts a physics layer would report for the current positions.
///
/// The ship collides with enemies, enemy lasers and powerups; player
/// lasers and mines collide with enemies. Results are in id order.
#[must_use]
pub fn detect_contacts(session: &Session, radius: Fixed) -> Vec<Contact> {
    let reach = radius * radius;
    let ship = session.player().position();
    let world = session.world();
    let mut contacts = Vec::new();

    let enemies: Vec<_> = world
        .iter_sorted()
        .filter(|i| i.body.kind() == EntityKind::Enemy)
        .collect();

    for instance in world.iter_sorted() {
        match instance.body.kind() {
            EntityKind::Enemy | EntityKind::EnemyLaser | EntityKind::Powerup => {
                if instance.position.distance_squared(ship) <= reach {
                    contacts.push(Contact::Player(instance.id));
                }
            }
            EntityKind::PlayerLaser | EntityKind::Mine => {
                if let Some(enemy) = enemies
                    .iter()
                    .find(|e| e.position.distance_squared(instance.position) <= reach)
                {
                    contacts.push(Contact::Instances(instance.id, enemy.id));
                }
            }
            EntityKind::Player => {}
        }
    }
    contacts
}

/// Scripted player.
#[derive(Debug)]
pub struct Pilot {
    scenario: ScenarioConfig,
    recording: RecordingSession,
    counts: Rc<RefCell<BTreeMap<String, u64>>>,
    heading: i32,
}

impl Pilot {
    /// Build a pilot and its recorded session.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the session cannot be built.
    pub fn new(config: GameConfig, catalog: Arc<Catalog>, scenario: ScenarioConfig) -> Result<Self> {
        let mut recording = RecordingSession::new(config, catalog, scenario.seed)?;
        let counts = Rc::new(RefCell::new(BTreeMap::new()));
        let sink = Rc::clone(&counts);
        recording.session_mut().bus_mut().subscribe_all(move |event| {
            *sink
                .borrow_mut()
                .entry(format!("{:?}", event.kind()))
                .or_insert(0) += 1;
        });
        Ok(Self {
            scenario,
            recording,
            counts,
            heading: 1,
        })
    }

    /// The live session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        self.recording.session()
    }

    /// Play one frame of the script.
    pub fn step(&mut self, frame: u32) {
        let dt = Fixed::ONE / Fixed::from_num(self.scenario.tick_rate.max(1));

        self.recording.apply(SessionInput::Tick { dt });

        let bounds = self.session().config().world.player_bounds;
        let x = self.session().player().position().x;
        if x >= bounds.max().x - Fixed::ONE {
            self.heading = -1;
        } else if x <= bounds.min().x + Fixed::ONE {
            self.heading = 1;
        }
        self.recording.apply(SessionInput::Move {
            axis: Vec2Fixed::from_ints(self.heading, 0),
            dt,
        });

        // Burn for two seconds out of every ten.
        let second = frame / self.scenario.tick_rate.max(1);
        if second % 10 == 0 {
            self.recording.apply(SessionInput::ThrusterOn);
        } else if second % 10 == 2 {
            self.recording.apply(SessionInput::ThrusterOff);
        }

        if self.scenario.fire_every > 0 && frame % self.scenario.fire_every == 0 {
            self.recording.apply(SessionInput::Fire);
        }

        if self.scenario.enemy_fire_every > 0 && frame % self.scenario.enemy_fire_every == 0 {
            let lowest = self
                .session()
                .world()
                .iter_sorted()
                .filter(|i| i.body.kind() == EntityKind::Enemy)
                .min_by_key(|i| i.position.y)
                .map(|i| i.position);
            if let Some(position) = lowest {
                self.recording.apply(SessionInput::EnemyFire { position });
            }
        }

        for contact in detect_contacts(self.session(), self.scenario.contact_radius) {
            self.recording.apply(SessionInput::Contact(contact));
        }
    }

    /// Run the whole script and hand back the outcome.
    #[must_use]
    pub fn run(mut self) -> ScenarioOutcome {
        self.recording.apply(SessionInput::StartTrigger);
        let frames = self.scenario.seconds.saturating_mul(self.scenario.tick_rate);
        for frame in 0..frames {
            self.step(frame);
        }
        let summary = self.session().summary();
        tracing::info!(
            seed = self.scenario.seed,
            score = summary.score,
            lives = summary.lives,
            "Scenario finished"
        );
        let event_counts = self.counts.borrow().clone();
        ScenarioOutcome {
            summary,
            event_counts,
            replay: self.recording.finish(),
        }
    }
}

/// Run one scripted scenario.
///
/// # Errors
///
/// Returns a configuration error if the session cannot be built.
pub fn run_scenario(
    config: &GameConfig,
    catalog: Arc<Catalog>,
    scenario: ScenarioConfig,
) -> Result<ScenarioOutcome> {
    Ok(Pilot::new(config.clone(), catalog, scenario)?.run())
}
