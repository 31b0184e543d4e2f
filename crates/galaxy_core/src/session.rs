//! Host-facing game session.
//!
//! A [`Session`] owns the player, the spawn director, the instance registry
//! and the event bus. The host drives it with one [`Session::tick`] per
//! frame plus discrete calls for the start trigger, contacts and input.
//!
//! # Tick order
//!
//! 1. **Player** - clock, fuel, buff countdowns, removal grace
//! 2. **World** - projectile and enemy kinematics
//! 3. **Director** - enemy and powerup emission
//! 4. **Dispatch** - route and publish everything produced above
//!
//! # Dispatch
//!
//! Events are handled first-in first-out. Each is routed to the internal
//! listeners (the director stops on [`GameEvent::PlayerTerminal`], the
//! player scores on [`GameEvent::EnemyDeath`]) and then published on the
//! bus. Events raised by a listener join the back of the queue, so bus
//! subscribers always see events in the order they were produced.
//!
//! # Determinism
//!
//! Given the same config, catalog, seed and input stream, two sessions
//! produce the same [`Session::state_hash`]. All randomness comes from the
//! `Rng` the host passes in.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::Catalog;
use crate::error::Result;
use crate::events::{EventBus, EventQueue, GameEvent};
use crate::math::{Fixed, Vec2Fixed};
use crate::player::{Player, ProjectilePattern};
use crate::spawn::{DirectorPhase, SpawnDirector};
use crate::world::{Body, EntityId, EntityKind, World};

/// A contact reported by the host's collision layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contact {
    /// The player ship touched a tracked instance.
    Player(EntityId),
    /// Two tracked instances touched.
    Instances(EntityId, EntityId),
}

/// One recorded host input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionInput {
    /// Advance time.
    Tick {
        /// Seconds elapsed.
        dt: Fixed,
    },
    /// The scripted start trigger fired.
    StartTrigger,
    /// A collision was reported.
    Contact(Contact),
    /// Fire pressed.
    Fire,
    /// Thruster pressed.
    ThrusterOn,
    /// Thruster released.
    ThrusterOff,
    /// Movement input held for `dt` seconds.
    Move {
        /// Input axis, each component in `[-1, 1]`.
        axis: Vec2Fixed,
        /// Seconds the input was held.
        dt: Fixed,
    },
    /// An enemy fired at `position`.
    EnemyFire {
        /// Muzzle position.
        position: Vec2Fixed,
    },
}

/// Snapshot of headline numbers, for tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Ticks run.
    pub ticks: u64,
    /// Simulated seconds.
    pub elapsed_seconds: f64,
    /// Player score.
    pub score: u32,
    /// Player lives.
    pub lives: u32,
    /// Laser ammo left.
    pub ammo: u32,
    /// Fuel in `[0, 1]`.
    pub fuel: f64,
    /// Shield strength, -1 when down.
    pub shield_strength: i32,
    /// Director phase.
    pub director: DirectorPhase,
    /// Live tracked instances.
    pub live_instances: usize,
    /// Events delivered on the bus.
    pub events_published: u64,
    /// Lasers and powerups that left the screen.
    pub instances_despawned: u64,
    /// Enemies that passed the bottom edge and re-entered at the top.
    pub enemies_recycled: u64,
    /// Final state hash.
    pub state_hash: u64,
}

/// The rule engine of one play session.
pub struct Session {
    config: GameConfig,
    catalog: Arc<Catalog>,
    player: Player,
    director: SpawnDirector,
    world: World,
    bus: EventBus,
    pending: VecDeque<GameEvent>,
    /// Enemy lasers that hit the player, removed at the next world phase so
    /// a duplicated report still resolves.
    spent_lasers: Vec<EntityId>,
    ticks: u64,
    elapsed: Fixed,
    events_published: u64,
    instances_despawned: u64,
    enemies_recycled: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ticks", &self.ticks)
            .field("player", &self.player)
            .field("director", &self.director.phase())
            .field("live_instances", &self.world.len())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from validated tuning and a shared catalog.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either input fails validation.
    pub fn new(config: GameConfig, catalog: Arc<Catalog>) -> Result<Self> {
        config.validate()?;
        catalog.validate()?;
        let player = Player::new(&config)?;
        let director = SpawnDirector::new(&config, Arc::clone(&catalog))?;
        let world = World::new(&config.world);
        tracing::info!(
            powerups = catalog.powerups.len(),
            enemies = catalog.enemies.len(),
            "Session created"
        );
        Ok(Self {
            config,
            catalog,
            player,
            director,
            world,
            bus: EventBus::new(),
            pending: VecDeque::new(),
            spent_lasers: Vec::new(),
            ticks: 0,
            elapsed: Fixed::ZERO,
            events_published: 0,
            instances_despawned: 0,
            enemies_recycled: 0,
        })
    }

    /// Session tuning.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Player state.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Spawn director state.
    #[must_use]
    pub const fn director(&self) -> &SpawnDirector {
        &self.director
    }

    /// Live instances.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Subscribe here for notifications.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds so far.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Advance the session by `dt` seconds.
    ///
    /// Steps longer than `world.max_tick_seconds` are cut to that length.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Fixed, rng: &mut R) {
        let dt = self.frame_step(dt);
        let mut produced = EventQueue::new();

        self.player.tick(dt, &mut produced);

        for id in self.spent_lasers.drain(..) {
            self.world.remove(id);
        }
        let report = self.world.tick(dt, rng);
        self.instances_despawned += report.despawned.len() as u64;
        self.enemies_recycled += report.recycled.len() as u64;

        self.director.tick(dt, &mut self.world, rng, &mut produced);

        self.ticks += 1;
        self.elapsed += dt;
        self.dispatch(produced);

        #[cfg(feature = "debug-validation")]
        self.check_invariants();
    }

    /// The scripted start trigger. Only the first call does anything.
    pub fn on_start_trigger(&mut self) -> bool {
        let mut produced = EventQueue::new();
        let started = self.director.start(&mut produced);
        self.dispatch(produced);
        started
    }

    /// Resolve a collision reported by the host.
    pub fn on_contact(&mut self, contact: Contact) {
        let mut produced = EventQueue::new();
        match contact {
            Contact::Player(id) => self.player_contact(id, &mut produced),
            Contact::Instances(a, b) => self.instance_contact(a, b, &mut produced),
        }
        self.dispatch(produced);
    }

    /// Fire pressed. Returns the ids of the projectiles that were spawned.
    pub fn fire(&mut self) -> Vec<EntityId> {
        let mut produced = EventQueue::new();
        let mut spawned = Vec::new();
        if let Some(pattern) = self.player.fire_weapon(&mut produced) {
            let origin = self.player.position();
            for offset in self.player.volley_offsets(pattern) {
                let body = match pattern {
                    ProjectilePattern::Mine => Body::Mine,
                    ProjectilePattern::Single | ProjectilePattern::Triple => Body::PlayerLaser,
                };
                spawned.push(self.world.insert(body, origin + offset));
            }
        }
        self.dispatch(produced);
        spawned
    }

    /// Thruster pressed.
    pub fn thruster_on(&mut self) -> bool {
        self.player.thruster_on()
    }

    /// Thruster released.
    pub fn thruster_off(&mut self) -> bool {
        self.player.thruster_off()
    }

    /// Movement input held for `dt` seconds.
    pub fn move_player(&mut self, axis: Vec2Fixed, dt: Fixed) {
        let bounds = self.config.world.player_bounds;
        let dt = self.frame_step(dt);
        self.player.move_by(axis, dt, &bounds);
    }

    /// Register a laser fired by an enemy. The muzzle is clamped onto the
    /// screen.
    pub fn spawn_enemy_laser(&mut self, position: Vec2Fixed) -> EntityId {
        let position = self.world.screen().clamp(position);
        self.world.insert(Body::EnemyLaser, position)
    }

    fn frame_step(&self, dt: Fixed) -> Fixed {
        let max = self.config.world.max_tick_seconds;
        if dt > max {
            tracing::debug!(%dt, %max, "Long frame shortened");
        }
        dt.clamp(Fixed::ZERO, max)
    }

    /// Start over with the same config and catalog. Bus subscriptions are
    /// kept.
    ///
    /// # Errors
    ///
    /// Propagates construction errors of the player or director.
    pub fn reset(&mut self) -> Result<()> {
        self.player = Player::new(&self.config)?;
        self.director = SpawnDirector::new(&self.config, Arc::clone(&self.catalog))?;
        self.world = World::new(&self.config.world);
        self.pending.clear();
        self.spent_lasers.clear();
        self.ticks = 0;
        self.elapsed = Fixed::ZERO;
        self.events_published = 0;
        self.instances_despawned = 0;
        self.enemies_recycled = 0;
        tracing::info!("Session reset");
        Ok(())
    }

    /// Apply one recorded input.
    pub fn apply_input<R: Rng + ?Sized>(&mut self, input: SessionInput, rng: &mut R) {
        match input {
            SessionInput::Tick { dt } => self.tick(dt, rng),
            SessionInput::StartTrigger => {
                self.on_start_trigger();
            }
            SessionInput::Contact(contact) => self.on_contact(contact),
            SessionInput::Fire => {
                self.fire();
            }
            SessionInput::ThrusterOn => {
                self.thruster_on();
            }
            SessionInput::ThrusterOff => {
                self.thruster_off();
            }
            SessionInput::Move { axis, dt } => self.move_player(axis, dt),
            SessionInput::EnemyFire { position } => {
                self.spawn_enemy_laser(position);
            }
        }
    }

    /// Hash of all rule state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.ticks.hash(&mut hasher);
        self.elapsed.to_bits().hash(&mut hasher);
        self.player.hash(&mut hasher);

        self.director.phase().hash(&mut hasher);
        self.director.enemy_spawning().hash(&mut hasher);
        self.director.powerup_spawning().hash(&mut hasher);

        self.world.len().hash(&mut hasher);
        for instance in self.world.iter_sorted() {
            instance.hash(&mut hasher);
        }
        self.spent_lasers.hash(&mut hasher);

        let hash = hasher.finish();
        tracing::debug!(tick = self.ticks, hash, "State hash");
        hash
    }

    /// Headline numbers for tooling.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            ticks: self.ticks,
            elapsed_seconds: self.elapsed.to_num(),
            score: self.player.score(),
            lives: self.player.lives(),
            ammo: self.player.ammo(),
            fuel: self.player.thruster().level().to_num(),
            shield_strength: self.player.shield().strength(),
            director: self.director.phase(),
            live_instances: self.world.len(),
            events_published: self.events_published,
            instances_despawned: self.instances_despawned,
            enemies_recycled: self.enemies_recycled,
            state_hash: self.state_hash(),
        }
    }

    fn player_contact(&mut self, id: EntityId, produced: &mut EventQueue) {
        match self.world.kind_of(id) {
            Some(EntityKind::Enemy) => {
                self.player.on_enemy_contact(produced);
                self.world.remove(id);
                produced.push(GameEvent::EnemyDeath { point_value: 0 });
            }
            Some(EntityKind::EnemyLaser) => {
                if self.spent_lasers.contains(&id) {
                    tracing::debug!(id, "Repeated report of a spent laser");
                    self.player.clear_laser_guard();
                } else if self.player.accept_laser_contact() {
                    self.player.on_enemy_contact(produced);
                    self.spent_lasers.push(id);
                }
            }
            Some(EntityKind::Powerup) => {
                let Some(instance) = self.world.remove(id) else {
                    return;
                };
                if let Body::Powerup(descriptor) = instance.body {
                    produced.push(GameEvent::PowerupCollected { descriptor });
                    self.player.apply_powerup(&descriptor, produced);
                }
            }
            Some(kind) => tracing::debug!(id, ?kind, "Ignored player contact"),
            None => tracing::warn!(id, "Player contact with unknown or consumed instance"),
        }
    }

    fn instance_contact(&mut self, a: EntityId, b: EntityId, produced: &mut EventQueue) {
        let (Some(kind_a), Some(kind_b)) = (self.world.kind_of(a), self.world.kind_of(b)) else {
            tracing::warn!(a, b, "Contact with unknown or consumed instance");
            return;
        };
        let (weapon, enemy) = match (kind_a, kind_b) {
            (EntityKind::PlayerLaser | EntityKind::Mine, EntityKind::Enemy) => (a, b),
            (EntityKind::Enemy, EntityKind::PlayerLaser | EntityKind::Mine) => (b, a),
            _ => {
                tracing::debug!(?kind_a, ?kind_b, "Ignored contact");
                return;
            }
        };

        self.world.remove(weapon);
        if let Some(instance) = self.world.remove(enemy) {
            if let Body::Enemy(descriptor) = instance.body {
                produced.push(GameEvent::EnemyDeath {
                    point_value: descriptor.point_value,
                });
            }
        }
    }

    fn dispatch(&mut self, produced: EventQueue) {
        self.pending.extend(produced);
        while let Some(event) = self.pending.pop_front() {
            let mut follow_up = EventQueue::new();
            self.route(&event, &mut follow_up);
            self.pending.extend(follow_up);
            self.bus.publish(&event);
            self.events_published += 1;
        }
    }

    fn route(&mut self, event: &GameEvent, follow_up: &mut EventQueue) {
        match event {
            GameEvent::PlayerTerminal => {
                self.director.stop(&mut self.world, follow_up);
                self.spent_lasers.clear();
            }
            GameEvent::EnemyDeath { point_value } => {
                self.player.on_enemy_death(*point_value, follow_up);
            }
            _ => {}
        }
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        let player = &self.player;
        debug_assert!(player.lives() <= player.max_lives());
        debug_assert!(player.ammo() <= player.max_ammo());
        let fuel = player.thruster().level();
        debug_assert!(fuel >= Fixed::ZERO && fuel <= Fixed::ONE);
        let strength = player.shield().strength();
        debug_assert!(strength >= crate::shield::SHIELD_DOWN);
        debug_assert!(strength <= player.shield().max_strength());
        if self.director.phase() == DirectorPhase::Stopped {
            debug_assert!(!self.director.enemy_spawning() && !self.director.powerup_spawning());
        }
    }
}
