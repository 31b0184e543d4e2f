//! Player aggregate state.
//!
//! The player owns its shield, thruster and buff countdowns. Every
//! operation mutates state and appends the resulting notifications to the
//! caller's [`EventQueue`]; the session decides where they go.
//!
//! # Life cycle
//!
//! ```text
//! Alive --last life lost--> Dying(grace) --grace elapsed--> Destroyed
//! ```
//!
//! [`GameEvent::PlayerTerminal`] is raised on entering `Dying`,
//! [`GameEvent::PlayerDestroyed`] on entering `Destroyed`. Contacts, pickups
//! and fire requests after the terminal point are ignored.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, PlayerConfig};
use crate::data::{PowerupDescriptor, PowerupKind};
use crate::effects::{EffectKind, EffectTarget, EffectTracker};
use crate::error::Result;
use crate::events::{EventQueue, GameEvent};
use crate::math::{Fixed, Vec2Fixed};
use crate::region::Region;
use crate::shield::Shield;
use crate::thruster::{Propelled, Thruster};

/// Shape of a volley returned by [`Player::fire_weapon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectilePattern {
    /// One laser above the ship.
    Single,
    /// Three lasers in a spread.
    Triple,
    /// A stationary mine at the ship's position.
    Mine,
}

/// Wing damage overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageIndicators {
    /// Left wing shows damage.
    pub left_wing: bool,
    /// Right wing shows damage.
    pub right_wing: bool,
}

impl DamageIndicators {
    /// Overlays for a ship missing `missing` lives: none, then the left
    /// wing, then both.
    #[must_use]
    pub const fn for_missing_lives(missing: u32) -> Self {
        Self {
            left_wing: missing >= 1,
            right_wing: missing >= 2,
        }
    }
}

/// Where the ship is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifePhase {
    /// Flying.
    Alive,
    /// Out of lives; removed once the grace countdown runs out.
    Dying {
        /// Seconds until removal.
        remaining: Fixed,
    },
    /// Gone.
    Destroyed,
}

/// Attributes that buffs and the thruster modify.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerAttributes {
    /// Speed before any multiplier.
    pub base_speed: Fixed,
    /// Product of all active speed multipliers.
    pub speed_multiplier: Fixed,
    /// Shots fire three lasers.
    pub triple_shot: bool,
    /// Shots launch mines without using ammo.
    pub mine_mode: bool,
}

impl PlayerAttributes {
    fn new(base_speed: Fixed) -> Self {
        Self {
            base_speed,
            speed_multiplier: Fixed::ONE,
            triple_shot: false,
            mine_mode: false,
        }
    }

    /// Current movement speed.
    #[must_use]
    pub fn speed(&self) -> Fixed {
        self.base_speed * self.speed_multiplier
    }
}

impl EffectTarget for PlayerAttributes {
    fn apply_effect(&mut self, kind: EffectKind, magnitude: Fixed) {
        match kind {
            EffectKind::SpeedBoost => self.speed_multiplier *= magnitude,
            EffectKind::TripleShot => self.triple_shot = true,
            EffectKind::MineMode => self.mine_mode = true,
        }
    }

    fn revert_effect(&mut self, kind: EffectKind, magnitude: Fixed) {
        match kind {
            EffectKind::SpeedBoost => self.speed_multiplier /= magnitude,
            EffectKind::TripleShot => self.triple_shot = false,
            EffectKind::MineMode => self.mine_mode = false,
        }
    }
}

impl Propelled for PlayerAttributes {
    fn multiply_speed(&mut self, factor: Fixed) {
        self.speed_multiplier *= factor;
    }

    fn divide_speed(&mut self, factor: Fixed) {
        self.speed_multiplier /= factor;
    }
}

/// The player ship's rule state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    config: PlayerConfig,
    lives: u32,
    score: u32,
    ammo: u32,
    position: Vec2Fixed,
    attributes: PlayerAttributes,
    shield: Shield,
    thruster: Thruster,
    effects: EffectTracker,
    indicators: DamageIndicators,
    phase: LifePhase,
    /// Seconds since the session started.
    clock: Fixed,
    /// Earliest clock value at which the next shot may leave.
    next_fire_at: Fixed,
    /// Set after a laser contact so a duplicated report is skipped.
    ignore_next_laser: bool,
}

impl Player {
    /// Create a ship with full lives, ammo and fuel and no shield.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let player = &config.player;
        Ok(Self {
            config: player.clone(),
            lives: player.max_lives,
            score: 0,
            ammo: player.max_ammo,
            position: player.start_position,
            attributes: PlayerAttributes::new(player.base_speed),
            shield: Shield::new(&config.shield)?,
            thruster: Thruster::new(&config.thruster)?,
            effects: EffectTracker::new(),
            indicators: DamageIndicators::default(),
            phase: LifePhase::Alive,
            clock: Fixed::ZERO,
            next_fire_at: Fixed::ZERO,
            ignore_next_laser: false,
        })
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Life cap.
    #[must_use]
    pub const fn max_lives(&self) -> u32 {
        self.config.max_lives
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Laser ammo left.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Ammo capacity.
    #[must_use]
    pub const fn max_ammo(&self) -> u32 {
        self.config.max_ammo
    }

    /// Ship position.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Current movement speed including buffs and thrust.
    #[must_use]
    pub fn speed(&self) -> Fixed {
        self.attributes.speed()
    }

    /// Buffable attributes.
    #[must_use]
    pub const fn attributes(&self) -> &PlayerAttributes {
        &self.attributes
    }

    /// Shield sub-state.
    #[must_use]
    pub const fn shield(&self) -> &Shield {
        &self.shield
    }

    /// Thruster sub-state.
    #[must_use]
    pub const fn thruster(&self) -> &Thruster {
        &self.thruster
    }

    /// Running buff countdowns.
    #[must_use]
    pub const fn effects(&self) -> &EffectTracker {
        &self.effects
    }

    /// Visible wing damage.
    #[must_use]
    pub const fn damage_indicators(&self) -> DamageIndicators {
        self.indicators
    }

    /// Life-cycle phase.
    #[must_use]
    pub const fn phase(&self) -> LifePhase {
        self.phase
    }

    /// Whether the ship still accepts input and contacts.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.phase, LifePhase::Alive)
    }

    /// Whether the last life has been lost.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_alive()
    }

    /// Seconds of simulated time seen by this ship.
    #[must_use]
    pub const fn clock(&self) -> Fixed {
        self.clock
    }

    /// Consume a collected powerup.
    pub fn apply_powerup(&mut self, descriptor: &PowerupDescriptor, events: &mut EventQueue) {
        if !self.is_alive() {
            tracing::debug!(kind = ?descriptor.kind, "Powerup ignored after terminal state");
            return;
        }

        match descriptor.kind {
            PowerupKind::AmmoRefill => {
                self.ammo = self.config.max_ammo;
                events.push(GameEvent::ShotFired {
                    ammo_remaining: self.ammo,
                });
            }
            PowerupKind::Mine => {
                self.effects.activate(
                    EffectKind::MineMode,
                    descriptor.duration,
                    Fixed::ONE,
                    &mut self.attributes,
                );
            }
            PowerupKind::ExtraLife => {
                if self.lives < self.config.max_lives {
                    self.lives += 1;
                    events.push(GameEvent::LivesChanged { lives: self.lives });
                    self.refresh_indicators(events);
                }
            }
            PowerupKind::Speedup => {
                self.effects.activate(
                    EffectKind::SpeedBoost,
                    descriptor.duration,
                    self.config.speed_boost_factor,
                    &mut self.attributes,
                );
            }
            PowerupKind::TripleShot => {
                self.effects.activate(
                    EffectKind::TripleShot,
                    descriptor.duration,
                    Fixed::ONE,
                    &mut self.attributes,
                );
            }
            PowerupKind::Shield => self.shield.collect(events),
        }
    }

    /// Try to fire.
    ///
    /// Returns the volley shape if a projectile left the ship. Requests
    /// inside the cooldown are dropped; an empty magazine outside mine mode
    /// raises [`GameEvent::OutOfAmmo`] and nothing else.
    pub fn fire_weapon(&mut self, events: &mut EventQueue) -> Option<ProjectilePattern> {
        if !self.is_alive() {
            return None;
        }
        if self.clock < self.next_fire_at {
            tracing::debug!(clock = %self.clock, ready_at = %self.next_fire_at, "Fire dropped during cooldown");
            return None;
        }
        if self.ammo == 0 && !self.attributes.mine_mode {
            events.push(GameEvent::OutOfAmmo);
            return None;
        }

        self.next_fire_at = self.clock + self.config.fire_rate;
        let pattern = if self.attributes.mine_mode {
            ProjectilePattern::Mine
        } else {
            self.ammo -= 1;
            if self.attributes.triple_shot {
                ProjectilePattern::Triple
            } else {
                ProjectilePattern::Single
            }
        };

        events.push(GameEvent::ProjectileFired {
            pattern,
            origin: self.position,
        });
        events.push(GameEvent::ShotFired {
            ammo_remaining: self.ammo,
        });
        Some(pattern)
    }

    /// Offsets of each projectile in a volley, relative to the ship.
    #[must_use]
    pub fn volley_offsets(&self, pattern: ProjectilePattern) -> Vec<Vec2Fixed> {
        let up = Vec2Fixed::new(Fixed::ZERO, self.config.laser_offset);
        let spread = self.config.triple_shot_spread;
        match pattern {
            ProjectilePattern::Single => vec![up],
            ProjectilePattern::Triple => vec![
                Vec2Fixed::new(-spread, Fixed::ZERO),
                up,
                Vec2Fixed::new(spread, Fixed::ZERO),
            ],
            ProjectilePattern::Mine => vec![Vec2Fixed::ZERO],
        }
    }

    /// Damage from ramming an enemy or being hit by an enemy laser.
    pub fn on_enemy_contact(&mut self, events: &mut EventQueue) {
        if !self.is_alive() {
            tracing::debug!("Contact ignored after terminal state");
            return;
        }
        if self.shield.is_active() {
            self.shield.hit(events);
            return;
        }

        self.lives = self.lives.saturating_sub(1);
        events.push(GameEvent::LivesChanged { lives: self.lives });

        if self.lives == 0 {
            tracing::info!(score = self.score, "Player out of lives");
            self.phase = LifePhase::Dying {
                remaining: self.config.death_grace,
            };
            events.push(GameEvent::PlayerTerminal);
        } else {
            self.refresh_indicators(events);
        }
    }

    /// Pass an enemy laser contact through the double-report guard.
    ///
    /// The guard flips on every call, so of two reports of the same hit
    /// only the first returns true.
    pub fn accept_laser_contact(&mut self) -> bool {
        if self.ignore_next_laser {
            self.ignore_next_laser = false;
            tracing::debug!("Duplicate laser contact skipped");
            return false;
        }
        self.ignore_next_laser = true;
        true
    }

    /// Drop a pending skip once the duplicate has been recognised some
    /// other way.
    pub fn clear_laser_guard(&mut self) {
        self.ignore_next_laser = false;
    }

    /// Award points for a kill.
    pub fn on_enemy_death(&mut self, point_value: u32, events: &mut EventQueue) {
        self.score = self.score.saturating_add(point_value);
        if point_value > 0 {
            events.push(GameEvent::ScoreChanged { score: self.score });
        }
    }

    /// Start the thruster.
    pub fn thruster_on(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.thruster.turn_on(&mut self.attributes)
    }

    /// Stop the thruster.
    pub fn thruster_off(&mut self) -> bool {
        self.thruster.turn_off(&mut self.attributes)
    }

    /// Move along `axis` for `dt` seconds at the current speed.
    ///
    /// Axis components are clamped to `[-1, 1]`. Vertical motion is
    /// clamped to `bounds`; leaving either side wraps to the opposite edge.
    pub fn move_by(&mut self, axis: Vec2Fixed, dt: Fixed, bounds: &Region) {
        if matches!(self.phase, LifePhase::Destroyed) {
            return;
        }
        let axis = Vec2Fixed::new(
            axis.x.clamp(-Fixed::ONE, Fixed::ONE),
            axis.y.clamp(-Fixed::ONE, Fixed::ONE),
        );
        let step = axis.scale(self.attributes.speed() * dt);
        self.position = bounds.wrap_horizontal(self.position + step);
    }

    /// Advance the clock, fuel, buffs and the removal countdown.
    pub fn tick(&mut self, dt: Fixed, events: &mut EventQueue) {
        self.clock += dt;
        self.thruster.tick(dt, &mut self.attributes, events);
        self.effects.tick(dt, &mut self.attributes, events);

        if let LifePhase::Dying { remaining } = self.phase {
            let remaining = remaining - dt;
            if remaining <= Fixed::ZERO {
                self.phase = LifePhase::Destroyed;
                tracing::info!("Player destroyed");
                events.push(GameEvent::PlayerDestroyed);
            } else {
                self.phase = LifePhase::Dying { remaining };
            }
        }
    }

    fn refresh_indicators(&mut self, events: &mut EventQueue) {
        let missing = self.config.max_lives.saturating_sub(self.lives);
        let indicators = DamageIndicators::for_missing_lives(missing);
        if indicators != self.indicators {
            self.indicators = indicators;
            events.push(GameEvent::DamageIndicatorsChanged { indicators });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&GameConfig::default()).unwrap()
    }

    fn powerup(kind: PowerupKind) -> PowerupDescriptor {
        PowerupDescriptor::new(kind)
    }

    fn secs(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    /// Fire, then wait out the cooldown.
    fn fire_and_wait(p: &mut Player, events: &mut EventQueue) -> Option<ProjectilePattern> {
        let shot = p.fire_weapon(events);
        p.tick(secs(0.25), events);
        shot
    }

    #[test]
    fn test_new_player_defaults() {
        let p = player();
        assert_eq!(p.lives(), 3);
        assert_eq!(p.ammo(), 15);
        assert_eq!(p.score(), 0);
        assert!(!p.shield().is_active());
        assert_eq!(p.thruster().level(), Fixed::ONE);
        assert_eq!(p.speed(), secs(5.0));
        assert!(p.is_alive());
    }

    #[test]
    fn test_fifteen_shots_then_empty() {
        let mut p = player();
        let mut events = EventQueue::new();

        for expected in (0..15).rev() {
            assert_eq!(fire_and_wait(&mut p, &mut events), Some(ProjectilePattern::Single));
            assert_eq!(p.ammo(), expected);
        }
        let shot_events = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ShotFired { .. }))
            .count();
        assert_eq!(shot_events, 15);

        events.clear();
        assert_eq!(fire_and_wait(&mut p, &mut events), None);
        assert_eq!(p.ammo(), 0);
        assert_eq!(events, vec![GameEvent::OutOfAmmo]);
    }

    #[test]
    fn test_cooldown_drops_rapid_fire() {
        let mut p = player();
        let mut events = EventQueue::new();
        assert!(p.fire_weapon(&mut events).is_some());
        assert!(p.fire_weapon(&mut events).is_none());
        p.tick(secs(0.1), &mut events);
        assert!(p.fire_weapon(&mut events).is_none());
        p.tick(secs(0.1), &mut events);
        assert!(p.fire_weapon(&mut events).is_some());
        assert_eq!(p.ammo(), 13);
    }

    #[test]
    fn test_triple_shot_pattern_and_expiry() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.apply_powerup(&powerup(PowerupKind::TripleShot), &mut events);
        assert_eq!(fire_and_wait(&mut p, &mut events), Some(ProjectilePattern::Triple));
        assert_eq!(p.ammo(), 14);

        p.tick(secs(5.0), &mut events);
        assert_eq!(fire_and_wait(&mut p, &mut events), Some(ProjectilePattern::Single));
        assert_eq!(p.volley_offsets(ProjectilePattern::Triple).len(), 3);
    }

    #[test]
    fn test_mine_mode_fires_without_ammo() {
        let mut p = player();
        let mut events = EventQueue::new();
        for _ in 0..15 {
            fire_and_wait(&mut p, &mut events);
        }
        assert_eq!(p.ammo(), 0);

        p.apply_powerup(&powerup(PowerupKind::Mine), &mut events);
        events.clear();
        assert_eq!(fire_and_wait(&mut p, &mut events), Some(ProjectilePattern::Mine));
        assert_eq!(p.ammo(), 0);
        assert!(events.contains(&GameEvent::ShotFired { ammo_remaining: 0 }));
        assert!(!events.contains(&GameEvent::OutOfAmmo));
    }

    #[test]
    fn test_ammo_refill_notifies() {
        let mut p = player();
        let mut events = EventQueue::new();
        fire_and_wait(&mut p, &mut events);
        events.clear();
        p.apply_powerup(&powerup(PowerupKind::AmmoRefill), &mut events);
        assert_eq!(p.ammo(), 15);
        assert_eq!(events, vec![GameEvent::ShotFired { ammo_remaining: 15 }]);
    }

    #[test]
    fn test_speed_boost_and_thruster_compose() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.apply_powerup(&powerup(PowerupKind::Speedup), &mut events);
        assert_eq!(p.speed(), secs(10.0));
        assert!(p.thruster_on());
        assert_eq!(p.speed(), secs(20.0));
        p.tick(secs(5.0), &mut events);
        assert_eq!(p.speed(), secs(10.0));
        p.thruster_off();
        assert_eq!(p.speed(), secs(5.0));
    }

    #[test]
    fn test_three_contacts_with_shield() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.apply_powerup(&powerup(PowerupKind::Shield), &mut events);
        assert_eq!(p.shield().strength(), 2);

        for expected in [1, 0, -1] {
            p.on_enemy_contact(&mut events);
            assert_eq!(p.shield().strength(), expected);
            assert_eq!(p.lives(), 3);
        }
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LivesChanged { .. })));

        p.on_enemy_contact(&mut events);
        assert_eq!(p.lives(), 2);
        assert!(events.contains(&GameEvent::LivesChanged { lives: 2 }));
    }

    #[test]
    fn test_damage_indicators_follow_lives() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.on_enemy_contact(&mut events);
        assert_eq!(
            p.damage_indicators(),
            DamageIndicators {
                left_wing: true,
                right_wing: false
            }
        );
        p.on_enemy_contact(&mut events);
        assert_eq!(
            p.damage_indicators(),
            DamageIndicators {
                left_wing: true,
                right_wing: true
            }
        );
        p.apply_powerup(&powerup(PowerupKind::ExtraLife), &mut events);
        assert_eq!(p.lives(), 2);
        assert!(!p.damage_indicators().right_wing);
    }

    #[test]
    fn test_extra_life_at_cap_is_silent() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.apply_powerup(&powerup(PowerupKind::ExtraLife), &mut events);
        assert_eq!(p.lives(), 3);
        assert!(events.is_empty());
    }

    #[test]
    fn test_terminal_once_then_destroyed_after_grace() {
        let mut p = player();
        let mut events = EventQueue::new();
        for _ in 0..5 {
            p.on_enemy_contact(&mut events);
        }
        assert_eq!(p.lives(), 0);
        let terminals = events
            .iter()
            .filter(|e| **e == GameEvent::PlayerTerminal)
            .count();
        assert_eq!(terminals, 1);
        assert!(p.fire_weapon(&mut events).is_none());

        events.clear();
        p.tick(secs(0.25), &mut events);
        assert!(events.is_empty());
        p.tick(secs(0.25), &mut events);
        assert_eq!(events, vec![GameEvent::PlayerDestroyed]);
        assert_eq!(p.phase(), LifePhase::Destroyed);
    }

    #[test]
    fn test_score_only_notified_for_points() {
        let mut p = player();
        let mut events = EventQueue::new();
        p.on_enemy_death(0, &mut events);
        assert!(events.is_empty());
        p.on_enemy_death(10, &mut events);
        assert_eq!(p.score(), 10);
        assert_eq!(events, vec![GameEvent::ScoreChanged { score: 10 }]);
    }

    #[test]
    fn test_laser_guard_toggles() {
        let mut p = player();
        assert!(p.accept_laser_contact());
        assert!(!p.accept_laser_contact());
        assert!(p.accept_laser_contact());
    }

    #[test]
    fn test_move_wraps_and_clamps() {
        let mut p = player();
        let bounds = GameConfig::default().world.player_bounds;

        p.move_by(Vec2Fixed::from_ints(0, -1), secs(10.0), &bounds);
        assert_eq!(p.position().y, bounds.min().y);

        p.move_by(Vec2Fixed::from_ints(1, 0), secs(3.0), &bounds);
        assert_eq!(p.position().x, bounds.min().x);
    }

    #[test]
    fn test_oversized_axis_moves_at_full_speed_only() {
        let mut p = player();
        let bounds = GameConfig::default().world.player_bounds;
        p.move_by(Vec2Fixed::from_ints(1000, 0), secs(0.5), &bounds);
        assert_eq!(p.position().x, secs(2.5));
    }

    #[test]
    fn test_cleared_guard_accepts_next_laser() {
        let mut p = player();
        assert!(p.accept_laser_contact());
        p.clear_laser_guard();
        assert!(p.accept_laser_contact());
    }

    #[test]
    fn test_identical_players_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let digest = |p: &Player| {
            let mut hasher = DefaultHasher::new();
            p.hash(&mut hasher);
            hasher.finish()
        };
        let mut a = player();
        let b = player();
        assert_eq!(digest(&a), digest(&b));
        a.tick(secs(0.5), &mut Vec::new());
        assert_ne!(digest(&a), digest(&b));
    }
}
