//! Spawn director.
//!
//! Paces enemy and powerup emission. The director sits idle until the
//! start trigger, emits on two independent countdowns while spawning, and
//! stops for good when the player is out of lives.
//!
//! ```text
//! Idle --start--> Spawning --player terminal--> Stopped
//! ```
//!
//! Both emitters fire on the first tick after the trigger and re-arm
//! afterwards. Each checks its own flag at the top of every cycle, so once
//! [`SpawnDirector::stop`] flips the flags nothing is emitted again.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, SpawnConfig};
use crate::data::{Catalog, PowerupDescriptor};
use crate::error::{GameError, Result};
use crate::events::{EventQueue, GameEvent};
use crate::math::{random_range, unit_draw, Fixed, Vec2Fixed};
use crate::region::Region;
use crate::world::World;

/// Director life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectorPhase {
    /// Waiting for the start trigger.
    Idle,
    /// Emitting.
    Spawning,
    /// Finished for this session.
    Stopped,
}

/// Enemy and powerup pacing.
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    catalog: Arc<Catalog>,
    config: SpawnConfig,
    screen: Region,
    player_bounds: Region,
    phase: DirectorPhase,
    enemy_spawning: bool,
    powerup_spawning: bool,
    /// Seconds until the next enemy.
    enemy_countdown: Fixed,
    /// Seconds until the next powerup.
    powerup_countdown: Fixed,
}

impl SpawnDirector {
    /// Create an idle director.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyCatalog`] if the catalog has nothing to
    /// emit.
    pub fn new(config: &GameConfig, catalog: Arc<Catalog>) -> Result<Self> {
        if catalog.enemies.is_empty() {
            return Err(GameError::EmptyCatalog("enemies".into()));
        }
        if catalog.regular_powerup_count() == 0 {
            return Err(GameError::EmptyCatalog("powerups (regular)".into()));
        }
        Ok(Self {
            catalog,
            config: config.spawn.clone(),
            screen: config.world.screen_bounds,
            player_bounds: config.world.player_bounds,
            phase: DirectorPhase::Idle,
            enemy_spawning: false,
            powerup_spawning: false,
            enemy_countdown: Fixed::ZERO,
            powerup_countdown: Fixed::ZERO,
        })
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DirectorPhase {
        self.phase
    }

    /// Whether enemies are being emitted.
    #[must_use]
    pub const fn enemy_spawning(&self) -> bool {
        self.enemy_spawning
    }

    /// Whether powerups are being emitted.
    #[must_use]
    pub const fn powerup_spawning(&self) -> bool {
        self.powerup_spawning
    }

    /// Shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Begin emitting. Only the first trigger of a session counts.
    pub fn start(&mut self, events: &mut EventQueue) -> bool {
        if self.phase != DirectorPhase::Idle {
            tracing::warn!(phase = ?self.phase, "Start trigger ignored");
            return false;
        }
        self.phase = DirectorPhase::Spawning;
        self.enemy_spawning = true;
        self.powerup_spawning = true;
        self.enemy_countdown = Fixed::ZERO;
        self.powerup_countdown = Fixed::ZERO;
        tracing::info!("Spawning started");
        events.push(GameEvent::SpawningStarted);
        true
    }

    /// Stop for good: both emitters at once, then clear the field.
    pub fn stop(&mut self, world: &mut World, events: &mut EventQueue) -> bool {
        if self.phase == DirectorPhase::Stopped {
            return false;
        }
        self.enemy_spawning = false;
        self.powerup_spawning = false;
        self.phase = DirectorPhase::Stopped;

        let count = world.sweep();
        tracing::info!(swept = count, "Spawning stopped");
        events.push(GameEvent::EntitiesSwept { count });
        events.push(GameEvent::SpawningStopped);
        true
    }

    /// Run both emitters for `dt` seconds.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: Fixed,
        world: &mut World,
        rng: &mut R,
        events: &mut EventQueue,
    ) {
        if self.enemy_spawning {
            self.enemy_countdown -= dt;
            if self.enemy_countdown <= Fixed::ZERO {
                self.emit_enemy(world, rng, events);
                self.enemy_countdown = self.config.enemy_interval;
            }
        }

        if self.powerup_spawning {
            self.powerup_countdown -= dt;
            if self.powerup_countdown <= Fixed::ZERO {
                self.emit_powerup(world, rng, events);
                self.powerup_countdown = random_range(
                    rng,
                    self.config.powerup_interval_min,
                    self.config.powerup_interval_max,
                );
            }
        }
    }

    /// Pick a powerup variant: the rare pool with the configured
    /// probability (when it has entries), otherwise the regular pool, then
    /// a uniform entry of that pool.
    pub fn select_powerup<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PowerupDescriptor> {
        let rare = unit_draw(rng) < self.config.rare_probability
            && self.catalog.rare_powerup_count() > 0;
        let pool_len = if rare {
            self.catalog.rare_powerup_count()
        } else {
            self.catalog.regular_powerup_count()
        };
        if pool_len == 0 {
            return None;
        }
        let index = rng.gen_range(0..pool_len);
        self.catalog.powerup_in_pool(rare, index).copied()
    }

    fn emit_enemy<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R, events: &mut EventQueue) {
        let index = rng.gen_range(0..self.catalog.enemies.len());
        let Some(descriptor) = self.catalog.enemies.get(index) else {
            return;
        };
        let position = Vec2Fixed::new(
            random_range(rng, self.screen.min().x, self.screen.max().x),
            self.screen.max().y,
        );
        let id = world.spawn_enemy(descriptor.clone(), position);
        tracing::debug!(id, enemy = %descriptor.id, "Enemy spawned");
        events.push(GameEvent::EnemySpawned { id, position });
    }

    fn emit_powerup<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R, events: &mut EventQueue) {
        let Some(descriptor) = self.select_powerup(rng) else {
            tracing::warn!("No powerup available to spawn");
            return;
        };
        // Player bounds are wider than the screen; keep the drop visible.
        let low = self.player_bounds.min().x.max(self.screen.min().x);
        let high = self.player_bounds.max().x.min(self.screen.max().x);
        let position = Vec2Fixed::new(random_range(rng, low, high), self.screen.max().y);
        let id = world.spawn_powerup(descriptor, position);
        tracing::debug!(id, kind = ?descriptor.kind, rare = descriptor.rare, "Powerup spawned");
        events.push(GameEvent::PowerupSpawned {
            id,
            descriptor,
            position,
        });
    }
}
