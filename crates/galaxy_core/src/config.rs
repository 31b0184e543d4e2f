//! Tuning tables for a session.
//!
//! One [`GameConfig`] is built at startup (usually from
//! `assets/data/game_config.ron`) and handed by reference to every
//! component that needs it. Defaults reproduce the shipped game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::read_data_file;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::region::Region;

/// Player tuning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Lives at session start, also the cap for extra-life pickups.
    pub max_lives: u32,
    /// Laser ammo capacity; the ship starts full.
    pub max_ammo: u32,
    /// Minimum seconds between two shots.
    #[serde(with = "fixed_serde")]
    pub fire_rate: Fixed,
    /// Movement speed in world units per second before multipliers.
    #[serde(with = "fixed_serde")]
    pub base_speed: Fixed,
    /// Multiplier applied while a speed boost powerup is active.
    #[serde(with = "fixed_serde")]
    pub speed_boost_factor: Fixed,
    /// Seconds between losing the last life and the ship being removed.
    #[serde(with = "fixed_serde")]
    pub death_grace: Fixed,
    /// Vertical offset of a single laser above the ship.
    #[serde(with = "fixed_serde")]
    pub laser_offset: Fixed,
    /// Horizontal offset of the outer lasers of a triple shot.
    #[serde(with = "fixed_serde")]
    pub triple_shot_spread: Fixed,
    /// Where the ship appears.
    pub start_position: Vec2Fixed,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            max_ammo: 15,
            fire_rate: Fixed::from_num(0.15),
            base_speed: Fixed::from_num(5),
            speed_boost_factor: Fixed::from_num(2),
            death_grace: Fixed::from_num(0.5),
            laser_offset: Fixed::from_num(0.8),
            triple_shot_spread: Fixed::from_num(0.75),
            start_position: Vec2Fixed::ZERO,
        }
    }
}

/// Highest accepted [`ShieldConfig::max_strength`].
pub const MAX_SHIELD_STRENGTH: i32 = 16;

/// Shield tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Strength restored by a shield pickup; hits absorbed is one more.
    pub max_strength: i32,
    /// Visual scale at strength 0.
    #[serde(with = "fixed_serde")]
    pub low_scale: Fixed,
    /// Visual scale at full strength.
    #[serde(with = "fixed_serde")]
    pub full_scale: Fixed,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            max_strength: 2,
            low_scale: Fixed::from_num(1.7),
            full_scale: Fixed::from_num(2.3),
        }
    }
}

/// Thruster tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrusterConfig {
    /// Seconds of continuous burn that empty a full tank.
    #[serde(with = "fixed_serde")]
    pub full_drain_seconds: Fixed,
    /// Speed multiplier while the thruster fires.
    #[serde(with = "fixed_serde")]
    pub speed_scalar: Fixed,
}

impl Default for ThrusterConfig {
    fn default() -> Self {
        Self {
            full_drain_seconds: Fixed::from_num(15),
            speed_scalar: Fixed::from_num(2),
        }
    }
}

/// Spawn pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Seconds between enemy emissions.
    #[serde(with = "fixed_serde")]
    pub enemy_interval: Fixed,
    /// Shortest gap between powerup emissions.
    #[serde(with = "fixed_serde")]
    pub powerup_interval_min: Fixed,
    /// Longest gap between powerup emissions.
    #[serde(with = "fixed_serde")]
    pub powerup_interval_max: Fixed,
    /// Chance in `[0, 1]` that a powerup comes from the rare pool.
    #[serde(with = "fixed_serde")]
    pub rare_probability: Fixed,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enemy_interval: Fixed::from_num(5),
            powerup_interval_min: Fixed::from_num(3),
            powerup_interval_max: Fixed::from_num(7),
            rare_probability: Fixed::from_num(0.1),
        }
    }
}

/// Playfield geometry and projectile speeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Area the ship may move in.
    pub player_bounds: Region,
    /// Visible play area; instances leaving it are despawned or recycled.
    pub screen_bounds: Region,
    /// Laser travel speed in world units per second.
    #[serde(with = "fixed_serde")]
    pub laser_speed: Fixed,
    /// Longest step a single tick or movement input may cover. Longer host
    /// frames are cut to this.
    #[serde(with = "fixed_serde", default = "default_max_tick_seconds")]
    pub max_tick_seconds: Fixed,
}

fn default_max_tick_seconds() -> Fixed {
    Fixed::from_num(0.25)
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player_bounds: Region {
                center: Vec2Fixed::from_ints(0, -2),
                half_width: Fixed::from_num(11.5),
                half_height: Fixed::from_num(2),
            },
            screen_bounds: Region {
                center: Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(1.25)),
                half_width: Fixed::from_num(9.25),
                half_height: Fixed::from_num(6.25),
            },
            laser_speed: Fixed::from_num(8),
            max_tick_seconds: default_max_tick_seconds(),
        }
    }
}

/// Complete session tuning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Player tuning.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Shield tuning.
    #[serde(default)]
    pub shield: ShieldConfig,
    /// Thruster tuning.
    #[serde(default)]
    pub thruster: ThrusterConfig,
    /// Spawn pacing.
    #[serde(default)]
    pub spawn: SpawnConfig,
    /// Playfield geometry.
    #[serde(default)]
    pub world: WorldConfig,
}

fn require_positive(field: &str, value: Fixed) -> Result<()> {
    if value <= Fixed::ZERO {
        return Err(GameError::invalid_config(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

impl GameConfig {
    /// Parse and validate a config from RON text.
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_data_file(path)?;
        Self::from_ron_str(&text, &path.display().to_string())
    }

    /// Reject values no session can run with.
    pub fn validate(&self) -> Result<()> {
        let player = &self.player;
        if player.max_lives == 0 {
            return Err(GameError::invalid_config("player.max_lives", "must be at least 1"));
        }
        require_positive("player.fire_rate", player.fire_rate)?;
        require_positive("player.base_speed", player.base_speed)?;
        require_positive("player.speed_boost_factor", player.speed_boost_factor)?;
        if player.death_grace < Fixed::ZERO {
            return Err(GameError::invalid_config(
                "player.death_grace",
                "must not be negative",
            ));
        }

        if !(1..=MAX_SHIELD_STRENGTH).contains(&self.shield.max_strength) {
            return Err(GameError::invalid_config(
                "shield.max_strength",
                format!("must lie in [1, {MAX_SHIELD_STRENGTH}]"),
            ));
        }
        if self.shield.full_scale < self.shield.low_scale {
            return Err(GameError::invalid_config(
                "shield.full_scale",
                "must not be smaller than shield.low_scale",
            ));
        }

        require_positive("thruster.full_drain_seconds", self.thruster.full_drain_seconds)?;
        require_positive("thruster.speed_scalar", self.thruster.speed_scalar)?;

        let spawn = &self.spawn;
        require_positive("spawn.enemy_interval", spawn.enemy_interval)?;
        require_positive("spawn.powerup_interval_min", spawn.powerup_interval_min)?;
        if spawn.powerup_interval_max < spawn.powerup_interval_min {
            return Err(GameError::invalid_config(
                "spawn.powerup_interval_max",
                "must not be smaller than spawn.powerup_interval_min",
            ));
        }
        if spawn.rare_probability < Fixed::ZERO || spawn.rare_probability > Fixed::ONE {
            return Err(GameError::invalid_config(
                "spawn.rare_probability",
                "must lie in [0, 1]",
            ));
        }

        self.world.player_bounds.validate()?;
        self.world.screen_bounds.validate()?;
        require_positive("world.laser_speed", self.world.laser_speed)?;
        require_positive("world.max_tick_seconds", self.world.max_tick_seconds)?;
        if self.world.max_tick_seconds > Fixed::ONE {
            return Err(GameError::invalid_config(
                "world.max_tick_seconds",
                "must not exceed one second",
            ));
        }
        if !self.world.player_bounds.contains(player.start_position) {
            return Err(GameError::invalid_config(
                "player.start_position",
                "must lie inside world.player_bounds",
            ));
        }

        Ok(())
    }
}
