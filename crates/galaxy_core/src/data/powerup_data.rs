//! Powerup descriptor definitions.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Every powerup variant the player knows how to consume.
///
/// Catalog files name variants by these identifiers. An unknown name fails
/// to parse, so a misconfigured catalog is caught at load time instead of
/// on first pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Restores the shield to full strength.
    Shield,
    /// Temporary movement speed multiplier.
    Speedup,
    /// Temporary three-laser spread.
    TripleShot,
    /// Refills laser ammo.
    AmmoRefill,
    /// Temporary unmetered mine launcher.
    Mine,
    /// Restores one life, up to the maximum.
    ExtraLife,
}

impl PowerupKind {
    /// All variants, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Shield,
        Self::Speedup,
        Self::TripleShot,
        Self::AmmoRefill,
        Self::Mine,
        Self::ExtraLife,
    ];

    /// Whether collecting this powerup starts a countdown.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Speedup | Self::TripleShot | Self::Mine)
    }
}

/// Immutable description of a powerup instance.
///
/// # Example RON
///
/// ```ron
/// PowerupDescriptor(
///     kind: TripleShot,
///     rare: false,
///     duration: 5.0,
///     speed: 3.0,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerupDescriptor {
    /// Which effect this powerup grants.
    pub kind: PowerupKind,

    /// Whether this entry belongs to the rare ("super weapon") pool.
    #[serde(default)]
    pub rare: bool,

    /// Effect duration in seconds for timed kinds; ignored otherwise.
    #[serde(with = "fixed_serde", default = "default_duration")]
    pub duration: Fixed,

    /// Fall speed in world units per second.
    #[serde(with = "fixed_serde", default = "default_speed")]
    pub speed: Fixed,
}

fn default_duration() -> Fixed {
    Fixed::from_num(5)
}

fn default_speed() -> Fixed {
    Fixed::from_num(3)
}

impl PowerupDescriptor {
    /// Create a regular powerup with default duration and speed.
    #[must_use]
    pub fn new(kind: PowerupKind) -> Self {
        Self {
            kind,
            rare: false,
            duration: default_duration(),
            speed: default_speed(),
        }
    }

    /// Mark this descriptor as a rare variant.
    #[must_use]
    pub fn rare(mut self) -> Self {
        self.rare = true;
        self
    }

    /// Override the effect duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Fixed) -> Self {
        self.duration = duration;
        self
    }

    /// Override the fall speed.
    #[must_use]
    pub fn with_speed(mut self, speed: Fixed) -> Self {
        self.speed = speed;
        self
    }
}
