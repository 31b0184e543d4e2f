//! Enemy descriptor definitions.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Data-driven enemy definition.
///
/// # Example RON
///
/// ```ron
/// EnemyDescriptor(
///     id: "fighter",
///     speed: 4.0,
///     point_value: 10,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    /// Unique string identifier for this enemy type.
    pub id: String,

    /// Descent speed in world units per second.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,

    /// Score awarded when the player shoots this enemy down.
    #[serde(default = "default_point_value")]
    pub point_value: u32,
}

const fn default_point_value() -> u32 {
    10
}

impl EnemyDescriptor {
    /// Create an enemy descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, speed: Fixed, point_value: u32) -> Self {
        Self {
            id: id.into(),
            speed,
            point_value,
        }
    }
}
