//! Shield state machine.
//!
//! Strength -1 means the shield is down. A shield pickup jumps straight to
//! the configured maximum and every absorbed hit costs one level, so a
//! full shield soaks `max_strength + 1` hits before the hull takes damage.

use serde::{Deserialize, Serialize};

use crate::config::{ShieldConfig, MAX_SHIELD_STRENGTH};
use crate::error::{GameError, Result};
use crate::events::{EventQueue, GameEvent};
use crate::math::{lerp, Fixed};

/// Strength value of a shield that is down.
pub const SHIELD_DOWN: i32 = -1;

/// Discrete-strength shield with a precomputed visual scale per level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shield {
    strength: i32,
    max_strength: i32,
    scale_table: Vec<Fixed>,
}

impl Shield {
    /// Build a shield from tuning, interpolating the scale table between
    /// the low and full scalars.
    pub fn new(config: &ShieldConfig) -> Result<Self> {
        if !(1..=MAX_SHIELD_STRENGTH).contains(&config.max_strength) {
            return Err(GameError::invalid_config(
                "shield.max_strength",
                format!("must lie in [1, {MAX_SHIELD_STRENGTH}]"),
            ));
        }
        let steps = Fixed::from_num(config.max_strength);
        let table = (0..=config.max_strength)
            .map(|level| lerp(config.low_scale, config.full_scale, Fixed::from_num(level) / steps))
            .collect();
        Self::with_scale_table(config.max_strength, table)
    }

    /// Build a shield from an explicit scale table, index = strength.
    pub fn with_scale_table(max_strength: i32, scale_table: Vec<Fixed>) -> Result<Self> {
        if max_strength < 1 {
            return Err(GameError::invalid_config(
                "shield.max_strength",
                "must be at least 1",
            ));
        }
        let required = usize::try_from(max_strength).unwrap_or(usize::MAX).saturating_add(1);
        if scale_table.len() < required {
            return Err(GameError::ScaleTableMismatch {
                max_strength,
                required,
                table_len: scale_table.len(),
            });
        }
        Ok(Self {
            strength: SHIELD_DOWN,
            max_strength,
            scale_table,
        })
    }

    /// Current strength, -1 when down.
    #[must_use]
    pub const fn strength(&self) -> i32 {
        self.strength
    }

    /// Strength restored by a pickup.
    #[must_use]
    pub const fn max_strength(&self) -> i32 {
        self.max_strength
    }

    /// Whether the shield currently absorbs hits.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.strength > SHIELD_DOWN
    }

    /// Visual scale for the current strength, `None` while down.
    #[must_use]
    pub fn scale(&self) -> Option<Fixed> {
        usize::try_from(self.strength)
            .ok()
            .and_then(|i| self.scale_table.get(i).copied())
    }

    /// The full scale table, index = strength.
    #[must_use]
    pub fn scale_table(&self) -> &[Fixed] {
        &self.scale_table
    }

    /// A shield pickup: jump to full strength.
    pub fn collect(&mut self, events: &mut EventQueue) {
        self.set_strength(self.max_strength, events);
    }

    /// Absorb a hit. Returns false if the shield was already down, in which
    /// case nothing changes.
    pub fn hit(&mut self, events: &mut EventQueue) -> bool {
        if !self.is_active() {
            tracing::warn!("Shield hit while inactive; ignoring");
            return false;
        }
        self.set_strength(self.strength - 1, events)
    }

    /// Force a strength level. Levels outside `-1..table_len` are rejected
    /// without touching state.
    pub fn set_strength(&mut self, strength: i32, events: &mut EventQueue) -> bool {
        let in_table = usize::try_from(strength).map_or(strength == SHIELD_DOWN, |i| {
            i < self.scale_table.len()
        });
        if !in_table {
            tracing::warn!(
                strength,
                table_len = self.scale_table.len(),
                "Rejected shield strength outside scale table"
            );
            return false;
        }

        self.strength = strength;
        events.push(GameEvent::ShieldChanged {
            strength,
            scale: self.scale(),
        });
        true
    }
}
