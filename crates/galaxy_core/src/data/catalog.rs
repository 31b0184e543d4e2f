//! Read-only catalog of spawnable descriptors.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{read_data_file, EnemyDescriptor, PowerupDescriptor, PowerupKind};
use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Everything the spawn director may emit.
///
/// Loaded once before the session starts and shared read-only afterwards.
///
/// # Example RON
///
/// ```ron
/// Catalog(
///     powerups: [
///         PowerupDescriptor(kind: Shield),
///         PowerupDescriptor(kind: Mine, rare: true, duration: 5.0),
///     ],
///     enemies: [
///         EnemyDescriptor(id: "fighter", speed: 4.0, point_value: 10),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Powerup variants, regular and rare mixed; see [`PowerupDescriptor::rare`].
    pub powerups: Vec<PowerupDescriptor>,
    /// Enemy variants.
    pub enemies: Vec<EnemyDescriptor>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(powerups: Vec<PowerupDescriptor>, enemies: Vec<EnemyDescriptor>) -> Result<Self> {
        let catalog = Self { powerups, enemies };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from RON text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read, parse and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_data_file(path)?;
        Self::from_ron_str(&text, &path.display().to_string())
    }

    /// Check that the catalog can drive a session.
    pub fn validate(&self) -> Result<()> {
        if self.enemies.is_empty() {
            return Err(GameError::EmptyCatalog("enemies".into()));
        }
        if self.regular_powerup_count() == 0 {
            return Err(GameError::EmptyCatalog("powerups (regular)".into()));
        }

        let mut seen = HashSet::new();
        for enemy in &self.enemies {
            if !seen.insert(enemy.id.as_str()) {
                return Err(GameError::invalid_config(
                    "enemies",
                    format!("duplicate enemy id '{}'", enemy.id),
                ));
            }
            if enemy.speed <= Fixed::ZERO {
                return Err(GameError::invalid_config(
                    format!("enemies.{}.speed", enemy.id),
                    "must be positive",
                ));
            }
        }

        for powerup in &self.powerups {
            if powerup.speed <= Fixed::ZERO {
                return Err(GameError::invalid_config(
                    format!("powerups.{:?}.speed", powerup.kind),
                    "must be positive",
                ));
            }
            if powerup.kind.is_timed() && powerup.duration <= Fixed::ZERO {
                return Err(GameError::invalid_config(
                    format!("powerups.{:?}.duration", powerup.kind),
                    "timed powerups need a positive duration",
                ));
            }
        }

        Ok(())
    }

    /// Number of regular powerup entries.
    #[must_use]
    pub fn regular_powerup_count(&self) -> usize {
        self.powerups.iter().filter(|p| !p.rare).count()
    }

    /// Number of rare powerup entries.
    #[must_use]
    pub fn rare_powerup_count(&self) -> usize {
        self.powerups.iter().filter(|p| p.rare).count()
    }

    /// The `index`-th entry of the regular or rare pool.
    #[must_use]
    pub fn powerup_in_pool(&self, rare: bool, index: usize) -> Option<&PowerupDescriptor> {
        self.powerups.iter().filter(|p| p.rare == rare).nth(index)
    }

    /// First descriptor of the given kind, if present.
    #[must_use]
    pub fn powerup_of_kind(&self, kind: PowerupKind) -> Option<&PowerupDescriptor> {
        self.powerups.iter().find(|p| p.kind == kind)
    }

    /// Look up an enemy descriptor by id.
    #[must_use]
    pub fn enemy(&self, id: &str) -> Option<&EnemyDescriptor> {
        self.enemies.iter().find(|e| e.id == id)
    }
}

impl Default for Catalog {
    /// The shipped set: five regular powerups, the mine launcher as the
    /// rare pick, and a single enemy fighter.
    fn default() -> Self {
        Self {
            powerups: vec![
                PowerupDescriptor::new(PowerupKind::Shield),
                PowerupDescriptor::new(PowerupKind::Speedup),
                PowerupDescriptor::new(PowerupKind::TripleShot),
                PowerupDescriptor::new(PowerupKind::AmmoRefill),
                PowerupDescriptor::new(PowerupKind::ExtraLife),
                PowerupDescriptor::new(PowerupKind::Mine).rare(),
            ],
            enemies: vec![EnemyDescriptor::new("fighter", Fixed::from_num(4), 10)],
        }
    }
}
