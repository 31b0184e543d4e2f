//! Test fixtures and helpers.
//!
//! Pre-built configs, catalogs and sessions for consistent testing.

use std::sync::Arc;

use fixed::types::I32F32;
use galaxy_core::config::GameConfig;
use galaxy_core::data::{Catalog, EnemyDescriptor, PowerupDescriptor, PowerupKind};
use galaxy_core::session::Session;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Seeded generator for reproducible tests.
#[must_use]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// The shipped catalog behind an `Arc`.
#[must_use]
pub fn default_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::default())
}

/// A catalog containing exactly one powerup kind and one enemy.
///
/// Useful for forcing the director's choice in tests.
///
/// # Panics
///
/// Panics if the resulting catalog fails validation.
#[must_use]
pub fn single_powerup_catalog(kind: PowerupKind) -> Arc<Catalog> {
    let catalog = Catalog::new(
        vec![PowerupDescriptor::new(kind)],
        vec![EnemyDescriptor::new("fighter", fixed(4), 10)],
    )
    .expect("single-entry catalog is valid");
    Arc::new(catalog)
}

/// Fresh session on the shipped config and catalog.
///
/// # Panics
///
/// Panics if the shipped defaults fail validation.
#[must_use]
pub fn default_session() -> Session {
    Session::new(GameConfig::default(), default_catalog()).expect("shipped defaults are valid")
}

/// Fresh session whose director always or never picks the rare pool.
///
/// # Panics
///
/// Panics if the adjusted config fails validation.
#[must_use]
pub fn session_with_rare_probability(probability: f64) -> Session {
    let mut config = GameConfig::default();
    config.spawn.rare_probability = fixed_f(probability);
    Session::new(config, default_catalog()).expect("adjusted config is valid")
}
