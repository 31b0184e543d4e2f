//! Data validation utilities.

use std::path::Path;
use std::sync::Arc;

use galaxy_core::config::GameConfig;
use galaxy_core::data::Catalog;
use galaxy_core::session::Session;

use crate::error::Result;

/// Tuning file name inside a data directory.
pub const CONFIG_FILE: &str = "game_config.ron";

/// Catalog file name inside a data directory.
pub const CATALOG_FILE: &str = "catalog.ron";

/// Load the tuning and catalog from a data directory.
///
/// # Errors
///
/// Returns an error if either file is missing, malformed or invalid.
pub fn load_data_directory(path: &Path) -> Result<(GameConfig, Catalog)> {
    let config = GameConfig::load(&path.join(CONFIG_FILE))?;
    let catalog = Catalog::load(&path.join(CATALOG_FILE))?;
    Ok((config, catalog))
}

/// Validate all RON data files in a directory.
///
/// Beyond per-file checks this builds a session from the pair, which
/// catches mismatches between tuning and catalog.
///
/// # Errors
///
/// Returns an error if any data file fails validation.
pub fn validate_data_directory(path: &Path) -> Result<()> {
    let (config, catalog) = load_data_directory(path)?;
    tracing::info!(
        powerups = catalog.powerups.len(),
        rare = catalog.rare_powerup_count(),
        enemies = catalog.enemies.len(),
        "Catalog loaded"
    );
    Session::new(config, Arc::new(catalog))?;
    Ok(())
}
