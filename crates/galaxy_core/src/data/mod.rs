//! Data structures for the spawnable catalog.
//!
//! Pure data types plus RON parsing. Everything here is read-only once a
//! session starts.

use std::path::Path;

use crate::error::{GameError, Result};

mod catalog;
mod enemy_data;
mod powerup_data;

pub use catalog::Catalog;
pub use enemy_data::EnemyDescriptor;
pub use powerup_data::{PowerupDescriptor, PowerupKind};

/// Read a data file, reporting an absent file as a missing dependency.
pub(crate) fn read_data_file(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(GameError::MissingDependency(format!(
            "data file '{}'",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.display().to_string(),
        source,
    })
}
