//! Error types for the game rule engine.
//!
//! Only misconfiguration is an error. Expected game-state conditions such
//! as firing during the cooldown or hitting an inactive shield are
//! recovered in place and logged, never returned.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all rule engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A required collaborator or catalog entry is absent.
    #[error("Missing required dependency: {0}")]
    MissingDependency(String),

    /// A tuning value is outside its allowed range.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Shield scale table does not cover every strength level.
    #[error("Shield scale table has {table_len} entries, need {required} for max strength {max_strength}")]
    ScaleTableMismatch {
        /// Configured maximum shield strength.
        max_strength: i32,
        /// Entries required (`max_strength + 1`).
        required: usize,
        /// Entries supplied.
        table_len: usize,
    },

    /// A descriptor catalog that must be populated is empty.
    #[error("Catalog '{0}' is empty")]
    EmptyCatalog(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to read a data file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Shorthand for [`GameError::InvalidConfig`].
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error stems from configuration and must halt startup.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::InvalidState(_))
    }
}
