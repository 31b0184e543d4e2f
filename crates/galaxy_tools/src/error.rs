//! Error type for the command-line tools.

use thiserror::Error;

use galaxy_core::error::GameError;

/// Anything a tool command can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Loading or validating game data failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A summary could not be encoded.
    #[error("Failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),

    /// A recorded run did not reproduce.
    #[error("Replay of seed {seed} diverged from the recorded run")]
    ReplayDiverged {
        /// Seed of the run.
        seed: u64,
    },
}

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;
