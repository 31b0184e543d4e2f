//! Input recording and replay verification.
//!
//! A replay is the seed plus every host input in order. Because sessions
//! are deterministic, running the inputs against a fresh session seeded the
//! same way must land on the recorded final state hash. Replays are encoded
//! to bytes with `bincode`; where the bytes are stored is the host's
//! business.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::data::Catalog;
use crate::error::{GameError, Result};
use crate::session::{Session, SessionInput};

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// A recorded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Seed of the session's random generator.
    pub seed: u64,
    /// Host inputs in the order they were applied.
    pub inputs: Vec<SessionInput>,
    /// State hash after the last input.
    pub final_hash: u64,
}

impl Replay {
    /// Start an empty recording.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            inputs: Vec::new(),
            final_hash: 0,
        }
    }

    /// Append an input.
    pub fn record(&mut self, input: SessionInput) {
        self.inputs.push(input);
    }

    /// Store the final state hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = final_hash;
    }

    /// Number of recorded inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Encode to bytes.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))
    }

    /// Decode from bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes are malformed or were written by a
    /// different format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Re-run the inputs on a fresh session and return its final hash.
    ///
    /// # Errors
    /// Returns a configuration error if the session cannot be built.
    pub fn play(&self, config: &GameConfig, catalog: Arc<Catalog>) -> Result<u64> {
        let mut session = Session::new(config.clone(), catalog)?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        for input in &self.inputs {
            session.apply_input(*input, &mut rng);
        }
        Ok(session.state_hash())
    }

    /// Whether re-running the inputs reproduces the recorded final hash.
    ///
    /// # Errors
    /// Returns a configuration error if the session cannot be built.
    pub fn verify(&self, config: &GameConfig, catalog: Arc<Catalog>) -> Result<bool> {
        let hash = self.play(config, catalog)?;
        if hash != self.final_hash {
            tracing::warn!(
                expected = self.final_hash,
                actual = hash,
                "Replay diverged"
            );
        }
        Ok(hash == self.final_hash)
    }
}

/// A session that records every input it is given.
#[derive(Debug)]
pub struct RecordingSession {
    session: Session,
    rng: StdRng,
    replay: Replay,
}

impl RecordingSession {
    /// Start a recorded session.
    ///
    /// # Errors
    /// Returns a configuration error if the session cannot be built.
    pub fn new(config: GameConfig, catalog: Arc<Catalog>, seed: u64) -> Result<Self> {
        Ok(Self {
            session: Session::new(config, catalog)?,
            rng: StdRng::seed_from_u64(seed),
            replay: Replay::new(seed),
        })
    }

    /// Apply and record one input.
    pub fn apply(&mut self, input: SessionInput) {
        self.replay.record(input);
        self.session.apply_input(input, &mut self.rng);
    }

    /// The live session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access, e.g. to subscribe to the bus.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Stop recording and return the replay with its final hash.
    #[must_use]
    pub fn finish(mut self) -> Replay {
        self.replay.finalize(self.session.state_hash());
        self.replay
    }
}
