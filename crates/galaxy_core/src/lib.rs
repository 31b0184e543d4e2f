//! # Galaxy Core
//!
//! Deterministic rule engine for Galaxy Shooter.
//!
//! This crate contains **only** game rules:
//! - No rendering
//! - No collision detection (the host reports contacts)
//! - No audio or UI (the host subscribes to events)
//! - No floating-point simulation math (uses fixed-point)
//!
//! This separation enables:
//! - Headless simulation and tooling
//! - Replay verification
//! - Unit testing every rule without an engine
//!
//! ## Crate Structure
//!
//! - [`effects`] - Timed buff countdowns
//! - [`shield`] - Shield strength state machine
//! - [`thruster`] - Fuel resource
//! - [`player`] - Player aggregate state
//! - [`spawn`] - Enemy and powerup pacing
//! - [`world`] - Registry of live instances
//! - [`session`] - Host-facing facade and event dispatch
//! - [`events`] - Event types and the notification bus
//! - [`replay`] - Input recording and verification
//! - [`config`], [`data`] - Tuning and catalogs loaded from RON
//! - [`math`], [`region`] - Fixed-point math and play-area bounds

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod data;
pub mod effects;
pub mod error;
pub mod events;
pub mod math;
pub mod player;
pub mod region;
pub mod replay;
pub mod session;
pub mod shield;
pub mod spawn;
pub mod thruster;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::data::{Catalog, EnemyDescriptor, PowerupDescriptor, PowerupKind};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{EventBus, EventKind, GameEvent};
    pub use crate::math::{seconds, Fixed, Vec2Fixed};
    pub use crate::player::{Player, ProjectilePattern};
    pub use crate::region::Region;
    pub use crate::replay::{RecordingSession, Replay};
    pub use crate::session::{Contact, Session, SessionInput};
    pub use crate::spawn::DirectorPhase;
    pub use crate::world::{EntityId, EntityKind};
}
