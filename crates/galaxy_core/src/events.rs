//! Event notification bus.
//!
//! Rule components never call out to the host. They push [`GameEvent`]s
//! into an outbox in the order state changes happen; the session routes
//! each event to its internal listeners and then publishes it here, where
//! UI, audio and animation collaborators subscribe.
//!
//! Delivery is synchronous and ordered: a handler sees events in exactly
//! the order they were produced, with no batching or reordering.

use std::fmt;

use crate::data::PowerupDescriptor;
use crate::effects::EffectKind;
use crate::math::{Fixed, Vec2Fixed};
use crate::player::{DamageIndicators, ProjectilePattern};
use crate::world::EntityId;

/// Everything the rule engine announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Score changed (only for deaths worth points).
    ScoreChanged {
        /// New score.
        score: u32,
    },
    /// Life count changed.
    LivesChanged {
        /// Remaining lives.
        lives: u32,
    },
    /// A shot was fired or ammo was refilled.
    ShotFired {
        /// Laser ammo left after the change.
        ammo_remaining: u32,
    },
    /// Thruster fuel level changed.
    FuelChanged {
        /// Fuel in `[0, 1]`.
        level: Fixed,
    },
    /// The thruster ran dry while firing.
    ThrusterExhausted,
    /// An enemy died.
    EnemyDeath {
        /// Points awarded for the kill, 0 for ramming deaths.
        point_value: u32,
    },
    /// The player picked up a powerup.
    PowerupCollected {
        /// What was collected.
        descriptor: PowerupDescriptor,
    },
    /// The player lost the last life. Published exactly once per session.
    PlayerTerminal,

    /// Shield strength changed; -1 means the shield is down.
    ShieldChanged {
        /// New strength level.
        strength: i32,
        /// Visual scale for the shield sprite, `None` while down.
        scale: Option<Fixed>,
    },
    /// Wing damage overlays changed.
    DamageIndicatorsChanged {
        /// Which overlays are visible.
        indicators: DamageIndicators,
    },
    /// Fire was requested with an empty magazine.
    OutOfAmmo,
    /// A projectile pattern left the ship.
    ProjectileFired {
        /// Single, triple or mine.
        pattern: ProjectilePattern,
        /// Ship position at the moment of firing.
        origin: Vec2Fixed,
    },
    /// A timed effect ran out and was reverted.
    EffectExpired {
        /// Which effect.
        kind: EffectKind,
    },
    /// An enemy entered play.
    EnemySpawned {
        /// Instance id.
        id: EntityId,
        /// Spawn position.
        position: Vec2Fixed,
    },
    /// A powerup entered play.
    PowerupSpawned {
        /// Instance id.
        id: EntityId,
        /// What it grants.
        descriptor: PowerupDescriptor,
        /// Spawn position.
        position: Vec2Fixed,
    },
    /// The spawn director began emitting.
    SpawningStarted,
    /// The spawn director stopped for good.
    SpawningStopped,
    /// Live instances removed when spawning stopped.
    EntitiesSwept {
        /// How many instances were removed.
        count: usize,
    },
    /// The grace delay after the last life elapsed; the ship is gone.
    PlayerDestroyed,
}

/// Discriminant of [`GameEvent`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`GameEvent::ScoreChanged`]
    ScoreChanged,
    /// [`GameEvent::LivesChanged`]
    LivesChanged,
    /// [`GameEvent::ShotFired`]
    ShotFired,
    /// [`GameEvent::FuelChanged`]
    FuelChanged,
    /// [`GameEvent::ThrusterExhausted`]
    ThrusterExhausted,
    /// [`GameEvent::EnemyDeath`]
    EnemyDeath,
    /// [`GameEvent::PowerupCollected`]
    PowerupCollected,
    /// [`GameEvent::PlayerTerminal`]
    PlayerTerminal,
    /// [`GameEvent::ShieldChanged`]
    ShieldChanged,
    /// [`GameEvent::DamageIndicatorsChanged`]
    DamageIndicatorsChanged,
    /// [`GameEvent::OutOfAmmo`]
    OutOfAmmo,
    /// [`GameEvent::ProjectileFired`]
    ProjectileFired,
    /// [`GameEvent::EffectExpired`]
    EffectExpired,
    /// [`GameEvent::EnemySpawned`]
    EnemySpawned,
    /// [`GameEvent::PowerupSpawned`]
    PowerupSpawned,
    /// [`GameEvent::SpawningStarted`]
    SpawningStarted,
    /// [`GameEvent::SpawningStopped`]
    SpawningStopped,
    /// [`GameEvent::EntitiesSwept`]
    EntitiesSwept,
    /// [`GameEvent::PlayerDestroyed`]
    PlayerDestroyed,
}

impl GameEvent {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ScoreChanged { .. } => EventKind::ScoreChanged,
            Self::LivesChanged { .. } => EventKind::LivesChanged,
            Self::ShotFired { .. } => EventKind::ShotFired,
            Self::FuelChanged { .. } => EventKind::FuelChanged,
            Self::ThrusterExhausted => EventKind::ThrusterExhausted,
            Self::EnemyDeath { .. } => EventKind::EnemyDeath,
            Self::PowerupCollected { .. } => EventKind::PowerupCollected,
            Self::PlayerTerminal => EventKind::PlayerTerminal,
            Self::ShieldChanged { .. } => EventKind::ShieldChanged,
            Self::DamageIndicatorsChanged { .. } => EventKind::DamageIndicatorsChanged,
            Self::OutOfAmmo => EventKind::OutOfAmmo,
            Self::ProjectileFired { .. } => EventKind::ProjectileFired,
            Self::EffectExpired { .. } => EventKind::EffectExpired,
            Self::EnemySpawned { .. } => EventKind::EnemySpawned,
            Self::PowerupSpawned { .. } => EventKind::PowerupSpawned,
            Self::SpawningStarted => EventKind::SpawningStarted,
            Self::SpawningStopped => EventKind::SpawningStopped,
            Self::EntitiesSwept { .. } => EventKind::EntitiesSwept,
            Self::PlayerDestroyed => EventKind::PlayerDestroyed,
        }
    }
}

/// Outbox that rule components append to while mutating state.
pub type EventQueue = Vec<GameEvent>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent)>;

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Handler,
}

/// Typed publish/subscribe channel.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event of one kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.insert(Some(kind), Box::new(handler))
    }

    /// Receive every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.insert(None, Box::new(handler))
    }

    fn insert(&mut self, filter: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to matching subscribers, in subscription order.
    pub fn publish(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for subscriber in &mut self.subscribers {
            if subscriber.filter.map_or(true, |k| k == kind) {
                (subscriber.handler)(event);
            }
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
