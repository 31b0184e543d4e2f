//! Registry of live tracked instances.
//!
//! The rule engine does not render or collide anything, but it has to know
//! which enemies, powerups and projectiles exist so that contact reports
//! can be resolved and the field can be swept when spawning stops.
//!
//! # Determinism
//!
//! Instances live in a `HashMap` for O(1) lookup by id. Anything that
//! iterates (kinematics, hashing) walks ids in sorted order.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::data::{EnemyDescriptor, PowerupDescriptor};
use crate::math::{random_range, Fixed, Vec2Fixed};
use crate::region::Region;

/// Unique identifier for a tracked instance.
pub type EntityId = u64;

/// Instance categories, as reported by the host's collision layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player ship. Never stored in the registry.
    Player,
    /// An enemy fighter.
    Enemy,
    /// A falling powerup.
    Powerup,
    /// A laser fired by the player.
    PlayerLaser,
    /// A laser fired by an enemy.
    EnemyLaser,
    /// A stationary mine laid by the player.
    Mine,
}

/// Per-category payload of a tracked instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    /// Enemy with its descriptor.
    Enemy(EnemyDescriptor),
    /// Powerup with the descriptor it grants.
    Powerup(PowerupDescriptor),
    /// Upward laser.
    PlayerLaser,
    /// Downward laser.
    EnemyLaser,
    /// Mine.
    Mine,
}

impl Body {
    /// Category of this payload.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Enemy(_) => EntityKind::Enemy,
            Self::Powerup(_) => EntityKind::Powerup,
            Self::PlayerLaser => EntityKind::PlayerLaser,
            Self::EnemyLaser => EntityKind::EnemyLaser,
            Self::Mine => EntityKind::Mine,
        }
    }
}

/// A live instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    /// Registry id.
    pub id: EntityId,
    /// Current position.
    pub position: Vec2Fixed,
    /// What it is.
    pub body: Body,
}

/// What happened to instances during one [`World::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KinematicsReport {
    /// Instances that left the screen and were removed.
    pub despawned: Vec<EntityId>,
    /// Enemies that passed the bottom edge and re-entered at the top.
    pub recycled: Vec<EntityId>,
}

/// All live instances plus the geometry they move in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    instances: HashMap<EntityId, Instance>,
    next_id: EntityId,
    screen: Region,
    laser_speed: Fixed,
}

impl World {
    /// Create an empty registry.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            instances: HashMap::new(),
            next_id: 1,
            screen: config.screen_bounds,
            laser_speed: config.laser_speed,
        }
    }

    /// Visible play area.
    #[must_use]
    pub const fn screen(&self) -> &Region {
        &self.screen
    }

    /// Add an instance and return its id.
    pub fn insert(&mut self, body: Body, position: Vec2Fixed) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.instances.insert(id, Instance { id, position, body });
        id
    }

    /// Add an enemy.
    pub fn spawn_enemy(&mut self, descriptor: EnemyDescriptor, position: Vec2Fixed) -> EntityId {
        self.insert(Body::Enemy(descriptor), position)
    }

    /// Add a powerup.
    pub fn spawn_powerup(&mut self, descriptor: PowerupDescriptor, position: Vec2Fixed) -> EntityId {
        self.insert(Body::Powerup(descriptor), position)
    }

    /// Remove an instance.
    pub fn remove(&mut self, id: EntityId) -> Option<Instance> {
        self.instances.remove(&id)
    }

    /// Look up an instance.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Category of a live instance.
    #[must_use]
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.instances.get(&id).map(|i| i.body.kind())
    }

    /// Whether the id is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of live instances of one category.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.instances
            .values()
            .filter(|i| i.body.kind() == kind)
            .count()
    }

    /// Ids in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.instances.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Instances in id order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Instance> {
        self.sorted_ids()
            .into_iter()
            .filter_map(move |id| self.instances.get(&id))
    }

    /// Move everything for `dt` seconds.
    ///
    /// Lasers and powerups that leave the screen are removed. Enemies that
    /// pass the bottom edge re-enter along the top edge at a random x.
    /// Mines do not move.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Fixed, rng: &mut R) -> KinematicsReport {
        let mut report = KinematicsReport::default();
        let (min, max) = (self.screen.min(), self.screen.max());

        for id in self.sorted_ids() {
            let Some(instance) = self.instances.get_mut(&id) else {
                continue;
            };
            match &instance.body {
                Body::Enemy(descriptor) => {
                    instance.position += Vec2Fixed::DOWN.scale(descriptor.speed * dt);
                    if instance.position.y <= min.y {
                        instance.position = Vec2Fixed::new(random_range(rng, min.x, max.x), max.y);
                        report.recycled.push(id);
                    }
                }
                Body::Powerup(descriptor) => {
                    instance.position += Vec2Fixed::DOWN.scale(descriptor.speed * dt);
                    if !self.screen.contains(instance.position) {
                        report.despawned.push(id);
                    }
                }
                Body::PlayerLaser => {
                    instance.position += Vec2Fixed::UP.scale(self.laser_speed * dt);
                    if !self.screen.contains(instance.position) {
                        report.despawned.push(id);
                    }
                }
                Body::EnemyLaser => {
                    instance.position += Vec2Fixed::DOWN.scale(self.laser_speed * dt);
                    if !self.screen.contains(instance.position) {
                        report.despawned.push(id);
                    }
                }
                Body::Mine => {}
            }
        }

        for id in &report.despawned {
            self.instances.remove(id);
        }
        if !report.despawned.is_empty() {
            tracing::debug!(count = report.despawned.len(), "Despawned off-screen instances");
        }
        report
    }

    /// Remove every live instance and return how many there were.
    pub fn sweep(&mut self) -> usize {
        let count = self.instances.len();
        self.instances.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::data::PowerupKind;

    fn world() -> World {
        World::new(&WorldConfig::default())
    }

    fn fighter() -> EnemyDescriptor {
        EnemyDescriptor::new("fighter", Fixed::from_num(4), 10)
    }

    #[test]
    fn test_ids_are_unique_and_sorted() {
        let mut w = world();
        let a = w.spawn_enemy(fighter(), Vec2Fixed::ZERO);
        let b = w.insert(Body::Mine, Vec2Fixed::ZERO);
        let c = w.insert(Body::PlayerLaser, Vec2Fixed::ZERO);
        assert!(a < b && b < c);
        assert_eq!(w.sorted_ids(), vec![a, b, c]);
        assert_eq!(w.kind_of(b), Some(EntityKind::Mine));
    }

    #[test]
    fn test_player_laser_leaves_screen() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(1);
        let id = w.insert(Body::PlayerLaser, Vec2Fixed::from_ints(0, -4));

        let report = w.tick(Fixed::ONE, &mut rng);
        assert!(report.despawned.is_empty());
        assert_eq!(w.get(id).unwrap().position.y, Fixed::from_num(4));

        let report = w.tick(Fixed::ONE, &mut rng);
        assert_eq!(report.despawned, vec![id]);
        assert!(!w.contains(id));
    }

    #[test]
    fn test_enemy_recycles_at_top() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(2);
        let id = w.spawn_enemy(fighter(), Vec2Fixed::ZERO);

        let report = w.tick(Fixed::from_num(2), &mut rng);
        assert_eq!(report.recycled, vec![id]);
        let instance = w.get(id).unwrap();
        assert_eq!(instance.position.y, w.screen().max().y);
        assert!(w.screen().contains(instance.position));
    }

    #[test]
    fn test_powerups_fall_at_their_own_speed() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(4);
        let slow = w.spawn_powerup(PowerupDescriptor::new(PowerupKind::Shield), Vec2Fixed::ZERO);
        let fast = w.spawn_powerup(
            PowerupDescriptor::new(PowerupKind::Shield).with_speed(Fixed::from_num(6)),
            Vec2Fixed::ZERO,
        );

        let report = w.tick(Fixed::from_num(0.5), &mut rng);
        assert_eq!(w.get(slow).unwrap().position.y, Fixed::from_num(-1.5));
        assert_eq!(w.get(fast).unwrap().position.y, Fixed::from_num(-3));
        assert!(report.despawned.is_empty());

        let report = w.tick(Fixed::from_num(0.5), &mut rng);
        assert_eq!(report.despawned, vec![fast]);
        assert!(w.contains(slow));
    }

    #[test]
    fn test_mines_are_static() {
        let mut w = world();
        let mut rng = StdRng::seed_from_u64(3);
        let pos = Vec2Fixed::from_ints(1, 1);
        let id = w.insert(Body::Mine, pos);
        w.tick(Fixed::from_num(10), &mut rng);
        assert_eq!(w.get(id).unwrap().position, pos);
    }

    #[test]
    fn test_sweep_clears_everything() {
        let mut w = world();
        w.spawn_enemy(fighter(), Vec2Fixed::ZERO);
        w.spawn_powerup(PowerupDescriptor::new(PowerupKind::Shield), Vec2Fixed::ZERO);
        w.insert(Body::EnemyLaser, Vec2Fixed::ZERO);
        assert_eq!(w.sweep(), 3);
        assert!(w.is_empty());
    }
}
