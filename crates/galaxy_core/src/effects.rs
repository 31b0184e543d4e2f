//! Timed effect tracking for temporary player buffs.
//!
//! A buff is applied the moment it is activated and reverted exactly once
//! when its countdown runs out. Collecting the same buff again only
//! refreshes the countdown; it never stacks duration or magnitude.

use serde::{Deserialize, Serialize};

use crate::events::{EventQueue, GameEvent};
use crate::math::Fixed;

/// Buffs that expire on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    /// Every shot fires three lasers.
    TripleShot,
    /// Movement speed is multiplied.
    SpeedBoost,
    /// Shots launch unmetered mines instead of lasers.
    MineMode,
}

/// Something whose attributes a buff modifies.
pub trait EffectTarget {
    /// Apply the buff. `magnitude` is the multiplier for
    /// [`EffectKind::SpeedBoost`] and ignored by flag buffs.
    fn apply_effect(&mut self, kind: EffectKind, magnitude: Fixed);

    /// Undo a buff previously applied with the same magnitude.
    fn revert_effect(&mut self, kind: EffectKind, magnitude: Fixed);
}

/// A running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Which buff.
    pub kind: EffectKind,
    /// Full duration; refreshes reset `remaining` to this.
    pub duration: Fixed,
    /// Seconds left.
    pub remaining: Fixed,
    /// Magnitude captured at activation and reused on revert.
    pub magnitude: Fixed,
    /// Cleared when the buff has been reverted.
    pub active: bool,
}

/// Outcome of [`EffectTracker::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The buff was not running and has been applied.
    Started,
    /// The buff was already running; only its countdown was reset.
    Refreshed,
}

/// Countdowns for every active buff, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectTracker {
    effects: Vec<TimedEffect>,
}

impl EffectTracker {
    /// Create a tracker with nothing running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or refresh a buff.
    pub fn activate<T: EffectTarget + ?Sized>(
        &mut self,
        kind: EffectKind,
        duration: Fixed,
        magnitude: Fixed,
        target: &mut T,
    ) -> Activation {
        if let Some(effect) = self.effects.iter_mut().find(|e| e.kind == kind) {
            effect.duration = duration;
            effect.remaining = duration;
            return Activation::Refreshed;
        }

        target.apply_effect(kind, magnitude);
        self.effects.push(TimedEffect {
            kind,
            duration,
            remaining: duration,
            magnitude,
            active: true,
        });
        Activation::Started
    }

    /// Advance all countdowns and revert the ones that ran out.
    ///
    /// Expired buffs are reverted in activation order, each announced with
    /// [`GameEvent::EffectExpired`].
    pub fn tick<T: EffectTarget + ?Sized>(
        &mut self,
        dt: Fixed,
        target: &mut T,
        events: &mut EventQueue,
    ) {
        for effect in &mut self.effects {
            effect.remaining -= dt;
            if effect.active && effect.remaining <= Fixed::ZERO {
                effect.active = false;
                target.revert_effect(effect.kind, effect.magnitude);
                events.push(GameEvent::EffectExpired { kind: effect.kind });
            }
        }
        self.effects.retain(|e| e.active);
    }

    /// Whether the buff is running.
    #[must_use]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Seconds left on the buff, if running.
    #[must_use]
    pub fn remaining(&self, kind: EffectKind) -> Option<Fixed> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining)
    }

    /// Running buffs in activation order.
    pub fn active(&self) -> impl Iterator<Item = &TimedEffect> {
        self.effects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        speed: Fixed,
        triple: bool,
        applied: u32,
        reverted: u32,
    }

    impl EffectTarget for Recorder {
        fn apply_effect(&mut self, kind: EffectKind, magnitude: Fixed) {
            self.applied += 1;
            match kind {
                EffectKind::SpeedBoost => self.speed *= magnitude,
                EffectKind::TripleShot => self.triple = true,
                EffectKind::MineMode => {}
            }
        }

        fn revert_effect(&mut self, kind: EffectKind, magnitude: Fixed) {
            self.reverted += 1;
            match kind {
                EffectKind::SpeedBoost => self.speed /= magnitude,
                EffectKind::TripleShot => self.triple = false,
                EffectKind::MineMode => {}
            }
        }
    }

    fn secs(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_activation_applies_immediately() {
        let mut tracker = EffectTracker::new();
        let mut recorder = Recorder {
            speed: secs(5),
            ..Recorder::default()
        };

        let result = tracker.activate(EffectKind::SpeedBoost, secs(5), secs(2), &mut recorder);

        assert_eq!(result, Activation::Started);
        assert_eq!(recorder.speed, secs(10));
        assert!(tracker.is_active(EffectKind::SpeedBoost));
    }

    #[test]
    fn test_expiry_reverts_exactly_once() {
        let mut tracker = EffectTracker::new();
        let mut recorder = Recorder::default();
        let mut events = EventQueue::new();

        tracker.activate(EffectKind::TripleShot, secs(5), Fixed::ONE, &mut recorder);
        for _ in 0..20 {
            tracker.tick(secs(1), &mut recorder, &mut events);
        }

        assert!(!recorder.triple);
        assert_eq!(recorder.reverted, 1);
        assert_eq!(
            events,
            vec![GameEvent::EffectExpired {
                kind: EffectKind::TripleShot
            }]
        );
        assert!(!tracker.is_active(EffectKind::TripleShot));
    }

    #[test]
    fn test_refresh_resets_duration_without_stacking() {
        let mut tracker = EffectTracker::new();
        let mut recorder = Recorder {
            speed: secs(5),
            ..Recorder::default()
        };
        let mut events = EventQueue::new();

        tracker.activate(EffectKind::SpeedBoost, secs(5), secs(2), &mut recorder);
        tracker.tick(secs(4), &mut recorder, &mut events);
        let again = tracker.activate(EffectKind::SpeedBoost, secs(5), secs(2), &mut recorder);

        assert_eq!(again, Activation::Refreshed);
        assert_eq!(recorder.speed, secs(10));
        assert_eq!(tracker.remaining(EffectKind::SpeedBoost), Some(secs(5)));

        tracker.tick(secs(4), &mut recorder, &mut events);
        assert!(tracker.is_active(EffectKind::SpeedBoost));
        tracker.tick(secs(1), &mut recorder, &mut events);
        assert_eq!(recorder.speed, secs(5));
        assert_eq!(recorder.applied, 1);
        assert_eq!(recorder.reverted, 1);
    }

    #[test]
    fn test_revert_uses_activation_magnitude() {
        let mut tracker = EffectTracker::new();
        let mut recorder = Recorder {
            speed: secs(4),
            ..Recorder::default()
        };
        let mut events = EventQueue::new();

        tracker.activate(EffectKind::SpeedBoost, secs(1), secs(2), &mut recorder);
        // A refresh with a different factor must not change what is undone.
        tracker.activate(EffectKind::SpeedBoost, secs(1), secs(3), &mut recorder);
        tracker.tick(secs(1), &mut recorder, &mut events);

        assert_eq!(recorder.speed, secs(4));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut tracker = EffectTracker::new();
        let mut recorder = Recorder {
            speed: secs(1),
            ..Recorder::default()
        };
        let mut events = EventQueue::new();

        tracker.activate(EffectKind::TripleShot, secs(2), Fixed::ONE, &mut recorder);
        tracker.activate(EffectKind::SpeedBoost, secs(4), secs(2), &mut recorder);
        tracker.tick(secs(3), &mut recorder, &mut events);

        assert!(!recorder.triple);
        assert_eq!(recorder.speed, secs(2));
        assert_eq!(tracker.active().count(), 1);
    }
}
