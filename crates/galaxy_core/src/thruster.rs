//! Thruster fuel resource.
//!
//! Fuel burns while the thruster fires and refills at the same rate while
//! it is idle. The level is kept internally as seconds of burn left, so a
//! tank drained with whole-second ticks lands exactly on empty.

use serde::{Deserialize, Serialize};

use crate::config::ThrusterConfig;
use crate::error::{GameError, Result};
use crate::events::{EventQueue, GameEvent};
use crate::math::Fixed;

/// Something whose speed the thruster boosts.
pub trait Propelled {
    /// Multiply current speed by `factor`.
    fn multiply_speed(&mut self, factor: Fixed);

    /// Divide current speed by `factor`.
    fn divide_speed(&mut self, factor: Fixed);
}

/// Fuel tank plus on/off state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Thruster {
    fuel_seconds: Fixed,
    full_drain_seconds: Fixed,
    burn_rate: Fixed,
    speed_scalar: Fixed,
    /// Factor applied to the holder by the last `turn_on`, if still firing.
    applied_scalar: Option<Fixed>,
}

impl Thruster {
    /// Create a thruster with a full tank.
    pub fn new(config: &ThrusterConfig) -> Result<Self> {
        if config.full_drain_seconds <= Fixed::ZERO {
            return Err(GameError::invalid_config(
                "thruster.full_drain_seconds",
                "must be positive",
            ));
        }
        Ok(Self {
            fuel_seconds: config.full_drain_seconds,
            full_drain_seconds: config.full_drain_seconds,
            burn_rate: Fixed::ONE / config.full_drain_seconds,
            speed_scalar: config.speed_scalar,
            applied_scalar: None,
        })
    }

    /// Fuel in `[0, 1]`.
    #[must_use]
    pub fn level(&self) -> Fixed {
        self.fuel_seconds / self.full_drain_seconds
    }

    /// Fraction of a full tank burned per second of firing.
    #[must_use]
    pub const fn burn_rate_per_second(&self) -> Fixed {
        self.burn_rate
    }

    /// Whether the thruster is firing.
    #[must_use]
    pub const fn is_firing(&self) -> bool {
        self.applied_scalar.is_some()
    }

    /// Multiplier applied to the holder while firing.
    #[must_use]
    pub const fn speed_scalar(&self) -> Fixed {
        self.speed_scalar
    }

    /// Start firing. Does nothing on an empty tank or if already firing.
    pub fn turn_on<P: Propelled + ?Sized>(&mut self, holder: &mut P) -> bool {
        if self.fuel_seconds <= Fixed::ZERO {
            tracing::debug!("Thruster turn-on ignored: tank empty");
            return false;
        }
        if self.is_firing() {
            return false;
        }
        holder.multiply_speed(self.speed_scalar);
        self.applied_scalar = Some(self.speed_scalar);
        true
    }

    /// Stop firing and undo the speed boost. Does nothing if idle.
    pub fn turn_off<P: Propelled + ?Sized>(&mut self, holder: &mut P) -> bool {
        match self.applied_scalar.take() {
            Some(scalar) => {
                holder.divide_speed(scalar);
                true
            }
            None => false,
        }
    }

    /// Burn or refill fuel for `dt` seconds.
    ///
    /// Running dry while firing reports the empty level first, then turns
    /// the thruster off, then raises [`GameEvent::ThrusterExhausted`].
    pub fn tick<P: Propelled + ?Sized>(&mut self, dt: Fixed, holder: &mut P, events: &mut EventQueue) {
        if dt <= Fixed::ZERO {
            return;
        }

        if self.is_firing() {
            self.fuel_seconds -= dt;
            if self.fuel_seconds > Fixed::ZERO {
                events.push(GameEvent::FuelChanged { level: self.level() });
                return;
            }
            self.fuel_seconds = Fixed::ZERO;
            events.push(GameEvent::FuelChanged { level: Fixed::ZERO });
            self.turn_off(holder);
            tracing::debug!("Thruster exhausted");
            events.push(GameEvent::ThrusterExhausted);
        } else {
            if self.fuel_seconds >= self.full_drain_seconds {
                return;
            }
            self.fuel_seconds = (self.fuel_seconds + dt).min(self.full_drain_seconds);
            events.push(GameEvent::FuelChanged { level: self.level() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ship {
        speed: Fixed,
    }

    impl Propelled for Ship {
        fn multiply_speed(&mut self, factor: Fixed) {
            self.speed *= factor;
        }

        fn divide_speed(&mut self, factor: Fixed) {
            self.speed /= factor;
        }
    }

    fn setup() -> (Thruster, Ship) {
        (
            Thruster::new(&ThrusterConfig::default()).unwrap(),
            Ship {
                speed: Fixed::from_num(5),
            },
        )
    }

    #[test]
    fn test_burn_rate_derived_from_duration() {
        let (thruster, _) = setup();
        assert_eq!(thruster.burn_rate_per_second(), Fixed::ONE / Fixed::from_num(15));
        assert_eq!(thruster.level(), Fixed::ONE);
    }

    #[test]
    fn test_turn_on_boosts_and_turn_off_reverts() {
        let (mut thruster, mut ship) = setup();
        assert!(thruster.turn_on(&mut ship));
        assert_eq!(ship.speed, Fixed::from_num(10));
        assert!(!thruster.turn_on(&mut ship));
        assert_eq!(ship.speed, Fixed::from_num(10));

        assert!(thruster.turn_off(&mut ship));
        assert_eq!(ship.speed, Fixed::from_num(5));
        assert!(!thruster.turn_off(&mut ship));
    }

    #[test]
    fn test_full_tank_idle_is_silent() {
        let (mut thruster, mut ship) = setup();
        let mut events = EventQueue::new();
        thruster.tick(Fixed::ONE, &mut ship, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_fifteen_second_drain_scenario() {
        let (mut thruster, mut ship) = setup();
        let mut events = EventQueue::new();
        thruster.turn_on(&mut ship);

        let mut exhausted_at = Vec::new();
        for tick in 1..=15 {
            events.clear();
            thruster.tick(Fixed::ONE, &mut ship, &mut events);
            if events.contains(&GameEvent::ThrusterExhausted) {
                exhausted_at.push(tick);
            }
        }

        assert_eq!(exhausted_at, vec![15]);
        assert_eq!(thruster.level(), Fixed::ZERO);
        assert!(!thruster.is_firing());
        assert_eq!(ship.speed, Fixed::from_num(5));

        // Tick 16: the tank is empty, so turning on does nothing.
        assert!(!thruster.turn_on(&mut ship));
        events.clear();
        thruster.tick(Fixed::ONE, &mut ship, &mut events);
        assert!(!events.contains(&GameEvent::ThrusterExhausted));
        assert_eq!(thruster.level(), Fixed::ONE / Fixed::from_num(15));
    }

    #[test]
    fn test_level_reported_before_exhaustion() {
        let (mut thruster, mut ship) = setup();
        let mut events = EventQueue::new();
        thruster.turn_on(&mut ship);
        thruster.tick(Fixed::from_num(20), &mut ship, &mut events);
        assert_eq!(
            events,
            vec![
                GameEvent::FuelChanged { level: Fixed::ZERO },
                GameEvent::ThrusterExhausted
            ]
        );
    }

    #[test]
    fn test_regeneration_clamps_at_full() {
        let (mut thruster, mut ship) = setup();
        let mut events = EventQueue::new();
        thruster.turn_on(&mut ship);
        thruster.tick(Fixed::from_num(3), &mut ship, &mut events);
        thruster.turn_off(&mut ship);
        thruster.tick(Fixed::from_num(10), &mut ship, &mut events);
        assert_eq!(thruster.level(), Fixed::ONE);
    }
}
