//! Fixed-point math utilities for deterministic simulation.
//!
//! All game simulation uses fixed-point arithmetic so that the same
//! inputs and seed always reproduce the same session, which is what the
//! replay verifier relies on. Floats only appear at the edges: tuning
//! files and host-supplied frame times are converted once.

use fixed::types::I32F32;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Tuning files are written by hand, so values are stored as plain
/// decimals and converted to fixed-point once while loading. Values that
/// do not fit the fixed-point range are rejected.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(raw)
            .ok_or_else(|| D::Error::custom(format!("{raw} is outside the fixed-point range")))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Unit vector pointing up the screen.
    pub const UP: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::from_bits(1 << 32),
    };

    /// Unit vector pointing down the screen.
    pub const DOWN: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::from_bits(-(1 << 32)),
    };

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2Fixed {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Linearly interpolate between two scalars.
#[must_use]
pub fn lerp(from: Fixed, to: Fixed, t: Fixed) -> Fixed {
    from + (to - from) * t
}

/// Convert a host frame time in seconds to fixed-point.
///
/// Negative and non-finite inputs collapse to zero so a misbehaving host
/// clock can never run timers backwards. Huge values saturate; the session
/// caps each step at `world.max_tick_seconds`.
#[must_use]
pub fn seconds(dt: f32) -> Fixed {
    if !dt.is_finite() || dt <= 0.0 {
        return Fixed::ZERO;
    }
    Fixed::saturating_from_num(dt)
}

/// Draw a value uniformly from `[low, high)`.
///
/// Returns `low` for an empty or inverted range.
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, low: Fixed, high: Fixed) -> Fixed {
    if high <= low {
        return low;
    }
    Fixed::from_bits(rng.gen_range(low.to_bits()..high.to_bits()))
}

/// Draw a value uniformly from `[0, 1)`.
pub fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> Fixed {
    random_range(rng, Fixed::ZERO, Fixed::ONE)
}
