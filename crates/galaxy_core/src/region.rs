//! Axis-aligned rectangular regions.
//!
//! Used for the player movement area and the screen area that decides
//! when lasers, powerups and enemies have left play.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// A rectangle described by its center and half-extents.
///
/// Half-extents are never negative; [`Region::new`] rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Center of the rectangle.
    pub center: Vec2Fixed,
    /// Half width.
    #[serde(with = "fixed_serde")]
    pub half_width: Fixed,
    /// Half height.
    #[serde(with = "fixed_serde")]
    pub half_height: Fixed,
}

impl Region {
    /// Create a region, validating the half-extents.
    pub fn new(center: Vec2Fixed, half_width: Fixed, half_height: Fixed) -> Result<Self> {
        let region = Self {
            center,
            half_width,
            half_height,
        };
        region.validate()?;
        Ok(region)
    }

    /// Create a region from a center and full size, the way editor bounds
    /// are usually written down.
    pub fn from_size(center: Vec2Fixed, width: Fixed, height: Fixed) -> Result<Self> {
        let two = Fixed::from_num(2);
        Self::new(center, width / two, height / two)
    }

    /// Check the half-extent invariant.
    pub fn validate(&self) -> Result<()> {
        if self.half_width < Fixed::ZERO || self.half_height < Fixed::ZERO {
            return Err(GameError::invalid_config(
                "region",
                format!(
                    "half extents must be non-negative, got ({}, {})",
                    self.half_width, self.half_height
                ),
            ));
        }
        Ok(())
    }

    /// Lower-left corner.
    #[must_use]
    pub fn min(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            self.center.x - self.half_width,
            self.center.y - self.half_height,
        )
    }

    /// Upper-right corner.
    #[must_use]
    pub fn max(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            self.center.x + self.half_width,
            self.center.y + self.half_height,
        )
    }

    /// Whether the point lies inside the region, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Clamp a value into the horizontal span.
    #[must_use]
    pub fn clamp_x(&self, x: Fixed) -> Fixed {
        x.clamp(self.min().x, self.max().x)
    }

    /// Clamp a value into the vertical span.
    #[must_use]
    pub fn clamp_y(&self, y: Fixed) -> Fixed {
        y.clamp(self.min().y, self.max().y)
    }

    /// Clamp a point into the region.
    #[must_use]
    pub fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(self.clamp_x(point.x), self.clamp_y(point.y))
    }

    /// Bring a point that escaped the region back in.
    ///
    /// Vertical position is clamped. Crossing a side edge re-enters on the
    /// opposite side.
    #[must_use]
    pub fn wrap_horizontal(&self, point: Vec2Fixed) -> Vec2Fixed {
        if self.contains(point) {
            return point;
        }
        let (min, max) = (self.min(), self.max());
        let x = if point.x >= max.x {
            min.x
        } else if point.x <= min.x {
            max.x
        } else {
            point.x
        };
        Vec2Fixed::new(x, self.clamp_y(point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_region() -> Region {
        Region::from_size(
            Vec2Fixed::from_ints(0, -2),
            Fixed::from_num(23),
            Fixed::from_num(4),
        )
        .unwrap()
    }

    #[test]
    fn test_negative_extent_rejected() {
        let err = Region::new(Vec2Fixed::ZERO, Fixed::from_num(-1), Fixed::ONE).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_contains_edges() {
        let region = player_region();
        assert!(region.contains(Vec2Fixed::new(Fixed::from_num(11.5), Fixed::from_num(-4))));
        assert!(!region.contains(Vec2Fixed::new(Fixed::from_num(11.6), Fixed::from_num(-2))));
        assert!(!region.contains(Vec2Fixed::from_ints(0, 1)));
    }

    #[test]
    fn test_clamp() {
        let region = player_region();
        let clamped = region.clamp(Vec2Fixed::from_ints(40, -10));
        assert_eq!(clamped, Vec2Fixed::new(Fixed::from_num(11.5), Fixed::from_num(-4)));
    }

    #[test]
    fn test_wrap_horizontal_crosses_sides() {
        let region = player_region();

        let right = region.wrap_horizontal(Vec2Fixed::from_ints(12, -2));
        assert_eq!(right.x, Fixed::from_num(-11.5));

        let left = region.wrap_horizontal(Vec2Fixed::new(Fixed::from_num(-12), Fixed::from_num(5)));
        assert_eq!(left.x, Fixed::from_num(11.5));
        assert_eq!(left.y, Fixed::ZERO);
    }

    #[test]
    fn test_wrap_leaves_inside_points_alone() {
        let region = player_region();
        let p = Vec2Fixed::from_ints(3, -3);
        assert_eq!(region.wrap_horizontal(p), p);
    }
}
