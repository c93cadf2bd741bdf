//! 2-D points with exact coordinates and geometric transforms.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::angle::Angle;
use super::length::{Length, PositiveLength, UnsignedLength};

/// Mirror axis for geometric transforms.
///
/// `Horizontal` mirrors across the vertical axis through the center (x is
/// negated), `Vertical` across the horizontal axis (y is negated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Mirror left-right.
    Horizontal,
    /// Mirror top-bottom.
    Vertical,
}

/// A point in the 2-D scene, in integer nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// X coordinate.
    pub x: Length,
    /// Y coordinate.
    pub y: Length,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self {
        x: Length::ZERO,
        y: Length::ZERO,
    };

    /// Creates a point from coordinates.
    #[must_use]
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    /// Creates a point from nanometre coordinates.
    #[must_use]
    pub const fn from_nm(x: i64, y: i64) -> Self {
        Self {
            x: Length::from_nm(x),
            y: Length::from_nm(y),
        }
    }

    /// Whether both coordinates are zero.
    #[must_use]
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Euclidean distance from the origin, rounded to the nearest nanometre.
    #[must_use]
    pub fn length(self) -> UnsignedLength {
        let x = self.x.to_nm() as f64;
        let y = self.y.to_nm() as f64;
        let nm = x.hypot(y).round() as i64;
        UnsignedLength::from_nm(nm).unwrap_or(UnsignedLength::ZERO)
    }

    /// Returns the point rotated around `center`.
    ///
    /// Multiples of 90° rotate exactly; other angles go through floating
    /// point and round to the nearest nanometre.
    #[must_use]
    pub fn rotated(self, angle: Angle, center: Self) -> Self {
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        let (rx, ry) = if angle.is_multiple_of_90() {
            match angle.normalized().to_microdeg() / 90_000_000 {
                1 => (-dy, dx),
                2 => (-dx, -dy),
                3 => (dy, -dx),
                _ => (dx, dy),
            }
        } else {
            let sin = angle.sin();
            let cos = angle.cos();
            let x = dx.to_nm() as f64;
            let y = dy.to_nm() as f64;
            (
                Length::from_nm((x * cos - y * sin).round() as i64),
                Length::from_nm((x * sin + y * cos).round() as i64),
            )
        };
        Self::new(center.x + rx, center.y + ry)
    }

    /// Returns the point mirrored across the axis through `center`.
    #[must_use]
    pub fn mirrored(self, orientation: Orientation, center: Self) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(center.x * 2 - self.x, self.y),
            Orientation::Vertical => Self::new(self.x, center.y * 2 - self.y),
        }
    }

    /// Returns the point snapped to the nearest grid intersection.
    #[must_use]
    pub fn mapped_to_grid(self, interval: PositiveLength) -> Self {
        Self::new(
            self.x.snapped_to_grid(interval),
            self.y.snapped_to_grid(interval),
        )
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turns_are_exact() {
        let p = Point::from_nm(1_000_000, 250_000);
        let mut q = p;
        for _ in 0..4 {
            q = q.rotated(Angle::DEG_90, Point::ORIGIN);
        }
        assert_eq!(q, p);
        assert_eq!(
            p.rotated(Angle::DEG_90, Point::ORIGIN),
            Point::from_nm(-250_000, 1_000_000)
        );
    }

    #[test]
    fn rotation_around_center() {
        let p = Point::from_nm(2_000_000, 0);
        let c = Point::from_nm(1_000_000, 0);
        assert_eq!(p.rotated(Angle::DEG_180, c), Point::from_nm(0, 0));
    }

    #[test]
    fn mirror_twice_is_identity() {
        let p = Point::from_nm(1_000_000, -250_000);
        let c = Point::from_nm(500_000, 500_000);
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            assert_eq!(p.mirrored(orientation, c).mirrored(orientation, c), p);
        }
        assert_eq!(
            p.mirrored(Orientation::Horizontal, c),
            Point::from_nm(0, -250_000)
        );
    }

    #[test]
    fn grid_mapping() {
        let grid = PositiveLength::from_nm(1_000_000).unwrap();
        assert_eq!(
            Point::from_nm(1_400_000, 2_600_000).mapped_to_grid(grid),
            Point::from_nm(1_000_000, 3_000_000)
        );
    }

    #[test]
    fn vector_length() {
        assert_eq!(
            Point::from_nm(3_000_000, 4_000_000).length().to_nm(),
            5_000_000
        );
    }
}
