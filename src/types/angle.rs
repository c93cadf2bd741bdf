//! Exact angle arithmetic in integer microdegrees.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::{EditorError, EditorResult};

/// Microdegrees per full turn.
const FULL_TURN: i64 = 360_000_000;

/// A signed angle in integer microdegrees.
///
/// The stored value is not normalised; rotations compose exactly and callers
/// choose a normalisation range explicitly when they need one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Angle(i64);

impl Angle {
    /// 0°.
    pub const DEG_0: Self = Self(0);
    /// 45°.
    pub const DEG_45: Self = Self(45_000_000);
    /// 90°.
    pub const DEG_90: Self = Self(90_000_000);
    /// 180°.
    pub const DEG_180: Self = Self(180_000_000);
    /// 270°.
    pub const DEG_270: Self = Self(270_000_000);

    /// Creates an angle from integer microdegrees.
    #[must_use]
    pub const fn from_microdeg(microdeg: i64) -> Self {
        Self(microdeg)
    }

    /// Returns the angle in microdegrees.
    #[must_use]
    pub const fn to_microdeg(self) -> i64 {
        self.0
    }

    /// Creates an angle from degrees, rounding to the nearest microdegree.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the input is not finite.
    pub fn from_deg(deg: f64) -> EditorResult<Self> {
        let microdeg = deg * 1_000_000.0;
        if !microdeg.is_finite() || microdeg.abs() >= i64::MAX as f64 {
            return Err(EditorError::invalid_value("Angle", deg));
        }
        Ok(Self(microdeg.round() as i64))
    }

    /// Parses the decimal degree format of the file format, e.g. `"90.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input.
    pub fn from_deg_str(s: &str) -> EditorResult<Self> {
        let deg: f64 = s
            .parse()
            .map_err(|_| EditorError::invalid_value("Angle", s))?;
        Self::from_deg(deg)
    }

    /// Returns the angle in degrees.
    #[must_use]
    pub fn to_deg(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Returns the angle in radians.
    #[must_use]
    pub fn to_rad(self) -> f64 {
        self.to_deg().to_radians()
    }

    /// Creates an angle from radians, rounding to the nearest microdegree.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the input is not finite.
    pub fn from_rad(rad: f64) -> EditorResult<Self> {
        Self::from_deg(rad.to_degrees())
    }

    /// Normalises into `[0°, 360°)`.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self(self.0.rem_euclid(FULL_TURN))
    }

    /// Normalises into `[-180°, 180°)`.
    #[must_use]
    pub const fn normalized_180(self) -> Self {
        let n = (self.0 + 180_000_000).rem_euclid(FULL_TURN);
        Self(n - 180_000_000)
    }

    /// Whether this angle is an exact multiple of 90°.
    #[must_use]
    pub const fn is_multiple_of_90(self) -> bool {
        self.0 % 90_000_000 == 0
    }

    /// Sine of the angle.
    #[must_use]
    pub fn sin(self) -> f64 {
        self.to_rad().sin()
    }

    /// Cosine of the angle.
    #[must_use]
    pub fn cos(self) -> f64 {
        self.to_rad().cos()
    }
}

impl Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Angle {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Angle {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// Formats as decimal degrees with trailing zeros trimmed, at least one
/// fractional digit. This is the canonical file format representation.
impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int = abs / 1_000_000;
        let mut frac = abs % 1_000_000;
        let mut digits = 6;
        while digits > 1 && frac % 10 == 0 {
            frac /= 10;
            digits -= 1;
        }
        write!(f, "{sign}{int}.{frac:0width$}", width = digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_ranges() {
        assert_eq!(Angle::from_microdeg(-90_000_000).normalized(), Angle::DEG_270);
        assert_eq!(Angle::from_microdeg(360_000_000).normalized(), Angle::DEG_0);
        assert_eq!(Angle::from_microdeg(540_000_000).normalized(), Angle::DEG_180);
        assert_eq!(Angle::DEG_270.normalized_180(), Angle::from_microdeg(-90_000_000));
        assert_eq!(Angle::DEG_180.normalized_180(), Angle::from_microdeg(-180_000_000));
        assert_eq!(Angle::DEG_90.normalized_180(), Angle::DEG_90);
    }

    #[test]
    fn display_format() {
        assert_eq!(Angle::DEG_90.to_string(), "90.0");
        assert_eq!(Angle::from_microdeg(-45_500_000).to_string(), "-45.5");
        assert_eq!(Angle::DEG_0.to_string(), "0.0");
    }

    #[test]
    fn parse_degrees() {
        assert_eq!(Angle::from_deg_str("90.0").unwrap(), Angle::DEG_90);
        assert_eq!(Angle::from_deg_str("-45.5").unwrap(), Angle::from_microdeg(-45_500_000));
        assert!(Angle::from_deg_str("ninety").is_err());
    }

    #[test]
    fn rotation_composition_is_exact() {
        let mut angle = Angle::DEG_0;
        for _ in 0..4 {
            angle += Angle::DEG_90;
        }
        assert_eq!(angle.normalized(), Angle::DEG_0);
    }
}
