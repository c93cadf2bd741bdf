//! Exact ratio arithmetic in integer parts-per-million.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::error::{EditorError, EditorResult};

/// A signed ratio in integer parts-per-million.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ratio(i64);

impl Ratio {
    /// 0 %.
    pub const ZERO: Self = Self(0);
    /// 100 %.
    pub const FULL: Self = Self(1_000_000);

    /// Creates a ratio from parts-per-million.
    #[must_use]
    pub const fn from_ppm(ppm: i64) -> Self {
        Self(ppm)
    }

    /// Returns the ratio in parts-per-million.
    #[must_use]
    pub const fn to_ppm(self) -> i64 {
        self.0
    }

    /// Creates a ratio from whole percent.
    #[must_use]
    pub const fn from_percent(percent: i64) -> Self {
        Self(percent * 10_000)
    }

    /// Creates a ratio from a normalised factor (1.0 = 100 %), rounding to
    /// the nearest ppm.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the input is not finite.
    pub fn from_normalized(factor: f64) -> EditorResult<Self> {
        let ppm = factor * 1_000_000.0;
        if !ppm.is_finite() || ppm.abs() >= i64::MAX as f64 {
            return Err(EditorError::invalid_value("Ratio", factor));
        }
        Ok(Self(ppm.round() as i64))
    }

    /// Returns the ratio as a normalised factor (1.0 = 100 %).
    #[must_use]
    pub fn to_normalized(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Returns the ratio in percent.
    #[must_use]
    pub fn to_percent(self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Parses the decimal percent format of the file format, e.g. `"50.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input.
    pub fn from_percent_str(s: &str) -> EditorResult<Self> {
        let percent: f64 = s
            .parse()
            .map_err(|_| EditorError::invalid_value("Ratio", s))?;
        Self::from_normalized(percent / 100.0)
    }
}

impl Add for Ratio {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Ratio {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Ratio {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// Formats as decimal percent with trailing zeros trimmed, at least one
/// fractional digit. This is the canonical file format representation.
impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int = abs / 10_000;
        let mut frac = abs % 10_000;
        let mut digits = 4;
        while digits > 1 && frac % 10 == 0 {
            frac /= 10;
            digits -= 1;
        }
        write!(f, "{sign}{int}.{frac:0width$}", width = digits)
    }
}

/// A ratio that is guaranteed to be within `[0 %, 100 %]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnsignedLimitedRatio(Ratio);

impl UnsignedLimitedRatio {
    /// 0 %.
    pub const ZERO: Self = Self(Ratio::ZERO);
    /// 100 %.
    pub const FULL: Self = Self(Ratio::FULL);

    /// Creates a limited ratio.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the ratio is outside
    /// `[0 %, 100 %]`.
    pub fn new(ratio: Ratio) -> EditorResult<Self> {
        if ratio < Ratio::ZERO || ratio > Ratio::FULL {
            return Err(EditorError::invalid_value("UnsignedLimitedRatio", ratio));
        }
        Ok(Self(ratio))
    }

    /// Creates a limited ratio, clamping out-of-range input.
    #[must_use]
    pub fn clamped(ratio: Ratio) -> Self {
        Self(ratio.max(Ratio::ZERO).min(Ratio::FULL))
    }

    /// Returns the wrapped [`Ratio`].
    #[must_use]
    pub const fn get(self) -> Ratio {
        self.0
    }
}

impl From<UnsignedLimitedRatio> for Ratio {
    fn from(value: UnsignedLimitedRatio) -> Self {
        value.0
    }
}

impl fmt::Display for UnsignedLimitedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_conversions() {
        assert_eq!(Ratio::from_percent(50).to_ppm(), 500_000);
        assert!((Ratio::from_percent(25).to_normalized() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn display_format() {
        assert_eq!(Ratio::from_percent(50).to_string(), "50.0");
        assert_eq!(Ratio::from_ppm(123_456).to_string(), "12.3456");
        assert_eq!(Ratio::ZERO.to_string(), "0.0");
    }

    #[test]
    fn limited_range() {
        assert!(UnsignedLimitedRatio::new(Ratio::from_percent(101)).is_err());
        assert!(UnsignedLimitedRatio::new(Ratio::from_percent(-1)).is_err());
        assert!(UnsignedLimitedRatio::new(Ratio::FULL).is_ok());
        assert_eq!(
            UnsignedLimitedRatio::clamped(Ratio::from_percent(150)),
            UnsignedLimitedRatio::FULL
        );
    }

    #[test]
    fn parse_percent() {
        assert_eq!(Ratio::from_percent_str("50.0").unwrap(), Ratio::from_percent(50));
        assert!(Ratio::from_percent_str("auto").is_err());
    }
}
