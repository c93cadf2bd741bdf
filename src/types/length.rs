//! Exact length arithmetic in integer nanometres.
//!
//! All geometry in the editor is stored as signed 64-bit nanometres, so
//! coordinate arithmetic is exact and closed: adding, subtracting and
//! grid-snapping lengths can never accumulate floating point error. Floats
//! appear only at the boundaries (parsing, display, trigonometry).

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::error::{EditorError, EditorResult};

/// Nanometres per millimetre.
const NM_PER_MM: i64 = 1_000_000;

/// A signed length in integer nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Length(i64);

impl Length {
    /// The zero length.
    pub const ZERO: Self = Self(0);

    /// Creates a length from integer nanometres.
    #[must_use]
    pub const fn from_nm(nm: i64) -> Self {
        Self(nm)
    }

    /// Returns the length in nanometres.
    #[must_use]
    pub const fn to_nm(self) -> i64 {
        self.0
    }

    /// Creates a length from millimetres, rounding to the nearest nanometre.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the input is not finite or
    /// does not fit the internal range.
    pub fn from_mm(mm: f64) -> EditorResult<Self> {
        let nm = mm * NM_PER_MM as f64;
        if !nm.is_finite() || nm.abs() >= i64::MAX as f64 {
            return Err(EditorError::invalid_value("Length", mm));
        }
        Ok(Self(nm.round() as i64))
    }

    /// Returns the length in millimetres.
    #[must_use]
    pub fn to_mm(self) -> f64 {
        self.0 as f64 / NM_PER_MM as f64
    }

    /// Parses the fixed-decimal millimetre format of the file format,
    /// e.g. `"0.2"`, `"-1.27"`, `"3"`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input or more than
    /// six fractional digits (sub-nanometre precision).
    pub fn from_mm_str(s: &str) -> EditorResult<Self> {
        let invalid = || EditorError::invalid_value("Length", s);
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > 6 {
            return Err(invalid());
        }
        let mut nm: i64 = 0;
        if !int_part.is_empty() {
            let mm: i64 = int_part.parse().map_err(|_| invalid())?;
            nm = mm.checked_mul(NM_PER_MM).ok_or_else(invalid)?;
        }
        if !frac_part.is_empty() {
            if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let mut frac: i64 = frac_part.parse().map_err(|_| invalid())?;
            for _ in frac_part.len()..6 {
                frac *= 10;
            }
            nm = nm.checked_add(frac).ok_or_else(invalid)?;
        }
        if negative {
            nm = -nm;
        }
        Ok(Self(nm))
    }

    /// Returns the absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Returns the smaller of two lengths.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Returns the larger of two lengths.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// Snaps to the nearest multiple of `interval`, rounding half away
    /// from zero.
    #[must_use]
    pub fn snapped_to_grid(self, interval: PositiveLength) -> Self {
        let step = interval.to_nm();
        let half = step / 2;
        let offset = if self.0 >= 0 { half } else { -half };
        Self((self.0 + offset) / step * step)
    }

    /// Multiplies by a floating point factor, rounding to the nearest
    /// nanometre.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor).round() as i64)
    }
}

impl Add for Length {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Length {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Length {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for Length {
    type Output = Self;
    /// Integer division; rounds toward zero.
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// Formats as millimetres with trailing zeros trimmed, at least one
/// fractional digit. This is the canonical file format representation.
impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int = abs / NM_PER_MM as u64;
        let mut frac = abs % NM_PER_MM as u64;
        let mut digits = 6;
        while digits > 1 && frac % 10 == 0 {
            frac /= 10;
            digits -= 1;
        }
        write!(f, "{sign}{int}.{frac:0width$}", width = digits)
    }
}

/// A length that is guaranteed to be `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnsignedLength(Length);

impl UnsignedLength {
    /// The zero length.
    pub const ZERO: Self = Self(Length::ZERO);

    /// Creates an unsigned length.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the length is negative.
    pub fn new(length: Length) -> EditorResult<Self> {
        if length.to_nm() < 0 {
            return Err(EditorError::invalid_value("UnsignedLength", length));
        }
        Ok(Self(length))
    }

    /// Creates an unsigned length from nanometres.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if `nm` is negative.
    pub fn from_nm(nm: i64) -> EditorResult<Self> {
        Self::new(Length::from_nm(nm))
    }

    /// Returns the wrapped [`Length`].
    #[must_use]
    pub const fn get(self) -> Length {
        self.0
    }

    /// Returns the length in nanometres.
    #[must_use]
    pub const fn to_nm(self) -> i64 {
        self.0.to_nm()
    }
}

impl From<UnsignedLength> for Length {
    fn from(value: UnsignedLength) -> Self {
        value.0
    }
}

impl From<PositiveLength> for UnsignedLength {
    fn from(value: PositiveLength) -> Self {
        Self(value.get())
    }
}

impl Add for UnsignedLength {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for UnsignedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A length that is guaranteed to be `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositiveLength(Length);

impl PositiveLength {
    /// Creates a positive length.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the length is zero or
    /// negative.
    pub fn new(length: Length) -> EditorResult<Self> {
        if length.to_nm() <= 0 {
            return Err(EditorError::invalid_value("PositiveLength", length));
        }
        Ok(Self(length))
    }

    /// Creates a positive length from nanometres.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if `nm` is zero or negative.
    pub fn from_nm(nm: i64) -> EditorResult<Self> {
        Self::new(Length::from_nm(nm))
    }

    /// Returns the wrapped [`Length`].
    #[must_use]
    pub const fn get(self) -> Length {
        self.0
    }

    /// Returns the length in nanometres.
    #[must_use]
    pub const fn to_nm(self) -> i64 {
        self.0.to_nm()
    }
}

impl From<PositiveLength> for Length {
    fn from(value: PositiveLength) -> Self {
        value.0
    }
}

impl fmt::Display for PositiveLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display unit for lengths in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// Millimetres.
    #[default]
    Millimeters,
    /// Micrometres.
    Micrometers,
    /// Nanometres.
    Nanometers,
    /// Inches.
    Inches,
    /// Mils (thousandths of an inch).
    Mils,
}

impl LengthUnit {
    /// Converts a length into this unit.
    #[must_use]
    pub fn convert(self, length: Length) -> f64 {
        let nm = length.to_nm() as f64;
        match self {
            Self::Millimeters => nm / 1_000_000.0,
            Self::Micrometers => nm / 1_000.0,
            Self::Nanometers => nm,
            Self::Inches => nm / 25_400_000.0,
            Self::Mils => nm / 25_400.0,
        }
    }

    /// A reasonable number of decimals when displaying in this unit.
    #[must_use]
    pub const fn reasonable_number_of_decimals(self) -> usize {
        match self {
            Self::Millimeters => 3,
            Self::Micrometers | Self::Mils => 1,
            Self::Nanometers => 0,
            Self::Inches => 4,
        }
    }

    /// Short unit suffix for status bar texts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Micrometers => "μm",
            Self::Nanometers => "nm",
            Self::Inches => "″",
            Self::Mils => "mils",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Length::from_nm(200_000).to_string(), "0.2");
        assert_eq!(Length::from_nm(1_000_000).to_string(), "1.0");
        assert_eq!(Length::from_nm(-1_270_000).to_string(), "-1.27");
        assert_eq!(Length::ZERO.to_string(), "0.0");
        assert_eq!(Length::from_nm(1).to_string(), "0.000001");
    }

    #[test]
    fn parse_mm_strings() {
        assert_eq!(Length::from_mm_str("0.2").unwrap(), Length::from_nm(200_000));
        assert_eq!(Length::from_mm_str("-1.27").unwrap(), Length::from_nm(-1_270_000));
        assert_eq!(Length::from_mm_str("3").unwrap(), Length::from_nm(3_000_000));
        assert_eq!(Length::from_mm_str("0.000001").unwrap(), Length::from_nm(1));
        assert!(Length::from_mm_str("").is_err());
        assert!(Length::from_mm_str("1.2.3").is_err());
        assert!(Length::from_mm_str("0.0000001").is_err());
        assert!(Length::from_mm_str("abc").is_err());
    }

    #[test]
    fn display_parse_roundtrip() {
        for nm in [0, 1, -1, 200_000, 2_540_000, -1_016_000, 123_456_789] {
            let length = Length::from_nm(nm);
            assert_eq!(Length::from_mm_str(&length.to_string()).unwrap(), length);
        }
    }

    #[test]
    fn snapping_rounds_to_nearest() {
        let grid = PositiveLength::from_nm(2_540_000).unwrap();
        assert_eq!(Length::from_nm(1_000_000).snapped_to_grid(grid), Length::ZERO);
        assert_eq!(Length::from_nm(1_500_000).snapped_to_grid(grid), Length::from_nm(2_540_000));
        assert_eq!(Length::from_nm(3_900_000).snapped_to_grid(grid), Length::from_nm(5_080_000));
        assert_eq!(Length::from_nm(-1_500_000).snapped_to_grid(grid), Length::from_nm(-2_540_000));
        assert_eq!(Length::ZERO.snapped_to_grid(grid), Length::ZERO);
    }

    #[test]
    fn unsigned_rejects_negative() {
        assert!(UnsignedLength::from_nm(-1).is_err());
        assert!(UnsignedLength::from_nm(0).is_ok());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(PositiveLength::from_nm(0).is_err());
        assert!(PositiveLength::from_nm(-5).is_err());
        assert!(PositiveLength::from_nm(1).is_ok());
    }

    #[test]
    fn division_rounds_toward_zero() {
        assert_eq!(Length::from_nm(7) / 2, Length::from_nm(3));
        assert_eq!(Length::from_nm(-7) / 2, Length::from_nm(-3));
    }

    #[test]
    fn unit_conversion() {
        let one_inch = Length::from_nm(25_400_000);
        assert!((LengthUnit::Mils.convert(one_inch) - 1000.0).abs() < 1e-9);
        assert!((LengthUnit::Millimeters.convert(one_inch) - 25.4).abs() < 1e-9);
    }
}
