//! Dotted numeric version tuples for the file format and library elements.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{EditorError, EditorResult};

/// A dotted numeric version, e.g. `0.2` or `1.4.12`.
///
/// Comparison ignores trailing zero segments, so `0.2` equals `0.2.0`.
#[derive(Debug, Clone, Eq, Hash)]
pub struct Version {
    segments: Vec<u32>,
}

impl Version {
    /// Parses a version string.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the string is not one to ten
    /// dot-separated decimal numbers.
    pub fn parse(s: &str) -> EditorResult<Self> {
        let invalid = || EditorError::invalid_value("Version", s);
        let segments: Vec<u32> = s
            .split('.')
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        if segments.is_empty() || segments.len() > 10 {
            return Err(invalid());
        }
        Ok(Self { segments })
    }

    /// Creates a version from segments.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] for zero or more than ten
    /// segments.
    pub fn from_segments(segments: Vec<u32>) -> EditorResult<Self> {
        if segments.is_empty() || segments.len() > 10 {
            return Err(EditorError::invalid_value("Version", format!("{segments:?}")));
        }
        Ok(Self { segments })
    }

    /// The current file format version written by this crate.
    #[must_use]
    pub fn current_file_format() -> Self {
        Self {
            segments: vec![0, 2],
        }
    }

    /// The file format which introduced hole slots (`length`, `rotation`).
    #[must_use]
    pub fn format_with_hole_slots() -> Self {
        Self {
            segments: vec![0, 2],
        }
    }

    /// The version segments.
    #[must_use]
    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    fn normalized(&self) -> &[u32] {
        let mut len = self.segments.len();
        while len > 1 && self.segments[len - 1] == 0 {
            len -= 1;
        }
        &self.segments[..len]
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(other.normalized())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let v = Version::parse("0.2").unwrap();
        assert_eq!(v.to_string(), "0.2");
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1..2").is_err());
        assert!(Version::parse("a.b").is_err());
        assert!(Version::parse("1.2.3.4.5.6.7.8.9.10.11").is_err());
    }

    #[test]
    fn comparison_ignores_trailing_zeros() {
        assert_eq!(Version::parse("0.2").unwrap(), Version::parse("0.2.0").unwrap());
        assert!(Version::parse("0.2").unwrap() > Version::parse("0.1.9").unwrap());
        assert!(Version::parse("1.0").unwrap() > Version::parse("0.9").unwrap());
    }

    #[test]
    fn hole_slot_gate() {
        assert!(Version::parse("0.1").unwrap() < Version::format_with_hole_slots());
        assert!(Version::current_file_format() >= Version::format_with_hole_slots());
    }
}
