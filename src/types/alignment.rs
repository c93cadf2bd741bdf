//! Text alignment.

use std::fmt;

use super::point::Orientation;
use crate::error::{EditorError, EditorResult};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HAlign {
    /// Anchor at the left edge.
    Left,
    /// Anchor at the horizontal center.
    #[default]
    Center,
    /// Anchor at the right edge.
    Right,
}

impl HAlign {
    /// Returns the opposite horizontal alignment.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Center => Self::Center,
            Self::Right => Self::Left,
        }
    }

    const fn token(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(EditorError::invalid_value("HAlign", other)),
        }
    }
}

/// Vertical text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    /// Anchor at the top edge.
    Top,
    /// Anchor at the vertical center.
    #[default]
    Center,
    /// Anchor at the bottom edge.
    Bottom,
}

impl VAlign {
    /// Returns the opposite vertical alignment.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Center => Self::Center,
            Self::Bottom => Self::Top,
        }
    }

    const fn token(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(EditorError::invalid_value("VAlign", other)),
        }
    }
}

/// Combined text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    /// Horizontal part.
    pub h: HAlign,
    /// Vertical part.
    pub v: VAlign,
}

impl Alignment {
    /// Creates an alignment.
    #[must_use]
    pub const fn new(h: HAlign, v: VAlign) -> Self {
        Self { h, v }
    }

    /// Returns the alignment mirrored along the given axis.
    #[must_use]
    pub const fn mirrored(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(self.h.mirrored(), self.v),
            Orientation::Vertical => Self::new(self.h, self.v.mirrored()),
        }
    }

    /// Parses the two-token file format, e.g. `"center bottom"`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input.
    pub fn from_tokens(h: &str, v: &str) -> EditorResult<Self> {
        Ok(Self::new(HAlign::from_token(h)?, VAlign::from_token(v)?))
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.h.token(), self.v.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_twice_is_identity() {
        let align = Alignment::new(HAlign::Left, VAlign::Bottom);
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            assert_eq!(align.mirrored(orientation).mirrored(orientation), align);
        }
        assert_eq!(
            align.mirrored(Orientation::Horizontal),
            Alignment::new(HAlign::Right, VAlign::Bottom)
        );
    }

    #[test]
    fn token_roundtrip() {
        let align = Alignment::new(HAlign::Center, VAlign::Top);
        assert_eq!(align.to_string(), "center top");
        assert_eq!(Alignment::from_tokens("center", "top").unwrap(), align);
        assert!(Alignment::from_tokens("middle", "top").is_err());
    }
}
