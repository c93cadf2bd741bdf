//! Geometric primitive entities.
//!
//! Every entity has an immutable uuid, setters that report whether anything
//! changed, and a change-event stream with one variant per field. Setters
//! take already-validated value types, so they cannot fail; equality is
//! field-wise and ignores the event stream.

mod circle;
mod hole;
mod net_label;
mod net_line;
mod polygon;
mod stroke_text;
mod trace;
mod zone;

pub use circle::{Circle, CircleEvent};
pub use hole::{Hole, HoleEvent};
pub use net_label::{NetLabel, NetLabelEvent};
pub use net_line::{NetLine, NetLineAnchor, NetLineEvent};
pub use polygon::{Polygon, PolygonEvent};
pub use stroke_text::{StrokeFont, StrokeText, StrokeTextEvent, StrokeTextSpacing};
pub use trace::{Trace, TraceAnchor, TraceEvent};
pub use zone::{Zone, ZoneEvent, ZoneLayers, ZoneRules};

use std::fmt;

use crate::error::{EditorError, EditorResult};
use crate::sexp::SExpr;
use crate::types::{Angle, Length, Path, Point, PositiveLength, UnsignedLength, Vertex};

/// Automatic/manual configuration of a stop mask or solder paste opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaskConfig {
    /// No opening.
    Off,
    /// Opening computed from design rules.
    #[default]
    Auto,
    /// Opening with a manual offset.
    Manual(Length),
}

impl MaskConfig {
    /// Parses the file format token (`off`, `auto` or a millimetre offset).
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input.
    pub fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "off" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            value => Ok(Self::Manual(Length::from_mm_str(value)?)),
        }
    }
}

impl fmt::Display for MaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Auto => f.write_str("auto"),
            Self::Manual(offset) => offset.fmt(f),
        }
    }
}

pub(crate) fn serialize_position(root: &mut SExpr, position: Point) {
    let node = root.append_child("position");
    node.push_token(position.x);
    node.push_token(position.y);
}

pub(crate) fn deserialize_position(node: &SExpr) -> EditorResult<Point> {
    let position = node.child("position")?;
    let x = Length::from_mm_str(position.value(0).ok_or_else(|| {
        EditorError::invalid_element("position", "missing x coordinate")
    })?)?;
    let y = Length::from_mm_str(position.value(1).ok_or_else(|| {
        EditorError::invalid_element("position", "missing y coordinate")
    })?)?;
    Ok(Point::new(x, y))
}

pub(crate) fn deserialize_length(node: &SExpr, name: &'static str) -> EditorResult<Length> {
    Length::from_mm_str(node.child_value(name)?)
}

pub(crate) fn deserialize_unsigned(
    node: &SExpr,
    name: &'static str,
) -> EditorResult<UnsignedLength> {
    UnsignedLength::new(deserialize_length(node, name)?)
}

pub(crate) fn deserialize_positive(
    node: &SExpr,
    name: &'static str,
) -> EditorResult<PositiveLength> {
    PositiveLength::new(deserialize_length(node, name)?)
}

pub(crate) fn deserialize_angle(node: &SExpr, name: &'static str) -> EditorResult<Angle> {
    Angle::from_deg_str(node.child_value(name)?)
}

pub(crate) fn deserialize_bool(node: &SExpr, name: &'static str) -> EditorResult<bool> {
    SExpr::parse_bool(node.child_value(name)?)
}

pub(crate) fn serialize_path(root: &mut SExpr, path: &Path) {
    for vertex in path.vertices() {
        let node = root.append_child("vertex");
        serialize_position(node, vertex.pos);
        node.push_value_child("angle", vertex.angle);
    }
}

pub(crate) fn deserialize_path(node: &SExpr) -> EditorResult<Path> {
    let mut vertices = Vec::new();
    for child in node.query("vertex") {
        let pos = deserialize_position(child)?;
        let angle = deserialize_angle(child, "angle")?;
        vertices.push(Vertex::with_angle(pos, angle));
    }
    Ok(Path::new(vertices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_config_tokens() {
        assert_eq!(MaskConfig::from_token("off").unwrap(), MaskConfig::Off);
        assert_eq!(MaskConfig::from_token("auto").unwrap(), MaskConfig::Auto);
        assert_eq!(
            MaskConfig::from_token("0.1").unwrap(),
            MaskConfig::Manual(Length::from_nm(100_000))
        );
        assert!(MaskConfig::from_token("maybe").is_err());
        assert_eq!(MaskConfig::Manual(Length::from_nm(100_000)).to_string(), "0.1");
    }

    #[test]
    fn path_serialization_roundtrip() {
        let path = Path::new(vec![
            Vertex::with_angle(Point::from_nm(0, 0), Angle::DEG_90),
            Vertex::new(Point::from_nm(1_000_000, -250_000)),
        ]);
        let mut node = SExpr::new("polygon");
        serialize_path(&mut node, &path);
        assert_eq!(deserialize_path(&node).unwrap(), path);
    }
}
