//! Polygons and polylines on a graphics layer.

use uuid::Uuid;

use super::{deserialize_bool, deserialize_path, deserialize_unsigned, serialize_path};
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, GraphicsLayerName, Path, UnsignedLength, Version};

/// Field-change events of a [`Polygon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The layer changed.
    LayerChanged,
    /// The line width changed.
    LineWidthChanged,
    /// The fill flag changed.
    FilledChanged,
    /// The grab-area flag changed.
    GrabAreaChanged,
    /// The vertex path changed.
    PathChanged,
}

/// A polygon on a footprint graphics layer.
///
/// The path may be open (a polyline) or closed (a fillable outline); the
/// arc angle of the last vertex only matters when the path is closed.
#[derive(Debug)]
pub struct Polygon {
    uuid: Uuid,
    layer: GraphicsLayerName,
    line_width: UnsignedLength,
    filled: bool,
    grab_area: bool,
    path: Path,
    on_edited: Signal<PolygonEvent>,
}

impl Polygon {
    /// Creates a polygon.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        layer: GraphicsLayerName,
        line_width: UnsignedLength,
        filled: bool,
        grab_area: bool,
        path: Path,
    ) -> Self {
        Self {
            uuid,
            layer,
            line_width,
            filled,
            grab_area,
            path,
            on_edited: Signal::new(),
        }
    }

    /// Copies `other`'s content under a new uuid.
    #[must_use]
    pub fn with_uuid(uuid: Uuid, other: &Self) -> Self {
        let mut copy = other.clone();
        copy.uuid = uuid;
        copy
    }

    /// The layer.
    #[must_use]
    pub fn layer(&self) -> &GraphicsLayerName {
        &self.layer
    }

    /// The outline line width.
    #[must_use]
    pub fn line_width(&self) -> UnsignedLength {
        self.line_width
    }

    /// Whether the polygon is filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Whether the polygon acts as a grab area.
    #[must_use]
    pub fn is_grab_area(&self) -> bool {
        self.grab_area
    }

    /// The vertex path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets the layer. Returns whether the value changed.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) -> bool {
        if layer == self.layer {
            return false;
        }
        self.layer = layer;
        self.on_edited.notify(&PolygonEvent::LayerChanged);
        true
    }

    /// Sets the line width. Returns whether the value changed.
    pub fn set_line_width(&mut self, width: UnsignedLength) -> bool {
        if width == self.line_width {
            return false;
        }
        self.line_width = width;
        self.on_edited.notify(&PolygonEvent::LineWidthChanged);
        true
    }

    /// Sets the fill flag. Returns whether the value changed.
    pub fn set_filled(&mut self, filled: bool) -> bool {
        if filled == self.filled {
            return false;
        }
        self.filled = filled;
        self.on_edited.notify(&PolygonEvent::FilledChanged);
        true
    }

    /// Sets the grab-area flag. Returns whether the value changed.
    pub fn set_grab_area(&mut self, grab_area: bool) -> bool {
        if grab_area == self.grab_area {
            return false;
        }
        self.grab_area = grab_area;
        self.on_edited.notify(&PolygonEvent::GrabAreaChanged);
        true
    }

    /// Sets the vertex path. Returns whether the value changed.
    pub fn set_path(&mut self, path: Path) -> bool {
        if path == self.path {
            return false;
        }
        self.path = path;
        self.on_edited.notify(&PolygonEvent::PathChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&PolygonEvent::UuidChanged);
        }
        self.set_layer(other.layer.clone());
        self.set_line_width(other.line_width);
        self.set_filled(other.filled);
        self.set_grab_area(other.grab_area);
        self.set_path(other.path.clone());
    }
}

impl Clone for Polygon {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            layer: self.layer.clone(),
            line_width: self.line_width,
            filled: self.filled,
            grab_area: self.grab_area,
            path: self.path.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.layer == other.layer
            && self.line_width == other.line_width
            && self.filled == other.filled
            && self.grab_area == other.grab_area
            && self.path == other.path
    }
}

impl ListItem for Polygon {
    const TAG: &'static str = "polygon";
    type Event = PolygonEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<PolygonEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("layer", &self.layer);
        root.push_value_child("width", self.line_width);
        root.push_value_child("fill", self.filled);
        root.push_value_child("grab_area", self.grab_area);
        serialize_path(root, &self.path);
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            GraphicsLayerName::new(node.child_value("layer")?)?,
            deserialize_unsigned(node, "width")?,
            deserialize_bool(node, "fill")?,
            deserialize_bool(node, "grab_area")?,
            deserialize_path(node)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;
    use crate::types::{Point, Vertex};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn polygon() -> Polygon {
        Polygon::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::from_nm(200_000).unwrap(),
            false,
            false,
            Path::new(vec![
                Vertex::new(Point::from_nm(0, 0)),
                Vertex::new(Point::from_nm(1_000_000, 0)),
            ]),
        )
    }

    #[test]
    fn path_setter_detects_no_op() {
        let mut p = polygon();
        let count = Rc::new(RefCell::new(0));
        let count2 = Rc::clone(&count);
        let _sub = p.on_edited().subscribe(move |_| *count2.borrow_mut() += 1);
        let same = p.path().clone();
        assert!(!p.set_path(same));
        assert_eq!(*count.borrow(), 0);
        assert!(p.set_path(Path::default()));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn serialization_roundtrip() {
        let p = polygon();
        let mut node = SExpr::new(Polygon::TAG);
        p.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Polygon::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, p);
    }
}
