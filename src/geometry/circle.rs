//! Circles on a graphics layer.

use uuid::Uuid;

use super::{deserialize_bool, deserialize_position, deserialize_positive, deserialize_unsigned,
            serialize_position};
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, GraphicsLayerName, Point, PositiveLength, UnsignedLength, Version};

/// Field-change events of a [`Circle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleEvent {
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
    /// The center position changed.
    CenterChanged,
    /// The diameter changed.
    DiameterChanged,
}

/// A circle on a footprint graphics layer.
#[derive(Debug)]
pub struct Circle {
    uuid: Uuid,
    layer: GraphicsLayerName,
    line_width: UnsignedLength,
    filled: bool,
    grab_area: bool,
    center: Point,
    diameter: PositiveLength,
    on_edited: Signal<CircleEvent>,
}

impl Circle {
    /// Creates a circle.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        layer: GraphicsLayerName,
        line_width: UnsignedLength,
        filled: bool,
        grab_area: bool,
        center: Point,
        diameter: PositiveLength,
    ) -> Self {
        Self {
            uuid,
            layer,
            line_width,
            filled,
            grab_area,
            center,
            diameter,
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

    /// Whether the circle is filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Whether the circle acts as a grab area.
    #[must_use]
    pub fn is_grab_area(&self) -> bool {
        self.grab_area
    }

    /// The center position.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// The diameter.
    #[must_use]
    pub fn diameter(&self) -> PositiveLength {
        self.diameter
    }

    /// Sets the layer. Returns whether the value changed.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) -> bool {
        if layer == self.layer {
            return false;
        }
        self.layer = layer;
        self.on_edited.notify(&CircleEvent::LayerChanged);
        true
    }

    /// Sets the line width. Returns whether the value changed.
    pub fn set_line_width(&mut self, width: UnsignedLength) -> bool {
        if width == self.line_width {
            return false;
        }
        self.line_width = width;
        self.on_edited.notify(&CircleEvent::LineWidthChanged);
        true
    }

    /// Sets the fill flag. Returns whether the value changed.
    pub fn set_filled(&mut self, filled: bool) -> bool {
        if filled == self.filled {
            return false;
        }
        self.filled = filled;
        self.on_edited.notify(&CircleEvent::FilledChanged);
        true
    }

    /// Sets the grab-area flag. Returns whether the value changed.
    pub fn set_grab_area(&mut self, grab_area: bool) -> bool {
        if grab_area == self.grab_area {
            return false;
        }
        self.grab_area = grab_area;
        self.on_edited.notify(&CircleEvent::GrabAreaChanged);
        true
    }

    /// Sets the center. Returns whether the value changed.
    pub fn set_center(&mut self, center: Point) -> bool {
        if center == self.center {
            return false;
        }
        self.center = center;
        self.on_edited.notify(&CircleEvent::CenterChanged);
        true
    }

    /// Sets the diameter. Returns whether the value changed.
    pub fn set_diameter(&mut self, diameter: PositiveLength) -> bool {
        if diameter == self.diameter {
            return false;
        }
        self.diameter = diameter;
        self.on_edited.notify(&CircleEvent::DiameterChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&CircleEvent::UuidChanged);
        }
        self.set_layer(other.layer.clone());
        self.set_line_width(other.line_width);
        self.set_filled(other.filled);
        self.set_grab_area(other.grab_area);
        self.set_center(other.center);
        self.set_diameter(other.diameter);
    }
}

impl Clone for Circle {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            layer: self.layer.clone(),
            line_width: self.line_width,
            filled: self.filled,
            grab_area: self.grab_area,
            center: self.center,
            diameter: self.diameter,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.layer == other.layer
            && self.line_width == other.line_width
            && self.filled == other.filled
            && self.grab_area == other.grab_area
            && self.center == other.center
            && self.diameter == other.diameter
    }
}

impl ListItem for Circle {
    const TAG: &'static str = "circle";
    type Event = CircleEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<CircleEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("layer", &self.layer);
        root.push_value_child("width", self.line_width);
        root.push_value_child("fill", self.filled);
        root.push_value_child("grab_area", self.grab_area);
        root.push_value_child("diameter", self.diameter);
        serialize_position(root, self.center);
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            GraphicsLayerName::new(node.child_value("layer")?)?,
            deserialize_unsigned(node, "width")?,
            deserialize_bool(node, "fill")?,
            deserialize_bool(node, "grab_area")?,
            deserialize_position(node)?,
            deserialize_positive(node, "diameter")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn circle() -> Circle {
        Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::from_nm(200_000).unwrap(),
            false,
            true,
            Point::from_nm(1_000_000, -500_000),
            PositiveLength::from_nm(2_000_000).unwrap(),
        )
    }

    #[test]
    fn setters_report_changes_and_emit_once() {
        let mut c = circle();
        let events = Rc::new(RefCell::new(Vec::new()));
        let events2 = Rc::clone(&events);
        let _sub = c.on_edited().subscribe(move |e| events2.borrow_mut().push(*e));

        assert!(c.set_filled(true));
        assert!(!c.set_filled(true));
        assert!(c.set_center(Point::ORIGIN));
        assert_eq!(
            *events.borrow(),
            vec![CircleEvent::FilledChanged, CircleEvent::CenterChanged]
        );
    }

    #[test]
    fn equality_ignores_subscribers() {
        let c = circle();
        let copy = c.clone();
        let _sub = c.on_edited().subscribe(|_| {});
        assert_eq!(c, copy);
    }

    #[test]
    fn assign_emits_uuid_first() {
        let mut a = circle();
        let mut b = circle();
        b.set_filled(true);
        let events = Rc::new(RefCell::new(Vec::new()));
        let events2 = Rc::clone(&events);
        let _sub = a.on_edited().subscribe(move |e| events2.borrow_mut().push(*e));
        a.assign(&b);
        assert_eq!(
            *events.borrow(),
            vec![CircleEvent::UuidChanged, CircleEvent::FilledChanged]
        );
        assert_eq!(a, b);
    }

    #[test]
    fn serialization_roundtrip() {
        let c = circle();
        let mut node = SExpr::new(Circle::TAG);
        c.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Circle::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, c);
    }

    #[test]
    fn deserialization_rejects_zero_diameter() {
        let c = circle();
        let mut node = SExpr::new(Circle::TAG);
        c.serialize(&mut node);
        let text = write(&node).replace("(diameter 2.0)", "(diameter 0.0)");
        let reparsed = parse(&text).unwrap();
        assert!(Circle::deserialize(&reparsed, &Version::current_file_format()).is_err());
    }
}
