//! Net labels of a schematic net segment.

use uuid::Uuid;

use super::{deserialize_angle, deserialize_bool, deserialize_position, serialize_position};
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Angle, Point, Version};

/// Field-change events of a [`NetLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetLabelEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The position changed.
    PositionChanged,
    /// The rotation changed.
    RotationChanged,
    /// The mirror flag changed.
    MirroredChanged,
}

/// A visual label showing a net name next to a net segment.
#[derive(Debug)]
pub struct NetLabel {
    uuid: Uuid,
    position: Point,
    rotation: Angle,
    mirrored: bool,
    on_edited: Signal<NetLabelEvent>,
}

impl NetLabel {
    /// Creates a net label.
    #[must_use]
    pub fn new(uuid: Uuid, position: Point, rotation: Angle, mirrored: bool) -> Self {
        Self {
            uuid,
            position,
            rotation,
            mirrored,
            on_edited: Signal::new(),
        }
    }

    /// The position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The rotation.
    #[must_use]
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Whether the label is mirrored.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Sets the position. Returns whether the value changed.
    pub fn set_position(&mut self, position: Point) -> bool {
        if position == self.position {
            return false;
        }
        self.position = position;
        self.on_edited.notify(&NetLabelEvent::PositionChanged);
        true
    }

    /// Sets the rotation. Returns whether the value changed.
    pub fn set_rotation(&mut self, rotation: Angle) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        self.on_edited.notify(&NetLabelEvent::RotationChanged);
        true
    }

    /// Sets the mirror flag. Returns whether the value changed.
    pub fn set_mirrored(&mut self, mirrored: bool) -> bool {
        if mirrored == self.mirrored {
            return false;
        }
        self.mirrored = mirrored;
        self.on_edited.notify(&NetLabelEvent::MirroredChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&NetLabelEvent::UuidChanged);
        }
        self.set_position(other.position);
        self.set_rotation(other.rotation);
        self.set_mirrored(other.mirrored);
    }
}

impl Clone for NetLabel {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            position: self.position,
            rotation: self.rotation,
            mirrored: self.mirrored,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for NetLabel {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.position == other.position
            && self.rotation == other.rotation
            && self.mirrored == other.mirrored
    }
}

impl ListItem for NetLabel {
    const TAG: &'static str = "label";
    type Event = NetLabelEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<NetLabelEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        serialize_position(root, self.position);
        root.push_value_child("rotation", self.rotation);
        root.push_value_child("mirror", self.mirrored);
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            deserialize_position(node)?,
            deserialize_angle(node, "rotation")?,
            deserialize_bool(node, "mirror")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn serialization_roundtrip() {
        let label = NetLabel::new(Uuid::new_v4(), Point::from_nm(10, -20), Angle::DEG_90, true);
        let mut node = SExpr::new(NetLabel::TAG);
        label.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = NetLabel::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, label);
    }
}
