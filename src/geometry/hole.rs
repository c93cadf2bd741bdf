//! Non-plated holes, round or slotted.

use uuid::Uuid;

use super::{deserialize_angle, deserialize_position, deserialize_positive, deserialize_unsigned,
            serialize_position, MaskConfig};
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Angle, Point, PositiveLength, UnsignedLength, Version};

/// Field-change events of a [`Hole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The position changed.
    PositionChanged,
    /// The diameter changed.
    DiameterChanged,
    /// The slot length changed.
    SlotLengthChanged,
    /// The rotation changed.
    RotationChanged,
    /// The stop mask configuration changed.
    StopMaskChanged,
}

/// A non-plated hole. A zero slot length makes it round; a positive slot
/// length stretches it along the rotated x axis.
#[derive(Debug)]
pub struct Hole {
    uuid: Uuid,
    position: Point,
    diameter: PositiveLength,
    slot_length: UnsignedLength,
    rotation: Angle,
    stop_mask: MaskConfig,
    on_edited: Signal<HoleEvent>,
}

impl Hole {
    /// Creates a hole.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        position: Point,
        diameter: PositiveLength,
        slot_length: UnsignedLength,
        rotation: Angle,
        stop_mask: MaskConfig,
    ) -> Self {
        Self {
            uuid,
            position,
            diameter,
            slot_length,
            rotation,
            stop_mask,
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

    /// The position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The drill diameter.
    #[must_use]
    pub fn diameter(&self) -> PositiveLength {
        self.diameter
    }

    /// The slot length (zero for a round hole).
    #[must_use]
    pub fn slot_length(&self) -> UnsignedLength {
        self.slot_length
    }

    /// The slot rotation.
    #[must_use]
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// The stop mask configuration.
    #[must_use]
    pub fn stop_mask(&self) -> MaskConfig {
        self.stop_mask
    }

    /// Sets the position. Returns whether the value changed.
    pub fn set_position(&mut self, position: Point) -> bool {
        if position == self.position {
            return false;
        }
        self.position = position;
        self.on_edited.notify(&HoleEvent::PositionChanged);
        true
    }

    /// Sets the diameter. Returns whether the value changed.
    pub fn set_diameter(&mut self, diameter: PositiveLength) -> bool {
        if diameter == self.diameter {
            return false;
        }
        self.diameter = diameter;
        self.on_edited.notify(&HoleEvent::DiameterChanged);
        true
    }

    /// Sets the slot length. Returns whether the value changed.
    pub fn set_slot_length(&mut self, slot_length: UnsignedLength) -> bool {
        if slot_length == self.slot_length {
            return false;
        }
        self.slot_length = slot_length;
        self.on_edited.notify(&HoleEvent::SlotLengthChanged);
        true
    }

    /// Sets the rotation. Returns whether the value changed.
    pub fn set_rotation(&mut self, rotation: Angle) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        self.on_edited.notify(&HoleEvent::RotationChanged);
        true
    }

    /// Sets the stop mask configuration. Returns whether the value changed.
    pub fn set_stop_mask(&mut self, stop_mask: MaskConfig) -> bool {
        if stop_mask == self.stop_mask {
            return false;
        }
        self.stop_mask = stop_mask;
        self.on_edited.notify(&HoleEvent::StopMaskChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&HoleEvent::UuidChanged);
        }
        self.set_position(other.position);
        self.set_diameter(other.diameter);
        self.set_slot_length(other.slot_length);
        self.set_rotation(other.rotation);
        self.set_stop_mask(other.stop_mask);
    }
}

impl Clone for Hole {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            position: self.position,
            diameter: self.diameter,
            slot_length: self.slot_length,
            rotation: self.rotation,
            stop_mask: self.stop_mask,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Hole {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.position == other.position
            && self.diameter == other.diameter
            && self.slot_length == other.slot_length
            && self.rotation == other.rotation
            && self.stop_mask == other.stop_mask
    }
}

impl ListItem for Hole {
    const TAG: &'static str = "hole";
    type Event = HoleEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<HoleEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("diameter", self.diameter);
        root.push_value_child("length", self.slot_length);
        root.push_value_child("rotation", self.rotation);
        serialize_position(root, self.position);
        root.push_value_child("stop_mask", self.stop_mask);
    }

    fn deserialize(node: &SExpr, format: &Version) -> EditorResult<Self> {
        // Slots were introduced with format 0.2; older documents have
        // neither length nor rotation.
        let (slot_length, rotation) = if *format >= Version::format_with_hole_slots() {
            (
                deserialize_unsigned(node, "length")?,
                deserialize_angle(node, "rotation")?,
            )
        } else {
            (UnsignedLength::ZERO, Angle::DEG_0)
        };
        let stop_mask = match node.find("stop_mask") {
            Some(child) => MaskConfig::from_token(child.first_value()?)?,
            None => MaskConfig::Auto,
        };
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            deserialize_position(node)?,
            deserialize_positive(node, "diameter")?,
            slot_length,
            rotation,
            stop_mask,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    fn hole() -> Hole {
        Hole::new(
            Uuid::new_v4(),
            Point::from_nm(500_000, 500_000),
            PositiveLength::from_nm(800_000).unwrap(),
            UnsignedLength::from_nm(1_000_000).unwrap(),
            Angle::DEG_45,
            MaskConfig::Auto,
        )
    }

    #[test]
    fn serialization_roundtrip() {
        let h = hole();
        let mut node = SExpr::new(Hole::TAG);
        h.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Hole::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, h);
    }

    #[test]
    fn pre_slot_format_defaults() {
        let uuid = Uuid::new_v4();
        let text = format!("(hole {uuid} (diameter 0.8) (position 0.0 0.0))");
        let node = parse(&text).unwrap();
        let h = Hole::deserialize(&node, &Version::parse("0.1").unwrap()).unwrap();
        assert_eq!(h.slot_length(), UnsignedLength::ZERO);
        assert_eq!(h.rotation(), Angle::DEG_0);
        assert_eq!(h.stop_mask(), MaskConfig::Auto);
    }

    #[test]
    fn assign_copies_everything() {
        let mut a = hole();
        let b = hole();
        a.assign(&b);
        assert_eq!(a, b);
    }
}
