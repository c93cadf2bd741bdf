//! Footprints: the per-variant PCB pattern of a package.

use uuid::Uuid;

use super::footprint_pad::FootprintPad;
use crate::error::EditorResult;
use crate::geometry::{Circle, Hole, Polygon, StrokeText, Zone};
use crate::list::{ListItem, ObjectList};
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Version};

/// Field-change events of a [`Footprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The name changed.
    NameChanged,
}

/// One geometry variant of a package, owning its own primitive lists.
///
/// List mutations are observable through each list's own signal; the
/// footprint's signal only reports its scalar fields.
#[derive(Debug)]
pub struct Footprint {
    uuid: Uuid,
    name: String,
    pads: ObjectList<FootprintPad>,
    circles: ObjectList<Circle>,
    polygons: ObjectList<Polygon>,
    stroke_texts: ObjectList<StrokeText>,
    zones: ObjectList<Zone>,
    holes: ObjectList<Hole>,
    on_edited: Signal<FootprintEvent>,
}

impl Footprint {
    /// Creates an empty footprint.
    #[must_use]
    pub fn new(uuid: Uuid, name: String) -> Self {
        Self {
            uuid,
            name,
            pads: ObjectList::new(),
            circles: ObjectList::new(),
            polygons: ObjectList::new(),
            stroke_texts: ObjectList::new(),
            zones: ObjectList::new(),
            holes: ObjectList::new(),
            on_edited: Signal::new(),
        }
    }

    /// The name, e.g. `default`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The footprint pads.
    #[must_use]
    pub fn pads(&self) -> &ObjectList<FootprintPad> {
        &self.pads
    }

    /// The circles.
    #[must_use]
    pub fn circles(&self) -> &ObjectList<Circle> {
        &self.circles
    }

    /// The polygons.
    #[must_use]
    pub fn polygons(&self) -> &ObjectList<Polygon> {
        &self.polygons
    }

    /// The stroke texts.
    #[must_use]
    pub fn stroke_texts(&self) -> &ObjectList<StrokeText> {
        &self.stroke_texts
    }

    /// The keep-out zones.
    #[must_use]
    pub fn zones(&self) -> &ObjectList<Zone> {
        &self.zones
    }

    /// The non-plated holes.
    #[must_use]
    pub fn holes(&self) -> &ObjectList<Hole> {
        &self.holes
    }

    /// Sets the name. Returns whether the value changed.
    pub fn set_name(&mut self, name: String) -> bool {
        if name == self.name {
            return false;
        }
        self.name = name;
        self.on_edited.notify(&FootprintEvent::NameChanged);
        true
    }

    /// Copies all content from `other`: uuid and name directly, lists via
    /// [`ObjectList::assign`] so observers see each change.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&FootprintEvent::UuidChanged);
        }
        self.set_name(other.name.clone());
        self.pads.assign(&other.pads);
        self.circles.assign(&other.circles);
        self.polygons.assign(&other.polygons);
        self.stroke_texts.assign(&other.stroke_texts);
        self.zones.assign(&other.zones);
        self.holes.assign(&other.holes);
    }
}

impl Clone for Footprint {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            name: self.name.clone(),
            pads: self.pads.deep_copy(),
            circles: self.circles.deep_copy(),
            polygons: self.polygons.deep_copy(),
            stroke_texts: self.stroke_texts.deep_copy(),
            zones: self.zones.deep_copy(),
            holes: self.holes.deep_copy(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Footprint {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.pads == other.pads
            && self.circles == other.circles
            && self.polygons == other.polygons
            && self.stroke_texts == other.stroke_texts
            && self.zones == other.zones
            && self.holes == other.holes
    }
}

impl ListItem for Footprint {
    const TAG: &'static str = "footprint";
    type Event = FootprintEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name_key(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn on_edited(&self) -> &Signal<FootprintEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_text_child("name", self.name.clone());
        self.pads.serialize_into(root);
        self.circles.serialize_into(root);
        self.polygons.serialize_into(root);
        self.stroke_texts.serialize_into(root);
        self.zones.serialize_into(root);
        self.holes.serialize_into(root);
    }

    fn deserialize(node: &SExpr, format: &Version) -> EditorResult<Self> {
        let mut footprint = Self::new(
            parse_uuid(node.first_value()?)?,
            node.child_value("name")?.to_string(),
        );
        footprint.pads = ObjectList::deserialize_from(node, format)?;
        footprint.circles = ObjectList::deserialize_from(node, format)?;
        footprint.polygons = ObjectList::deserialize_from(node, format)?;
        footprint.stroke_texts = ObjectList::deserialize_from(node, format)?;
        footprint.zones = ObjectList::deserialize_from(node, format)?;
        footprint.holes = ObjectList::deserialize_from(node, format)?;
        Ok(footprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;
    use crate::shared;
    use crate::types::{GraphicsLayerName, Point, PositiveLength, UnsignedLength};

    fn footprint_with_circle() -> Footprint {
        let footprint = Footprint::new(Uuid::new_v4(), "default".to_string());
        footprint.circles().append(shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::from_nm(200_000).unwrap(),
            false,
            false,
            Point::ORIGIN,
            PositiveLength::from_nm(1_000_000).unwrap(),
        )));
        footprint
    }

    #[test]
    fn serialization_roundtrip() {
        let footprint = footprint_with_circle();
        let mut node = SExpr::new(Footprint::TAG);
        footprint.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored =
            Footprint::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, footprint);
    }

    #[test]
    fn clone_is_deep() {
        let footprint = footprint_with_circle();
        let copy = footprint.clone();
        footprint.circles().value(0).unwrap().borrow_mut().set_filled(true);
        assert!(!copy.circles().value(0).unwrap().borrow().is_filled());
        assert_ne!(footprint, copy);
    }

    #[test]
    fn assign_replaces_lists() {
        let mut a = Footprint::new(Uuid::new_v4(), "default".to_string());
        let b = footprint_with_circle();
        a.assign(&b);
        assert_eq!(a, b);
        // Elements are copies, not shared with b.
        assert!(!std::rc::Rc::ptr_eq(
            &a.circles().value(0).unwrap(),
            &b.circles().value(0).unwrap()
        ));
    }
}
