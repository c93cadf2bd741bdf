//! Logical pads of a package.

use uuid::Uuid;

use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, CircuitIdentifier, Version};

/// Field-change events of a [`PackagePad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePadEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The name changed.
    NameChanged,
}

/// The logical identity of a package pad, referenced from footprint pads.
///
/// Names must be unique within the package's pad list; the command layer
/// enforces this on insert and rename.
#[derive(Debug)]
pub struct PackagePad {
    uuid: Uuid,
    name: CircuitIdentifier,
    on_edited: Signal<PackagePadEvent>,
}

impl PackagePad {
    /// Creates a package pad.
    #[must_use]
    pub fn new(uuid: Uuid, name: CircuitIdentifier) -> Self {
        Self {
            uuid,
            name,
            on_edited: Signal::new(),
        }
    }

    /// The name.
    #[must_use]
    pub fn name(&self) -> &CircuitIdentifier {
        &self.name
    }

    /// Sets the name. Returns whether the value changed.
    pub fn set_name(&mut self, name: CircuitIdentifier) -> bool {
        if name == self.name {
            return false;
        }
        self.name = name;
        self.on_edited.notify(&PackagePadEvent::NameChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&PackagePadEvent::UuidChanged);
        }
        self.set_name(other.name.clone());
    }
}

impl Clone for PackagePad {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            name: self.name.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for PackagePad {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid && self.name == other.name
    }
}

impl ListItem for PackagePad {
    const TAG: &'static str = "pad";
    type Event = PackagePadEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name_key(&self) -> Option<String> {
        Some(self.name.as_str().to_string())
    }

    fn on_edited(&self) -> &Signal<PackagePadEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_text(self.name.as_str());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let uuid = parse_uuid(node.first_value()?)?;
        let name = CircuitIdentifier::new(node.value(1).ok_or_else(|| {
            crate::error::EditorError::invalid_element("pad", "missing name token")
        })?)?;
        Ok(Self::new(uuid, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn serialization_roundtrip() {
        let pad = PackagePad::new(Uuid::new_v4(), CircuitIdentifier::new("A1").unwrap());
        let mut node = SExpr::new(PackagePad::TAG);
        pad.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = PackagePad::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, pad);
    }

    #[test]
    fn name_lookup_key() {
        let pad = PackagePad::new(Uuid::new_v4(), CircuitIdentifier::new("GND").unwrap());
        assert_eq!(pad.name_key().as_deref(), Some("GND"));
    }
}
