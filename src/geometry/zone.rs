//! Keep-out zones.

use bitflags::bitflags;

use uuid::Uuid;

use super::{deserialize_path, serialize_path};
use crate::error::{EditorError, EditorResult};
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Path, Version};

bitflags! {
    /// Board sides a zone applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ZoneLayers: u8 {
        /// Top copper side.
        const TOP = 0x01;
        /// All inner copper layers.
        const INNER = 0x02;
        /// Bottom copper side.
        const BOTTOM = 0x04;
    }
}

bitflags! {
    /// What a zone keeps out.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ZoneRules: u8 {
        /// No copper objects.
        const NO_COPPER = 0x01;
        /// No planes/pours.
        const NO_PLANES = 0x02;
        /// No stop mask openings.
        const NO_EXPOSURE = 0x04;
        /// No devices.
        const NO_DEVICES = 0x08;
        /// All of the above.
        const ALL = 0x0f;
    }
}

impl ZoneLayers {
    fn tokens(self) -> Vec<&'static str> {
        let mut tokens = Vec::new();
        if self.contains(Self::TOP) {
            tokens.push("top");
        }
        if self.contains(Self::INNER) {
            tokens.push("inner");
        }
        if self.contains(Self::BOTTOM) {
            tokens.push("bottom");
        }
        tokens
    }

    fn from_tokens(tokens: &[&str]) -> EditorResult<Self> {
        let mut layers = Self::empty();
        for token in tokens {
            layers |= match *token {
                "top" => Self::TOP,
                "inner" => Self::INNER,
                "bottom" => Self::BOTTOM,
                other => return Err(EditorError::invalid_value("ZoneLayers", other)),
            };
        }
        Ok(layers)
    }
}

impl ZoneRules {
    fn tokens(self) -> Vec<&'static str> {
        let mut tokens = Vec::new();
        if self.contains(Self::NO_COPPER) {
            tokens.push("no_copper");
        }
        if self.contains(Self::NO_PLANES) {
            tokens.push("no_planes");
        }
        if self.contains(Self::NO_EXPOSURE) {
            tokens.push("no_exposure");
        }
        if self.contains(Self::NO_DEVICES) {
            tokens.push("no_devices");
        }
        tokens
    }

    fn from_tokens(tokens: &[&str]) -> EditorResult<Self> {
        let mut rules = Self::empty();
        for token in tokens {
            rules |= match *token {
                "no_copper" => Self::NO_COPPER,
                "no_planes" => Self::NO_PLANES,
                "no_exposure" => Self::NO_EXPOSURE,
                "no_devices" => Self::NO_DEVICES,
                other => return Err(EditorError::invalid_value("ZoneRules", other)),
            };
        }
        Ok(rules)
    }
}

/// Field-change events of a [`Zone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The layer set changed.
    LayersChanged,
    /// The rule set changed.
    RulesChanged,
    /// The outline changed.
    OutlineChanged,
}

/// A keep-out zone over a set of board sides.
///
/// The outline is conceptually closed; while the user is still drawing it
/// the stored path may be open.
#[derive(Debug)]
pub struct Zone {
    uuid: Uuid,
    layers: ZoneLayers,
    rules: ZoneRules,
    outline: Path,
    on_edited: Signal<ZoneEvent>,
}

impl Zone {
    /// Creates a zone.
    #[must_use]
    pub fn new(uuid: Uuid, layers: ZoneLayers, rules: ZoneRules, outline: Path) -> Self {
        Self {
            uuid,
            layers,
            rules,
            outline,
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

    /// The board sides the zone applies to.
    #[must_use]
    pub fn layers(&self) -> ZoneLayers {
        self.layers
    }

    /// The keep-out rules.
    #[must_use]
    pub fn rules(&self) -> ZoneRules {
        self.rules
    }

    /// The outline path.
    #[must_use]
    pub fn outline(&self) -> &Path {
        &self.outline
    }

    /// Sets the layer set. Returns whether the value changed.
    pub fn set_layers(&mut self, layers: ZoneLayers) -> bool {
        if layers == self.layers {
            return false;
        }
        self.layers = layers;
        self.on_edited.notify(&ZoneEvent::LayersChanged);
        true
    }

    /// Sets the rule set. Returns whether the value changed.
    pub fn set_rules(&mut self, rules: ZoneRules) -> bool {
        if rules == self.rules {
            return false;
        }
        self.rules = rules;
        self.on_edited.notify(&ZoneEvent::RulesChanged);
        true
    }

    /// Sets the outline. Returns whether the value changed.
    pub fn set_outline(&mut self, outline: Path) -> bool {
        if outline == self.outline {
            return false;
        }
        self.outline = outline;
        self.on_edited.notify(&ZoneEvent::OutlineChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&ZoneEvent::UuidChanged);
        }
        self.set_layers(other.layers);
        self.set_rules(other.rules);
        self.set_outline(other.outline.clone());
    }
}

impl Clone for Zone {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            layers: self.layers,
            rules: self.rules,
            outline: self.outline.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.layers == other.layers
            && self.rules == other.rules
            && self.outline == other.outline
    }
}

impl ListItem for Zone {
    const TAG: &'static str = "zone";
    type Event = ZoneEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<ZoneEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        let layers = root.append_child("layers");
        for token in self.layers.tokens() {
            layers.push_token(token);
        }
        let rules = root.append_child("rules");
        for token in self.rules.tokens() {
            rules.push_token(token);
        }
        serialize_path(root, &self.outline);
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            ZoneLayers::from_tokens(&node.child("layers")?.values())?,
            ZoneRules::from_tokens(&node.child("rules")?.values())?,
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

    fn zone() -> Zone {
        Zone::new(
            Uuid::new_v4(),
            ZoneLayers::TOP | ZoneLayers::BOTTOM,
            ZoneRules::NO_COPPER | ZoneRules::NO_DEVICES,
            Path::new(vec![
                Vertex::new(Point::from_nm(0, 0)),
                Vertex::new(Point::from_nm(1_000_000, 0)),
                Vertex::new(Point::from_nm(1_000_000, 1_000_000)),
                Vertex::new(Point::from_nm(0, 0)),
            ]),
        )
    }

    #[test]
    fn serialization_roundtrip() {
        let z = zone();
        let mut node = SExpr::new(Zone::TAG);
        z.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Zone::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, z);
    }

    #[test]
    fn unknown_layer_token_is_rejected() {
        let uuid = Uuid::new_v4();
        let text = format!("(zone {uuid} (layers top middle) (rules no_copper))");
        let node = parse(&text).unwrap();
        assert!(Zone::deserialize(&node, &Version::current_file_format()).is_err());
    }

    #[test]
    fn flag_setters() {
        let mut z = zone();
        assert!(z.set_layers(ZoneLayers::INNER));
        assert!(!z.set_layers(ZoneLayers::INNER));
        assert!(z.set_rules(ZoneRules::ALL));
        assert!(z.rules().contains(ZoneRules::NO_EXPOSURE));
    }
}
