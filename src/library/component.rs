//! Component-level library items: signals, symbol variant items and device
//! pad/signal mappings.

use std::fmt;

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::geometry::{deserialize_angle, deserialize_bool, deserialize_position,
                      serialize_position};
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Angle, CircuitIdentifier, Point, Version};

/// Electrical role of a component signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalRole {
    /// No specific role.
    #[default]
    Passive,
    /// Power supply pin.
    Power,
    /// Input pin.
    Input,
    /// Output pin.
    Output,
    /// Bidirectional pin.
    InOut,
    /// Open-drain output.
    OpenDrain,
}

impl SignalRole {
    const fn token(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Power => "power",
            Self::Input => "input",
            Self::Output => "output",
            Self::InOut => "inout",
            Self::OpenDrain => "opendrain",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "passive" => Ok(Self::Passive),
            "power" => Ok(Self::Power),
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            "inout" => Ok(Self::InOut),
            "opendrain" => Ok(Self::OpenDrain),
            other => Err(EditorError::invalid_value("SignalRole", other)),
        }
    }
}

impl fmt::Display for SignalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Field-change events of a [`ComponentSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSignalEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The name changed.
    NameChanged,
    /// The role changed.
    RoleChanged,
    /// The required flag changed.
    RequiredChanged,
    /// The negated flag changed.
    NegatedChanged,
    /// The clock flag changed.
    ClockChanged,
    /// The forced net name changed.
    ForcedNetNameChanged,
}

/// An abstract electrical signal of a component.
#[derive(Debug)]
pub struct ComponentSignal {
    uuid: Uuid,
    name: CircuitIdentifier,
    role: SignalRole,
    required: bool,
    negated: bool,
    clock: bool,
    forced_net_name: String,
    on_edited: Signal<ComponentSignalEvent>,
}

impl ComponentSignal {
    /// Creates a component signal.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        name: CircuitIdentifier,
        role: SignalRole,
        required: bool,
        negated: bool,
        clock: bool,
        forced_net_name: String,
    ) -> Self {
        Self {
            uuid,
            name,
            role,
            required,
            negated,
            clock,
            forced_net_name,
            on_edited: Signal::new(),
        }
    }

    /// The name.
    #[must_use]
    pub fn name(&self) -> &CircuitIdentifier {
        &self.name
    }

    /// The role.
    #[must_use]
    pub fn role(&self) -> SignalRole {
        self.role
    }

    /// Whether the signal must be connected.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the signal is active-low.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether the signal is a clock.
    #[must_use]
    pub fn is_clock(&self) -> bool {
        self.clock
    }

    /// The forced net name (empty for none).
    #[must_use]
    pub fn forced_net_name(&self) -> &str {
        &self.forced_net_name
    }

    /// Sets the name. Returns whether the value changed.
    pub fn set_name(&mut self, name: CircuitIdentifier) -> bool {
        if name == self.name {
            return false;
        }
        self.name = name;
        self.on_edited.notify(&ComponentSignalEvent::NameChanged);
        true
    }

    /// Sets the role. Returns whether the value changed.
    pub fn set_role(&mut self, role: SignalRole) -> bool {
        if role == self.role {
            return false;
        }
        self.role = role;
        self.on_edited.notify(&ComponentSignalEvent::RoleChanged);
        true
    }

    /// Sets the required flag. Returns whether the value changed.
    pub fn set_required(&mut self, required: bool) -> bool {
        if required == self.required {
            return false;
        }
        self.required = required;
        self.on_edited.notify(&ComponentSignalEvent::RequiredChanged);
        true
    }

    /// Sets the negated flag. Returns whether the value changed.
    pub fn set_negated(&mut self, negated: bool) -> bool {
        if negated == self.negated {
            return false;
        }
        self.negated = negated;
        self.on_edited.notify(&ComponentSignalEvent::NegatedChanged);
        true
    }

    /// Sets the clock flag. Returns whether the value changed.
    pub fn set_clock(&mut self, clock: bool) -> bool {
        if clock == self.clock {
            return false;
        }
        self.clock = clock;
        self.on_edited.notify(&ComponentSignalEvent::ClockChanged);
        true
    }

    /// Sets the forced net name. Returns whether the value changed.
    pub fn set_forced_net_name(&mut self, name: String) -> bool {
        if name == self.forced_net_name {
            return false;
        }
        self.forced_net_name = name;
        self.on_edited.notify(&ComponentSignalEvent::ForcedNetNameChanged);
        true
    }
}

impl Clone for ComponentSignal {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            name: self.name.clone(),
            role: self.role,
            required: self.required,
            negated: self.negated,
            clock: self.clock,
            forced_net_name: self.forced_net_name.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for ComponentSignal {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.role == other.role
            && self.required == other.required
            && self.negated == other.negated
            && self.clock == other.clock
            && self.forced_net_name == other.forced_net_name
    }
}

impl ListItem for ComponentSignal {
    const TAG: &'static str = "signal";
    type Event = ComponentSignalEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn name_key(&self) -> Option<String> {
        Some(self.name.as_str().to_string())
    }

    fn on_edited(&self) -> &Signal<ComponentSignalEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_text_child("name", self.name.as_str());
        root.push_value_child("role", self.role);
        root.push_value_child("required", self.required);
        root.push_value_child("negated", self.negated);
        root.push_value_child("clock", self.clock);
        root.push_text_child("forced_net", self.forced_net_name.clone());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            CircuitIdentifier::new(node.child_value("name")?)?,
            SignalRole::from_token(node.child_value("role")?)?,
            deserialize_bool(node, "required")?,
            deserialize_bool(node, "negated")?,
            deserialize_bool(node, "clock")?,
            node.child("forced_net")?.value(0).unwrap_or_default().to_string(),
        ))
    }
}

/// Field-change events of a [`ComponentSymbolVariantItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentSymbolVariantItemEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The symbol reference changed.
    SymbolChanged,
    /// The position changed.
    PositionChanged,
    /// The rotation changed.
    RotationChanged,
    /// The mirror flag changed.
    MirroredChanged,
    /// The required flag changed.
    RequiredChanged,
    /// The suffix changed.
    SuffixChanged,
}

/// One gate of a component symbol variant: which symbol to place and how.
#[derive(Debug)]
pub struct ComponentSymbolVariantItem {
    uuid: Uuid,
    symbol: Uuid,
    position: Point,
    rotation: Angle,
    mirrored: bool,
    required: bool,
    suffix: String,
    on_edited: Signal<ComponentSymbolVariantItemEvent>,
}

impl ComponentSymbolVariantItem {
    /// Creates a symbol variant item.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        symbol: Uuid,
        position: Point,
        rotation: Angle,
        mirrored: bool,
        required: bool,
        suffix: String,
    ) -> Self {
        Self {
            uuid,
            symbol,
            position,
            rotation,
            mirrored,
            required,
            suffix,
            on_edited: Signal::new(),
        }
    }

    /// The referenced symbol.
    #[must_use]
    pub fn symbol(&self) -> Uuid {
        self.symbol
    }

    /// The placement position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The placement rotation.
    #[must_use]
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Whether the gate is placed mirrored.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Whether the gate must be placed.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The designator suffix, e.g. `A` for `U1A`.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Sets the symbol reference. Returns whether the value changed.
    pub fn set_symbol(&mut self, symbol: Uuid) -> bool {
        if symbol == self.symbol {
            return false;
        }
        self.symbol = symbol;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::SymbolChanged);
        true
    }

    /// Sets the position. Returns whether the value changed.
    pub fn set_position(&mut self, position: Point) -> bool {
        if position == self.position {
            return false;
        }
        self.position = position;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::PositionChanged);
        true
    }

    /// Sets the rotation. Returns whether the value changed.
    pub fn set_rotation(&mut self, rotation: Angle) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::RotationChanged);
        true
    }

    /// Sets the mirror flag. Returns whether the value changed.
    pub fn set_mirrored(&mut self, mirrored: bool) -> bool {
        if mirrored == self.mirrored {
            return false;
        }
        self.mirrored = mirrored;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::MirroredChanged);
        true
    }

    /// Sets the required flag. Returns whether the value changed.
    pub fn set_required(&mut self, required: bool) -> bool {
        if required == self.required {
            return false;
        }
        self.required = required;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::RequiredChanged);
        true
    }

    /// Sets the suffix. Returns whether the value changed.
    pub fn set_suffix(&mut self, suffix: String) -> bool {
        if suffix == self.suffix {
            return false;
        }
        self.suffix = suffix;
        self.on_edited
            .notify(&ComponentSymbolVariantItemEvent::SuffixChanged);
        true
    }
}

impl Clone for ComponentSymbolVariantItem {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            symbol: self.symbol,
            position: self.position,
            rotation: self.rotation,
            mirrored: self.mirrored,
            required: self.required,
            suffix: self.suffix.clone(),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for ComponentSymbolVariantItem {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.symbol == other.symbol
            && self.position == other.position
            && self.rotation == other.rotation
            && self.mirrored == other.mirrored
            && self.required == other.required
            && self.suffix == other.suffix
    }
}

impl ListItem for ComponentSymbolVariantItem {
    const TAG: &'static str = "gate";
    type Event = ComponentSymbolVariantItemEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<ComponentSymbolVariantItemEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("symbol", self.symbol);
        serialize_position(root, self.position);
        root.push_value_child("rotation", self.rotation);
        root.push_value_child("mirror", self.mirrored);
        root.push_value_child("required", self.required);
        root.push_text_child("suffix", self.suffix.clone());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            parse_uuid(node.child_value("symbol")?)?,
            deserialize_position(node)?,
            deserialize_angle(node, "rotation")?,
            deserialize_bool(node, "mirror")?,
            deserialize_bool(node, "required")?,
            node.child("suffix")?.value(0).unwrap_or_default().to_string(),
        ))
    }
}

/// Field-change events of a [`DevicePadSignalMapItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePadSignalMapItemEvent {
    /// The mapped signal changed.
    SignalChanged,
}

/// Maps one package pad of a device to a component signal.
///
/// The pad uuid is the identity of the item and never changes; only the
/// mapped signal is editable.
#[derive(Debug)]
pub struct DevicePadSignalMapItem {
    pad: Uuid,
    signal: Option<Uuid>,
    on_edited: Signal<DevicePadSignalMapItemEvent>,
}

impl DevicePadSignalMapItem {
    /// Creates a pad/signal mapping.
    #[must_use]
    pub fn new(pad: Uuid, signal: Option<Uuid>) -> Self {
        Self {
            pad,
            signal,
            on_edited: Signal::new(),
        }
    }

    /// The package pad this mapping belongs to.
    #[must_use]
    pub fn pad(&self) -> Uuid {
        self.pad
    }

    /// The mapped signal, if any.
    #[must_use]
    pub fn signal(&self) -> Option<Uuid> {
        self.signal
    }

    /// Sets the mapped signal. Returns whether the value changed.
    pub fn set_signal(&mut self, signal: Option<Uuid>) -> bool {
        if signal == self.signal {
            return false;
        }
        self.signal = signal;
        self.on_edited.notify(&DevicePadSignalMapItemEvent::SignalChanged);
        true
    }
}

impl Clone for DevicePadSignalMapItem {
    fn clone(&self) -> Self {
        Self {
            pad: self.pad,
            signal: self.signal,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for DevicePadSignalMapItem {
    fn eq(&self, other: &Self) -> bool {
        self.pad == other.pad && self.signal == other.signal
    }
}

impl ListItem for DevicePadSignalMapItem {
    const TAG: &'static str = "pad";
    type Event = DevicePadSignalMapItemEvent;

    fn uuid(&self) -> Uuid {
        self.pad
    }

    fn on_edited(&self) -> &Signal<DevicePadSignalMapItemEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.pad);
        match self.signal {
            Some(signal) => root.push_value_child("signal", signal),
            None => root.push_value_child("signal", "none"),
        }
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let signal = match node.child_value("signal")? {
            "none" => None,
            token => Some(parse_uuid(token)?),
        };
        Ok(Self::new(parse_uuid(node.first_value()?)?, signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn signal_roundtrip() {
        let signal = ComponentSignal::new(
            Uuid::new_v4(),
            CircuitIdentifier::new("CLK").unwrap(),
            SignalRole::Input,
            true,
            false,
            true,
            String::new(),
        );
        let mut node = SExpr::new(ComponentSignal::TAG);
        signal.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored =
            ComponentSignal::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, signal);
    }

    #[test]
    fn gate_roundtrip() {
        let gate = ComponentSymbolVariantItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Point::from_nm(0, 0),
            Angle::DEG_0,
            false,
            true,
            "A".to_string(),
        );
        let mut node = SExpr::new(ComponentSymbolVariantItem::TAG);
        gate.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored =
            ComponentSymbolVariantItem::deserialize(&reparsed, &Version::current_file_format())
                .unwrap();
        assert_eq!(restored, gate);
    }

    #[test]
    fn pad_signal_map_identity_is_the_pad() {
        let pad = Uuid::new_v4();
        let mut item = DevicePadSignalMapItem::new(pad, None);
        assert_eq!(item.uuid(), pad);
        assert!(item.set_signal(Some(Uuid::new_v4())));
        assert!(!item.set_signal(item.signal()));
    }
}
