//! User-defined attributes with typed values and units.

use std::fmt;

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{AttributeKey, Version};

/// Value domain of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeType {
    /// Free-form text, no unit.
    #[default]
    String,
    /// Electrical resistance.
    Resistance,
    /// Capacitance.
    Capacitance,
    /// Inductance.
    Inductance,
    /// Voltage.
    Voltage,
    /// Current.
    Current,
    /// Power.
    Power,
    /// Frequency.
    Frequency,
}

/// Unit of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeUnit {
    /// Ω
    Ohm,
    /// kΩ
    KiloOhm,
    /// MΩ
    MegaOhm,
    /// pF
    Picofarad,
    /// nF
    Nanofarad,
    /// µF
    Microfarad,
    /// nH
    Nanohenry,
    /// µH
    Microhenry,
    /// mH
    Millihenry,
    /// mV
    Millivolt,
    /// V
    Volt,
    /// kV
    Kilovolt,
    /// mA
    Milliampere,
    /// A
    Ampere,
    /// mW
    Milliwatt,
    /// W
    Watt,
    /// Hz
    Hertz,
    /// kHz
    Kilohertz,
    /// MHz
    Megahertz,
    /// GHz
    Gigahertz,
}

impl AttributeUnit {
    /// The file format token, e.g. `kiloohm`.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Ohm => "ohm",
            Self::KiloOhm => "kiloohm",
            Self::MegaOhm => "megaohm",
            Self::Picofarad => "picofarad",
            Self::Nanofarad => "nanofarad",
            Self::Microfarad => "microfarad",
            Self::Nanohenry => "nanohenry",
            Self::Microhenry => "microhenry",
            Self::Millihenry => "millihenry",
            Self::Millivolt => "millivolt",
            Self::Volt => "volt",
            Self::Kilovolt => "kilovolt",
            Self::Milliampere => "milliampere",
            Self::Ampere => "ampere",
            Self::Milliwatt => "milliwatt",
            Self::Watt => "watt",
            Self::Hertz => "hertz",
            Self::Kilohertz => "kilohertz",
            Self::Megahertz => "megahertz",
            Self::Gigahertz => "gigahertz",
        }
    }

    /// Parses a file format token.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] for unknown tokens.
    pub fn from_token(token: &str) -> EditorResult<Self> {
        const ALL: [AttributeUnit; 20] = [
            AttributeUnit::Ohm,
            AttributeUnit::KiloOhm,
            AttributeUnit::MegaOhm,
            AttributeUnit::Picofarad,
            AttributeUnit::Nanofarad,
            AttributeUnit::Microfarad,
            AttributeUnit::Nanohenry,
            AttributeUnit::Microhenry,
            AttributeUnit::Millihenry,
            AttributeUnit::Millivolt,
            AttributeUnit::Volt,
            AttributeUnit::Kilovolt,
            AttributeUnit::Milliampere,
            AttributeUnit::Ampere,
            AttributeUnit::Milliwatt,
            AttributeUnit::Watt,
            AttributeUnit::Hertz,
            AttributeUnit::Kilohertz,
            AttributeUnit::Megahertz,
            AttributeUnit::Gigahertz,
        ];
        ALL.iter()
            .copied()
            .find(|unit| unit.token() == token)
            .ok_or_else(|| EditorError::invalid_value("AttributeUnit", token))
    }
}

impl fmt::Display for AttributeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl AttributeType {
    /// The file format token, e.g. `resistance`.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Resistance => "resistance",
            Self::Capacitance => "capacitance",
            Self::Inductance => "inductance",
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::Power => "power",
            Self::Frequency => "frequency",
        }
    }

    /// Parses a file format token.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] for unknown tokens.
    pub fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "string" => Ok(Self::String),
            "resistance" => Ok(Self::Resistance),
            "capacitance" => Ok(Self::Capacitance),
            "inductance" => Ok(Self::Inductance),
            "voltage" => Ok(Self::Voltage),
            "current" => Ok(Self::Current),
            "power" => Ok(Self::Power),
            "frequency" => Ok(Self::Frequency),
            other => Err(EditorError::invalid_value("AttributeType", other)),
        }
    }

    /// The units usable with this type; empty for unit-less types.
    #[must_use]
    pub const fn available_units(self) -> &'static [AttributeUnit] {
        match self {
            Self::String => &[],
            Self::Resistance => &[AttributeUnit::Ohm, AttributeUnit::KiloOhm, AttributeUnit::MegaOhm],
            Self::Capacitance => &[
                AttributeUnit::Picofarad,
                AttributeUnit::Nanofarad,
                AttributeUnit::Microfarad,
            ],
            Self::Inductance => &[
                AttributeUnit::Nanohenry,
                AttributeUnit::Microhenry,
                AttributeUnit::Millihenry,
            ],
            Self::Voltage => &[
                AttributeUnit::Millivolt,
                AttributeUnit::Volt,
                AttributeUnit::Kilovolt,
            ],
            Self::Current => &[AttributeUnit::Milliampere, AttributeUnit::Ampere],
            Self::Power => &[AttributeUnit::Milliwatt, AttributeUnit::Watt],
            Self::Frequency => &[
                AttributeUnit::Hertz,
                AttributeUnit::Kilohertz,
                AttributeUnit::Megahertz,
                AttributeUnit::Gigahertz,
            ],
        }
    }

    /// The default unit of this type, if it has units.
    #[must_use]
    pub fn default_unit(self) -> Option<AttributeUnit> {
        self.available_units().last().copied()
    }

    /// Whether `value` is valid for this type. Numeric types accept a
    /// decimal number; `String` accepts anything.
    #[must_use]
    pub fn validate_value(self, value: &str) -> bool {
        match self {
            Self::String => true,
            _ => !value.trim().is_empty() && value.trim().parse::<f64>().is_ok(),
        }
    }

    /// Checks type/value/unit consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UserError`] if the unit does not belong to this
    /// type or the value does not validate.
    pub fn check(self, value: &str, unit: Option<AttributeUnit>) -> EditorResult<()> {
        match unit {
            Some(unit) if !self.available_units().contains(&unit) => {
                return Err(EditorError::user(format!(
                    "Unit '{unit}' is not valid for attribute type '{}'",
                    self.token()
                )));
            }
            None if !self.available_units().is_empty() => {
                return Err(EditorError::user(format!(
                    "Attribute type '{}' requires a unit",
                    self.token()
                )));
            }
            _ => {}
        }
        if !self.validate_value(value) {
            return Err(EditorError::user(format!(
                "Value '{value}' is not valid for attribute type '{}'",
                self.token()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Field-change events of an [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeEvent {
    /// The key changed.
    KeyChanged,
    /// The type changed.
    TypeChanged,
    /// The value changed.
    ValueChanged,
    /// The unit changed.
    UnitChanged,
}

/// A typed key/value attribute.
///
/// Attributes are identified by key rather than uuid; the list stores them
/// under a synthetic uuid derived from nothing (attributes are addressed by
/// name).
#[derive(Debug)]
pub struct Attribute {
    key: AttributeKey,
    attribute_type: AttributeType,
    value: String,
    unit: Option<AttributeUnit>,
    on_edited: Signal<AttributeEvent>,
}

impl Attribute {
    /// Creates an attribute, validating type/value/unit consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UserError`] if the unit does not belong to the
    /// type or the value does not validate.
    pub fn new(
        key: AttributeKey,
        attribute_type: AttributeType,
        value: String,
        unit: Option<AttributeUnit>,
    ) -> EditorResult<Self> {
        attribute_type.check(&value, unit)?;
        Ok(Self {
            key,
            attribute_type,
            value,
            unit,
            on_edited: Signal::new(),
        })
    }

    /// The key.
    #[must_use]
    pub fn key(&self) -> &AttributeKey {
        &self.key
    }

    /// The type.
    #[must_use]
    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }

    /// The value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The unit, if the type has units.
    #[must_use]
    pub fn unit(&self) -> Option<AttributeUnit> {
        self.unit
    }

    /// Sets the key. Returns whether the value changed.
    pub fn set_key(&mut self, key: AttributeKey) -> bool {
        if key == self.key {
            return false;
        }
        self.key = key;
        self.on_edited.notify(&AttributeEvent::KeyChanged);
        true
    }

    /// Sets type, value and unit together, keeping them consistent.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UserError`] if the combination is invalid.
    pub fn set_type_value_unit(
        &mut self,
        attribute_type: AttributeType,
        value: String,
        unit: Option<AttributeUnit>,
    ) -> EditorResult<bool> {
        attribute_type.check(&value, unit)?;
        let mut changed = false;
        if attribute_type != self.attribute_type {
            self.attribute_type = attribute_type;
            self.on_edited.notify(&AttributeEvent::TypeChanged);
            changed = true;
        }
        if value != self.value {
            self.value = value;
            self.on_edited.notify(&AttributeEvent::ValueChanged);
            changed = true;
        }
        if unit != self.unit {
            self.unit = unit;
            self.on_edited.notify(&AttributeEvent::UnitChanged);
            changed = true;
        }
        Ok(changed)
    }
}

impl Clone for Attribute {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            attribute_type: self.attribute_type,
            value: self.value.clone(),
            unit: self.unit,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.attribute_type == other.attribute_type
            && self.value == other.value
            && self.unit == other.unit
    }
}

impl ListItem for Attribute {
    const TAG: &'static str = "attribute";
    type Event = AttributeEvent;

    fn uuid(&self) -> Uuid {
        // Attributes are keyed by name; derive a stable id from the key so
        // uuid-based list plumbing keeps working.
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.key.as_str().as_bytes())
    }

    fn name_key(&self) -> Option<String> {
        Some(self.key.as_str().to_string())
    }

    fn on_edited(&self) -> &Signal<AttributeEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_text(self.key.as_str());
        root.push_value_child("type", self.attribute_type);
        match self.unit {
            Some(unit) => root.push_value_child("unit", unit),
            None => root.push_value_child("unit", "none"),
        }
        root.push_text_child("value", self.value.clone());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let unit = match node.child_value("unit")? {
            "none" => None,
            token => Some(AttributeUnit::from_token(token)?),
        };
        Self::new(
            AttributeKey::new(node.first_value()?)?,
            AttributeType::from_token(node.child_value("type")?)?,
            node.child_value("value")?.to_string(),
            unit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn unit_must_match_type() {
        assert!(Attribute::new(
            AttributeKey::new("R1").unwrap(),
            AttributeType::Resistance,
            "100".to_string(),
            Some(AttributeUnit::Volt),
        )
        .is_err());
        assert!(Attribute::new(
            AttributeKey::new("R1").unwrap(),
            AttributeType::Resistance,
            "100".to_string(),
            Some(AttributeUnit::KiloOhm),
        )
        .is_ok());
    }

    #[test]
    fn numeric_types_validate_values() {
        assert!(AttributeType::Voltage.validate_value("3.3"));
        assert!(!AttributeType::Voltage.validate_value("high"));
        assert!(AttributeType::String.validate_value("anything at all"));
        let mut attribute = Attribute::new(
            AttributeKey::new("VMAX").unwrap(),
            AttributeType::Voltage,
            "5".to_string(),
            Some(AttributeUnit::Volt),
        )
        .unwrap();
        assert!(attribute
            .set_type_value_unit(AttributeType::Voltage, "high".to_string(), Some(AttributeUnit::Volt))
            .is_err());
    }

    #[test]
    fn string_type_has_no_unit() {
        assert!(Attribute::new(
            AttributeKey::new("NOTE").unwrap(),
            AttributeType::String,
            String::new(),
            Some(AttributeUnit::Volt),
        )
        .is_err());
        assert_eq!(AttributeType::String.default_unit(), None);
    }

    #[test]
    fn serialization_roundtrip() {
        let attribute = Attribute::new(
            AttributeKey::new("FREQ").unwrap(),
            AttributeType::Frequency,
            "16".to_string(),
            Some(AttributeUnit::Megahertz),
        )
        .unwrap();
        let mut node = SExpr::new(Attribute::TAG);
        attribute.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Attribute::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, attribute);
    }
}
