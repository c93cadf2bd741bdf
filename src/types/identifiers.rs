//! Validated identifier strings.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::{EditorError, EditorResult};

fn circuit_identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-a-zA-Z0-9_+/!?@#$]{1,32}$").expect("valid circuit identifier regex")
    })
}

fn attribute_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Z][A-Z0-9_]{0,39}$").expect("valid attribute key regex"))
}

/// Parses a UUID in canonical 36-character form.
///
/// # Errors
///
/// Returns [`EditorError::InvalidValue`] for any other representation.
pub fn parse_uuid(s: &str) -> EditorResult<Uuid> {
    if s.len() != 36 {
        return Err(EditorError::invalid_value("Uuid", s));
    }
    Uuid::try_parse(s).map_err(|_| EditorError::invalid_value("Uuid", s))
}

/// A name of a circuit-level object such as a package pad or component
/// signal: non-empty, at most 32 characters of a printable subset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CircuitIdentifier(String);

impl CircuitIdentifier {
    /// Creates a circuit identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the name does not match the
    /// circuit identifier predicate.
    pub fn new(name: impl Into<String>) -> EditorResult<Self> {
        let name = name.into();
        if !circuit_identifier_regex().is_match(&name) {
            return Err(EditorError::invalid_value("CircuitIdentifier", name));
        }
        Ok(Self(name))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CircuitIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attribute key: non-empty uppercase identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeKey(String);

impl AttributeKey {
    /// Creates an attribute key.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the key does not match
    /// `^[A-Z][A-Z0-9_]{0,39}$`.
    pub fn new(key: impl Into<String>) -> EditorResult<Self> {
        let key = key.into();
        if !attribute_key_regex().is_match(&key) {
            return Err(EditorError::invalid_value("AttributeKey", key));
        }
        Ok(Self(key))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_identifier_predicate() {
        assert!(CircuitIdentifier::new("1").is_ok());
        assert!(CircuitIdentifier::new("GND@2").is_ok());
        assert!(CircuitIdentifier::new("n-1_V+").is_ok());
        assert!(CircuitIdentifier::new("").is_err());
        assert!(CircuitIdentifier::new("with space").is_err());
        assert!(CircuitIdentifier::new("a".repeat(33)).is_err());
        assert!(CircuitIdentifier::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn attribute_key_predicate() {
        assert!(AttributeKey::new("VALUE").is_ok());
        assert!(AttributeKey::new("R_MAX_2").is_ok());
        assert!(AttributeKey::new("value").is_err());
        assert!(AttributeKey::new("2ND").is_err());
        assert!(AttributeKey::new("").is_err());
    }

    #[test]
    fn uuid_canonical_form_only() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert!(parse_uuid(&id.simple().to_string()).is_err());
        assert!(parse_uuid("not-a-uuid").is_err());
    }
}
