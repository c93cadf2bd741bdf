//! S-expression document model.
//!
//! Every library element serializes to a tagged s-expression tree; this
//! module provides the tree itself plus a tokenizing [`parser`] and the
//! canonical multi-line [`writer`]. The tree distinguishes bare value tokens
//! from quoted strings so user text survives round-trips unchanged.

pub mod parser;
pub mod writer;

use std::fmt;

use crate::error::{EditorError, EditorResult};

/// One child of an [`SExpr`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SAtom {
    /// A bare value token, e.g. `0.2` or `top_legend`.
    Token(String),
    /// A quoted string, e.g. `"{{NAME}}"`.
    Text(String),
    /// A nested child node.
    Child(SExpr),
}

/// A tagged s-expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SExpr {
    name: String,
    children: Vec<SAtom>,
}

impl SExpr {
    /// Creates an empty node with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// The tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All children in order.
    #[must_use]
    pub fn atoms(&self) -> &[SAtom] {
        &self.children
    }

    /// Appends a bare value token, rendered via `Display`.
    pub fn push_token(&mut self, value: impl fmt::Display) -> &mut Self {
        self.children.push(SAtom::Token(value.to_string()));
        self
    }

    /// Appends a quoted string.
    pub fn push_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.children.push(SAtom::Text(text.into()));
        self
    }

    /// Appends a prebuilt child node.
    pub fn push_child(&mut self, child: Self) -> &mut Self {
        self.children.push(SAtom::Child(child));
        self
    }

    /// Appends a new empty child node and returns a reference to it.
    pub fn append_child(&mut self, name: impl Into<String>) -> &mut Self {
        self.children.push(SAtom::Child(Self::new(name)));
        match self.children.last_mut() {
            Some(SAtom::Child(child)) => child,
            _ => unreachable!("child was just appended"),
        }
    }

    /// Appends a child holding a single value token, e.g. `(width 0.2)`.
    pub fn push_value_child(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.append_child(name).push_token(value);
    }

    /// Appends a child holding a single quoted string, e.g. `(name "RES")`.
    pub fn push_text_child(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.append_child(name).push_text(text);
    }

    /// Child nodes in order.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|atom| match atom {
            SAtom::Child(child) => Some(child),
            _ => None,
        })
    }

    /// Child nodes with the given tag name.
    pub fn query<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children().filter(move |child| child.name == name)
    }

    /// The first child node with the given tag name.
    #[must_use]
    pub fn find<'a>(&'a self, name: &'a str) -> Option<&'a Self> {
        self.query(name).next()
    }

    /// The first child node with the given tag name.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidElement`] if there is none.
    pub fn child(&self, name: &'static str) -> EditorResult<&Self> {
        self.find(name)
            .ok_or_else(|| EditorError::invalid_element(name, format!("missing in ({})", self.name)))
    }

    /// The n-th value (token or quoted string) of this node.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.children
            .iter()
            .filter_map(|atom| match atom {
                SAtom::Token(s) | SAtom::Text(s) => Some(s.as_str()),
                SAtom::Child(_) => None,
            })
            .nth(index)
    }

    /// The first value of this node.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidElement`] if the node has no value.
    pub fn first_value(&self) -> EditorResult<&str> {
        self.value(0).ok_or_else(|| {
            EditorError::invalid_element("value", format!("({}) has no value", self.name))
        })
    }

    /// All values of this node.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|atom| match atom {
                SAtom::Token(s) | SAtom::Text(s) => Some(s.as_str()),
                SAtom::Child(_) => None,
            })
            .collect()
    }

    /// Shorthand for the first value of a named child.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidElement`] if the child or its value is
    /// missing.
    pub fn child_value(&self, name: &'static str) -> EditorResult<&str> {
        self.child(name)?.first_value()
    }

    /// Parses a `true`/`false` token.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on any other token.
    pub fn parse_bool(token: &str) -> EditorResult<bool> {
        match token {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(EditorError::invalid_value("bool", other)),
        }
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::write(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_query() {
        let mut node = SExpr::new("circle");
        node.push_token("3f1a");
        node.push_value_child("layer", "top_legend");
        node.push_value_child("width", "0.2");
        assert_eq!(node.value(0), Some("3f1a"));
        assert_eq!(node.child_value("layer").unwrap(), "top_legend");
        assert!(node.child("diameter").is_err());
        assert_eq!(node.children().count(), 2);
    }

    #[test]
    fn values_skip_children() {
        let mut node = SExpr::new("position");
        node.push_token("1.0");
        node.append_child("nested");
        node.push_token("2.0");
        assert_eq!(node.values(), vec!["1.0", "2.0"]);
        assert_eq!(node.value(1), Some("2.0"));
    }

    #[test]
    fn bool_tokens() {
        assert!(SExpr::parse_bool("true").unwrap());
        assert!(!SExpr::parse_bool("false").unwrap());
        assert!(SExpr::parse_bool("yes").is_err());
    }
}
