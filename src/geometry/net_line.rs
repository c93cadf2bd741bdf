//! Net lines of a schematic net segment.

use std::fmt;

use uuid::Uuid;

use super::deserialize_unsigned;
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, UnsignedLength, Version};

/// Where a net line ends: on a junction or on a symbol pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetLineAnchor {
    /// A junction of the same net segment.
    Junction(Uuid),
    /// A pin of a symbol instance.
    Pin {
        /// The symbol instance.
        symbol: Uuid,
        /// The pin within the symbol.
        pin: Uuid,
    },
}

impl NetLineAnchor {
    /// The junction uuid, if this anchor is a junction.
    #[must_use]
    pub const fn junction(&self) -> Option<Uuid> {
        match self {
            Self::Junction(uuid) => Some(*uuid),
            Self::Pin { .. } => None,
        }
    }

    fn serialize(&self, root: &mut SExpr) {
        match self {
            Self::Junction(uuid) => root.push_value_child("junction", uuid),
            Self::Pin { symbol, pin } => {
                root.push_value_child("symbol", symbol);
                root.push_value_child("pin", pin);
            }
        }
    }

    fn deserialize(node: &SExpr) -> EditorResult<Self> {
        if let Some(junction) = node.find("junction") {
            return Ok(Self::Junction(parse_uuid(junction.first_value()?)?));
        }
        let symbol = parse_uuid(node.child_value("symbol")?)?;
        let pin = parse_uuid(node.child_value("pin")?)?;
        Ok(Self::Pin { symbol, pin })
    }
}

impl fmt::Display for NetLineAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Junction(uuid) => write!(f, "junction {uuid}"),
            Self::Pin { symbol, pin } => write!(f, "pin {symbol}:{pin}"),
        }
    }
}

/// Field-change events of a [`NetLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetLineEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The width changed.
    WidthChanged,
    /// The start anchor changed.
    StartChanged,
    /// The end anchor changed.
    EndChanged,
}

/// A straight net line between two anchors of a schematic net segment.
#[derive(Debug)]
pub struct NetLine {
    uuid: Uuid,
    width: UnsignedLength,
    start: NetLineAnchor,
    end: NetLineAnchor,
    on_edited: Signal<NetLineEvent>,
}

impl NetLine {
    /// Creates a net line.
    #[must_use]
    pub fn new(uuid: Uuid, width: UnsignedLength, start: NetLineAnchor, end: NetLineAnchor) -> Self {
        Self {
            uuid,
            width,
            start,
            end,
            on_edited: Signal::new(),
        }
    }

    /// The line width.
    #[must_use]
    pub fn width(&self) -> UnsignedLength {
        self.width
    }

    /// The start anchor.
    #[must_use]
    pub fn start(&self) -> NetLineAnchor {
        self.start
    }

    /// The end anchor.
    #[must_use]
    pub fn end(&self) -> NetLineAnchor {
        self.end
    }

    /// Sets the width. Returns whether the value changed.
    pub fn set_width(&mut self, width: UnsignedLength) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        self.on_edited.notify(&NetLineEvent::WidthChanged);
        true
    }

    /// Sets the start anchor. Returns whether the value changed.
    pub fn set_start(&mut self, start: NetLineAnchor) -> bool {
        if start == self.start {
            return false;
        }
        self.start = start;
        self.on_edited.notify(&NetLineEvent::StartChanged);
        true
    }

    /// Sets the end anchor. Returns whether the value changed.
    pub fn set_end(&mut self, end: NetLineAnchor) -> bool {
        if end == self.end {
            return false;
        }
        self.end = end;
        self.on_edited.notify(&NetLineEvent::EndChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&NetLineEvent::UuidChanged);
        }
        self.set_width(other.width);
        self.set_start(other.start);
        self.set_end(other.end);
    }
}

impl Clone for NetLine {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            width: self.width,
            start: self.start,
            end: self.end,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for NetLine {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.width == other.width
            && self.start == other.start
            && self.end == other.end
    }
}

impl ListItem for NetLine {
    const TAG: &'static str = "line";
    type Event = NetLineEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<NetLineEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("width", self.width);
        self.start.serialize(root.append_child("from"));
        self.end.serialize(root.append_child("to"));
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            deserialize_unsigned(node, "width")?,
            NetLineAnchor::deserialize(node.child("from")?)?,
            NetLineAnchor::deserialize(node.child("to")?)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn anchor_variants_roundtrip() {
        let line = NetLine::new(
            Uuid::new_v4(),
            UnsignedLength::from_nm(158_750).unwrap(),
            NetLineAnchor::Junction(Uuid::new_v4()),
            NetLineAnchor::Pin {
                symbol: Uuid::new_v4(),
                pin: Uuid::new_v4(),
            },
        );
        let mut node = SExpr::new(NetLine::TAG);
        line.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = NetLine::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, line);
        assert!(restored.start().junction().is_some());
        assert!(restored.end().junction().is_none());
    }

    #[test]
    fn malformed_anchor_is_rejected() {
        let uuid = Uuid::new_v4();
        let text = format!("(line {uuid} (width 0.1) (from) (to (junction {uuid})))");
        let node = parse(&text).unwrap();
        assert!(NetLine::deserialize(&node, &Version::current_file_format()).is_err());
    }

    #[test]
    fn line_anchor_errors_name_the_missing_child() {
        let uuid = Uuid::new_v4();
        let text = format!("(line {uuid} (width 0.1) (to (junction {uuid})))");
        let node = parse(&text).unwrap();
        match NetLine::deserialize(&node, &Version::current_file_format()) {
            Err(EditorError::InvalidElement { node: tag, .. }) => assert_eq!(tag, "from"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
