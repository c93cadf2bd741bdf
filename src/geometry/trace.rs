//! Board traces.

use std::fmt;

use uuid::Uuid;

use super::deserialize_positive;
use crate::error::EditorResult;
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, GraphicsLayerName, PositiveLength, Version};

/// Where a trace ends: on a junction, a via or a device pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceAnchor {
    /// A junction of the same net segment.
    Junction(Uuid),
    /// A via of the same net segment.
    Via(Uuid),
    /// A pad of a device instance.
    Pad {
        /// The device instance.
        device: Uuid,
        /// The pad within the device's footprint.
        pad: Uuid,
    },
}

impl TraceAnchor {
    fn serialize(&self, root: &mut SExpr) {
        match self {
            Self::Junction(uuid) => root.push_value_child("junction", uuid),
            Self::Via(uuid) => root.push_value_child("via", uuid),
            Self::Pad { device, pad } => {
                root.push_value_child("device", device);
                root.push_value_child("pad", pad);
            }
        }
    }

    fn deserialize(node: &SExpr) -> EditorResult<Self> {
        if let Some(junction) = node.find("junction") {
            return Ok(Self::Junction(parse_uuid(junction.first_value()?)?));
        }
        if let Some(via) = node.find("via") {
            return Ok(Self::Via(parse_uuid(via.first_value()?)?));
        }
        let device = parse_uuid(node.child_value("device")?)?;
        let pad = parse_uuid(node.child_value("pad")?)?;
        Ok(Self::Pad { device, pad })
    }
}

impl fmt::Display for TraceAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Junction(uuid) => write!(f, "junction {uuid}"),
            Self::Via(uuid) => write!(f, "via {uuid}"),
            Self::Pad { device, pad } => write!(f, "pad {device}:{pad}"),
        }
    }
}

/// Field-change events of a [`Trace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The layer changed.
    LayerChanged,
    /// The width changed.
    WidthChanged,
    /// The start anchor changed.
    StartChanged,
    /// The end anchor changed.
    EndChanged,
}

/// A copper trace between two anchors on one board layer.
#[derive(Debug)]
pub struct Trace {
    uuid: Uuid,
    layer: GraphicsLayerName,
    width: PositiveLength,
    start: TraceAnchor,
    end: TraceAnchor,
    on_edited: Signal<TraceEvent>,
}

impl Trace {
    /// Creates a trace.
    #[must_use]
    pub fn new(
        uuid: Uuid,
        layer: GraphicsLayerName,
        width: PositiveLength,
        start: TraceAnchor,
        end: TraceAnchor,
    ) -> Self {
        Self {
            uuid,
            layer,
            width,
            start,
            end,
            on_edited: Signal::new(),
        }
    }

    /// The copper layer.
    #[must_use]
    pub fn layer(&self) -> &GraphicsLayerName {
        &self.layer
    }

    /// The trace width.
    #[must_use]
    pub fn width(&self) -> PositiveLength {
        self.width
    }

    /// The start anchor.
    #[must_use]
    pub fn start(&self) -> TraceAnchor {
        self.start
    }

    /// The end anchor.
    #[must_use]
    pub fn end(&self) -> TraceAnchor {
        self.end
    }

    /// Sets the layer. Returns whether the value changed.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) -> bool {
        if layer == self.layer {
            return false;
        }
        self.layer = layer;
        self.on_edited.notify(&TraceEvent::LayerChanged);
        true
    }

    /// Sets the width. Returns whether the value changed.
    pub fn set_width(&mut self, width: PositiveLength) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        self.on_edited.notify(&TraceEvent::WidthChanged);
        true
    }

    /// Sets the start anchor. Returns whether the value changed.
    pub fn set_start(&mut self, start: TraceAnchor) -> bool {
        if start == self.start {
            return false;
        }
        self.start = start;
        self.on_edited.notify(&TraceEvent::StartChanged);
        true
    }

    /// Sets the end anchor. Returns whether the value changed.
    pub fn set_end(&mut self, end: TraceAnchor) -> bool {
        if end == self.end {
            return false;
        }
        self.end = end;
        self.on_edited.notify(&TraceEvent::EndChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&TraceEvent::UuidChanged);
        }
        self.set_layer(other.layer.clone());
        self.set_width(other.width);
        self.set_start(other.start);
        self.set_end(other.end);
    }
}

impl Clone for Trace {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            layer: self.layer.clone(),
            width: self.width,
            start: self.start,
            end: self.end,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for Trace {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.layer == other.layer
            && self.width == other.width
            && self.start == other.start
            && self.end == other.end
    }
}

impl ListItem for Trace {
    const TAG: &'static str = "trace";
    type Event = TraceEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<TraceEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("layer", &self.layer);
        root.push_value_child("width", self.width);
        self.start.serialize(root.append_child("from"));
        self.end.serialize(root.append_child("to"));
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            GraphicsLayerName::new(node.child_value("layer")?)?,
            deserialize_positive(node, "width")?,
            TraceAnchor::deserialize(node.child("from")?)?,
            TraceAnchor::deserialize(node.child("to")?)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    #[test]
    fn anchor_variants_roundtrip() {
        let trace = Trace::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_copper(),
            PositiveLength::from_nm(250_000).unwrap(),
            TraceAnchor::Via(Uuid::new_v4()),
            TraceAnchor::Pad {
                device: Uuid::new_v4(),
                pad: Uuid::new_v4(),
            },
        );
        let mut node = SExpr::new(Trace::TAG);
        trace.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = Trace::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, trace);
    }
}
