//! Clipboard data of the footprint editor.

use uuid::Uuid;

use super::selection::{FootprintSelection, ItemKind};
use crate::geometry::{Circle, Hole, Polygon, StrokeText, Zone};
use crate::library::{Footprint, FootprintPad};
use crate::types::Point;

/// A snapshot of copied footprint items, positioned relative to the cursor
/// position at copy time.
#[derive(Debug, Clone, Default)]
pub struct FootprintClipboardData {
    /// Cursor position the copy was anchored at.
    pub cursor: Point,
    /// Copied pads.
    pub pads: Vec<FootprintPad>,
    /// Copied circles.
    pub circles: Vec<Circle>,
    /// Copied polygons.
    pub polygons: Vec<Polygon>,
    /// Copied stroke texts.
    pub texts: Vec<StrokeText>,
    /// Copied zones.
    pub zones: Vec<Zone>,
    /// Copied holes.
    pub holes: Vec<Hole>,
}

impl FootprintClipboardData {
    /// Copies the selected items of `footprint`, anchored at `cursor`.
    #[must_use]
    pub fn from_selection(
        footprint: &Footprint,
        selection: &FootprintSelection,
        cursor: Point,
    ) -> Self {
        let mut data = Self {
            cursor,
            ..Self::default()
        };
        for uuid in selection.of_kind(ItemKind::Pad) {
            if let Some(pad) = footprint.pads().find(uuid) {
                data.pads.push(pad.borrow().clone());
            }
        }
        for uuid in selection.of_kind(ItemKind::Circle) {
            if let Some(circle) = footprint.circles().find(uuid) {
                data.circles.push(circle.borrow().clone());
            }
        }
        for uuid in selection.of_kind(ItemKind::Polygon) {
            if let Some(polygon) = footprint.polygons().find(uuid) {
                data.polygons.push(polygon.borrow().clone());
            }
        }
        for uuid in selection.of_kind(ItemKind::Text) {
            if let Some(text) = footprint.stroke_texts().find(uuid) {
                data.texts.push(text.borrow().clone());
            }
        }
        for uuid in selection.of_kind(ItemKind::Zone) {
            if let Some(zone) = footprint.zones().find(uuid) {
                data.zones.push(zone.borrow().clone());
            }
        }
        for uuid in selection.of_kind(ItemKind::Hole) {
            if let Some(hole) = footprint.holes().find(uuid) {
                data.holes.push(hole.borrow().clone());
            }
        }
        data
    }

    /// Whether the clipboard holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
            && self.circles.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
            && self.zones.is_empty()
            && self.holes.is_empty()
    }

    /// Number of items in the clipboard.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pads.len()
            + self.circles.len()
            + self.polygons.len()
            + self.texts.len()
            + self.zones.len()
            + self.holes.len()
    }

    /// Materialises paste copies with fresh uuids, moved by `delta`.
    #[must_use]
    pub fn instantiate(&self, delta: Point) -> Self {
        let mut out = Self {
            cursor: self.cursor + delta,
            ..Self::default()
        };
        for pad in &self.pads {
            let mut copy = FootprintPad::with_uuid(Uuid::new_v4(), pad);
            copy.set_position(pad.position() + delta);
            out.pads.push(copy);
        }
        for circle in &self.circles {
            let mut copy = Circle::with_uuid(Uuid::new_v4(), circle);
            copy.set_center(circle.center() + delta);
            out.circles.push(copy);
        }
        for polygon in &self.polygons {
            let mut copy = Polygon::with_uuid(Uuid::new_v4(), polygon);
            copy.set_path(polygon.path().translated(delta));
            out.polygons.push(copy);
        }
        for text in &self.texts {
            let mut copy = StrokeText::with_uuid(Uuid::new_v4(), text);
            copy.set_position(text.position() + delta);
            out.texts.push(copy);
        }
        for zone in &self.zones {
            let mut copy = Zone::with_uuid(Uuid::new_v4(), zone);
            copy.set_outline(zone.outline().translated(delta));
            out.zones.push(copy);
        }
        for hole in &self.holes {
            let mut copy = Hole::with_uuid(Uuid::new_v4(), hole);
            copy.set_position(hole.position() + delta);
            out.holes.push(copy);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::selection::ItemRef;
    use crate::list::ListItem;
    use crate::shared;
    use crate::types::{GraphicsLayerName, PositiveLength, UnsignedLength};

    #[test]
    fn copy_and_instantiate_moves_and_renames() {
        let footprint = Footprint::new(Uuid::new_v4(), "default".to_string());
        let circle = shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::ZERO,
            false,
            false,
            Point::from_nm(1_000_000, 0),
            PositiveLength::from_nm(500_000).unwrap(),
        ));
        footprint.circles().append(circle.clone());
        let mut selection = FootprintSelection::new();
        selection.select(ItemRef::new(ItemKind::Circle, circle.borrow().uuid()));

        let data = FootprintClipboardData::from_selection(&footprint, &selection, Point::ORIGIN);
        assert_eq!(data.len(), 1);

        let pasted = data.instantiate(Point::from_nm(0, 2_000_000));
        assert_eq!(pasted.circles[0].center(), Point::from_nm(1_000_000, 2_000_000));
        assert_ne!(pasted.circles[0].uuid(), circle.borrow().uuid());
    }
}
