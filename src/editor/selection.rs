//! Selection model of the footprint scene.
//!
//! The scene graph itself (graphics items, z-order, painting) lives outside
//! the core; what the editing logic needs is which items are selected and a
//! way to resolve pointer positions to items, both provided here.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::library::Footprint;
use crate::list::ListItem;
use crate::types::{Length, Point, PositiveLength};

/// Kind of a footprint item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    /// A footprint pad.
    Pad,
    /// A circle.
    Circle,
    /// A polygon.
    Polygon,
    /// A stroke text.
    Text,
    /// A keep-out zone.
    Zone,
    /// A non-plated hole.
    Hole,
}

/// Reference to one footprint item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemRef {
    /// The item kind.
    pub kind: ItemKind,
    /// The item's uuid.
    pub uuid: Uuid,
}

impl ItemRef {
    /// Creates an item reference.
    #[must_use]
    pub const fn new(kind: ItemKind, uuid: Uuid) -> Self {
        Self { kind, uuid }
    }
}

/// The set of selected items of one footprint.
#[derive(Debug, Default)]
pub struct FootprintSelection {
    items: BTreeSet<ItemRef>,
}

impl FootprintSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of selected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether `item` is selected.
    #[must_use]
    pub fn contains(&self, item: ItemRef) -> bool {
        self.items.contains(&item)
    }

    /// Selects `item` in addition to the current selection.
    pub fn select(&mut self, item: ItemRef) {
        self.items.insert(item);
    }

    /// Deselects `item`.
    pub fn deselect(&mut self, item: ItemRef) {
        self.items.remove(&item);
    }

    /// Toggles `item`.
    pub fn toggle(&mut self, item: ItemRef) {
        if !self.items.remove(&item) {
            self.items.insert(item);
        }
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the selection.
    pub fn set(&mut self, items: impl IntoIterator<Item = ItemRef>) {
        self.items = items.into_iter().collect();
    }

    /// Selects every item of `footprint`.
    pub fn select_all(&mut self, footprint: &Footprint) {
        self.set(all_items(footprint));
    }

    /// All selected items.
    #[must_use]
    pub fn items(&self) -> Vec<ItemRef> {
        self.items.iter().copied().collect()
    }

    /// The selected uuids of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: ItemKind) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.uuid)
            .collect()
    }
}

/// All items of a footprint, pads first.
#[must_use]
pub fn all_items(footprint: &Footprint) -> Vec<ItemRef> {
    let mut items = Vec::new();
    for uuid in footprint.pads().uuids() {
        items.push(ItemRef::new(ItemKind::Pad, uuid));
    }
    for uuid in footprint.circles().uuids() {
        items.push(ItemRef::new(ItemKind::Circle, uuid));
    }
    for uuid in footprint.polygons().uuids() {
        items.push(ItemRef::new(ItemKind::Polygon, uuid));
    }
    for uuid in footprint.stroke_texts().uuids() {
        items.push(ItemRef::new(ItemKind::Text, uuid));
    }
    for uuid in footprint.zones().uuids() {
        items.push(ItemRef::new(ItemKind::Zone, uuid));
    }
    for uuid in footprint.holes().uuids() {
        items.push(ItemRef::new(ItemKind::Hole, uuid));
    }
    items
}

fn within(pos: Point, center: Point, radius: Length) -> bool {
    Length::from(
        (pos - center).length(),
    ) <= radius
}

/// Finds the topmost item at `pos`. Pads win over graphics, matching the
/// scene's stacking order.
#[must_use]
pub fn item_at(footprint: &Footprint, pos: Point, tolerance: PositiveLength) -> Option<ItemRef> {
    let tolerance = tolerance.get();
    for pad in footprint.pads().elements() {
        let pad = pad.borrow();
        let half = pad.width().get().max(pad.height().get()) / 2;
        if within(pos, pad.position(), half + tolerance) {
            return Some(ItemRef::new(ItemKind::Pad, pad.uuid()));
        }
    }
    for hole in footprint.holes().elements() {
        let hole = hole.borrow();
        let reach = hole.diameter().get() / 2 + hole.slot_length().get() / 2;
        if within(pos, hole.position(), reach + tolerance) {
            return Some(ItemRef::new(ItemKind::Hole, hole.uuid()));
        }
    }
    for circle in footprint.circles().elements() {
        let circle = circle.borrow();
        let reach = circle.diameter().get() / 2 + circle.line_width().get() / 2;
        if within(pos, circle.center(), reach + tolerance) {
            return Some(ItemRef::new(ItemKind::Circle, circle.uuid()));
        }
    }
    for text in footprint.stroke_texts().elements() {
        let text = text.borrow();
        if within(pos, text.position(), text.height().get() + tolerance) {
            return Some(ItemRef::new(ItemKind::Text, text.uuid()));
        }
    }
    for polygon in footprint.polygons().elements() {
        let polygon = polygon.borrow();
        let near = polygon
            .path()
            .vertices()
            .iter()
            .any(|vertex| within(pos, vertex.pos, tolerance));
        if near {
            return Some(ItemRef::new(ItemKind::Polygon, polygon.uuid()));
        }
    }
    for zone in footprint.zones().elements() {
        let zone = zone.borrow();
        let near = zone
            .outline()
            .vertices()
            .iter()
            .any(|vertex| within(pos, vertex.pos, tolerance));
        if near {
            return Some(ItemRef::new(ItemKind::Zone, zone.uuid()));
        }
    }
    None
}

/// All items whose reference points lie within the rectangle spanned by two
/// corners (any vertex counts for polygons and zones).
#[must_use]
pub fn items_in_rect(footprint: &Footprint, corner1: Point, corner2: Point) -> Vec<ItemRef> {
    let min = Point::new(corner1.x.min(corner2.x), corner1.y.min(corner2.y));
    let max = Point::new(corner1.x.max(corner2.x), corner1.y.max(corner2.y));
    let inside =
        |p: Point| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;

    let mut items = Vec::new();
    for pad in footprint.pads().elements() {
        let pad = pad.borrow();
        if inside(pad.position()) {
            items.push(ItemRef::new(ItemKind::Pad, pad.uuid()));
        }
    }
    for circle in footprint.circles().elements() {
        let circle = circle.borrow();
        if inside(circle.center()) {
            items.push(ItemRef::new(ItemKind::Circle, circle.uuid()));
        }
    }
    for polygon in footprint.polygons().elements() {
        let polygon = polygon.borrow();
        if polygon.path().vertices().iter().any(|v| inside(v.pos)) {
            items.push(ItemRef::new(ItemKind::Polygon, polygon.uuid()));
        }
    }
    for text in footprint.stroke_texts().elements() {
        let text = text.borrow();
        if inside(text.position()) {
            items.push(ItemRef::new(ItemKind::Text, text.uuid()));
        }
    }
    for zone in footprint.zones().elements() {
        let zone = zone.borrow();
        if zone.outline().vertices().iter().any(|v| inside(v.pos)) {
            items.push(ItemRef::new(ItemKind::Zone, zone.uuid()));
        }
    }
    for hole in footprint.holes().elements() {
        let hole = hole.borrow();
        if inside(hole.position()) {
            items.push(ItemRef::new(ItemKind::Hole, hole.uuid()));
        }
    }
    items
}

/// Finds a polygon or zone vertex near `pos`, returning the owning item and
/// the vertex index.
#[must_use]
pub fn vertex_at(
    footprint: &Footprint,
    pos: Point,
    tolerance: PositiveLength,
) -> Option<(ItemRef, usize)> {
    let tolerance = tolerance.get();
    for polygon in footprint.polygons().elements() {
        let polygon = polygon.borrow();
        for (index, vertex) in polygon.path().vertices().iter().enumerate() {
            if within(pos, vertex.pos, tolerance) {
                return Some((ItemRef::new(ItemKind::Polygon, polygon.uuid()), index));
            }
        }
    }
    for zone in footprint.zones().elements() {
        let zone = zone.borrow();
        for (index, vertex) in zone.outline().vertices().iter().enumerate() {
            if within(pos, vertex.pos, tolerance) {
                return Some((ItemRef::new(ItemKind::Zone, zone.uuid()), index));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Circle;
    use crate::shared;
    use crate::types::{GraphicsLayerName, UnsignedLength};

    fn footprint_with_circle(center: Point) -> Footprint {
        let footprint = Footprint::new(Uuid::new_v4(), "default".to_string());
        footprint.circles().append(shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::ZERO,
            false,
            false,
            center,
            PositiveLength::from_nm(1_000_000).unwrap(),
        )));
        footprint
    }

    #[test]
    fn hit_test_finds_the_circle() {
        let footprint = footprint_with_circle(Point::from_nm(1_000_000, 0));
        let tolerance = PositiveLength::from_nm(100_000).unwrap();
        let hit = item_at(&footprint, Point::from_nm(1_200_000, 0), tolerance);
        assert_eq!(hit.map(|i| i.kind), Some(ItemKind::Circle));
        assert_eq!(item_at(&footprint, Point::from_nm(5_000_000, 0), tolerance), None);
    }

    #[test]
    fn rect_selection_collects_reference_points() {
        let footprint = footprint_with_circle(Point::from_nm(1_000_000, 1_000_000));
        let items = items_in_rect(
            &footprint,
            Point::from_nm(0, 0),
            Point::from_nm(2_000_000, 2_000_000),
        );
        assert_eq!(items.len(), 1);
        assert!(items_in_rect(
            &footprint,
            Point::from_nm(2_000_000, 2_000_000),
            Point::from_nm(3_000_000, 3_000_000),
        )
        .is_empty());
    }

    #[test]
    fn toggle_and_clear() {
        let mut selection = FootprintSelection::new();
        let item = ItemRef::new(ItemKind::Pad, Uuid::new_v4());
        selection.toggle(item);
        assert!(selection.contains(item));
        selection.toggle(item);
        assert!(selection.is_empty());
        selection.select(item);
        selection.clear();
        assert!(selection.is_empty());
    }
}
