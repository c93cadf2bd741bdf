//! Composite drag command over the current footprint selection.

use crate::error::EditorResult;
use crate::geometry::{Circle, Hole, Polygon, StrokeText};
use crate::library::FootprintPad;
use crate::types::{Angle, Orientation, Point, PositiveLength};
use crate::undo::{CommandMeta, UndoCommand, UndoCommandGroup};
use crate::Shared;

use super::geometry::{CmdCircleEdit, CmdHoleEdit, CmdPolygonEdit, CmdStrokeTextEdit};
use super::pads::CmdFootprintPadEdit;

/// The selected footprint items a drag operates on.
#[derive(Default)]
pub struct DragItems {
    /// Selected pads.
    pub pads: Vec<Shared<FootprintPad>>,
    /// Selected circles.
    pub circles: Vec<Shared<Circle>>,
    /// Selected polygons.
    pub polygons: Vec<Shared<Polygon>>,
    /// Selected stroke texts.
    pub texts: Vec<Shared<StrokeText>>,
    /// Selected holes.
    pub holes: Vec<Shared<Hole>>,
}

impl DragItems {
    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
            && self.circles.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
            && self.holes.is_empty()
    }
}

/// Applies translate/rotate/mirror transforms to the whole selection as one
/// atomic undo step.
///
/// All transforms give immediate feedback through the child edit commands;
/// executing the command with untouched accumulators reports a no-op so the
/// stack discards the whole group.
pub struct CmdDragSelectedFootprintItems {
    group: UndoCommandGroup,
    pad_cmds: Vec<CmdFootprintPadEdit>,
    circle_cmds: Vec<CmdCircleEdit>,
    polygon_cmds: Vec<CmdPolygonEdit>,
    text_cmds: Vec<CmdStrokeTextEdit>,
    hole_cmds: Vec<CmdHoleEdit>,
    center: Point,
    delta_pos: Point,
    delta_rot: Angle,
    mirrored_geometry: bool,
    mirrored_layer: bool,
    snapped: bool,
}

impl CmdDragSelectedFootprintItems {
    /// Captures the selection. The rotate/mirror center is the average of
    /// all item positions (every polygon vertex counts), snapped to the
    /// grid.
    #[must_use]
    pub fn new(items: &DragItems, grid_interval: PositiveLength) -> Self {
        let mut center = Point::ORIGIN;
        let mut count: i64 = 0;

        let mut pad_cmds = Vec::with_capacity(items.pads.len());
        for pad in &items.pads {
            center += pad.borrow().position();
            count += 1;
            pad_cmds.push(CmdFootprintPadEdit::new(Shared::clone(pad)));
        }
        let mut circle_cmds = Vec::with_capacity(items.circles.len());
        for circle in &items.circles {
            center += circle.borrow().center();
            count += 1;
            circle_cmds.push(CmdCircleEdit::new(Shared::clone(circle)));
        }
        let mut polygon_cmds = Vec::with_capacity(items.polygons.len());
        for polygon in &items.polygons {
            for vertex in polygon.borrow().path().vertices() {
                center += vertex.pos;
                count += 1;
            }
            polygon_cmds.push(CmdPolygonEdit::new(Shared::clone(polygon)));
        }
        let mut text_cmds = Vec::with_capacity(items.texts.len());
        for text in &items.texts {
            center += text.borrow().position();
            count += 1;
            text_cmds.push(CmdStrokeTextEdit::new(Shared::clone(text)));
        }
        let mut hole_cmds = Vec::with_capacity(items.holes.len());
        for hole in &items.holes {
            center += hole.borrow().position();
            count += 1;
            hole_cmds.push(CmdHoleEdit::new(Shared::clone(hole)));
        }

        let divisor = count.max(1);
        center = Point::new(center.x / divisor, center.y / divisor);
        center = center.mapped_to_grid(grid_interval);

        Self {
            group: UndoCommandGroup::new("Drag footprint elements"),
            pad_cmds,
            circle_cmds,
            polygon_cmds,
            text_cmds,
            hole_cmds,
            center,
            delta_pos: Point::ORIGIN,
            delta_rot: Angle::DEG_0,
            mirrored_geometry: false,
            mirrored_layer: false,
            snapped: false,
        }
    }

    /// Number of captured items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pad_cmds.len()
            + self.circle_cmds.len()
            + self.polygon_cmds.len()
            + self.text_cmds.len()
            + self.hole_cmds.len()
    }

    /// The rotate/mirror center.
    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    /// Translates so the total offset from the drag start becomes `delta`.
    pub fn set_delta_to_start_pos(&mut self, delta: Point) {
        self.translate(delta - self.delta_pos);
    }

    /// Translates the whole selection.
    pub fn translate(&mut self, delta: Point) {
        if delta.is_origin() {
            return;
        }
        for cmd in &mut self.pad_cmds {
            cmd.translate(delta, true);
        }
        for cmd in &mut self.circle_cmds {
            cmd.translate(delta, true);
        }
        for cmd in &mut self.polygon_cmds {
            cmd.translate(delta, true);
        }
        for cmd in &mut self.text_cmds {
            cmd.translate(delta, true);
        }
        for cmd in &mut self.hole_cmds {
            cmd.translate(delta, true);
        }
        self.delta_pos += delta;
        self.center += delta;
    }

    /// Rotates the whole selection around the captured center.
    pub fn rotate(&mut self, angle: Angle) {
        let center = self.center;
        for cmd in &mut self.pad_cmds {
            cmd.rotate(angle, center, true);
        }
        for cmd in &mut self.circle_cmds {
            cmd.rotate(angle, center, true);
        }
        for cmd in &mut self.polygon_cmds {
            cmd.rotate(angle, center, true);
        }
        for cmd in &mut self.text_cmds {
            cmd.rotate(angle, center, true);
        }
        for cmd in &mut self.hole_cmds {
            cmd.rotate(angle, center, true);
        }
        self.delta_rot += angle;
    }

    /// Mirrors the whole selection's geometry across the axis through the
    /// captured center.
    pub fn mirror_geometry(&mut self, orientation: Orientation) {
        let center = self.center;
        for cmd in &mut self.pad_cmds {
            cmd.mirror_geometry(orientation, center, true);
        }
        for cmd in &mut self.circle_cmds {
            cmd.mirror_geometry(orientation, center, true);
        }
        for cmd in &mut self.polygon_cmds {
            cmd.mirror_geometry(orientation, center, true);
        }
        for cmd in &mut self.text_cmds {
            cmd.mirror_geometry(orientation, center, true);
        }
        for cmd in &mut self.hole_cmds {
            cmd.mirror(orientation, center, true);
        }
        self.mirrored_geometry = !self.mirrored_geometry;
    }

    /// Moves the whole selection to the mirrored layers/side.
    pub fn mirror_layer(&mut self) {
        for cmd in &mut self.pad_cmds {
            cmd.mirror_layer(true);
        }
        for cmd in &mut self.circle_cmds {
            cmd.mirror_layer(true);
        }
        for cmd in &mut self.polygon_cmds {
            cmd.mirror_layer(true);
        }
        for cmd in &mut self.text_cmds {
            cmd.mirror_layer(true);
        }
        self.mirrored_layer = !self.mirrored_layer;
    }

    /// Snaps every item to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength) {
        for cmd in &mut self.pad_cmds {
            cmd.snap_to_grid(interval, true);
        }
        for cmd in &mut self.circle_cmds {
            cmd.snap_to_grid(interval, true);
        }
        for cmd in &mut self.polygon_cmds {
            cmd.snap_to_grid(interval, true);
        }
        for cmd in &mut self.text_cmds {
            cmd.snap_to_grid(interval, true);
        }
        for cmd in &mut self.hole_cmds {
            cmd.snap_to_grid(interval, true);
        }
        self.snapped = true;
    }
}

impl UndoCommand for CmdDragSelectedFootprintItems {
    fn meta(&self) -> &CommandMeta {
        self.group.meta()
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        self.group.meta_mut()
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        if self.delta_pos.is_origin()
            && self.delta_rot == Angle::DEG_0
            && !self.mirrored_geometry
            && !self.mirrored_layer
            && !self.snapped
        {
            // Nothing happened; dropping the unexecuted child commands
            // reverts any immediate feedback.
            self.pad_cmds.clear();
            self.circle_cmds.clear();
            self.polygon_cmds.clear();
            self.text_cmds.clear();
            self.hole_cmds.clear();
            return Ok(false);
        }

        // Hand the child commands over to the group, newest captured first.
        while let Some(cmd) = self.pad_cmds.pop() {
            self.group.append_child(Box::new(cmd))?;
        }
        while let Some(cmd) = self.circle_cmds.pop() {
            self.group.append_child(Box::new(cmd))?;
        }
        while let Some(cmd) = self.polygon_cmds.pop() {
            self.group.append_child(Box::new(cmd))?;
        }
        while let Some(cmd) = self.text_cmds.pop() {
            self.group.append_child(Box::new(cmd))?;
        }
        while let Some(cmd) = self.hole_cmds.pop() {
            self.group.append_child(Box::new(cmd))?;
        }
        self.group.perform_execute()
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        self.group.perform_undo()
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        self.group.perform_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;
    use crate::types::{GraphicsLayerName, Path, UnsignedLength, Vertex};
    use uuid::Uuid;

    fn grid() -> PositiveLength {
        PositiveLength::from_nm(500_000).unwrap()
    }

    fn items() -> (DragItems, Shared<Circle>, Shared<Polygon>) {
        let circle = shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::ZERO,
            false,
            false,
            Point::from_nm(1_000_000, 0),
            PositiveLength::from_nm(500_000).unwrap(),
        ));
        let polygon = shared(Polygon::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::ZERO,
            false,
            false,
            Path::new(vec![
                Vertex::new(Point::from_nm(0, 0)),
                Vertex::new(Point::from_nm(1_000_000, 0)),
            ]),
        ));
        let items = DragItems {
            circles: vec![Shared::clone(&circle)],
            polygons: vec![Shared::clone(&polygon)],
            ..DragItems::default()
        };
        (items, circle, polygon)
    }

    #[test]
    fn center_is_the_snapped_average() {
        let (items, _, _) = items();
        let cmd = CmdDragSelectedFootprintItems::new(&items, grid());
        // Average of (1.0, 0), (0, 0), (1.0, 0) is (0.666..., 0) which snaps
        // to (0.5, 0).
        assert_eq!(cmd.center(), Point::from_nm(500_000, 0));
        assert_eq!(cmd.count(), 2);
    }

    #[test]
    fn untouched_drag_discards_as_no_op() {
        let (items, _, _) = items();
        let mut cmd = CmdDragSelectedFootprintItems::new(&items, grid());
        assert!(!cmd.execute().unwrap());
        cmd.undo().unwrap();
    }

    #[test]
    fn translate_applies_immediately_and_is_one_undo_step() {
        let (items, circle, polygon) = items();
        let mut cmd = CmdDragSelectedFootprintItems::new(&items, grid());
        cmd.translate(Point::from_nm(500_000, 500_000));
        assert_eq!(circle.borrow().center(), Point::from_nm(1_500_000, 500_000));
        assert!(cmd.execute().unwrap());
        cmd.undo().unwrap();
        assert_eq!(circle.borrow().center(), Point::from_nm(1_000_000, 0));
        assert_eq!(polygon.borrow().path().vertices()[0].pos, Point::from_nm(0, 0));
        cmd.redo().unwrap();
        assert_eq!(circle.borrow().center(), Point::from_nm(1_500_000, 500_000));
        cmd.undo().unwrap();
    }

    #[test]
    fn four_quarter_turns_are_the_identity() {
        let (items, circle, polygon) = items();
        let before_circle = circle.borrow().clone();
        let before_polygon = polygon.borrow().clone();
        let mut cmd = CmdDragSelectedFootprintItems::new(&items, grid());
        for _ in 0..4 {
            cmd.rotate(Angle::DEG_90);
        }
        cmd.execute().unwrap();
        assert_eq!(*circle.borrow(), before_circle);
        assert_eq!(*polygon.borrow(), before_polygon);
        cmd.undo().unwrap();
    }

    #[test]
    fn double_mirror_is_the_identity() {
        let (items, circle, _) = items();
        let before = circle.borrow().clone();
        let mut cmd = CmdDragSelectedFootprintItems::new(&items, grid());
        cmd.mirror_geometry(Orientation::Horizontal);
        cmd.mirror_geometry(Orientation::Horizontal);
        cmd.execute().unwrap();
        assert_eq!(*circle.borrow(), before);
        cmd.undo().unwrap();
    }
}
