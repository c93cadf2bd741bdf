//! Shared tool state for drawing lines, rectangles, polygons and arcs.
//!
//! All four tools create polygons; they differ in how clicks extend the
//! vertex path. Lines and polygons keep adding segments (each segment is its
//! own transaction, so an abort only discards the segment in progress),
//! rectangles finish after the second corner, arcs draw one arced segment at
//! a time.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdPolygonEdit, CmdPolygonInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, Key, KeyEvent, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::Polygon;
use crate::list::ListItem;
use crate::types::{Angle, GraphicsLayerName, Path, Point, UnsignedLength, Vertex};
use crate::{shared, Shared};

/// Drawing behavior of the shared polygon tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Open polyline, segment by segment.
    Line,
    /// Closed rectangle from two corners.
    Rect,
    /// Outline that may be closed by clicking the first vertex again.
    Polygon,
    /// Arced segments.
    Arc,
}

struct CurrentPolygon {
    polygon: Shared<Polygon>,
    edit: CmdPolygonEdit,
    segment_start: Point,
}

/// Tool state for the four polygon-based drawing tools.
pub struct DrawPolygonBaseState {
    mode: PolygonMode,
    layer: GraphicsLayerName,
    line_width: UnsignedLength,
    angle: Angle,
    filled: bool,
    grab_area: bool,
    used_line_widths: IndexMap<GraphicsLayerName, UnsignedLength>,
    cursor: Point,
    snapped_cursor: Point,
    current: Option<CurrentPolygon>,
}

impl DrawPolygonBaseState {
    /// Creates the state for one drawing mode with the conventional
    /// defaults.
    #[must_use]
    pub fn new(mode: PolygonMode) -> Self {
        Self {
            mode,
            layer: GraphicsLayerName::top_legend(),
            line_width: UnsignedLength::from_nm(200_000).unwrap_or(UnsignedLength::ZERO),
            angle: if mode == PolygonMode::Arc {
                Angle::DEG_90
            } else {
                Angle::DEG_0
            },
            filled: false,
            grab_area: false,
            used_line_widths: IndexMap::new(),
            cursor: Point::ORIGIN,
            snapped_cursor: Point::ORIGIN,
            current: None,
        }
    }

    /// The drawing mode.
    #[must_use]
    pub fn mode(&self) -> PolygonMode {
        self.mode
    }

    /// Selects the layer for new polygons, recalling the line width last
    /// used on that layer.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) {
        self.layer = layer;
        if let Some(current) = &mut self.current {
            current.edit.set_layer(self.layer.clone(), true);
        }
        if let Some(width) = self.used_line_widths.get(&self.layer).copied() {
            self.set_line_width(width);
        } else if self.layer.polygons_represent_areas() {
            self.set_line_width(UnsignedLength::ZERO);
        }
    }

    /// Sets the line width for new polygons.
    pub fn set_line_width(&mut self, width: UnsignedLength) {
        self.line_width = width;
        self.used_line_widths.insert(self.layer.clone(), width);
        if let Some(current) = &mut self.current {
            current.edit.set_line_width(width, true);
        }
    }

    /// Sets the arc angle of the segment being drawn.
    pub fn set_angle(&mut self, angle: Angle) {
        self.angle = angle;
        if let Some(current) = &mut self.current {
            let mut path = current.polygon.borrow().path().clone();
            let count = path.len();
            if count >= 2 {
                path.vertices_mut()[count - 2].angle = angle;
                current.edit.set_path(path, true);
            }
        }
    }

    /// Sets the fill flag for new polygons.
    pub fn set_filled(&mut self, filled: bool) {
        self.filled = filled;
        if let Some(current) = &mut self.current {
            current.edit.set_filled(filled, true);
        }
    }

    /// Sets the grab-area flag for new polygons.
    pub fn set_grab_area(&mut self, grab_area: bool) {
        self.grab_area = grab_area;
        if let Some(current) = &mut self.current {
            current.edit.set_grab_area(grab_area, true);
        }
    }

    fn update_cursor(&mut self, ctx: &Context, raw: Point, shift: bool) {
        self.cursor = raw;
        // Shift disables grid snapping while drawing polygon outlines.
        self.snapped_cursor = if shift && self.mode == PolygonMode::Polygon {
            raw
        } else {
            ctx.snap(raw)
        };
    }

    fn start(&mut self, ctx: &mut Context, pos: Point) -> bool {
        match self.try_start(ctx, pos) {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                self.current = None;
                abort_active_group(ctx);
                false
            }
        }
    }

    fn try_start(&mut self, ctx: &mut Context, pos: Point) -> EditorResult<()> {
        let Some(footprint) = ctx.current_footprint.clone() else {
            return Ok(());
        };
        ctx.undo_stack
            .borrow_mut()
            .begin_cmd_group("Add footprint polygon")?;
        let path = match self.mode {
            PolygonMode::Rect => Path::rect(pos, pos),
            _ => Path::new(vec![Vertex::with_angle(pos, self.angle), Vertex::new(pos)]),
        };
        let polygon = shared(Polygon::new(
            Uuid::new_v4(),
            self.layer.clone(),
            self.line_width,
            self.filled,
            self.grab_area,
            path,
        ));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdPolygonInsert::new(
                footprint.borrow().polygons().clone(),
                Shared::clone(&polygon),
                None,
            )))?;
        let edit = CmdPolygonEdit::new(Shared::clone(&polygon));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Polygon, polygon.borrow().uuid()));
        }
        self.current = Some(CurrentPolygon {
            polygon,
            edit,
            segment_start: pos,
        });
        ctx.adapter
            .set_status_bar_message("Click to specify the next point (right click to abort)");
        Ok(())
    }

    fn update_shape(&mut self, pos: Point) {
        if let Some(current) = &mut self.current {
            let path = match self.mode {
                PolygonMode::Rect => Path::rect(current.segment_start, pos),
                _ => {
                    let mut path = current.polygon.borrow().path().clone();
                    if let Some(last) = path.vertices_mut().last_mut() {
                        last.pos = pos;
                    }
                    path
                }
            };
            current.edit.set_path(path, true);
        }
    }

    fn add_next_segment(&mut self, ctx: &mut Context, pos: Point) -> bool {
        self.update_shape(pos);
        let Some(current) = &self.current else {
            return false;
        };

        if self.mode == PolygonMode::Rect {
            if pos == current.segment_start {
                return self.abort(ctx);
            }
            return self.commit_segment(ctx, None, true);
        }

        let vertices: Vec<Vertex> = current.polygon.borrow().path().vertices().to_vec();
        let count = vertices.len();
        if count >= 2 && vertices[count - 1].pos == vertices[count - 2].pos {
            // No line was drawn since the last click.
            return self.abort(ctx);
        }
        let closed = count >= 3 && vertices[0].pos == vertices[count - 1].pos;
        if closed {
            // Drop the coincident last vertex; the closing edge is implied.
            let mut trimmed = vertices;
            trimmed.pop();
            return self.commit_segment(ctx, Some(Path::new(trimmed)), true);
        }
        self.commit_segment(ctx, None, false)
    }

    /// Commits the transaction of the segment drawn so far. With `finish`
    /// the polygon is done; otherwise a new transaction with the next
    /// floating vertex is opened.
    fn commit_segment(&mut self, ctx: &mut Context, final_path: Option<Path>, finish: bool) -> bool {
        let Some(mut current) = self.current.take() else {
            return false;
        };
        if let Some(path) = final_path {
            current.edit.set_path(path, true);
        }
        let polygon = Shared::clone(&current.polygon);
        let result = ctx
            .undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(current.edit));
        let result = match result {
            Ok(_) => ctx.undo_stack.borrow_mut().commit_cmd_group().map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            handle_error(ctx, &e);
            abort_active_group(ctx);
            if let Some(selection) = &ctx.selection {
                selection.borrow_mut().clear();
            }
            return false;
        }
        if finish {
            if let Some(selection) = &ctx.selection {
                selection.borrow_mut().clear();
            }
            ctx.adapter
                .set_status_bar_message("Click to specify the first point");
            return true;
        }
        // Open the next segment: a fresh transaction holding one edit that
        // appends the floating vertex.
        match self.try_continue(ctx, polygon) {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                abort_active_group(ctx);
                false
            }
        }
    }

    fn try_continue(&mut self, ctx: &mut Context, polygon: Shared<Polygon>) -> EditorResult<()> {
        ctx.undo_stack
            .borrow_mut()
            .begin_cmd_group("Add footprint polygon")?;
        let mut edit = CmdPolygonEdit::new(Shared::clone(&polygon));
        let mut path = polygon.borrow().path().clone();
        if let Some(last) = path.vertices_mut().last_mut() {
            last.angle = self.angle;
        }
        let segment_start = path.vertices().last().map_or(Point::ORIGIN, |v| v.pos);
        path.vertices_mut().push(Vertex::new(self.snapped_cursor));
        edit.set_path(path, true);
        self.current = Some(CurrentPolygon {
            polygon,
            edit,
            segment_start,
        });
        Ok(())
    }

    fn abort(&mut self, ctx: &mut Context) -> bool {
        if let Some(selection) = &ctx.selection {
            selection.borrow_mut().clear();
        }
        self.current = None;
        match ctx.undo_stack.borrow_mut().abort_cmd_group() {
            Ok(()) => {
                ctx.adapter
                    .set_status_bar_message("Click to specify the first point");
                true
            }
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }
}

impl EditorState for DrawPolygonBaseState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        ctx.adapter
            .set_status_bar_message("Click to specify the first point");
        true
    }

    fn exit(&mut self, ctx: &mut Context) -> bool {
        if self.current.is_some() && !self.abort(ctx) {
            return false;
        }
        ctx.adapter.set_status_bar_message("");
        true
    }

    fn available_features(&self, _ctx: &Context) -> BTreeSet<Feature> {
        let mut features = BTreeSet::new();
        if self.current.is_some() {
            features.insert(Feature::Abort);
        }
        features
    }

    fn process_key_pressed(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Shift {
            self.update_cursor(ctx, self.cursor, true);
            self.update_shape(self.snapped_cursor);
            return true;
        }
        false
    }

    fn process_key_released(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Shift {
            self.update_cursor(ctx, self.cursor, false);
            self.update_shape(self.snapped_cursor);
            return true;
        }
        false
    }

    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.update_cursor(ctx, e.scene_pos, e.modifiers.shift);
        if self.current.is_some() {
            self.update_shape(self.snapped_cursor);
        }
        true
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.update_cursor(ctx, e.scene_pos, e.modifiers.shift);
        let pos = self.snapped_cursor;
        if self.current.is_some() {
            self.add_next_segment(ctx, pos)
        } else {
            self.start(ctx, pos)
        }
    }

    fn process_left_button_double_clicked(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        // Finish the open outline without closing it.
        self.update_cursor(ctx, e.scene_pos, e.modifiers.shift);
        if self.current.is_some() {
            let pos = self.snapped_cursor;
            self.update_shape(pos);
            self.commit_segment(ctx, None, true)
        } else {
            false
        }
    }

    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        if self.current.is_some() {
            self.abort(ctx)
        } else {
            false
        }
    }
}
