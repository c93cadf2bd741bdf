//! Tool state for drawing keep-out zones.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdZoneEdit, CmdZoneInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, Key, KeyEvent, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::{Zone, ZoneLayers, ZoneRules};
use crate::list::ListItem;
use crate::types::{Angle, Path, Point, Vertex};
use crate::{shared, Shared};

struct CurrentZone {
    zone: Shared<Zone>,
    edit: CmdZoneEdit,
}

/// Tool state for drawing zone outlines, segment by segment like the
/// polygon tool.
pub struct DrawZoneState {
    layers: ZoneLayers,
    rules: ZoneRules,
    angle: Angle,
    cursor: Point,
    snapped_cursor: Point,
    current: Option<CurrentZone>,
}

impl DrawZoneState {
    /// Creates the state; new zones default to the top side with all rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: ZoneLayers::TOP,
            rules: ZoneRules::ALL,
            angle: Angle::DEG_0,
            cursor: Point::ORIGIN,
            snapped_cursor: Point::ORIGIN,
            current: None,
        }
    }

    /// Sets the board sides for new zones.
    pub fn set_layers(&mut self, layers: ZoneLayers) {
        self.layers = layers;
        if let Some(current) = &mut self.current {
            current.edit.set_layers(layers, true);
        }
    }

    /// Sets the keep-out rules for new zones.
    pub fn set_rules(&mut self, rules: ZoneRules) {
        self.rules = rules;
        if let Some(current) = &mut self.current {
            current.edit.set_rules(rules, true);
        }
    }

    /// Sets the arc angle of the segment being drawn.
    pub fn set_angle(&mut self, angle: Angle) {
        self.angle = angle;
        if let Some(current) = &mut self.current {
            let mut outline = current.zone.borrow().outline().clone();
            let count = outline.len();
            if count >= 2 {
                outline.vertices_mut()[count - 2].angle = angle;
                current.edit.set_outline(outline, true);
            }
        }
    }

    fn update_cursor(&mut self, ctx: &Context, raw: Point, shift: bool) {
        self.cursor = raw;
        // Shift disables grid snapping.
        self.snapped_cursor = if shift { raw } else { ctx.snap(raw) };
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
            .begin_cmd_group("Add footprint zone")?;
        let outline = Path::new(vec![Vertex::with_angle(pos, self.angle), Vertex::new(pos)]);
        let zone = shared(Zone::new(Uuid::new_v4(), self.layers, self.rules, outline));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdZoneInsert::new(
                footprint.borrow().zones().clone(),
                Shared::clone(&zone),
                None,
            )))?;
        let edit = CmdZoneEdit::new(Shared::clone(&zone));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Zone, zone.borrow().uuid()));
        }
        self.current = Some(CurrentZone { zone, edit });
        ctx.adapter
            .set_status_bar_message("Click to specify the next point (press Shift to disable snap)");
        Ok(())
    }

    fn update_outline(&mut self, pos: Point) {
        if let Some(current) = &mut self.current {
            let mut outline = current.zone.borrow().outline().clone();
            if let Some(last) = outline.vertices_mut().last_mut() {
                last.pos = pos;
            }
            current.edit.set_outline(outline, true);
        }
    }

    fn add_next_segment(&mut self, ctx: &mut Context, pos: Point) -> bool {
        self.update_outline(pos);
        let Some(current) = &self.current else {
            return false;
        };
        let vertices: Vec<Vertex> = current.zone.borrow().outline().vertices().to_vec();
        let count = vertices.len();
        if count >= 2 && vertices[count - 1].pos == vertices[count - 2].pos {
            // No line was drawn since the last click.
            return self.abort(ctx);
        }
        let closed = count >= 3 && vertices[0].pos == vertices[count - 1].pos;
        if closed {
            // Drop the coincident last vertex; zone outlines close
            // implicitly.
            let mut trimmed = vertices;
            trimmed.pop();
            return self.commit_segment(ctx, Some(Path::new(trimmed)), true);
        }
        self.commit_segment(ctx, None, false)
    }

    fn commit_segment(&mut self, ctx: &mut Context, final_path: Option<Path>, finish: bool) -> bool {
        let Some(mut current) = self.current.take() else {
            return false;
        };
        if let Some(path) = final_path {
            current.edit.set_outline(path, true);
        }
        let zone = Shared::clone(&current.zone);
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
        match self.try_continue(ctx, zone) {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                abort_active_group(ctx);
                false
            }
        }
    }

    fn try_continue(&mut self, ctx: &mut Context, zone: Shared<Zone>) -> EditorResult<()> {
        ctx.undo_stack
            .borrow_mut()
            .begin_cmd_group("Add footprint zone")?;
        let mut edit = CmdZoneEdit::new(Shared::clone(&zone));
        let mut outline = zone.borrow().outline().clone();
        if let Some(last) = outline.vertices_mut().last_mut() {
            last.angle = self.angle;
        }
        outline.vertices_mut().push(Vertex::new(self.snapped_cursor));
        edit.set_outline(outline, true);
        self.current = Some(CurrentZone { zone, edit });
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

impl Default for DrawZoneState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for DrawZoneState {
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
            self.update_outline(self.snapped_cursor);
            return true;
        }
        false
    }

    fn process_key_released(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Shift {
            self.update_cursor(ctx, self.cursor, false);
            self.update_outline(self.snapped_cursor);
            return true;
        }
        false
    }

    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.update_cursor(ctx, e.scene_pos, e.modifiers.shift);
        if self.current.is_some() {
            self.update_outline(self.snapped_cursor);
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
        // Handled like a single click, matching the polygon tool family.
        self.process_left_button_pressed(ctx, e)
    }

    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        if self.current.is_some() {
            self.abort(ctx)
        } else {
            false
        }
    }
}
