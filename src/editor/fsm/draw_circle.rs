//! Tool state for drawing circles.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdCircleEdit, CmdCircleInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::Circle;
use crate::list::ListItem;
use crate::types::{GraphicsLayerName, Length, Point, PositiveLength, UnsignedLength};
use crate::{shared, Shared};

struct CurrentCircle {
    circle: Shared<Circle>,
    edit: CmdCircleEdit,
}

/// Two-click circle tool: first click places the center, the second click
/// fixes the diameter.
pub struct DrawCircleState {
    layer: GraphicsLayerName,
    line_width: UnsignedLength,
    filled: bool,
    grab_area: bool,
    used_line_widths: IndexMap<GraphicsLayerName, UnsignedLength>,
    current: Option<CurrentCircle>,
}

impl DrawCircleState {
    /// Creates the state with the conventional defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layer: GraphicsLayerName::top_legend(),
            line_width: UnsignedLength::from_nm(200_000).unwrap_or(UnsignedLength::ZERO),
            filled: false,
            grab_area: false,
            used_line_widths: IndexMap::new(),
            current: None,
        }
    }

    /// Selects the layer for new circles, recalling the line width last
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

    /// Sets the line width for new circles.
    pub fn set_line_width(&mut self, width: UnsignedLength) {
        self.line_width = width;
        self.used_line_widths.insert(self.layer.clone(), width);
        if let Some(current) = &mut self.current {
            current.edit.set_line_width(width, true);
        }
    }

    /// Sets the fill flag for new circles.
    pub fn set_filled(&mut self, filled: bool) {
        self.filled = filled;
        if let Some(current) = &mut self.current {
            current.edit.set_filled(filled, true);
        }
    }

    /// Sets the grab-area flag for new circles.
    pub fn set_grab_area(&mut self, grab_area: bool) {
        self.grab_area = grab_area;
        if let Some(current) = &mut self.current {
            current.edit.set_grab_area(grab_area, true);
        }
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
            .begin_cmd_group("Add footprint circle")?;
        let circle = shared(Circle::new(
            Uuid::new_v4(),
            self.layer.clone(),
            self.line_width,
            self.filled,
            self.grab_area,
            pos,
            PositiveLength::from_nm(1).expect("one nanometre is positive"),
        ));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdCircleInsert::new(
                footprint.borrow().circles().clone(),
                Shared::clone(&circle),
                None,
            )))?;
        let edit = CmdCircleEdit::new(Shared::clone(&circle));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Circle, circle.borrow().uuid()));
        }
        self.current = Some(CurrentCircle { circle, edit });
        ctx.adapter
            .set_status_bar_message("Click to specify the diameter");
        Ok(())
    }

    fn update_diameter(&mut self, pos: Point) {
        if let Some(current) = &mut self.current {
            let center = current.circle.borrow().center();
            let diameter = Length::from((pos - center).length()) * 2;
            let diameter = diameter.max(Length::from_nm(1));
            if let Ok(diameter) = PositiveLength::new(diameter) {
                current.edit.set_diameter(diameter, true);
            }
        }
    }

    fn finish(&mut self, ctx: &mut Context, pos: Point) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        if pos == current.circle.borrow().center() {
            // A second click on the center would give a degenerate circle.
            return self.abort(ctx);
        }
        self.update_diameter(pos);
        let Some(current) = self.current.take() else {
            return false;
        };
        if let Some(selection) = &ctx.selection {
            selection.borrow_mut().clear();
        }
        let result = ctx
            .undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(current.edit));
        let result = match result {
            Ok(_) => ctx.undo_stack.borrow_mut().commit_cmd_group().map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                ctx.adapter
                    .set_status_bar_message("Click to specify the center");
                true
            }
            Err(e) => {
                handle_error(ctx, &e);
                abort_active_group(ctx);
                false
            }
        }
    }

    fn abort(&mut self, ctx: &mut Context) -> bool {
        if let Some(selection) = &ctx.selection {
            selection.borrow_mut().clear();
        }
        // Dropping the edit command reverts its immediate feedback before
        // the group abort removes the circle again.
        self.current = None;
        match ctx.undo_stack.borrow_mut().abort_cmd_group() {
            Ok(()) => {
                ctx.adapter
                    .set_status_bar_message("Click to specify the center");
                true
            }
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }
}

impl Default for DrawCircleState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for DrawCircleState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        ctx.adapter
            .set_status_bar_message("Click to specify the center");
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

    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        let pos = ctx.snap(e.scene_pos);
        if self.current.is_some() {
            self.update_diameter(pos);
        }
        true
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        let pos = ctx.snap(e.scene_pos);
        if self.current.is_some() {
            self.finish(ctx, pos)
        } else {
            self.start(ctx, pos)
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
