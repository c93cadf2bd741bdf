//! Tool state for placing non-plated holes.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdHoleEdit, CmdHoleInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::{Hole, MaskConfig};
use crate::list::ListItem;
use crate::types::{Angle, Point, PositiveLength, UnsignedLength};
use crate::{shared, Shared};

struct CurrentHole {
    hole: Shared<Hole>,
    edit: CmdHoleEdit,
}

/// Stamping hole tool: a hole is attached to the cursor on entry; every
/// click fixes it and attaches the next one.
pub struct AddHolesState {
    diameter: PositiveLength,
    cursor: Point,
    current: Option<CurrentHole>,
}

impl AddHolesState {
    /// Creates the state with a 0.8 mm default drill.
    #[must_use]
    pub fn new() -> Self {
        Self {
            diameter: PositiveLength::from_nm(800_000).expect("default diameter is positive"),
            cursor: Point::ORIGIN,
            current: None,
        }
    }

    /// Sets the drill diameter for new holes.
    pub fn set_diameter(&mut self, diameter: PositiveLength) {
        self.diameter = diameter;
        if let Some(current) = &mut self.current {
            current.edit.set_diameter(diameter, true);
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
            .begin_cmd_group("Add footprint hole")?;
        let hole = shared(Hole::new(
            Uuid::new_v4(),
            pos,
            self.diameter,
            UnsignedLength::ZERO,
            Angle::DEG_0,
            MaskConfig::Auto,
        ));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdHoleInsert::new(
                footprint.borrow().holes().clone(),
                Shared::clone(&hole),
                None,
            )))?;
        let edit = CmdHoleEdit::new(Shared::clone(&hole));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Hole, hole.borrow().uuid()));
        }
        self.current = Some(CurrentHole { hole, edit });
        ctx.adapter.set_status_bar_message("Click to place the hole");
        Ok(())
    }

    fn finish_and_restart(&mut self, ctx: &mut Context, pos: Point) -> bool {
        let Some(mut current) = self.current.take() else {
            return false;
        };
        current.edit.set_position(pos, true);
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
            Ok(()) => self.start(ctx, pos),
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
        self.current = None;
        match ctx.undo_stack.borrow_mut().abort_cmd_group() {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }
}

impl Default for AddHolesState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for AddHolesState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        let pos = ctx.snap(self.cursor);
        self.start(ctx, pos)
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
        self.cursor = e.scene_pos;
        if let Some(current) = &mut self.current {
            current.edit.set_position(ctx.snap(e.scene_pos), true);
        }
        true
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.cursor = e.scene_pos;
        let pos = ctx.snap(e.scene_pos);
        if self.current.is_some() {
            self.finish_and_restart(ctx, pos)
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
