//! Tool state for re-numbering footprint pads by clicking them in order.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::state::{handle_error, EditorState};
use crate::commands::CmdFootprintPadEdit;
use crate::editor::{Context, Feature, PointerEvent};
use crate::editor::selection;
use crate::editor::selection::ItemKind;
use crate::types::{Point, PositiveLength};

/// Reassigns package pads to footprint pads in click order.
///
/// All reassignments of one run go into a single transaction, so aborting
/// rolls the entire renumbering back; switching tools commits it.
pub struct ReNumberPadsState {
    active: bool,
    package_pads: Vec<Uuid>,
    next_index: usize,
}

impl ReNumberPadsState {
    /// Creates the state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: false,
            package_pads: Vec::new(),
            next_index: 0,
        }
    }

    fn commit(&mut self, ctx: &mut Context) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        match ctx.undo_stack.borrow_mut().commit_cmd_group() {
            Ok(_) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn abort(&mut self, ctx: &mut Context) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        match ctx.undo_stack.borrow_mut().abort_cmd_group() {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn assign_clicked_pad(&mut self, ctx: &mut Context, pos: Point) -> bool {
        if self.package_pads.is_empty() {
            return false;
        }
        let Some(footprint) = ctx.current_footprint.clone() else {
            return false;
        };
        let tolerance = PositiveLength::from_nm(ctx.grid_interval.to_nm() / 2)
            .unwrap_or(ctx.grid_interval);
        let Some(item) = selection::item_at(&footprint.borrow(), pos, tolerance) else {
            return false;
        };
        if item.kind != ItemKind::Pad {
            return false;
        }
        let Some(pad) = footprint.borrow().pads().find(item.uuid) else {
            return false;
        };

        if !self.active {
            if let Err(e) = ctx
                .undo_stack
                .borrow_mut()
                .begin_cmd_group("Re-number footprint pads")
            {
                handle_error(ctx, &e);
                return false;
            }
            self.active = true;
        }

        // Assign the next package pad in insertion order, wrapping around.
        let package_pad = self.package_pads[self.next_index % self.package_pads.len()];
        self.next_index += 1;
        let mut edit = CmdFootprintPadEdit::new(pad);
        edit.set_package_pad(Some(package_pad), false);
        if let Err(e) = ctx.undo_stack.borrow_mut().append_to_cmd_group(Box::new(edit)) {
            handle_error(ctx, &e);
            return false;
        }
        true
    }
}

impl Default for ReNumberPadsState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for ReNumberPadsState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        self.package_pads = ctx.package.borrow().pads().uuids();
        self.next_index = 0;
        self.active = false;
        ctx.adapter.set_status_bar_message(
            "Click the pads in their new order (right click to restart)",
        );
        true
    }

    fn exit(&mut self, ctx: &mut Context) -> bool {
        // Switching tools keeps the work done so far.
        if self.active {
            self.commit(ctx);
        }
        ctx.adapter.set_status_bar_message("");
        true
    }

    fn available_features(&self, _ctx: &Context) -> BTreeSet<Feature> {
        let mut features = BTreeSet::new();
        if self.active {
            features.insert(Feature::Abort);
        }
        features
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.assign_clicked_pad(ctx, e.scene_pos)
    }

    fn process_accept_command(&mut self, ctx: &mut Context) -> bool {
        self.commit(ctx)
    }

    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        if self.abort(ctx) {
            self.next_index = 0;
            true
        } else {
            false
        }
    }
}
