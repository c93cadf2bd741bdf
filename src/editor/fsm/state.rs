//! The state contract of the editor FSM.

use std::collections::BTreeSet;

use tracing::error;

use crate::editor::{Context, Feature, KeyEvent, PointerEvent};
use crate::error::EditorError;
use crate::types::{Angle, Orientation, Point};

/// One tool of the package editor.
///
/// All handlers return whether they consumed the input; unconsumed events
/// fall through to the FSM's default behavior. `entry`/`exit` may veto a
/// transition by returning `false` (e.g. when an unfinished drawing cannot
/// be aborted).
#[allow(unused_variables)]
pub trait EditorState {
    /// Enters the state.
    fn entry(&mut self, ctx: &mut Context) -> bool {
        true
    }

    /// Leaves the state.
    fn exit(&mut self, ctx: &mut Context) -> bool {
        true
    }

    /// The UI actions currently offered by this state.
    fn available_features(&self, ctx: &Context) -> BTreeSet<Feature> {
        BTreeSet::new()
    }

    /// A key was pressed.
    fn process_key_pressed(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        false
    }

    /// A key was released.
    fn process_key_released(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        false
    }

    /// The pointer moved.
    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        false
    }

    /// The left button was pressed.
    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        false
    }

    /// The left button was released.
    fn process_left_button_released(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        false
    }

    /// The left button was double-clicked.
    fn process_left_button_double_clicked(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        false
    }

    /// The right button was released.
    fn process_right_button_released(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        false
    }

    /// Select-all was requested.
    fn process_select_all(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Cut was requested.
    fn process_cut(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Copy was requested.
    fn process_copy(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Paste was requested.
    fn process_paste(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Rotating by `angle` was requested.
    fn process_rotate(&mut self, ctx: &mut Context, angle: Angle) -> bool {
        false
    }

    /// Mirroring the geometry was requested.
    fn process_mirror(&mut self, ctx: &mut Context, orientation: Orientation) -> bool {
        false
    }

    /// Flipping to the other board side was requested.
    fn process_flip(&mut self, ctx: &mut Context, orientation: Orientation) -> bool {
        false
    }

    /// Move/align of the selection was requested.
    fn process_move_align(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Snapping the selection to the grid was requested.
    fn process_snap_to_grid(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Removing the selection was requested.
    fn process_remove(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Opening the properties dialog was requested.
    fn process_edit_properties(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Moving the selection by `delta` was requested.
    fn process_move(&mut self, ctx: &mut Context, delta: Point) -> bool {
        false
    }

    /// Accepting the current command was requested (e.g. Enter).
    fn process_accept_command(&mut self, ctx: &mut Context) -> bool {
        false
    }

    /// Aborting the current command was requested (e.g. Esc, right click).
    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        false
    }
}

/// Surfaces an error to the user and keeps the editor interactive.
///
/// User errors are shown as-is; anything else is a defect and additionally
/// logged.
pub(crate) fn handle_error(ctx: &Context, error: &EditorError) {
    if !error.is_user_error() {
        error!(%error, "unexpected error in editor state");
    }
    ctx.adapter.show_error(&error.to_string());
}

/// Aborts a possibly active command group after a failed operation, keeping
/// the undo stack consistent.
pub(crate) fn abort_active_group(ctx: &Context) {
    let mut stack = ctx.undo_stack.borrow_mut();
    if stack.is_command_group_active() {
        if let Err(e) = stack.abort_cmd_group() {
            error!(%e, "could not abort command group after error");
        }
    }
}
