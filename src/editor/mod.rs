//! The interactive package editor: context, input events, selection,
//! clipboard, settings, state machine and the tab orchestrator.

pub mod clipboard;
pub mod fsm;
pub mod selection;
pub mod settings;
pub mod tab;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::library::fs::TransactionalFs;
use crate::library::{Footprint, Package};
use crate::types::{LengthUnit, Point, PositiveLength};
use crate::undo::UndoStack;
use crate::Shared;

use self::clipboard::FootprintClipboardData;
use self::selection::{FootprintSelection, ItemRef};

/// Keyboard modifier state of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift is held.
    pub shift: bool,
    /// Control is held.
    pub control: bool,
}

/// A pointer event in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Position in the scene.
    pub scene_pos: Point,
    /// Modifier state.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Creates a pointer event without modifiers.
    #[must_use]
    pub const fn at(scene_pos: Point) -> Self {
        Self {
            scene_pos,
            modifiers: Modifiers {
                shift: false,
                control: false,
            },
        }
    }
}

/// Keys the editor core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Shift (toggles grid snapping in some tools).
    Shift,
    /// Escape.
    Escape,
    /// Return/Enter.
    Return,
    /// Delete.
    Delete,
    /// Any other key, by its code.
    Other(u32),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Modifier state after the event.
    pub modifiers: Modifiers,
}

/// UI actions a state can offer; drives enabling/disabling of menu entries
/// and toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Feature {
    /// Abort the current command.
    Abort,
    /// Select everything.
    SelectAll,
    /// Cut the selection.
    Cut,
    /// Copy the selection.
    Copy,
    /// Paste the clipboard.
    Paste,
    /// Remove the selection.
    Remove,
    /// Rotate the selection.
    Rotate,
    /// Mirror the selection geometry.
    Mirror,
    /// Flip the selection to the other board side.
    Flip,
    /// Move the selection to an entered position.
    MoveAlign,
    /// Snap the selection to the grid.
    SnapToGrid,
    /// Open the properties dialog.
    Properties,
}

/// Callbacks into the surrounding UI.
///
/// The editing core never talks to a widget toolkit directly; everything
/// user-visible goes through this trait. Implementations live on the UI
/// side; tests use a recording double.
pub trait EditorUiAdapter {
    /// Shows a transient message in the status bar (empty clears it).
    fn set_status_bar_message(&self, message: &str);

    /// Shows a modal error to the user.
    fn show_error(&self, message: &str);

    /// Shows or hides the measurement ruler overlay.
    fn set_ruler_positions(&self, positions: Option<(Point, Point)>);

    /// Asks the UI to open the properties dialog for an item.
    fn request_properties_dialog(&self, item: ItemRef);

    /// Asks the UI for a move/align target position for a selection
    /// centered at `center`. `None` means the user cancelled.
    fn request_move_align(&self, center: Point) -> Option<Point> {
        let _ = center;
        None
    }

    /// The set of available UI actions changed.
    fn available_features_changed(&self, features: &BTreeSet<Feature>);
}

/// Shared state handed to every FSM state method.
///
/// The context is a passive aggregate; it owns nothing but the handles.
pub struct Context {
    /// The package under edit.
    pub package: Shared<Package>,
    /// The package's file store.
    pub fs: Shared<TransactionalFs>,
    /// The undo stack all edits go through.
    pub undo_stack: Rc<RefCell<UndoStack>>,
    /// The footprint currently shown in the editor.
    pub current_footprint: Option<Shared<Footprint>>,
    /// The selection model matching `current_footprint`.
    pub selection: Option<Shared<FootprintSelection>>,
    /// Current grid snap interval.
    pub grid_interval: PositiveLength,
    /// Display unit for status bar texts.
    pub length_unit: LengthUnit,
    /// Clipboard content of the footprint editor, if any.
    pub clipboard: Option<FootprintClipboardData>,
    /// Callbacks into the UI.
    pub adapter: Rc<dyn EditorUiAdapter>,
}

impl Context {
    /// Snaps a scene position to the grid.
    #[must_use]
    pub fn snap(&self, pos: Point) -> Point {
        pos.mapped_to_grid(self.grid_interval)
    }
}
