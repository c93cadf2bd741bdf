//! The editor tab orchestrator.
//!
//! Owns the undo stack, the FSM and its context, and maintains the derived
//! state around them: which footprint is shown, whether the package's
//! interface (its pad uuids) still matches the state last saved to disk,
//! and the dirty flag driving the window title.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::{debug, warn};
use uuid::Uuid;

use super::fsm::{EditorFsm, State};
use super::selection::FootprintSelection;
use super::settings::WorkspaceSettings;
use super::{Context, EditorUiAdapter, Feature, KeyEvent, PointerEvent};
use crate::commands::CmdPackageReload;
use crate::error::EditorResult;
use crate::library::fs::TransactionalFs;
use crate::library::{Package, PadFunction};
use crate::list::ListItem;
use crate::types::{Angle, Orientation, Point, PositiveLength};
use crate::undo::UndoStack;
use crate::{shared, Shared};

/// The pad-uuid baseline used for interface-break detection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct InterfaceBaseline {
    package_pads: BTreeSet<Uuid>,
    footprint_pads: BTreeMap<Uuid, BTreeSet<Uuid>>,
}

impl InterfaceBaseline {
    fn capture(package: &Package) -> Self {
        let mut footprint_pads = BTreeMap::new();
        for footprint in package.footprints().elements() {
            let footprint = footprint.borrow();
            footprint_pads.insert(footprint.uuid(), footprint.pads().uuid_set());
        }
        Self {
            package_pads: package.pads().uuid_set(),
            footprint_pads,
        }
    }
}

/// Orchestrates one open package editor tab.
pub struct EditorTab {
    fsm: EditorFsm,
    baseline: InterfaceBaseline,
    interface_broken: bool,
}

impl EditorTab {
    /// Opens a tab over a package and its file store. The first footprint
    /// becomes current.
    #[must_use]
    pub fn new(
        package: Shared<Package>,
        fs: Shared<TransactionalFs>,
        adapter: Rc<dyn EditorUiAdapter>,
        settings: &WorkspaceSettings,
    ) -> Self {
        let grid_interval = settings
            .grid_interval()
            .unwrap_or_else(|_| PositiveLength::from_nm(635_000).expect("default grid"));
        let current_footprint = package.borrow().footprints().value(0);
        let selection = current_footprint
            .as_ref()
            .map(|_| shared(FootprintSelection::new()));
        let baseline = InterfaceBaseline::capture(&package.borrow());
        let context = Context {
            package,
            fs,
            undo_stack: Rc::new(std::cell::RefCell::new(UndoStack::new())),
            current_footprint,
            selection,
            grid_interval,
            length_unit: settings.length_unit,
            clipboard: None,
            adapter,
        };
        Self {
            fsm: EditorFsm::new(context),
            baseline,
            interface_broken: false,
        }
    }

    /// The state machine (for tool control and input forwarding).
    pub fn fsm_mut(&mut self) -> &mut EditorFsm {
        &mut self.fsm
    }

    /// The state machine.
    #[must_use]
    pub fn fsm(&self) -> &EditorFsm {
        &self.fsm
    }

    /// The currently active tool.
    #[must_use]
    pub fn current_state(&self) -> State {
        self.fsm.current_state()
    }

    /// The UI actions currently offered.
    #[must_use]
    pub fn available_features(&self) -> BTreeSet<Feature> {
        self.fsm.available_features()
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.fsm.context().undo_stack.borrow().is_clean()
    }

    /// Whether the package's pad interface differs from the last saved
    /// baseline (dependent devices would break).
    #[must_use]
    pub fn is_interface_broken(&self) -> bool {
        self.interface_broken
    }

    /// Recomputes the derived state. The UI calls this from its undo-stack
    /// notification so external stack changes are reflected too.
    pub fn refresh(&mut self) {
        self.update_derived_state();
    }

    /// Switches to the footprint with the given uuid (or to none).
    pub fn set_current_footprint(&mut self, uuid: Option<Uuid>) -> bool {
        let footprint = uuid.and_then(|uuid| {
            self.fsm
                .context()
                .package
                .borrow()
                .footprints()
                .find(uuid)
        });
        let selection = footprint.as_ref().map(|_| shared(FootprintSelection::new()));
        let changed = self.fsm.process_change_current_footprint(footprint, selection);
        self.update_derived_state();
        changed
    }

    /// Undoes the last command.
    ///
    /// # Errors
    ///
    /// Returns the command's undo error.
    pub fn undo(&mut self) -> EditorResult<()> {
        let result = self.fsm.context().undo_stack.borrow_mut().undo();
        self.update_derived_state();
        result
    }

    /// Redoes the next command.
    ///
    /// # Errors
    ///
    /// Returns the command's redo error.
    pub fn redo(&mut self) -> EditorResult<()> {
        let result = self.fsm.context().undo_stack.borrow_mut().redo();
        self.update_derived_state();
        result
    }

    /// Saves the package to disk, refreshing the clean mark and the
    /// interface baseline.
    ///
    /// # Errors
    ///
    /// Returns serialization or file system errors.
    pub fn save(&mut self) -> EditorResult<()> {
        // An unfinished drawing must not be saved half-done.
        self.drain_tool();
        {
            let context = self.fsm.context();
            let package = context.package.borrow();
            let mut fs = context.fs.borrow_mut();
            package.write_to(&mut fs);
            fs.save()?;
        }
        self.fsm.context().undo_stack.borrow_mut().set_clean();
        self.baseline = InterfaceBaseline::capture(&self.fsm.context().package.borrow());
        self.update_derived_state();
        debug!("saved package");
        Ok(())
    }

    /// Reloads the package from disk as one undoable step.
    ///
    /// # Errors
    ///
    /// Returns the reload command's error; the package is unchanged then.
    pub fn reload(&mut self) -> EditorResult<()> {
        self.drain_tool();
        let cmd = {
            let context = self.fsm.context();
            CmdPackageReload::new(
                Shared::clone(&context.package),
                Shared::clone(&context.fs),
            )
        };
        let result = self
            .fsm
            .context()
            .undo_stack
            .borrow_mut()
            .exec_cmd(Box::new(cmd), false)
            .map(|_| ());
        self.update_derived_state();
        result
    }

    /// Forwards a pointer move.
    pub fn process_mouse_moved(&mut self, e: &PointerEvent) -> bool {
        let handled = self.fsm.process_mouse_moved(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a left press.
    pub fn process_left_button_pressed(&mut self, e: &PointerEvent) -> bool {
        let handled = self.fsm.process_left_button_pressed(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a left release.
    pub fn process_left_button_released(&mut self, e: &PointerEvent) -> bool {
        let handled = self.fsm.process_left_button_released(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a double click.
    pub fn process_left_button_double_clicked(&mut self, e: &PointerEvent) -> bool {
        let handled = self.fsm.process_left_button_double_clicked(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a right click.
    pub fn process_right_button_released(&mut self, e: &PointerEvent) -> bool {
        let handled = self.fsm.process_right_button_released(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a key press.
    pub fn process_key_pressed(&mut self, e: &KeyEvent) -> bool {
        let handled = self.fsm.process_key_pressed(e);
        self.update_derived_state();
        handled
    }

    /// Forwards a key release.
    pub fn process_key_released(&mut self, e: &KeyEvent) -> bool {
        let handled = self.fsm.process_key_released(e);
        self.update_derived_state();
        handled
    }

    /// Forwards an abort (Esc).
    pub fn process_abort_command(&mut self) -> bool {
        let handled = self.fsm.process_abort_command();
        self.update_derived_state();
        handled
    }

    /// Forwards an accept (Enter).
    pub fn process_accept_command(&mut self) -> bool {
        let handled = self.fsm.process_accept_command();
        self.update_derived_state();
        handled
    }

    /// Forwards a rotate request.
    pub fn process_rotate(&mut self, angle: Angle) -> bool {
        let handled = self.fsm.process_rotate(angle);
        self.update_derived_state();
        handled
    }

    /// Forwards a mirror request.
    pub fn process_mirror(&mut self, orientation: Orientation) -> bool {
        let handled = self.fsm.process_mirror(orientation);
        self.update_derived_state();
        handled
    }

    /// Forwards a flip request.
    pub fn process_flip(&mut self, orientation: Orientation) -> bool {
        let handled = self.fsm.process_flip(orientation);
        self.update_derived_state();
        handled
    }

    /// Forwards a move request.
    pub fn process_move(&mut self, delta: Point) -> bool {
        let handled = self.fsm.process_move(delta);
        self.update_derived_state();
        handled
    }

    /// Forwards a remove request.
    pub fn process_remove(&mut self) -> bool {
        let handled = self.fsm.process_remove();
        self.update_derived_state();
        handled
    }

    /// Forwards a select-all request.
    pub fn process_select_all(&mut self) -> bool {
        let handled = self.fsm.process_select_all();
        self.update_derived_state();
        handled
    }

    /// Forwards a cut request.
    pub fn process_cut(&mut self) -> bool {
        let handled = self.fsm.process_cut();
        self.update_derived_state();
        handled
    }

    /// Forwards a copy request.
    pub fn process_copy(&mut self) -> bool {
        let handled = self.fsm.process_copy();
        self.update_derived_state();
        handled
    }

    /// Forwards a paste request.
    pub fn process_paste(&mut self) -> bool {
        let handled = self.fsm.process_paste();
        self.update_derived_state();
        handled
    }

    /// Forwards a snap-to-grid request.
    pub fn process_snap_to_grid(&mut self) -> bool {
        let handled = self.fsm.process_snap_to_grid();
        self.update_derived_state();
        handled
    }

    /// Starts the SMT pad tool with a function.
    pub fn start_adding_smt_pads(&mut self, function: PadFunction) -> bool {
        let started = self.fsm.process_start_adding_smt_pads(function);
        self.update_derived_state();
        started
    }

    fn drain_tool(&mut self) {
        // Three aborts are enough to unwind any tool sub-state (pending
        // segment, floating item, open transaction).
        for _ in 0..3 {
            if !self.fsm.process_abort_command() {
                break;
            }
            if self.fsm.current_state() == State::Select
                && !self
                    .fsm
                    .context()
                    .undo_stack
                    .borrow()
                    .is_command_group_active()
            {
                break;
            }
        }
        if self
            .fsm
            .context()
            .undo_stack
            .borrow()
            .is_command_group_active()
        {
            warn!("a command group survived draining the active tool");
        }
    }

    fn update_derived_state(&mut self) {
        self.resolve_current_footprint();
        let broken =
            InterfaceBaseline::capture(&self.fsm.context().package.borrow()) != self.baseline;
        self.interface_broken = broken;
    }

    /// After undo/redo/reload the current footprint handle may no longer be
    /// part of the package; re-resolve it by uuid or fall back to the first
    /// footprint.
    fn resolve_current_footprint(&mut self) {
        let context = self.fsm.context();
        let current = context.current_footprint.clone();
        let footprints = context.package.borrow().footprints().clone();
        match current {
            Some(footprint) if footprints.index_of(&footprint).is_some() => {}
            Some(footprint) => {
                let uuid = footprint.borrow().uuid();
                let replacement = footprints.find(uuid).or_else(|| footprints.value(0));
                let selection = replacement
                    .as_ref()
                    .map(|_| shared(FootprintSelection::new()));
                self.fsm
                    .process_change_current_footprint(replacement, selection);
            }
            None => {
                if let Some(first) = footprints.value(0) {
                    let selection = shared(FootprintSelection::new());
                    self.fsm
                        .process_change_current_footprint(Some(first), Some(selection));
                }
            }
        }
    }
}

impl Drop for EditorTab {
    fn drop(&mut self) {
        // The undo stack must be drained before the package goes away.
        self.drain_tool();
        self.fsm.context().undo_stack.borrow_mut().clear();
    }
}
