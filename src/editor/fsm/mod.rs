//! The package editor's hierarchical state machine.
//!
//! Exactly one state is active at a time. States veto transitions through
//! `entry`/`exit`; unconsumed events fall back to the FSM-level rules
//! (right-click aborts or returns to the previous tool, an unhandled abort
//! falls back to the selection tool).

mod add_holes;
mod add_pads;
mod draw_circle;
mod draw_polygon_base;
mod draw_text;
mod draw_zone;
mod measure;
mod renumber_pads;
mod select;
mod state;

pub use add_holes::AddHolesState;
pub use add_pads::{AddPadsState, PadType, ShapeSelector};
pub use draw_circle::DrawCircleState;
pub use draw_polygon_base::{DrawPolygonBaseState, PolygonMode};
pub use draw_text::{DrawTextState, TextMode};
pub use draw_zone::DrawZoneState;
pub use measure::MeasureState;
pub use renumber_pads::ReNumberPadsState;
pub use select::SelectState;
pub use state::EditorState;

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::selection::FootprintSelection;
use super::{Context, Feature, KeyEvent, PointerEvent};
use crate::library::{Footprint, PadFunction};
use crate::types::{Angle, Orientation, Point, PositiveLength};
use crate::Shared;

/// Identifies one editor tool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Transitional no-tool state.
    Idle,
    /// The selection tool.
    Select,
    /// Place through-hole pads.
    AddThtPads,
    /// Place surface-mount pads of the given function.
    AddSmtPads(PadFunction),
    /// Place `{{NAME}}` texts.
    AddNames,
    /// Place `{{VALUE}}` texts.
    AddValues,
    /// Draw polylines.
    DrawLine,
    /// Draw rectangles.
    DrawRect,
    /// Draw polygons.
    DrawPolygon,
    /// Draw circles.
    DrawCircle,
    /// Draw arcs.
    DrawArc,
    /// Place free texts.
    DrawText,
    /// Draw keep-out zones.
    DrawZone,
    /// Place non-plated holes.
    AddHoles,
    /// Measure distances.
    Measure,
    /// Re-number pads by clicking.
    ReNumberPads,
}

/// The editor state machine. Owns the shared [`Context`] and all states.
pub struct EditorFsm {
    context: Context,
    states: HashMap<State, Box<dyn EditorState>>,
    current: State,
    previous: State,
}

impl EditorFsm {
    /// Creates the FSM and enters the selection tool.
    #[must_use]
    pub fn new(context: Context) -> Self {
        let mut states: HashMap<State, Box<dyn EditorState>> = HashMap::new();
        states.insert(State::Select, Box::new(SelectState::new()));
        states.insert(
            State::AddThtPads,
            Box::new(AddPadsState::new(PadType::Tht, PadFunction::StandardPad)),
        );
        for function in PadFunction::ALL {
            states.insert(
                State::AddSmtPads(function),
                Box::new(AddPadsState::new(PadType::Smt, function)),
            );
        }
        states.insert(State::AddNames, Box::new(DrawTextState::new(TextMode::Name)));
        states.insert(State::AddValues, Box::new(DrawTextState::new(TextMode::Value)));
        states.insert(
            State::DrawLine,
            Box::new(DrawPolygonBaseState::new(PolygonMode::Line)),
        );
        states.insert(
            State::DrawRect,
            Box::new(DrawPolygonBaseState::new(PolygonMode::Rect)),
        );
        states.insert(
            State::DrawPolygon,
            Box::new(DrawPolygonBaseState::new(PolygonMode::Polygon)),
        );
        states.insert(State::DrawCircle, Box::new(DrawCircleState::new()));
        states.insert(
            State::DrawArc,
            Box::new(DrawPolygonBaseState::new(PolygonMode::Arc)),
        );
        states.insert(State::DrawText, Box::new(DrawTextState::new(TextMode::Free)));
        states.insert(State::DrawZone, Box::new(DrawZoneState::new()));
        states.insert(State::AddHoles, Box::new(AddHolesState::new()));
        states.insert(State::Measure, Box::new(MeasureState::new()));
        states.insert(State::ReNumberPads, Box::new(ReNumberPadsState::new()));

        let mut fsm = Self {
            context,
            states,
            current: State::Idle,
            previous: State::Idle,
        };
        fsm.enter_next_state(State::Select);
        fsm
    }

    /// The shared editor context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable access to the shared editor context.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// The currently active state.
    #[must_use]
    pub fn current_state(&self) -> State {
        self.current
    }

    /// The UI actions offered by the active state.
    #[must_use]
    pub fn available_features(&self) -> BTreeSet<Feature> {
        self.states
            .get(&self.current)
            .map(|state| state.available_features(&self.context))
            .unwrap_or_default()
    }

    fn with_current<R>(
        &mut self,
        f: impl FnOnce(&mut dyn EditorState, &mut Context) -> R,
    ) -> Option<R> {
        let state = self.states.get_mut(&self.current)?;
        Some(f(state.as_mut(), &mut self.context))
    }

    fn has_footprint(&self) -> bool {
        self.context.current_footprint.is_some() && self.context.selection.is_some()
    }

    /// Switches to another footprint (or none), restoring the active tool
    /// afterwards when possible.
    pub fn process_change_current_footprint(
        &mut self,
        footprint: Option<Shared<Footprint>>,
        selection: Option<Shared<FootprintSelection>>,
    ) -> bool {
        let same = match (&self.context.current_footprint, &footprint) {
            (None, None) => true,
            (Some(a), Some(b)) => Shared::ptr_eq(a, b),
            _ => false,
        };
        if same {
            return false;
        }
        let previous = self.current;
        if !self.leave_current_state() {
            return false;
        }
        self.context.current_footprint = footprint;
        self.context.selection = selection;
        if self.context.current_footprint.is_some() {
            self.set_next_state(previous)
        } else {
            // Only the selection tool works without a footprint.
            self.set_next_state(State::Select)
        }
    }

    /// Forwards a key press to the active state.
    pub fn process_key_pressed(&mut self, e: &KeyEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_key_pressed(ctx, e))
            .unwrap_or(false)
    }

    /// Forwards a key release to the active state.
    pub fn process_key_released(&mut self, e: &KeyEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_key_released(ctx, e))
            .unwrap_or(false)
    }

    /// Forwards a pointer move to the active state.
    pub fn process_mouse_moved(&mut self, e: &PointerEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_mouse_moved(ctx, e))
            .unwrap_or(false)
    }

    /// Forwards a left press to the active state.
    pub fn process_left_button_pressed(&mut self, e: &PointerEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_left_button_pressed(ctx, e))
            .unwrap_or(false)
    }

    /// Forwards a left release to the active state.
    pub fn process_left_button_released(&mut self, e: &PointerEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_left_button_released(ctx, e))
            .unwrap_or(false)
    }

    /// Forwards a double click to the active state.
    pub fn process_left_button_double_clicked(&mut self, e: &PointerEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_left_button_double_clicked(ctx, e))
            .unwrap_or(false)
    }

    /// Handles a right click: states may consume it; otherwise it aborts
    /// the running command, or switches back to the previous tool when the
    /// selection tool is active.
    pub fn process_right_button_released(&mut self, e: &PointerEvent) -> bool {
        if !self.has_footprint() {
            return false;
        }
        let consumed = self
            .with_current(|state, ctx| state.process_right_button_released(ctx, e))
            .unwrap_or(false);
        if consumed {
            true
        } else if self.current != State::Select {
            self.process_abort_command()
        } else {
            self.switch_to_previous_state()
        }
    }

    /// Select-all, forwarded to the active state.
    pub fn process_select_all(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_select_all(ctx))
            .unwrap_or(false)
    }

    /// Cut, forwarded to the active state.
    pub fn process_cut(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_cut(ctx))
            .unwrap_or(false)
    }

    /// Copy, forwarded to the active state.
    pub fn process_copy(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_copy(ctx))
            .unwrap_or(false)
    }

    /// Paste, forwarded to the active state.
    pub fn process_paste(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_paste(ctx))
            .unwrap_or(false)
    }

    /// Rotate, forwarded to the active state.
    pub fn process_rotate(&mut self, angle: Angle) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_rotate(ctx, angle))
            .unwrap_or(false)
    }

    /// Mirror, forwarded to the active state.
    pub fn process_mirror(&mut self, orientation: Orientation) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_mirror(ctx, orientation))
            .unwrap_or(false)
    }

    /// Flip, forwarded to the active state.
    pub fn process_flip(&mut self, orientation: Orientation) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_flip(ctx, orientation))
            .unwrap_or(false)
    }

    /// Move/align, forwarded to the active state.
    pub fn process_move_align(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_move_align(ctx))
            .unwrap_or(false)
    }

    /// Snap-to-grid, forwarded to the active state.
    pub fn process_snap_to_grid(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_snap_to_grid(ctx))
            .unwrap_or(false)
    }

    /// Remove, forwarded to the active state.
    pub fn process_remove(&mut self) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_remove(ctx))
            .unwrap_or(false)
    }

    /// Edit-properties, forwarded to the active state.
    pub fn process_edit_properties(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_edit_properties(ctx))
            .unwrap_or(false)
    }

    /// Move-by-delta, forwarded to the active state.
    pub fn process_move(&mut self, delta: Point) -> bool {
        if !self.has_footprint() {
            return false;
        }
        self.with_current(|state, ctx| state.process_move(ctx, delta))
            .unwrap_or(false)
    }

    /// Accept-command, forwarded to the active state.
    pub fn process_accept_command(&mut self) -> bool {
        self.with_current(|state, ctx| state.process_accept_command(ctx))
            .unwrap_or(false)
    }

    /// Abort-command: the active state may handle it; otherwise the FSM
    /// falls back to the selection tool.
    pub fn process_abort_command(&mut self) -> bool {
        let handled = self
            .with_current(|state, ctx| state.process_abort_command(ctx))
            .unwrap_or(false);
        if handled {
            true
        } else {
            self.set_next_state(State::Select)
        }
    }

    /// Starts the selection tool.
    pub fn process_start_selecting(&mut self) -> bool {
        self.set_next_state(State::Select)
    }

    /// Starts the THT pad tool.
    pub fn process_start_adding_tht_pads(&mut self) -> bool {
        self.set_next_state(State::AddThtPads)
    }

    /// Starts the SMT pad tool for the given function.
    pub fn process_start_adding_smt_pads(&mut self, function: PadFunction) -> bool {
        self.set_next_state(State::AddSmtPads(function))
    }

    /// Starts the names tool.
    pub fn process_start_adding_names(&mut self) -> bool {
        self.set_next_state(State::AddNames)
    }

    /// Starts the values tool.
    pub fn process_start_adding_values(&mut self) -> bool {
        self.set_next_state(State::AddValues)
    }

    /// Starts the line tool.
    pub fn process_start_drawing_lines(&mut self) -> bool {
        self.set_next_state(State::DrawLine)
    }

    /// Starts the rectangle tool.
    pub fn process_start_drawing_rects(&mut self) -> bool {
        self.set_next_state(State::DrawRect)
    }

    /// Starts the polygon tool.
    pub fn process_start_drawing_polygons(&mut self) -> bool {
        self.set_next_state(State::DrawPolygon)
    }

    /// Starts the circle tool.
    pub fn process_start_drawing_circles(&mut self) -> bool {
        self.set_next_state(State::DrawCircle)
    }

    /// Starts the arc tool.
    pub fn process_start_drawing_arcs(&mut self) -> bool {
        self.set_next_state(State::DrawArc)
    }

    /// Starts the free text tool.
    pub fn process_start_drawing_texts(&mut self) -> bool {
        self.set_next_state(State::DrawText)
    }

    /// Starts the zone tool.
    pub fn process_start_drawing_zones(&mut self) -> bool {
        self.set_next_state(State::DrawZone)
    }

    /// Starts the hole tool.
    pub fn process_start_adding_holes(&mut self) -> bool {
        self.set_next_state(State::AddHoles)
    }

    /// Starts the measure tool.
    pub fn process_start_measure(&mut self) -> bool {
        self.set_next_state(State::Measure)
    }

    /// Starts the pad re-numbering tool.
    pub fn process_start_renumber_pads(&mut self) -> bool {
        self.set_next_state(State::ReNumberPads)
    }

    /// Changes the grid interval used by all tools.
    pub fn process_grid_interval_changed(&mut self, interval: PositiveLength) {
        self.context.grid_interval = interval;
    }

    fn set_next_state(&mut self, state: State) -> bool {
        if state == self.current {
            return true;
        }
        if state != State::Select && !self.has_footprint() {
            // Only the selection tool may run without a footprint.
            return false;
        }
        if !self.leave_current_state() {
            return false;
        }
        self.enter_next_state(state)
    }

    fn leave_current_state(&mut self) -> bool {
        let left = self
            .with_current(|state, ctx| state.exit(ctx))
            .unwrap_or(true);
        if !left {
            return false;
        }
        if self.current != State::Select && self.current != State::Idle {
            // Only tools other than the selection tool are worth
            // remembering.
            self.previous = self.current;
        }
        self.current = State::Idle;
        true
    }

    fn enter_next_state(&mut self, state: State) -> bool {
        debug_assert_eq!(self.current, State::Idle);
        self.current = state;
        let entered = self
            .with_current(|state, ctx| state.entry(ctx))
            .unwrap_or(true);
        if !entered {
            self.current = State::Idle;
            return false;
        }
        debug!(state = ?state, "entered editor state");
        self.context
            .adapter
            .available_features_changed(&self.available_features());
        true
    }

    fn switch_to_previous_state(&mut self) -> bool {
        let next = if self.previous == self.current || self.previous == State::Idle {
            State::Select
        } else {
            self.previous
        };
        self.set_next_state(next)
    }
}
