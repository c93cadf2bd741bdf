//! Two-click measurement tool.

use std::collections::BTreeSet;

use super::state::EditorState;
use crate::editor::{Context, Feature, Key, KeyEvent, PointerEvent};
use crate::types::{Angle, Length, Point};

/// Measures distances between two clicked points. Produces only a ruler
/// overlay and status bar text, never a persistent primitive.
pub struct MeasureState {
    start: Option<Point>,
    cursor: Point,
    snap_disabled: bool,
}

impl MeasureState {
    /// Creates the state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: None,
            cursor: Point::ORIGIN,
            snap_disabled: false,
        }
    }

    fn effective_cursor(&self, ctx: &Context) -> Point {
        if self.snap_disabled {
            self.cursor
        } else {
            ctx.snap(self.cursor)
        }
    }

    fn update_overlay(&self, ctx: &Context) {
        let cursor = self.effective_cursor(ctx);
        match self.start {
            Some(start) => {
                ctx.adapter.set_ruler_positions(Some((start, cursor)));
                ctx.adapter
                    .set_status_bar_message(&format_measurement(ctx, start, cursor));
            }
            None => {
                ctx.adapter.set_ruler_positions(None);
                ctx.adapter
                    .set_status_bar_message("Click to specify the first point");
            }
        }
    }
}

/// Formats Δx/Δy, the distance and the angle of a measurement in the
/// configured display unit.
fn format_measurement(ctx: &Context, start: Point, end: Point) -> String {
    let delta = end - start;
    let unit = ctx.length_unit;
    let decimals = unit.reasonable_number_of_decimals();
    let dx = unit.convert(delta.x);
    let dy = unit.convert(delta.y);
    let length = unit.convert(Length::from(delta.length()));
    let angle = Angle::from_rad((delta.y.to_nm() as f64).atan2(delta.x.to_nm() as f64))
        .unwrap_or(Angle::DEG_0);
    format!(
        "ΔX: {dx:.decimals$} {unit} · ΔY: {dy:.decimals$} {unit} · Δ: {length:.decimals$} {unit} · ∠: {angle:.3}°",
        unit = unit.symbol(),
        angle = angle.to_deg(),
    )
}

impl Default for MeasureState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for MeasureState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        self.start = None;
        self.update_overlay(ctx);
        true
    }

    fn exit(&mut self, ctx: &mut Context) -> bool {
        ctx.adapter.set_ruler_positions(None);
        ctx.adapter.set_status_bar_message("");
        true
    }

    fn available_features(&self, _ctx: &Context) -> BTreeSet<Feature> {
        let mut features = BTreeSet::new();
        if self.start.is_some() {
            features.insert(Feature::Abort);
        }
        features
    }

    fn process_key_pressed(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Shift {
            self.snap_disabled = true;
            self.update_overlay(ctx);
            return true;
        }
        false
    }

    fn process_key_released(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Shift {
            self.snap_disabled = false;
            self.update_overlay(ctx);
            return true;
        }
        false
    }

    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.cursor = e.scene_pos;
        self.snap_disabled = e.modifiers.shift;
        self.update_overlay(ctx);
        true
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.cursor = e.scene_pos;
        let pos = self.effective_cursor(ctx);
        match self.start {
            None => {
                self.start = Some(pos);
            }
            Some(start) => {
                // Freeze the result in the status bar; the next click
                // starts a new measurement.
                ctx.adapter
                    .set_status_bar_message(&format_measurement(ctx, start, pos));
                self.start = None;
                return true;
            }
        }
        self.update_overlay(ctx);
        true
    }

    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        if self.start.is_some() {
            self.start = None;
            self.update_overlay(ctx);
            true
        } else {
            false
        }
    }
}
