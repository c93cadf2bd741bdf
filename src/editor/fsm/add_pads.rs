//! Tool state for placing THT and SMT pads.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdFootprintPadEdit, CmdFootprintPadInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::MaskConfig;
use crate::library::{ComponentSide, FootprintPad, PadFunction, PadShape};
use crate::list::ListItem;
use crate::types::{Angle, Path, Point, PositiveLength, UnsignedLength, UnsignedLimitedRatio};
use crate::{shared, Shared};

/// Whether the tool places through-hole or surface-mount pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadType {
    /// Through-hole pads (with a drill).
    Tht,
    /// Surface-mount pads.
    Smt,
}

/// Shape choices offered by the pad toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSelector {
    /// Fully rounded (circle/obround).
    Round,
    /// Rounded rectangle with the recommended corner radius.
    RoundedRect,
    /// Sharp rectangle.
    Rect,
    /// Octagon.
    Octagon,
}

struct CurrentPad {
    pad: Shared<FootprintPad>,
    edit: CmdFootprintPadEdit,
}

/// Stamping pad tool: a pad is attached to the cursor on entry; every click
/// fixes it, advances to the next free package pad and attaches the next
/// one.
pub struct AddPadsState {
    pad_type: PadType,
    function: PadFunction,
    shape: PadShape,
    radius: UnsignedLimitedRatio,
    width: PositiveLength,
    height: PositiveLength,
    drill: Option<PositiveLength>,
    component_side: ComponentSide,
    copper_clearance: UnsignedLength,
    rotation: Angle,
    selected_package_pad: Option<Uuid>,
    cursor: Point,
    current: Option<CurrentPad>,
}

impl AddPadsState {
    /// Creates the state for one pad type and function with library
    /// convention defaults.
    #[must_use]
    pub fn new(pad_type: PadType, function: PadFunction) -> Self {
        let (width, height, drill) = match pad_type {
            PadType::Tht => (
                PositiveLength::from_nm(1_600_000),
                PositiveLength::from_nm(1_600_000),
                PositiveLength::from_nm(800_000).ok(),
            ),
            PadType::Smt => (
                PositiveLength::from_nm(1_000_000),
                PositiveLength::from_nm(2_000_000),
                None,
            ),
        };
        let width = width.expect("default width is positive");
        let height = height.expect("default height is positive");
        Self {
            pad_type,
            function,
            shape: PadShape::RoundedRect,
            radius: FootprintPad::recommended_radius(width, height),
            width,
            height,
            drill,
            component_side: ComponentSide::Top,
            copper_clearance: UnsignedLength::ZERO,
            rotation: Angle::DEG_0,
            selected_package_pad: None,
            cursor: Point::ORIGIN,
            current: None,
        }
    }

    /// The pad type this tool places.
    #[must_use]
    pub fn pad_type(&self) -> PadType {
        self.pad_type
    }

    /// The function of pads placed by this tool.
    #[must_use]
    pub fn function(&self) -> PadFunction {
        self.function
    }

    /// The package pad the next placed pad will realise.
    #[must_use]
    pub fn selected_package_pad(&self) -> Option<Uuid> {
        self.selected_package_pad
    }

    /// Selects the package pad the next placed pad will realise. Ignored by
    /// fiducial tools, which never connect pads.
    pub fn select_package_pad(&mut self, pad: Option<Uuid>) {
        if self.function.is_fiducial() {
            return;
        }
        self.selected_package_pad = pad;
        if let Some(current) = &mut self.current {
            current.edit.set_package_pad(pad, true);
        }
    }

    /// Applies a toolbar shape choice.
    ///
    /// Round and Rect map to a rounded rectangle with full/zero radius;
    /// the rounded rectangle choice applies the recommended radius for the
    /// current size.
    pub fn select_shape(&mut self, selector: ShapeSelector) {
        let (shape, radius) = match selector {
            ShapeSelector::Round => (PadShape::RoundedRect, UnsignedLimitedRatio::FULL),
            ShapeSelector::RoundedRect => (
                PadShape::RoundedRect,
                FootprintPad::recommended_radius(self.width, self.height),
            ),
            ShapeSelector::Rect => (PadShape::RoundedRect, UnsignedLimitedRatio::ZERO),
            ShapeSelector::Octagon => (PadShape::RoundedOctagon, UnsignedLimitedRatio::ZERO),
        };
        self.shape = shape;
        self.radius = radius;
        if let Some(current) = &mut self.current {
            current.edit.set_shape(shape, true);
            current.edit.set_radius(radius, true);
        }
    }

    /// Sets the corner radius ratio.
    pub fn set_radius(&mut self, radius: UnsignedLimitedRatio) {
        self.radius = radius;
        if let Some(current) = &mut self.current {
            current.edit.set_radius(radius, true);
        }
    }

    /// Sets the pad width.
    pub fn set_width(&mut self, width: PositiveLength) {
        self.width = width;
        if let Some(current) = &mut self.current {
            current.edit.set_width(width, true);
        }
    }

    /// Sets the pad height.
    pub fn set_height(&mut self, height: PositiveLength) {
        self.height = height;
        if let Some(current) = &mut self.current {
            current.edit.set_height(height, true);
        }
    }

    /// Sets the drill diameter of THT pads.
    pub fn set_drill(&mut self, drill: PositiveLength) {
        if self.pad_type != PadType::Tht {
            return;
        }
        self.drill = Some(drill);
        if let Some(current) = &mut self.current {
            current.edit.set_drill(Some(drill), true);
        }
    }

    /// Sets the component side of SMT pads.
    pub fn set_component_side(&mut self, side: ComponentSide) {
        self.component_side = side;
        if let Some(current) = &mut self.current {
            current.edit.set_component_side(side, true);
        }
    }

    /// Sets the copper clearance (used by fiducials).
    pub fn set_copper_clearance(&mut self, clearance: UnsignedLength) {
        self.copper_clearance = clearance;
        if let Some(current) = &mut self.current {
            current.edit.set_copper_clearance(clearance, true);
        }
    }

    /// The package pads not yet realised by any footprint pad, in insertion
    /// order.
    fn free_package_pads(ctx: &Context) -> Vec<Uuid> {
        let Some(footprint) = &ctx.current_footprint else {
            return Vec::new();
        };
        let used: BTreeSet<Uuid> = footprint
            .borrow()
            .pads()
            .elements()
            .iter()
            .filter_map(|pad| pad.borrow().package_pad())
            .collect();
        ctx.package
            .borrow()
            .pads()
            .uuids()
            .into_iter()
            .filter(|uuid| !used.contains(uuid))
            .collect()
    }

    fn select_next_free_pad(&mut self, ctx: &Context) {
        if self.function.is_fiducial() {
            self.selected_package_pad = None;
            return;
        }
        self.selected_package_pad = Self::free_package_pads(ctx).first().copied();
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
            .begin_cmd_group("Add footprint pad")?;
        let solder_paste = if self.pad_type == PadType::Tht {
            MaskConfig::Off
        } else {
            MaskConfig::Auto
        };
        let pad = shared(FootprintPad::new(
            Uuid::new_v4(),
            self.selected_package_pad,
            pos,
            self.rotation,
            self.shape,
            self.width,
            self.height,
            self.radius,
            Path::default(),
            self.drill,
            self.component_side,
            self.function,
            self.copper_clearance,
            MaskConfig::Auto,
            solder_paste,
        ));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdFootprintPadInsert::new(
                footprint.borrow().pads().clone(),
                Shared::clone(&pad),
                None,
            )))?;
        let edit = CmdFootprintPadEdit::new(Shared::clone(&pad));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Pad, pad.borrow().uuid()));
        }
        self.current = Some(CurrentPad { pad, edit });
        ctx.adapter.set_status_bar_message("Click to place the pad");
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
            Ok(()) => {
                // The placed pad occupies its package pad; advance to the
                // next free one.
                if self.selected_package_pad.is_some() {
                    self.select_next_free_pad(ctx);
                }
                self.start(ctx, pos)
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

impl EditorState for AddPadsState {
    fn entry(&mut self, ctx: &mut Context) -> bool {
        self.select_next_free_pad(ctx);
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
            features.insert(Feature::Rotate);
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

    fn process_right_button_released(&mut self, ctx: &mut Context, _e: &PointerEvent) -> bool {
        // Rotate the floating pad instead of aborting.
        self.process_rotate(ctx, Angle::DEG_90)
    }

    fn process_rotate(&mut self, _ctx: &mut Context, angle: Angle) -> bool {
        if let Some(current) = &mut self.current {
            self.rotation += angle;
            current.edit.set_rotation(self.rotation, true);
            true
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ratio;

    #[test]
    fn shape_selector_semantics() {
        let mut state = AddPadsState::new(PadType::Smt, PadFunction::StandardPad);
        state.select_shape(ShapeSelector::Round);
        assert_eq!(state.shape, PadShape::RoundedRect);
        assert_eq!(state.radius, UnsignedLimitedRatio::FULL);
        state.select_shape(ShapeSelector::Rect);
        assert_eq!(state.shape, PadShape::RoundedRect);
        assert_eq!(state.radius, UnsignedLimitedRatio::ZERO);
        state.select_shape(ShapeSelector::Octagon);
        assert_eq!(state.shape, PadShape::RoundedOctagon);
        state.select_shape(ShapeSelector::RoundedRect);
        assert_eq!(
            state.radius.get(),
            Ratio::from_percent(25) // 0.25 mm on a 1 mm wide pad
        );
    }

    #[test]
    fn fiducials_never_take_a_package_pad() {
        let mut state = AddPadsState::new(PadType::Smt, PadFunction::LocalFiducial);
        state.select_package_pad(Some(Uuid::new_v4()));
        assert_eq!(state.selected_package_pad(), None);
    }

    #[test]
    fn tht_defaults_have_a_drill() {
        let state = AddPadsState::new(PadType::Tht, PadFunction::StandardPad);
        assert!(state.drill.is_some());
        let smt = AddPadsState::new(PadType::Smt, PadFunction::StandardPad);
        assert!(smt.drill.is_none());
    }
}
