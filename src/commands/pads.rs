//! Edit commands for footprint pads and package pads.

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::geometry::MaskConfig;
use crate::library::{ComponentSide, FootprintPad, PackagePad, PadFunction, PadShape};
use crate::list::ObjectList;
use crate::types::{Angle, CircuitIdentifier, Orientation, Path, Point, PositiveLength,
                   UnsignedLength, UnsignedLimitedRatio};
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Reversible edit of a [`FootprintPad`].
pub struct CmdFootprintPadEdit {
    meta: CommandMeta,
    pad: Shared<FootprintPad>,
    old_package_pad: Option<Uuid>,
    new_package_pad: Option<Uuid>,
    old_position: Point,
    new_position: Point,
    old_rotation: Angle,
    new_rotation: Angle,
    old_shape: PadShape,
    new_shape: PadShape,
    old_width: PositiveLength,
    new_width: PositiveLength,
    old_height: PositiveLength,
    new_height: PositiveLength,
    old_radius: UnsignedLimitedRatio,
    new_radius: UnsignedLimitedRatio,
    old_custom_outline: Path,
    new_custom_outline: Path,
    old_drill: Option<PositiveLength>,
    new_drill: Option<PositiveLength>,
    old_component_side: ComponentSide,
    new_component_side: ComponentSide,
    old_function: PadFunction,
    new_function: PadFunction,
    old_copper_clearance: UnsignedLength,
    new_copper_clearance: UnsignedLength,
    old_stop_mask: MaskConfig,
    new_stop_mask: MaskConfig,
    old_solder_paste: MaskConfig,
    new_solder_paste: MaskConfig,
}

impl CmdFootprintPadEdit {
    /// Snapshots `pad` for editing.
    #[must_use]
    pub fn new(pad: Shared<FootprintPad>) -> Self {
        let snapshot = pad.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit pad"),
            old_package_pad: snapshot.package_pad(),
            new_package_pad: snapshot.package_pad(),
            old_position: snapshot.position(),
            new_position: snapshot.position(),
            old_rotation: snapshot.rotation(),
            new_rotation: snapshot.rotation(),
            old_shape: snapshot.shape(),
            new_shape: snapshot.shape(),
            old_width: snapshot.width(),
            new_width: snapshot.width(),
            old_height: snapshot.height(),
            new_height: snapshot.height(),
            old_radius: snapshot.radius(),
            new_radius: snapshot.radius(),
            old_custom_outline: snapshot.custom_outline().clone(),
            new_custom_outline: snapshot.custom_outline().clone(),
            old_drill: snapshot.drill(),
            new_drill: snapshot.drill(),
            old_component_side: snapshot.component_side(),
            new_component_side: snapshot.component_side(),
            old_function: snapshot.function(),
            new_function: snapshot.function(),
            old_copper_clearance: snapshot.copper_clearance(),
            new_copper_clearance: snapshot.copper_clearance(),
            old_stop_mask: snapshot.stop_mask(),
            new_stop_mask: snapshot.stop_mask(),
            old_solder_paste: snapshot.solder_paste(),
            new_solder_paste: snapshot.solder_paste(),
            pad,
        }
    }

    /// Sets the package pad reference.
    pub fn set_package_pad(&mut self, package_pad: Option<Uuid>, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_package_pad = package_pad;
        if immediate {
            self.pad.borrow_mut().set_package_pad(package_pad);
        }
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Point, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_position = position;
        if immediate {
            self.pad.borrow_mut().set_position(position);
        }
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Angle, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rotation = rotation;
        if immediate {
            self.pad.borrow_mut().set_rotation(rotation);
        }
    }

    /// Sets the shape.
    pub fn set_shape(&mut self, shape: PadShape, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_shape = shape;
        if immediate {
            self.pad.borrow_mut().set_shape(shape);
        }
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_width = width;
        if immediate {
            self.pad.borrow_mut().set_width(width);
        }
    }

    /// Sets the height.
    pub fn set_height(&mut self, height: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_height = height;
        if immediate {
            self.pad.borrow_mut().set_height(height);
        }
    }

    /// Sets the corner radius ratio.
    pub fn set_radius(&mut self, radius: UnsignedLimitedRatio, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_radius = radius;
        if immediate {
            self.pad.borrow_mut().set_radius(radius);
        }
    }

    /// Sets the custom outline.
    pub fn set_custom_outline(&mut self, outline: Path, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_custom_outline = outline;
        if immediate {
            self.pad
                .borrow_mut()
                .set_custom_outline(self.new_custom_outline.clone());
        }
    }

    /// Sets the drill diameter (presence makes the pad through-hole).
    pub fn set_drill(&mut self, drill: Option<PositiveLength>, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_drill = drill;
        if immediate {
            self.pad.borrow_mut().set_drill(drill);
        }
    }

    /// Sets the component side.
    pub fn set_component_side(&mut self, side: ComponentSide, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_component_side = side;
        if immediate {
            self.pad.borrow_mut().set_component_side(side);
        }
    }

    /// Sets the function.
    pub fn set_function(&mut self, function: PadFunction, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_function = function;
        if immediate {
            self.pad.borrow_mut().set_function(function);
        }
    }

    /// Sets the copper clearance.
    pub fn set_copper_clearance(&mut self, clearance: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_copper_clearance = clearance;
        if immediate {
            self.pad.borrow_mut().set_copper_clearance(clearance);
        }
    }

    /// Sets the stop mask configuration.
    pub fn set_stop_mask(&mut self, config: MaskConfig, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_stop_mask = config;
        if immediate {
            self.pad.borrow_mut().set_stop_mask(config);
        }
    }

    /// Sets the solder paste configuration.
    pub fn set_solder_paste(&mut self, config: MaskConfig, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_solder_paste = config;
        if immediate {
            self.pad.borrow_mut().set_solder_paste(config);
        }
    }

    /// Moves the pad, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_position(self.new_position + delta, immediate);
    }

    /// Rotates the pad around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_position(self.new_position.rotated(angle, center), immediate);
        self.set_rotation(self.new_rotation + angle, immediate);
    }

    /// Mirrors the pad's geometry across the axis through `center`.
    pub fn mirror_geometry(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_position(self.new_position.mirrored(orientation, center), immediate);
        let rotation = match orientation {
            Orientation::Horizontal => Angle::DEG_180 - self.new_rotation,
            Orientation::Vertical => -self.new_rotation,
        };
        self.set_rotation(rotation, immediate);
        if !self.new_custom_outline.is_empty() {
            self.set_custom_outline(
                self.new_custom_outline.mirrored(orientation, Point::ORIGIN),
                immediate,
            );
        }
    }

    /// Flips the pad to the other board side.
    pub fn mirror_layer(&mut self, immediate: bool) {
        self.set_component_side(self.new_component_side.mirrored(), immediate);
    }

    /// Snaps the position to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_position(self.new_position.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdFootprintPadEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        if self.new_shape == PadShape::Custom && self.new_custom_outline.is_empty() {
            return Err(EditorError::user(
                "A custom pad shape requires a non-empty outline",
            ));
        }
        self.perform_redo()?;
        Ok(self.new_package_pad != self.old_package_pad
            || self.new_position != self.old_position
            || self.new_rotation != self.old_rotation
            || self.new_shape != self.old_shape
            || self.new_width != self.old_width
            || self.new_height != self.old_height
            || self.new_radius != self.old_radius
            || self.new_custom_outline != self.old_custom_outline
            || self.new_drill != self.old_drill
            || self.new_component_side != self.old_component_side
            || self.new_function != self.old_function
            || self.new_copper_clearance != self.old_copper_clearance
            || self.new_stop_mask != self.old_stop_mask
            || self.new_solder_paste != self.old_solder_paste)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut pad = self.pad.borrow_mut();
        pad.set_package_pad(self.old_package_pad);
        pad.set_position(self.old_position);
        pad.set_rotation(self.old_rotation);
        pad.set_shape(self.old_shape);
        pad.set_width(self.old_width);
        pad.set_height(self.old_height);
        pad.set_radius(self.old_radius);
        pad.set_custom_outline(self.old_custom_outline.clone());
        pad.set_drill(self.old_drill);
        pad.set_component_side(self.old_component_side);
        pad.set_function(self.old_function);
        pad.set_copper_clearance(self.old_copper_clearance);
        pad.set_stop_mask(self.old_stop_mask);
        pad.set_solder_paste(self.old_solder_paste);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut pad = self.pad.borrow_mut();
        pad.set_package_pad(self.new_package_pad);
        pad.set_position(self.new_position);
        pad.set_rotation(self.new_rotation);
        pad.set_shape(self.new_shape);
        pad.set_width(self.new_width);
        pad.set_height(self.new_height);
        pad.set_radius(self.new_radius);
        pad.set_custom_outline(self.new_custom_outline.clone());
        pad.set_drill(self.new_drill);
        pad.set_component_side(self.new_component_side);
        pad.set_function(self.new_function);
        pad.set_copper_clearance(self.new_copper_clearance);
        pad.set_stop_mask(self.new_stop_mask);
        pad.set_solder_paste(self.new_solder_paste);
        Ok(())
    }
}

impl Drop for CmdFootprintPadEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible rename of a [`PackagePad`], enforcing name uniqueness within
/// the owning list.
pub struct CmdPackagePadEdit {
    meta: CommandMeta,
    pad: Shared<PackagePad>,
    list: ObjectList<PackagePad>,
    old_name: CircuitIdentifier,
    new_name: CircuitIdentifier,
}

impl CmdPackagePadEdit {
    /// Snapshots `pad` for editing within `list`.
    #[must_use]
    pub fn new(pad: Shared<PackagePad>, list: ObjectList<PackagePad>) -> Self {
        let name = pad.borrow().name().clone();
        Self {
            meta: CommandMeta::new("Edit package pad"),
            old_name: name.clone(),
            new_name: name,
            pad,
            list,
        }
    }

    /// Sets the name.
    pub fn set_name(&mut self, name: CircuitIdentifier, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_name = name;
        if immediate {
            self.pad.borrow_mut().set_name(self.new_name.clone());
        }
    }
}

impl UndoCommand for CmdPackagePadEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        if self.new_name != self.old_name {
            let taken = self
                .list
                .find_by_name(self.new_name.as_str())
                .is_some_and(|other| !Shared::ptr_eq(&other, &self.pad));
            if taken {
                return Err(EditorError::user(format!(
                    "There is already a pad with the name \"{}\"",
                    self.new_name
                )));
            }
        }
        self.perform_redo()?;
        Ok(self.new_name != self.old_name)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        self.pad.borrow_mut().set_name(self.old_name.clone());
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        self.pad.borrow_mut().set_name(self.new_name.clone());
        Ok(())
    }
}

impl Drop for CmdPackagePadEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;

    fn package_pads() -> (ObjectList<PackagePad>, Shared<PackagePad>, Shared<PackagePad>) {
        let list = ObjectList::new();
        let first = shared(PackagePad::new(
            Uuid::new_v4(),
            CircuitIdentifier::new("1").unwrap(),
        ));
        let second = shared(PackagePad::new(
            Uuid::new_v4(),
            CircuitIdentifier::new("2").unwrap(),
        ));
        list.append(Shared::clone(&first));
        list.append(Shared::clone(&second));
        (list, first, second)
    }

    #[test]
    fn duplicate_name_is_a_user_error() {
        let (list, first, _) = package_pads();
        let mut cmd = CmdPackagePadEdit::new(Shared::clone(&first), list);
        cmd.set_name(CircuitIdentifier::new("2").unwrap(), false);
        assert!(matches!(cmd.execute(), Err(EditorError::UserError { .. })));
        assert_eq!(first.borrow().name().as_str(), "1");
    }

    #[test]
    fn rename_to_own_name_is_a_no_op() {
        let (list, first, _) = package_pads();
        let mut cmd = CmdPackagePadEdit::new(Shared::clone(&first), list);
        cmd.set_name(CircuitIdentifier::new("1").unwrap(), false);
        assert!(!cmd.execute().unwrap());
    }

    #[test]
    fn rename_undo_redo() {
        let (list, first, _) = package_pads();
        let mut cmd = CmdPackagePadEdit::new(Shared::clone(&first), list);
        cmd.set_name(CircuitIdentifier::new("A").unwrap(), false);
        assert!(cmd.execute().unwrap());
        assert_eq!(first.borrow().name().as_str(), "A");
        cmd.undo().unwrap();
        assert_eq!(first.borrow().name().as_str(), "1");
        cmd.redo().unwrap();
        cmd.undo().unwrap();
    }

    #[test]
    fn pad_rotate_turns_position_and_rotation() {
        let pad = shared(FootprintPad::new(
            Uuid::new_v4(),
            None,
            Point::from_nm(1_000_000, 0),
            Angle::DEG_0,
            PadShape::RoundedRect,
            PositiveLength::from_nm(1_000_000).unwrap(),
            PositiveLength::from_nm(1_000_000).unwrap(),
            UnsignedLimitedRatio::ZERO,
            Path::default(),
            None,
            ComponentSide::Top,
            PadFunction::StandardPad,
            UnsignedLength::ZERO,
            MaskConfig::Auto,
            MaskConfig::Auto,
        ));
        let mut cmd = CmdFootprintPadEdit::new(Shared::clone(&pad));
        cmd.rotate(Angle::DEG_90, Point::ORIGIN, false);
        cmd.execute().unwrap();
        assert_eq!(pad.borrow().position(), Point::from_nm(0, 1_000_000));
        assert_eq!(pad.borrow().rotation(), Angle::DEG_90);
        cmd.undo().unwrap();
    }

    #[test]
    fn custom_shape_without_outline_is_refused() {
        let pad = shared(FootprintPad::new(
            Uuid::new_v4(),
            None,
            Point::ORIGIN,
            Angle::DEG_0,
            PadShape::RoundedRect,
            PositiveLength::from_nm(1_000_000).unwrap(),
            PositiveLength::from_nm(1_000_000).unwrap(),
            UnsignedLimitedRatio::ZERO,
            Path::default(),
            None,
            ComponentSide::Top,
            PadFunction::StandardPad,
            UnsignedLength::ZERO,
            MaskConfig::Auto,
            MaskConfig::Auto,
        ));
        let mut cmd = CmdFootprintPadEdit::new(Shared::clone(&pad));
        cmd.set_shape(PadShape::Custom, false);
        assert!(matches!(cmd.execute(), Err(EditorError::UserError { .. })));
        assert_eq!(pad.borrow().shape(), PadShape::RoundedRect);
    }
}
