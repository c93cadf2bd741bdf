//! Edit commands for the geometric primitives.
//!
//! Every command snapshots the fields it may modify at construction time.
//! Setters and transform helpers only touch the "new" snapshot; with
//! `immediate` they additionally push the value into the live primitive for
//! instant feedback. A command dropped without ever being executed restores
//! the old snapshot, so immediate feedback is always reversible.

use crate::error::EditorResult;
use crate::geometry::{Circle, Hole, MaskConfig, NetLabel, NetLine, NetLineAnchor, Polygon,
                      StrokeText, StrokeTextSpacing, Trace, TraceAnchor, Zone, ZoneLayers,
                      ZoneRules};
use crate::types::{Alignment, Angle, GraphicsLayerName, Orientation, Path, Point, PositiveLength,
                   UnsignedLength};
use crate::undo::{CommandMeta, UndoCommand};
use crate::Shared;

/// Mirrors a rotation across the given axis.
fn mirrored_rotation(rotation: Angle, orientation: Orientation) -> Angle {
    match orientation {
        Orientation::Horizontal => Angle::DEG_180 - rotation,
        Orientation::Vertical => -rotation,
    }
}

/// Reversible edit of a [`Circle`].
pub struct CmdCircleEdit {
    meta: CommandMeta,
    circle: Shared<Circle>,
    old_layer: GraphicsLayerName,
    new_layer: GraphicsLayerName,
    old_line_width: UnsignedLength,
    new_line_width: UnsignedLength,
    old_filled: bool,
    new_filled: bool,
    old_grab_area: bool,
    new_grab_area: bool,
    old_center: Point,
    new_center: Point,
    old_diameter: PositiveLength,
    new_diameter: PositiveLength,
}

impl CmdCircleEdit {
    /// Snapshots `circle` for editing.
    #[must_use]
    pub fn new(circle: Shared<Circle>) -> Self {
        let snapshot = circle.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit circle"),
            old_layer: snapshot.layer().clone(),
            new_layer: snapshot.layer().clone(),
            old_line_width: snapshot.line_width(),
            new_line_width: snapshot.line_width(),
            old_filled: snapshot.is_filled(),
            new_filled: snapshot.is_filled(),
            old_grab_area: snapshot.is_grab_area(),
            new_grab_area: snapshot.is_grab_area(),
            old_center: snapshot.center(),
            new_center: snapshot.center(),
            old_diameter: snapshot.diameter(),
            new_diameter: snapshot.diameter(),
            circle,
        }
    }

    /// Sets the layer.
    pub fn set_layer(&mut self, layer: GraphicsLayerName, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_layer = layer;
        if immediate {
            self.circle.borrow_mut().set_layer(self.new_layer.clone());
        }
    }

    /// Sets the line width.
    pub fn set_line_width(&mut self, width: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_line_width = width;
        if immediate {
            self.circle.borrow_mut().set_line_width(width);
        }
    }

    /// Sets the fill flag.
    pub fn set_filled(&mut self, filled: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_filled = filled;
        if immediate {
            self.circle.borrow_mut().set_filled(filled);
        }
    }

    /// Sets the grab-area flag.
    pub fn set_grab_area(&mut self, grab_area: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_grab_area = grab_area;
        if immediate {
            self.circle.borrow_mut().set_grab_area(grab_area);
        }
    }

    /// Sets the center.
    pub fn set_center(&mut self, center: Point, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_center = center;
        if immediate {
            self.circle.borrow_mut().set_center(center);
        }
    }

    /// Sets the diameter.
    pub fn set_diameter(&mut self, diameter: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_diameter = diameter;
        if immediate {
            self.circle.borrow_mut().set_diameter(diameter);
        }
    }

    /// Moves the circle, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_center(self.new_center + delta, immediate);
    }

    /// Rotates the circle around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_center(self.new_center.rotated(angle, center), immediate);
    }

    /// Mirrors the circle's geometry across the axis through `center`.
    pub fn mirror_geometry(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_center(self.new_center.mirrored(orientation, center), immediate);
    }

    /// Moves the circle to the mirrored layer.
    pub fn mirror_layer(&mut self, immediate: bool) {
        self.set_layer(self.new_layer.mirrored(), immediate);
    }

    /// Snaps the center to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_center(self.new_center.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdCircleEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_layer != self.old_layer
            || self.new_line_width != self.old_line_width
            || self.new_filled != self.old_filled
            || self.new_grab_area != self.old_grab_area
            || self.new_center != self.old_center
            || self.new_diameter != self.old_diameter)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut circle = self.circle.borrow_mut();
        circle.set_layer(self.old_layer.clone());
        circle.set_line_width(self.old_line_width);
        circle.set_filled(self.old_filled);
        circle.set_grab_area(self.old_grab_area);
        circle.set_center(self.old_center);
        circle.set_diameter(self.old_diameter);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut circle = self.circle.borrow_mut();
        circle.set_layer(self.new_layer.clone());
        circle.set_line_width(self.new_line_width);
        circle.set_filled(self.new_filled);
        circle.set_grab_area(self.new_grab_area);
        circle.set_center(self.new_center);
        circle.set_diameter(self.new_diameter);
        Ok(())
    }
}

impl Drop for CmdCircleEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            // Discard immediate changes of a command that never made it
            // into the undo stack.
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`Polygon`].
pub struct CmdPolygonEdit {
    meta: CommandMeta,
    polygon: Shared<Polygon>,
    old_layer: GraphicsLayerName,
    new_layer: GraphicsLayerName,
    old_line_width: UnsignedLength,
    new_line_width: UnsignedLength,
    old_filled: bool,
    new_filled: bool,
    old_grab_area: bool,
    new_grab_area: bool,
    old_path: Path,
    new_path: Path,
}

impl CmdPolygonEdit {
    /// Snapshots `polygon` for editing.
    #[must_use]
    pub fn new(polygon: Shared<Polygon>) -> Self {
        let snapshot = polygon.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit polygon"),
            old_layer: snapshot.layer().clone(),
            new_layer: snapshot.layer().clone(),
            old_line_width: snapshot.line_width(),
            new_line_width: snapshot.line_width(),
            old_filled: snapshot.is_filled(),
            new_filled: snapshot.is_filled(),
            old_grab_area: snapshot.is_grab_area(),
            new_grab_area: snapshot.is_grab_area(),
            old_path: snapshot.path().clone(),
            new_path: snapshot.path().clone(),
            polygon,
        }
    }

    /// Sets the layer.
    pub fn set_layer(&mut self, layer: GraphicsLayerName, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_layer = layer;
        if immediate {
            self.polygon.borrow_mut().set_layer(self.new_layer.clone());
        }
    }

    /// Sets the line width.
    pub fn set_line_width(&mut self, width: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_line_width = width;
        if immediate {
            self.polygon.borrow_mut().set_line_width(width);
        }
    }

    /// Sets the fill flag.
    pub fn set_filled(&mut self, filled: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_filled = filled;
        if immediate {
            self.polygon.borrow_mut().set_filled(filled);
        }
    }

    /// Sets the grab-area flag.
    pub fn set_grab_area(&mut self, grab_area: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_grab_area = grab_area;
        if immediate {
            self.polygon.borrow_mut().set_grab_area(grab_area);
        }
    }

    /// Sets the vertex path.
    pub fn set_path(&mut self, path: Path, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_path = path;
        if immediate {
            self.polygon.borrow_mut().set_path(self.new_path.clone());
        }
    }

    /// Moves the polygon, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_path(self.new_path.translated(delta), immediate);
    }

    /// Rotates the polygon around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_path(self.new_path.rotated(angle, center), immediate);
    }

    /// Mirrors the polygon's geometry across the axis through `center`.
    pub fn mirror_geometry(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_path(self.new_path.mirrored(orientation, center), immediate);
    }

    /// Moves the polygon to the mirrored layer.
    pub fn mirror_layer(&mut self, immediate: bool) {
        self.set_layer(self.new_layer.mirrored(), immediate);
    }

    /// Snaps all vertices to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_path(self.new_path.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdPolygonEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_layer != self.old_layer
            || self.new_line_width != self.old_line_width
            || self.new_filled != self.old_filled
            || self.new_grab_area != self.old_grab_area
            || self.new_path != self.old_path)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut polygon = self.polygon.borrow_mut();
        polygon.set_layer(self.old_layer.clone());
        polygon.set_line_width(self.old_line_width);
        polygon.set_filled(self.old_filled);
        polygon.set_grab_area(self.old_grab_area);
        polygon.set_path(self.old_path.clone());
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut polygon = self.polygon.borrow_mut();
        polygon.set_layer(self.new_layer.clone());
        polygon.set_line_width(self.new_line_width);
        polygon.set_filled(self.new_filled);
        polygon.set_grab_area(self.new_grab_area);
        polygon.set_path(self.new_path.clone());
        Ok(())
    }
}

impl Drop for CmdPolygonEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`Hole`].
pub struct CmdHoleEdit {
    meta: CommandMeta,
    hole: Shared<Hole>,
    old_position: Point,
    new_position: Point,
    old_diameter: PositiveLength,
    new_diameter: PositiveLength,
    old_slot_length: UnsignedLength,
    new_slot_length: UnsignedLength,
    old_rotation: Angle,
    new_rotation: Angle,
    old_stop_mask: MaskConfig,
    new_stop_mask: MaskConfig,
}

impl CmdHoleEdit {
    /// Snapshots `hole` for editing.
    #[must_use]
    pub fn new(hole: Shared<Hole>) -> Self {
        let snapshot = hole.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit hole"),
            old_position: snapshot.position(),
            new_position: snapshot.position(),
            old_diameter: snapshot.diameter(),
            new_diameter: snapshot.diameter(),
            old_slot_length: snapshot.slot_length(),
            new_slot_length: snapshot.slot_length(),
            old_rotation: snapshot.rotation(),
            new_rotation: snapshot.rotation(),
            old_stop_mask: snapshot.stop_mask(),
            new_stop_mask: snapshot.stop_mask(),
            hole,
        }
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Point, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_position = position;
        if immediate {
            self.hole.borrow_mut().set_position(position);
        }
    }

    /// Sets the diameter.
    pub fn set_diameter(&mut self, diameter: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_diameter = diameter;
        if immediate {
            self.hole.borrow_mut().set_diameter(diameter);
        }
    }

    /// Sets the slot length.
    pub fn set_slot_length(&mut self, slot_length: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_slot_length = slot_length;
        if immediate {
            self.hole.borrow_mut().set_slot_length(slot_length);
        }
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Angle, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rotation = rotation;
        if immediate {
            self.hole.borrow_mut().set_rotation(rotation);
        }
    }

    /// Sets the stop mask configuration.
    pub fn set_stop_mask(&mut self, config: MaskConfig, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_stop_mask = config;
        if immediate {
            self.hole.borrow_mut().set_stop_mask(config);
        }
    }

    /// Moves the hole, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_position(self.new_position + delta, immediate);
    }

    /// Rotates the hole around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_position(self.new_position.rotated(angle, center), immediate);
        self.set_rotation(self.new_rotation + angle, immediate);
    }

    /// Mirrors the hole across the axis through `center`.
    pub fn mirror(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_position(self.new_position.mirrored(orientation, center), immediate);
        self.set_rotation(mirrored_rotation(self.new_rotation, orientation), immediate);
    }

    /// Snaps the position to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_position(self.new_position.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdHoleEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_position != self.old_position
            || self.new_diameter != self.old_diameter
            || self.new_slot_length != self.old_slot_length
            || self.new_rotation != self.old_rotation
            || self.new_stop_mask != self.old_stop_mask)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut hole = self.hole.borrow_mut();
        hole.set_position(self.old_position);
        hole.set_diameter(self.old_diameter);
        hole.set_slot_length(self.old_slot_length);
        hole.set_rotation(self.old_rotation);
        hole.set_stop_mask(self.old_stop_mask);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut hole = self.hole.borrow_mut();
        hole.set_position(self.new_position);
        hole.set_diameter(self.new_diameter);
        hole.set_slot_length(self.new_slot_length);
        hole.set_rotation(self.new_rotation);
        hole.set_stop_mask(self.new_stop_mask);
        Ok(())
    }
}

impl Drop for CmdHoleEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`StrokeText`].
pub struct CmdStrokeTextEdit {
    meta: CommandMeta,
    text: Shared<StrokeText>,
    old_layer: GraphicsLayerName,
    new_layer: GraphicsLayerName,
    old_text: String,
    new_text: String,
    old_position: Point,
    new_position: Point,
    old_rotation: Angle,
    new_rotation: Angle,
    old_height: PositiveLength,
    new_height: PositiveLength,
    old_stroke_width: UnsignedLength,
    new_stroke_width: UnsignedLength,
    old_letter_spacing: StrokeTextSpacing,
    new_letter_spacing: StrokeTextSpacing,
    old_line_spacing: StrokeTextSpacing,
    new_line_spacing: StrokeTextSpacing,
    old_align: Alignment,
    new_align: Alignment,
    old_mirrored: bool,
    new_mirrored: bool,
    old_auto_rotate: bool,
    new_auto_rotate: bool,
}

impl CmdStrokeTextEdit {
    /// Snapshots `text` for editing.
    #[must_use]
    pub fn new(text: Shared<StrokeText>) -> Self {
        let snapshot = text.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit text"),
            old_layer: snapshot.layer().clone(),
            new_layer: snapshot.layer().clone(),
            old_text: snapshot.text().to_string(),
            new_text: snapshot.text().to_string(),
            old_position: snapshot.position(),
            new_position: snapshot.position(),
            old_rotation: snapshot.rotation(),
            new_rotation: snapshot.rotation(),
            old_height: snapshot.height(),
            new_height: snapshot.height(),
            old_stroke_width: snapshot.stroke_width(),
            new_stroke_width: snapshot.stroke_width(),
            old_letter_spacing: snapshot.letter_spacing(),
            new_letter_spacing: snapshot.letter_spacing(),
            old_line_spacing: snapshot.line_spacing(),
            new_line_spacing: snapshot.line_spacing(),
            old_align: snapshot.align(),
            new_align: snapshot.align(),
            old_mirrored: snapshot.is_mirrored(),
            new_mirrored: snapshot.is_mirrored(),
            old_auto_rotate: snapshot.auto_rotate(),
            new_auto_rotate: snapshot.auto_rotate(),
            text,
        }
    }

    /// Sets the layer.
    pub fn set_layer(&mut self, layer: GraphicsLayerName, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_layer = layer;
        if immediate {
            self.text.borrow_mut().set_layer(self.new_layer.clone());
        }
    }

    /// Sets the text.
    pub fn set_text(&mut self, text: String, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_text = text;
        if immediate {
            self.text.borrow_mut().set_text(self.new_text.clone());
        }
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Point, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_position = position;
        if immediate {
            self.text.borrow_mut().set_position(position);
        }
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Angle, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rotation = rotation;
        if immediate {
            self.text.borrow_mut().set_rotation(rotation);
        }
    }

    /// Sets the glyph height.
    pub fn set_height(&mut self, height: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_height = height;
        if immediate {
            self.text.borrow_mut().set_height(height);
        }
    }

    /// Sets the stroke width.
    pub fn set_stroke_width(&mut self, width: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_stroke_width = width;
        if immediate {
            self.text.borrow_mut().set_stroke_width(width);
        }
    }

    /// Sets the letter spacing.
    pub fn set_letter_spacing(&mut self, spacing: StrokeTextSpacing, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_letter_spacing = spacing;
        if immediate {
            self.text.borrow_mut().set_letter_spacing(spacing);
        }
    }

    /// Sets the line spacing.
    pub fn set_line_spacing(&mut self, spacing: StrokeTextSpacing, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_line_spacing = spacing;
        if immediate {
            self.text.borrow_mut().set_line_spacing(spacing);
        }
    }

    /// Sets the alignment.
    pub fn set_align(&mut self, align: Alignment, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_align = align;
        if immediate {
            self.text.borrow_mut().set_align(align);
        }
    }

    /// Sets the mirror flag.
    pub fn set_mirrored(&mut self, mirrored: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_mirrored = mirrored;
        if immediate {
            self.text.borrow_mut().set_mirrored(mirrored);
        }
    }

    /// Sets the auto-rotate flag.
    pub fn set_auto_rotate(&mut self, auto_rotate: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_auto_rotate = auto_rotate;
        if immediate {
            self.text.borrow_mut().set_auto_rotate(auto_rotate);
        }
    }

    /// Moves the text, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_position(self.new_position + delta, immediate);
    }

    /// Rotates the text around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_position(self.new_position.rotated(angle, center), immediate);
        self.set_rotation(self.new_rotation + angle, immediate);
    }

    /// Mirrors the text's geometry across the axis through `center`.
    pub fn mirror_geometry(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_position(self.new_position.mirrored(orientation, center), immediate);
        self.set_rotation(mirrored_rotation(self.new_rotation, orientation), immediate);
        self.set_mirrored(!self.new_mirrored, immediate);
        self.set_align(self.new_align.mirrored(orientation), immediate);
    }

    /// Moves the text to the mirrored layer, flipping its render side.
    pub fn mirror_layer(&mut self, immediate: bool) {
        self.set_layer(self.new_layer.mirrored(), immediate);
        self.set_mirrored(!self.new_mirrored, immediate);
    }

    /// Snaps the position to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_position(self.new_position.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdStrokeTextEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_layer != self.old_layer
            || self.new_text != self.old_text
            || self.new_position != self.old_position
            || self.new_rotation != self.old_rotation
            || self.new_height != self.old_height
            || self.new_stroke_width != self.old_stroke_width
            || self.new_letter_spacing != self.old_letter_spacing
            || self.new_line_spacing != self.old_line_spacing
            || self.new_align != self.old_align
            || self.new_mirrored != self.old_mirrored
            || self.new_auto_rotate != self.old_auto_rotate)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut text = self.text.borrow_mut();
        text.set_layer(self.old_layer.clone());
        text.set_text(self.old_text.clone());
        text.set_position(self.old_position);
        text.set_rotation(self.old_rotation);
        text.set_height(self.old_height);
        text.set_stroke_width(self.old_stroke_width);
        text.set_letter_spacing(self.old_letter_spacing);
        text.set_line_spacing(self.old_line_spacing);
        text.set_align(self.old_align);
        text.set_mirrored(self.old_mirrored);
        text.set_auto_rotate(self.old_auto_rotate);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut text = self.text.borrow_mut();
        text.set_layer(self.new_layer.clone());
        text.set_text(self.new_text.clone());
        text.set_position(self.new_position);
        text.set_rotation(self.new_rotation);
        text.set_height(self.new_height);
        text.set_stroke_width(self.new_stroke_width);
        text.set_letter_spacing(self.new_letter_spacing);
        text.set_line_spacing(self.new_line_spacing);
        text.set_align(self.new_align);
        text.set_mirrored(self.new_mirrored);
        text.set_auto_rotate(self.new_auto_rotate);
        Ok(())
    }
}

impl Drop for CmdStrokeTextEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`Zone`].
pub struct CmdZoneEdit {
    meta: CommandMeta,
    zone: Shared<Zone>,
    old_layers: ZoneLayers,
    new_layers: ZoneLayers,
    old_rules: ZoneRules,
    new_rules: ZoneRules,
    old_outline: Path,
    new_outline: Path,
}

impl CmdZoneEdit {
    /// Snapshots `zone` for editing.
    #[must_use]
    pub fn new(zone: Shared<Zone>) -> Self {
        let snapshot = zone.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit zone"),
            old_layers: snapshot.layers(),
            new_layers: snapshot.layers(),
            old_rules: snapshot.rules(),
            new_rules: snapshot.rules(),
            old_outline: snapshot.outline().clone(),
            new_outline: snapshot.outline().clone(),
            zone,
        }
    }

    /// Sets the layer set.
    pub fn set_layers(&mut self, layers: ZoneLayers, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_layers = layers;
        if immediate {
            self.zone.borrow_mut().set_layers(layers);
        }
    }

    /// Sets the rule set.
    pub fn set_rules(&mut self, rules: ZoneRules, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rules = rules;
        if immediate {
            self.zone.borrow_mut().set_rules(rules);
        }
    }

    /// Sets the outline.
    pub fn set_outline(&mut self, outline: Path, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_outline = outline;
        if immediate {
            self.zone.borrow_mut().set_outline(self.new_outline.clone());
        }
    }

    /// Moves the zone, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_outline(self.new_outline.translated(delta), immediate);
    }

    /// Rotates the zone around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_outline(self.new_outline.rotated(angle, center), immediate);
    }

    /// Mirrors the zone's outline across the axis through `center`.
    pub fn mirror_geometry(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_outline(self.new_outline.mirrored(orientation, center), immediate);
    }

    /// Swaps the top and bottom layer flags.
    pub fn mirror_layer(&mut self, immediate: bool) {
        let mut layers = self.new_layers & ZoneLayers::INNER;
        if self.new_layers.contains(ZoneLayers::TOP) {
            layers |= ZoneLayers::BOTTOM;
        }
        if self.new_layers.contains(ZoneLayers::BOTTOM) {
            layers |= ZoneLayers::TOP;
        }
        self.set_layers(layers, immediate);
    }

    /// Snaps all outline vertices to the grid.
    pub fn snap_to_grid(&mut self, interval: PositiveLength, immediate: bool) {
        self.set_outline(self.new_outline.mapped_to_grid(interval), immediate);
    }
}

impl UndoCommand for CmdZoneEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_layers != self.old_layers
            || self.new_rules != self.old_rules
            || self.new_outline != self.old_outline)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut zone = self.zone.borrow_mut();
        zone.set_layers(self.old_layers);
        zone.set_rules(self.old_rules);
        zone.set_outline(self.old_outline.clone());
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut zone = self.zone.borrow_mut();
        zone.set_layers(self.new_layers);
        zone.set_rules(self.new_rules);
        zone.set_outline(self.new_outline.clone());
        Ok(())
    }
}

impl Drop for CmdZoneEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`NetLabel`].
pub struct CmdNetLabelEdit {
    meta: CommandMeta,
    label: Shared<NetLabel>,
    old_position: Point,
    new_position: Point,
    old_rotation: Angle,
    new_rotation: Angle,
    old_mirrored: bool,
    new_mirrored: bool,
}

impl CmdNetLabelEdit {
    /// Snapshots `label` for editing.
    #[must_use]
    pub fn new(label: Shared<NetLabel>) -> Self {
        let snapshot = label.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit net label"),
            old_position: snapshot.position(),
            new_position: snapshot.position(),
            old_rotation: snapshot.rotation(),
            new_rotation: snapshot.rotation(),
            old_mirrored: snapshot.is_mirrored(),
            new_mirrored: snapshot.is_mirrored(),
            label,
        }
    }

    /// Sets the position.
    pub fn set_position(&mut self, position: Point, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_position = position;
        if immediate {
            self.label.borrow_mut().set_position(position);
        }
    }

    /// Sets the rotation.
    pub fn set_rotation(&mut self, rotation: Angle, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_rotation = rotation;
        if immediate {
            self.label.borrow_mut().set_rotation(rotation);
        }
    }

    /// Sets the mirror flag.
    pub fn set_mirrored(&mut self, mirrored: bool, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_mirrored = mirrored;
        if immediate {
            self.label.borrow_mut().set_mirrored(mirrored);
        }
    }

    /// Moves the label, composing with pending transforms.
    pub fn translate(&mut self, delta: Point, immediate: bool) {
        self.set_position(self.new_position + delta, immediate);
    }

    /// Rotates the label around `center`.
    pub fn rotate(&mut self, angle: Angle, center: Point, immediate: bool) {
        self.set_position(self.new_position.rotated(angle, center), immediate);
        self.set_rotation(self.new_rotation + angle, immediate);
    }

    /// Mirrors the label across the axis through `center`.
    pub fn mirror(&mut self, orientation: Orientation, center: Point, immediate: bool) {
        self.set_position(self.new_position.mirrored(orientation, center), immediate);
        self.set_rotation(mirrored_rotation(self.new_rotation, orientation), immediate);
        self.set_mirrored(!self.new_mirrored, immediate);
    }
}

impl UndoCommand for CmdNetLabelEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_position != self.old_position
            || self.new_rotation != self.old_rotation
            || self.new_mirrored != self.old_mirrored)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut label = self.label.borrow_mut();
        label.set_position(self.old_position);
        label.set_rotation(self.old_rotation);
        label.set_mirrored(self.old_mirrored);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut label = self.label.borrow_mut();
        label.set_position(self.new_position);
        label.set_rotation(self.new_rotation);
        label.set_mirrored(self.new_mirrored);
        Ok(())
    }
}

impl Drop for CmdNetLabelEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`NetLine`].
pub struct CmdNetLineEdit {
    meta: CommandMeta,
    line: Shared<NetLine>,
    old_width: UnsignedLength,
    new_width: UnsignedLength,
    old_start: NetLineAnchor,
    new_start: NetLineAnchor,
    old_end: NetLineAnchor,
    new_end: NetLineAnchor,
}

impl CmdNetLineEdit {
    /// Snapshots `line` for editing.
    #[must_use]
    pub fn new(line: Shared<NetLine>) -> Self {
        let snapshot = line.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit net line"),
            old_width: snapshot.width(),
            new_width: snapshot.width(),
            old_start: snapshot.start(),
            new_start: snapshot.start(),
            old_end: snapshot.end(),
            new_end: snapshot.end(),
            line,
        }
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: UnsignedLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_width = width;
        if immediate {
            self.line.borrow_mut().set_width(width);
        }
    }

    /// Sets the start anchor.
    pub fn set_start(&mut self, start: NetLineAnchor, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_start = start;
        if immediate {
            self.line.borrow_mut().set_start(start);
        }
    }

    /// Sets the end anchor.
    pub fn set_end(&mut self, end: NetLineAnchor, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_end = end;
        if immediate {
            self.line.borrow_mut().set_end(end);
        }
    }
}

impl UndoCommand for CmdNetLineEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_width != self.old_width
            || self.new_start != self.old_start
            || self.new_end != self.old_end)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut line = self.line.borrow_mut();
        line.set_width(self.old_width);
        line.set_start(self.old_start);
        line.set_end(self.old_end);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut line = self.line.borrow_mut();
        line.set_width(self.new_width);
        line.set_start(self.new_start);
        line.set_end(self.new_end);
        Ok(())
    }
}

impl Drop for CmdNetLineEdit {
    fn drop(&mut self) {
        if !self.meta.was_ever_executed() {
            let _ = self.perform_undo();
        }
    }
}

/// Reversible edit of a [`Trace`].
pub struct CmdTraceEdit {
    meta: CommandMeta,
    trace: Shared<Trace>,
    old_layer: GraphicsLayerName,
    new_layer: GraphicsLayerName,
    old_width: PositiveLength,
    new_width: PositiveLength,
    old_start: TraceAnchor,
    new_start: TraceAnchor,
    old_end: TraceAnchor,
    new_end: TraceAnchor,
}

impl CmdTraceEdit {
    /// Snapshots `trace` for editing.
    #[must_use]
    pub fn new(trace: Shared<Trace>) -> Self {
        let snapshot = trace.borrow().clone();
        Self {
            meta: CommandMeta::new("Edit trace"),
            old_layer: snapshot.layer().clone(),
            new_layer: snapshot.layer().clone(),
            old_width: snapshot.width(),
            new_width: snapshot.width(),
            old_start: snapshot.start(),
            new_start: snapshot.start(),
            old_end: snapshot.end(),
            new_end: snapshot.end(),
            trace,
        }
    }

    /// Sets the layer.
    pub fn set_layer(&mut self, layer: GraphicsLayerName, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_layer = layer;
        if immediate {
            self.trace.borrow_mut().set_layer(self.new_layer.clone());
        }
    }

    /// Sets the width.
    pub fn set_width(&mut self, width: PositiveLength, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_width = width;
        if immediate {
            self.trace.borrow_mut().set_width(width);
        }
    }

    /// Sets the start anchor.
    pub fn set_start(&mut self, start: TraceAnchor, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_start = start;
        if immediate {
            self.trace.borrow_mut().set_start(start);
        }
    }

    /// Sets the end anchor.
    pub fn set_end(&mut self, end: TraceAnchor, immediate: bool) {
        debug_assert!(!self.meta.was_ever_executed());
        self.new_end = end;
        if immediate {
            self.trace.borrow_mut().set_end(end);
        }
    }

    /// Moves the trace to the mirrored layer.
    pub fn mirror_layer(&mut self, immediate: bool) {
        self.set_layer(self.new_layer.mirrored(), immediate);
    }
}

impl UndoCommand for CmdTraceEdit {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn perform_execute(&mut self) -> EditorResult<bool> {
        self.perform_redo()?;
        Ok(self.new_layer != self.old_layer
            || self.new_width != self.old_width
            || self.new_start != self.old_start
            || self.new_end != self.old_end)
    }

    fn perform_undo(&mut self) -> EditorResult<()> {
        let mut trace = self.trace.borrow_mut();
        trace.set_layer(self.old_layer.clone());
        trace.set_width(self.old_width);
        trace.set_start(self.old_start);
        trace.set_end(self.old_end);
        Ok(())
    }

    fn perform_redo(&mut self) -> EditorResult<()> {
        let mut trace = self.trace.borrow_mut();
        trace.set_layer(self.new_layer.clone());
        trace.set_width(self.new_width);
        trace.set_start(self.new_start);
        trace.set_end(self.new_end);
        Ok(())
    }
}

impl Drop for CmdTraceEdit {
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
    use crate::types::Vertex;
    use uuid::Uuid;

    fn circle() -> Shared<Circle> {
        shared(Circle::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_legend(),
            UnsignedLength::from_nm(200_000).unwrap(),
            false,
            false,
            Point::from_nm(1_000_000, 0),
            PositiveLength::from_nm(500_000).unwrap(),
        ))
    }

    #[test]
    fn undo_restores_the_pre_execute_state() {
        let c = circle();
        let before = c.borrow().clone();
        let mut cmd = CmdCircleEdit::new(Shared::clone(&c));
        cmd.set_diameter(PositiveLength::from_nm(2_000_000).unwrap(), false);
        cmd.translate(Point::from_nm(500_000, 500_000), false);
        assert!(cmd.execute().unwrap());
        assert_ne!(*c.borrow(), before);
        cmd.undo().unwrap();
        assert_eq!(*c.borrow(), before);
        cmd.redo().unwrap();
        cmd.undo().unwrap();
    }

    #[test]
    fn unchanged_command_reports_no_op() {
        let c = circle();
        let mut cmd = CmdCircleEdit::new(Shared::clone(&c));
        assert!(!cmd.execute().unwrap());
        cmd.undo().unwrap();
    }

    #[test]
    fn dropping_an_unexecuted_command_reverts_immediate_changes() {
        let c = circle();
        let before = c.borrow().clone();
        {
            let mut cmd = CmdCircleEdit::new(Shared::clone(&c));
            cmd.set_center(Point::from_nm(9, 9), true);
            assert_ne!(*c.borrow(), before);
        }
        assert_eq!(*c.borrow(), before);
    }

    #[test]
    fn transforms_compose_on_the_new_snapshot() {
        let c = circle();
        let mut cmd = CmdCircleEdit::new(Shared::clone(&c));
        cmd.translate(Point::from_nm(1_000_000, 0), false);
        cmd.rotate(Angle::DEG_90, Point::ORIGIN, false);
        cmd.execute().unwrap();
        assert_eq!(c.borrow().center(), Point::from_nm(0, 2_000_000));
        cmd.undo().unwrap();
        assert_eq!(c.borrow().center(), Point::from_nm(1_000_000, 0));
        cmd.redo().unwrap();
        cmd.undo().unwrap();
    }

    #[test]
    fn mirror_layer_swaps_the_side() {
        let c = circle();
        let mut cmd = CmdCircleEdit::new(Shared::clone(&c));
        cmd.mirror_layer(false);
        cmd.execute().unwrap();
        assert_eq!(c.borrow().layer().as_str(), "bot_legend");
        cmd.undo().unwrap();
    }

    #[test]
    fn zone_mirror_layer_swaps_top_and_bottom() {
        let z = shared(Zone::new(
            Uuid::new_v4(),
            ZoneLayers::TOP | ZoneLayers::INNER,
            ZoneRules::ALL,
            Path::new(vec![Vertex::new(Point::ORIGIN)]),
        ));
        let mut cmd = CmdZoneEdit::new(Shared::clone(&z));
        cmd.mirror_layer(false);
        cmd.execute().unwrap();
        assert_eq!(z.borrow().layers(), ZoneLayers::BOTTOM | ZoneLayers::INNER);
        cmd.undo().unwrap();
    }

    #[test]
    fn stroke_text_mirror_geometry_flips_everything() {
        let t = shared(StrokeText::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_names(),
            "X".to_string(),
            Point::from_nm(1_000_000, 0),
            Angle::DEG_0,
            PositiveLength::from_nm(1_000_000).unwrap(),
            UnsignedLength::ZERO,
            StrokeTextSpacing::Auto,
            StrokeTextSpacing::Auto,
            Alignment::default(),
            false,
            true,
        ));
        let mut cmd = CmdStrokeTextEdit::new(Shared::clone(&t));
        cmd.mirror_geometry(Orientation::Horizontal, Point::ORIGIN, false);
        cmd.execute().unwrap();
        assert_eq!(t.borrow().position(), Point::from_nm(-1_000_000, 0));
        assert!(t.borrow().is_mirrored());
        assert_eq!(t.borrow().rotation(), Angle::DEG_180);
        cmd.undo().unwrap();
        assert!(!t.borrow().is_mirrored());
    }
}
