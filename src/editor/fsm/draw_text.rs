//! Tool states for placing stroke texts: names, values and free text.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::state::{abort_active_group, handle_error, EditorState};
use crate::commands::{CmdStrokeTextEdit, CmdStrokeTextInsert};
use crate::editor::selection::{ItemKind, ItemRef};
use crate::editor::{Context, Feature, PointerEvent};
use crate::error::EditorResult;
use crate::geometry::{StrokeText, StrokeTextSpacing};
use crate::list::ListItem;
use crate::types::{Alignment, Angle, GraphicsLayerName, HAlign, Orientation, Point,
                   PositiveLength, UnsignedLength, VAlign};
use crate::{shared, Shared};

/// What kind of text the tool stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// `{{NAME}}` on the names layer.
    Name,
    /// `{{VALUE}}` on the values layer.
    Value,
    /// Arbitrary text.
    Free,
}

struct CurrentText {
    text: Shared<StrokeText>,
    edit: CmdStrokeTextEdit,
}

/// Stamping text tool: a text is attached to the cursor on entry; every
/// click fixes it and attaches the next one.
pub struct DrawTextState {
    mode: TextMode,
    layer: GraphicsLayerName,
    text: String,
    height: PositiveLength,
    stroke_width: UnsignedLength,
    align: Alignment,
    rotation: Angle,
    mirrored: bool,
    cursor: Point,
    current: Option<CurrentText>,
}

impl DrawTextState {
    /// Creates the state with the preloads of the given mode.
    #[must_use]
    pub fn new(mode: TextMode) -> Self {
        let one_mm = PositiveLength::from_nm(1_000_000).expect("one millimetre is positive");
        let (layer, text, height, align) = match mode {
            TextMode::Name => (
                GraphicsLayerName::top_names(),
                "{{NAME}}".to_string(),
                one_mm,
                Alignment::new(HAlign::Center, VAlign::Bottom),
            ),
            TextMode::Value => (
                GraphicsLayerName::top_values(),
                "{{VALUE}}".to_string(),
                one_mm,
                Alignment::new(HAlign::Center, VAlign::Top),
            ),
            TextMode::Free => (
                GraphicsLayerName::top_legend(),
                // Non-empty so the new text is visible right away.
                "Text".to_string(),
                PositiveLength::from_nm(2_000_000).expect("two millimetres are positive"),
                Alignment::new(HAlign::Left, VAlign::Bottom),
            ),
        };
        Self {
            mode,
            layer,
            text,
            height,
            stroke_width: UnsignedLength::from_nm(200_000).unwrap_or(UnsignedLength::ZERO),
            align,
            rotation: Angle::DEG_0,
            mirrored: false,
            cursor: Point::ORIGIN,
            current: None,
        }
    }

    /// The tool's text mode.
    #[must_use]
    pub fn mode(&self) -> TextMode {
        self.mode
    }

    /// Sets the layer for new texts.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) {
        self.layer = layer;
        if let Some(current) = &mut self.current {
            current.edit.set_layer(self.layer.clone(), true);
        }
    }

    /// Sets the text content (only meaningful for [`TextMode::Free`]).
    pub fn set_text(&mut self, text: String) {
        self.text = text.trim().to_string();
        if let Some(current) = &mut self.current {
            current.edit.set_text(self.text.clone(), true);
        }
    }

    /// Sets the glyph height for new texts.
    pub fn set_height(&mut self, height: PositiveLength) {
        self.height = height;
        if let Some(current) = &mut self.current {
            current.edit.set_height(height, true);
        }
    }

    /// Sets the stroke width for new texts.
    pub fn set_stroke_width(&mut self, width: UnsignedLength) {
        self.stroke_width = width;
        if let Some(current) = &mut self.current {
            current.edit.set_stroke_width(width, true);
        }
    }

    /// Sets the alignment for new texts.
    pub fn set_align(&mut self, align: Alignment) {
        self.align = align;
        if let Some(current) = &mut self.current {
            current.edit.set_align(align, true);
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
            .begin_cmd_group("Add footprint text")?;
        let text = shared(StrokeText::new(
            Uuid::new_v4(),
            self.layer.clone(),
            self.text.clone(),
            pos,
            self.rotation,
            self.height,
            self.stroke_width,
            StrokeTextSpacing::Auto,
            StrokeTextSpacing::Auto,
            self.align,
            self.mirrored,
            true,
        ));
        ctx.undo_stack
            .borrow_mut()
            .append_to_cmd_group(Box::new(CmdStrokeTextInsert::new(
                footprint.borrow().stroke_texts().clone(),
                Shared::clone(&text),
                None,
            )))?;
        let edit = CmdStrokeTextEdit::new(Shared::clone(&text));
        if let Some(selection) = &ctx.selection {
            let mut selection = selection.borrow_mut();
            selection.clear();
            selection.select(ItemRef::new(ItemKind::Text, text.borrow().uuid()));
        }
        self.current = Some(CurrentText { text, edit });
        ctx.adapter.set_status_bar_message("Click to place the text");
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

impl EditorState for DrawTextState {
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
            features.insert(Feature::Rotate);
            features.insert(Feature::Mirror);
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
        // Rotate the floating text instead of aborting.
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

    fn process_mirror(&mut self, _ctx: &mut Context, orientation: Orientation) -> bool {
        if let Some(current) = &mut self.current {
            self.mirrored = !self.mirrored;
            self.align = self.align.mirrored(orientation);
            current.edit.set_mirrored(self.mirrored, true);
            current.edit.set_align(self.align, true);
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
