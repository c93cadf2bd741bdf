//! The selection tool: picking, rubber-band selection, moving, vertex
//! editing and the clipboard/geometry operations on the selection.

use std::collections::BTreeSet;

use super::state::{handle_error, EditorState};
use crate::commands::{CmdCircleInsert, CmdCircleRemove, CmdDragSelectedFootprintItems,
                      CmdFootprintPadInsert, CmdFootprintPadRemove, CmdHoleInsert, CmdHoleRemove,
                      CmdPolygonEdit, CmdPolygonInsert, CmdPolygonRemove, CmdStrokeTextInsert,
                      CmdStrokeTextRemove, CmdZoneEdit, CmdZoneInsert, CmdZoneRemove, DragItems};
use crate::editor::clipboard::FootprintClipboardData;
use crate::list::ListItem;
use crate::editor::selection::{self, ItemKind, ItemRef};
use crate::editor::{Context, Feature, Key, KeyEvent, PointerEvent};
use crate::error::EditorResult;
use crate::library::Footprint;
use crate::types::{Angle, Orientation, Point, PositiveLength};
use crate::undo::UndoCommand;
use crate::{shared, Shared};

enum SubState {
    Idle,
    Selecting {
        start: Point,
    },
    Moving {
        cmd: CmdDragSelectedFootprintItems,
        start_pos: Point,
    },
    MovingVertex {
        item: ItemRef,
        vertex_index: usize,
        edit: VertexEdit,
    },
}

enum VertexEdit {
    Polygon(CmdPolygonEdit),
    Zone(CmdZoneEdit),
}

/// The selection tool.
pub struct SelectState {
    sub_state: SubState,
    cursor: Point,
}

impl SelectState {
    /// Creates the state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sub_state: SubState::Idle,
            cursor: Point::ORIGIN,
        }
    }

    fn tolerance(ctx: &Context) -> PositiveLength {
        PositiveLength::from_nm(ctx.grid_interval.to_nm() / 2).unwrap_or(ctx.grid_interval)
    }

    fn footprint(ctx: &Context) -> Option<Shared<Footprint>> {
        ctx.current_footprint.clone()
    }

    /// Resolves the current selection into shared item handles for a drag.
    fn drag_items(ctx: &Context) -> DragItems {
        let mut items = DragItems::default();
        let (Some(footprint), Some(selection)) = (&ctx.current_footprint, &ctx.selection) else {
            return items;
        };
        let footprint = footprint.borrow();
        let selection = selection.borrow();
        for uuid in selection.of_kind(ItemKind::Pad) {
            if let Some(pad) = footprint.pads().find(uuid) {
                items.pads.push(pad);
            }
        }
        for uuid in selection.of_kind(ItemKind::Circle) {
            if let Some(circle) = footprint.circles().find(uuid) {
                items.circles.push(circle);
            }
        }
        for uuid in selection.of_kind(ItemKind::Polygon) {
            if let Some(polygon) = footprint.polygons().find(uuid) {
                items.polygons.push(polygon);
            }
        }
        for uuid in selection.of_kind(ItemKind::Text) {
            if let Some(text) = footprint.stroke_texts().find(uuid) {
                items.texts.push(text);
            }
        }
        for uuid in selection.of_kind(ItemKind::Hole) {
            if let Some(hole) = footprint.holes().find(uuid) {
                items.holes.push(hole);
            }
        }
        items
    }

    fn exec_drag(
        ctx: &mut Context,
        configure: impl FnOnce(&mut CmdDragSelectedFootprintItems),
    ) -> bool {
        let items = Self::drag_items(ctx);
        if items.is_empty() {
            return false;
        }
        let mut cmd = CmdDragSelectedFootprintItems::new(&items, ctx.grid_interval);
        configure(&mut cmd);
        match ctx.undo_stack.borrow_mut().exec_cmd(Box::new(cmd), false) {
            Ok(_) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn begin_move(&mut self, ctx: &Context, start_pos: Point) {
        let items = Self::drag_items(ctx);
        if items.is_empty() {
            return;
        }
        let cmd = CmdDragSelectedFootprintItems::new(&items, ctx.grid_interval);
        self.sub_state = SubState::Moving { cmd, start_pos };
    }

    fn begin_vertex_move(&mut self, ctx: &Context, item: ItemRef, vertex_index: usize) -> bool {
        let Some(footprint) = Self::footprint(ctx) else {
            return false;
        };
        let footprint = footprint.borrow();
        let edit = match item.kind {
            ItemKind::Polygon => footprint
                .polygons()
                .find(item.uuid)
                .map(|polygon| VertexEdit::Polygon(CmdPolygonEdit::new(polygon))),
            ItemKind::Zone => footprint
                .zones()
                .find(item.uuid)
                .map(|zone| VertexEdit::Zone(CmdZoneEdit::new(zone))),
            _ => None,
        };
        match edit {
            Some(edit) => {
                self.sub_state = SubState::MovingVertex {
                    item,
                    vertex_index,
                    edit,
                };
                true
            }
            None => false,
        }
    }

    fn update_vertex_move(&mut self, ctx: &Context, pos: Point) {
        let SubState::MovingVertex {
            item,
            vertex_index,
            edit,
        } = &mut self.sub_state
        else {
            return;
        };
        let Some(footprint) = ctx.current_footprint.clone() else {
            return;
        };
        let footprint = footprint.borrow();
        match edit {
            VertexEdit::Polygon(edit) => {
                if let Some(polygon) = footprint.polygons().find(item.uuid) {
                    let mut path = polygon.borrow().path().clone();
                    if let Some(vertex) = path.vertices_mut().get_mut(*vertex_index) {
                        vertex.pos = pos;
                    }
                    edit.set_path(path, true);
                }
            }
            VertexEdit::Zone(edit) => {
                if let Some(zone) = footprint.zones().find(item.uuid) {
                    let mut outline = zone.borrow().outline().clone();
                    if let Some(vertex) = outline.vertices_mut().get_mut(*vertex_index) {
                        vertex.pos = pos;
                    }
                    edit.set_outline(outline, true);
                }
            }
        }
    }

    fn finish_sub_state(&mut self, ctx: &mut Context) -> bool {
        match std::mem::replace(&mut self.sub_state, SubState::Idle) {
            SubState::Idle => false,
            SubState::Selecting { .. } => true,
            SubState::Moving { cmd, .. } => {
                match ctx.undo_stack.borrow_mut().exec_cmd(Box::new(cmd), false) {
                    Ok(_) => true,
                    Err(e) => {
                        handle_error(ctx, &e);
                        false
                    }
                }
            }
            SubState::MovingVertex { edit, .. } => {
                let cmd: Box<dyn UndoCommand> = match edit {
                    VertexEdit::Polygon(edit) => Box::new(edit),
                    VertexEdit::Zone(edit) => Box::new(edit),
                };
                match ctx.undo_stack.borrow_mut().exec_cmd(cmd, false) {
                    Ok(_) => true,
                    Err(e) => {
                        handle_error(ctx, &e);
                        false
                    }
                }
            }
        }
    }

    fn remove_selected(&mut self, ctx: &mut Context) -> EditorResult<()> {
        let (Some(footprint), Some(selection)) = (
            ctx.current_footprint.clone(),
            ctx.selection.clone(),
        ) else {
            return Ok(());
        };
        let items = selection.borrow().items();
        if items.is_empty() {
            return Ok(());
        }
        ctx.undo_stack
            .borrow_mut()
            .begin_cmd_group("Remove footprint elements")?;
        let footprint = footprint.borrow();
        let result: EditorResult<()> = (|| {
            for item in &items {
                let mut stack = ctx.undo_stack.borrow_mut();
                match item.kind {
                    ItemKind::Pad => {
                        if let Some(pad) = footprint.pads().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdFootprintPadRemove::new(
                                footprint.pads().clone(),
                                pad,
                            )))?;
                        }
                    }
                    ItemKind::Circle => {
                        if let Some(circle) = footprint.circles().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdCircleRemove::new(
                                footprint.circles().clone(),
                                circle,
                            )))?;
                        }
                    }
                    ItemKind::Polygon => {
                        if let Some(polygon) = footprint.polygons().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdPolygonRemove::new(
                                footprint.polygons().clone(),
                                polygon,
                            )))?;
                        }
                    }
                    ItemKind::Text => {
                        if let Some(text) = footprint.stroke_texts().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdStrokeTextRemove::new(
                                footprint.stroke_texts().clone(),
                                text,
                            )))?;
                        }
                    }
                    ItemKind::Zone => {
                        if let Some(zone) = footprint.zones().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdZoneRemove::new(
                                footprint.zones().clone(),
                                zone,
                            )))?;
                        }
                    }
                    ItemKind::Hole => {
                        if let Some(hole) = footprint.holes().find(item.uuid) {
                            stack.append_to_cmd_group(Box::new(CmdHoleRemove::new(
                                footprint.holes().clone(),
                                hole,
                            )))?;
                        }
                    }
                }
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                ctx.undo_stack.borrow_mut().commit_cmd_group()?;
                selection.borrow_mut().clear();
                Ok(())
            }
            Err(e) => {
                ctx.undo_stack.borrow_mut().abort_cmd_group()?;
                Err(e)
            }
        }
    }

    fn copy_selection(ctx: &mut Context, cursor: Point) -> bool {
        let (Some(footprint), Some(selection)) = (&ctx.current_footprint, &ctx.selection) else {
            return false;
        };
        let data = FootprintClipboardData::from_selection(
            &footprint.borrow(),
            &selection.borrow(),
            cursor,
        );
        if data.is_empty() {
            return false;
        }
        ctx.clipboard = Some(data);
        true
    }

    fn paste(&mut self, ctx: &mut Context) -> EditorResult<bool> {
        let Some(clipboard) = ctx.clipboard.clone() else {
            return Ok(false);
        };
        let Some(footprint) = ctx.current_footprint.clone() else {
            return Ok(false);
        };
        let delta = ctx.snap(self.cursor) - clipboard.cursor;
        let pasted = clipboard.instantiate(delta);
        ctx.undo_stack
            .borrow_mut()
            .begin_cmd_group("Paste footprint elements")?;
        let footprint = footprint.borrow();
        let mut new_selection: Vec<ItemRef> = Vec::new();
        let result: EditorResult<()> = (|| {
            let mut stack = ctx.undo_stack.borrow_mut();
            for pad in &pasted.pads {
                let element = shared(pad.clone());
                new_selection.push(ItemRef::new(ItemKind::Pad, pad.uuid()));
                stack.append_to_cmd_group(Box::new(CmdFootprintPadInsert::new(
                    footprint.pads().clone(),
                    element,
                    None,
                )))?;
            }
            for circle in &pasted.circles {
                let element = shared(circle.clone());
                new_selection.push(ItemRef::new(ItemKind::Circle, circle.uuid()));
                stack.append_to_cmd_group(Box::new(CmdCircleInsert::new(
                    footprint.circles().clone(),
                    element,
                    None,
                )))?;
            }
            for polygon in &pasted.polygons {
                let element = shared(polygon.clone());
                new_selection.push(ItemRef::new(ItemKind::Polygon, polygon.uuid()));
                stack.append_to_cmd_group(Box::new(CmdPolygonInsert::new(
                    footprint.polygons().clone(),
                    element,
                    None,
                )))?;
            }
            for text in &pasted.texts {
                let element = shared(text.clone());
                new_selection.push(ItemRef::new(ItemKind::Text, text.uuid()));
                stack.append_to_cmd_group(Box::new(CmdStrokeTextInsert::new(
                    footprint.stroke_texts().clone(),
                    element,
                    None,
                )))?;
            }
            for zone in &pasted.zones {
                let element = shared(zone.clone());
                new_selection.push(ItemRef::new(ItemKind::Zone, zone.uuid()));
                stack.append_to_cmd_group(Box::new(CmdZoneInsert::new(
                    footprint.zones().clone(),
                    element,
                    None,
                )))?;
            }
            for hole in &pasted.holes {
                let element = shared(hole.clone());
                new_selection.push(ItemRef::new(ItemKind::Hole, hole.uuid()));
                stack.append_to_cmd_group(Box::new(CmdHoleInsert::new(
                    footprint.holes().clone(),
                    element,
                    None,
                )))?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                ctx.undo_stack.borrow_mut().commit_cmd_group()?;
                if let Some(selection) = &ctx.selection {
                    selection.borrow_mut().set(new_selection);
                }
                Ok(true)
            }
            Err(e) => {
                ctx.undo_stack.borrow_mut().abort_cmd_group()?;
                Err(e)
            }
        }
    }
}

impl Default for SelectState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState for SelectState {
    fn exit(&mut self, ctx: &mut Context) -> bool {
        // Dropping an unfinished move reverts its immediate feedback.
        self.sub_state = SubState::Idle;
        if let Some(selection) = &ctx.selection {
            selection.borrow_mut().clear();
        }
        true
    }

    fn available_features(&self, ctx: &Context) -> BTreeSet<Feature> {
        let mut features = BTreeSet::new();
        features.insert(Feature::SelectAll);
        if ctx.clipboard.is_some() {
            features.insert(Feature::Paste);
        }
        let has_selection = ctx
            .selection
            .as_ref()
            .is_some_and(|selection| !selection.borrow().is_empty());
        if has_selection {
            for feature in [
                Feature::Cut,
                Feature::Copy,
                Feature::Remove,
                Feature::Rotate,
                Feature::Mirror,
                Feature::Flip,
                Feature::MoveAlign,
                Feature::SnapToGrid,
                Feature::Properties,
            ] {
                features.insert(feature);
            }
        }
        if !matches!(self.sub_state, SubState::Idle) {
            features.insert(Feature::Abort);
        }
        features
    }

    fn process_mouse_moved(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.cursor = e.scene_pos;
        match &mut self.sub_state {
            SubState::Idle => false,
            SubState::Selecting { start } => {
                let start = *start;
                if let (Some(footprint), Some(selection)) =
                    (&ctx.current_footprint, &ctx.selection)
                {
                    let items =
                        selection::items_in_rect(&footprint.borrow(), start, e.scene_pos);
                    selection.borrow_mut().set(items);
                }
                true
            }
            SubState::Moving { cmd, start_pos } => {
                let delta = (e.scene_pos - *start_pos).mapped_to_grid(ctx.grid_interval);
                cmd.set_delta_to_start_pos(delta);
                true
            }
            SubState::MovingVertex { .. } => {
                let pos = ctx.snap(e.scene_pos);
                self.update_vertex_move(ctx, pos);
                true
            }
        }
    }

    fn process_left_button_pressed(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        self.cursor = e.scene_pos;
        let Some(footprint) = Self::footprint(ctx) else {
            return false;
        };
        let tolerance = Self::tolerance(ctx);

        // A press on a vertex of a selected polygon/zone starts vertex
        // editing.
        if let Some((item, vertex_index)) =
            selection::vertex_at(&footprint.borrow(), e.scene_pos, tolerance)
        {
            let selected = ctx
                .selection
                .as_ref()
                .is_some_and(|selection| selection.borrow().contains(item));
            if selected && self.begin_vertex_move(ctx, item, vertex_index) {
                return true;
            }
        }

        let hit = selection::item_at(&footprint.borrow(), e.scene_pos, tolerance);
        match hit {
            Some(item) => {
                if let Some(selection) = &ctx.selection {
                    let mut selection = selection.borrow_mut();
                    if e.modifiers.shift {
                        selection.toggle(item);
                    } else if !selection.contains(item) {
                        selection.clear();
                        selection.select(item);
                    }
                    if !selection.contains(item) {
                        // The toggle removed it; nothing to move.
                        return true;
                    }
                }
                self.begin_move(ctx, e.scene_pos);
                true
            }
            None => {
                if let Some(selection) = &ctx.selection {
                    if !e.modifiers.shift {
                        selection.borrow_mut().clear();
                    }
                }
                self.sub_state = SubState::Selecting {
                    start: e.scene_pos,
                };
                true
            }
        }
    }

    fn process_left_button_released(&mut self, ctx: &mut Context, _e: &PointerEvent) -> bool {
        self.finish_sub_state(ctx)
    }

    fn process_left_button_double_clicked(&mut self, ctx: &mut Context, e: &PointerEvent) -> bool {
        let Some(footprint) = Self::footprint(ctx) else {
            return false;
        };
        let tolerance = Self::tolerance(ctx);
        let hit = selection::item_at(&footprint.borrow(), e.scene_pos, tolerance);
        match hit {
            Some(item) => {
                ctx.adapter.request_properties_dialog(item);
                true
            }
            None => false,
        }
    }

    fn process_select_all(&mut self, ctx: &mut Context) -> bool {
        let (Some(footprint), Some(selection)) = (&ctx.current_footprint, &ctx.selection) else {
            return false;
        };
        selection.borrow_mut().select_all(&footprint.borrow());
        true
    }

    fn process_cut(&mut self, ctx: &mut Context) -> bool {
        let cursor = ctx.snap(self.cursor);
        if !Self::copy_selection(ctx, cursor) {
            return false;
        }
        match self.remove_selected(ctx) {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn process_copy(&mut self, ctx: &mut Context) -> bool {
        let cursor = ctx.snap(self.cursor);
        Self::copy_selection(ctx, cursor)
    }

    fn process_paste(&mut self, ctx: &mut Context) -> bool {
        match self.paste(ctx) {
            Ok(done) => done,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn process_rotate(&mut self, ctx: &mut Context, angle: Angle) -> bool {
        if let SubState::Moving { cmd, .. } = &mut self.sub_state {
            cmd.rotate(angle);
            return true;
        }
        Self::exec_drag(ctx, |cmd| cmd.rotate(angle))
    }

    fn process_mirror(&mut self, ctx: &mut Context, orientation: Orientation) -> bool {
        if let SubState::Moving { cmd, .. } = &mut self.sub_state {
            cmd.mirror_geometry(orientation);
            return true;
        }
        Self::exec_drag(ctx, |cmd| cmd.mirror_geometry(orientation))
    }

    fn process_flip(&mut self, ctx: &mut Context, orientation: Orientation) -> bool {
        Self::exec_drag(ctx, |cmd| {
            cmd.mirror_geometry(orientation);
            cmd.mirror_layer();
        })
    }

    fn process_move_align(&mut self, ctx: &mut Context) -> bool {
        let items = Self::drag_items(ctx);
        if items.is_empty() {
            return false;
        }
        let cmd = CmdDragSelectedFootprintItems::new(&items, ctx.grid_interval);
        let center = cmd.center();
        drop(cmd);
        let Some(target) = ctx.adapter.request_move_align(center) else {
            return false;
        };
        Self::exec_drag(ctx, |cmd| cmd.translate(target - center))
    }

    fn process_snap_to_grid(&mut self, ctx: &mut Context) -> bool {
        let interval = ctx.grid_interval;
        Self::exec_drag(ctx, |cmd| cmd.snap_to_grid(interval))
    }

    fn process_remove(&mut self, ctx: &mut Context) -> bool {
        match self.remove_selected(ctx) {
            Ok(()) => true,
            Err(e) => {
                handle_error(ctx, &e);
                false
            }
        }
    }

    fn process_edit_properties(&mut self, ctx: &mut Context) -> bool {
        let Some(selection) = &ctx.selection else {
            return false;
        };
        let Some(item) = selection.borrow().items().first().copied() else {
            return false;
        };
        ctx.adapter.request_properties_dialog(item);
        true
    }

    fn process_move(&mut self, ctx: &mut Context, delta: Point) -> bool {
        Self::exec_drag(ctx, |cmd| cmd.translate(delta))
    }

    fn process_key_pressed(&mut self, ctx: &mut Context, e: &KeyEvent) -> bool {
        if e.key == Key::Delete {
            return self.process_remove(ctx);
        }
        false
    }

    fn process_abort_command(&mut self, ctx: &mut Context) -> bool {
        if !matches!(self.sub_state, SubState::Idle) {
            // Dropping the pending command reverts its immediate feedback.
            self.sub_state = SubState::Idle;
            return true;
        }
        let has_selection = ctx
            .selection
            .as_ref()
            .is_some_and(|selection| !selection.borrow().is_empty());
        if has_selection {
            if let Some(selection) = &ctx.selection {
                selection.borrow_mut().clear();
            }
            return true;
        }
        false
    }
}
