//! Undo engine properties exercised with real library primitives.

mod common;

use common::test_package;

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use pcb_package_editor::commands::{CmdFootprintPadEdit, CmdFootprintPadInsert,
                                   CmdFootprintPadRemove, CmdPolygonInsert};
use pcb_package_editor::error::EditorError;
use pcb_package_editor::geometry::{MaskConfig, Polygon};
use pcb_package_editor::library::{ComponentSide, FootprintPad, PadFunction, PadShape};
use pcb_package_editor::types::{Angle, GraphicsLayerName, Path, Point, PositiveLength,
                                UnsignedLength, UnsignedLimitedRatio, Vertex};
use pcb_package_editor::undo::{UndoStack, UndoStackTransaction};
use pcb_package_editor::{shared, Shared};

fn pad_at(x: i64) -> Shared<FootprintPad> {
    shared(FootprintPad::new(
        Uuid::new_v4(),
        None,
        Point::from_nm(x, 0),
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
    ))
}

fn polygon() -> Shared<Polygon> {
    shared(Polygon::new(
        Uuid::new_v4(),
        GraphicsLayerName::top_legend(),
        UnsignedLength::ZERO,
        false,
        false,
        Path::new(vec![
            Vertex::new(Point::from_nm(0, 0)),
            Vertex::new(Point::from_nm(1_000_000, 0)),
        ]),
    ))
}

/// Insert a pad, widen it, remove it; three undos resurrect the original,
/// three redos remove it again.
#[test]
fn insert_edit_remove_chain() {
    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let pads = footprint.borrow().pads().clone();
    let mut stack = UndoStack::new();

    let pad = pad_at(0);
    let uuid_before = pads.uuid_set();
    stack
        .exec_cmd(
            Box::new(CmdFootprintPadInsert::new(pads.clone(), Shared::clone(&pad), None)),
            false,
        )
        .unwrap();

    let mut edit = CmdFootprintPadEdit::new(Shared::clone(&pad));
    edit.set_width(PositiveLength::from_nm(2_000_000).unwrap(), false);
    stack.exec_cmd(Box::new(edit), false).unwrap();
    assert_eq!(pad.borrow().width().to_nm(), 2_000_000);

    stack
        .exec_cmd(
            Box::new(CmdFootprintPadRemove::new(pads.clone(), Shared::clone(&pad))),
            false,
        )
        .unwrap();
    assert!(pads.is_empty());

    stack.undo().unwrap();
    stack.undo().unwrap();
    stack.undo().unwrap();
    assert_eq!(pads.len(), 1);
    // The resurrected pad is the very same object, back at 1 mm.
    let restored = pads.value(0).unwrap();
    assert!(Shared::ptr_eq(&restored, &pad));
    assert_eq!(restored.borrow().width().to_nm(), 1_000_000);

    stack.redo().unwrap();
    stack.redo().unwrap();
    stack.redo().unwrap();
    assert!(pads.is_empty());
    assert_eq!(pads.uuid_set(), uuid_before);
}

/// An aborted transaction leaves neither primitives nor history behind.
#[test]
fn aborted_transaction_rolls_everything_back() {
    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let polygons = footprint.borrow().polygons().clone();
    let stack = Rc::new(RefCell::new(UndoStack::new()));

    let polygon_count = polygons.len();
    let stack_len = stack.borrow().len();

    let mut tx = UndoStackTransaction::new(Rc::clone(&stack), "Add two polygons").unwrap();
    tx.append(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)))
        .unwrap();
    tx.append(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)))
        .unwrap();
    assert_eq!(polygons.len(), polygon_count + 2);
    tx.abort().unwrap();

    assert_eq!(polygons.len(), polygon_count);
    assert_eq!(stack.borrow().len(), stack_len);
    assert!(!stack.borrow().is_command_group_active());
}

/// A committed transaction undoes as a single step, children in reverse
/// order.
#[test]
fn committed_transaction_is_one_undo_step() {
    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let polygons = footprint.borrow().polygons().clone();
    let stack = Rc::new(RefCell::new(UndoStack::new()));

    let mut tx = UndoStackTransaction::new(Rc::clone(&stack), "Add two polygons").unwrap();
    tx.append(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)))
        .unwrap();
    tx.append(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)))
        .unwrap();
    assert!(tx.commit().unwrap());

    assert_eq!(polygons.len(), 2);
    stack.borrow_mut().undo().unwrap();
    assert_eq!(polygons.len(), 0);
    stack.borrow_mut().redo().unwrap();
    assert_eq!(polygons.len(), 2);
    stack.borrow_mut().undo().unwrap();
}

/// The clean mark never re-asserts after its position was cut off.
#[test]
fn clean_mark_is_lost_when_the_tail_is_cut() {
    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let polygons = footprint.borrow().polygons().clone();
    let mut stack = UndoStack::new();

    stack
        .exec_cmd(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)), false)
        .unwrap();
    stack
        .exec_cmd(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)), false)
        .unwrap();
    stack.set_clean();
    stack.undo().unwrap();
    assert!(!stack.is_clean());
    stack
        .exec_cmd(Box::new(CmdPolygonInsert::new(polygons.clone(), polygon(), None)), false)
        .unwrap();
    // The clean position is gone; no sequence of undo/redo reaches it.
    stack.undo().unwrap();
    assert!(!stack.is_clean());
    stack.redo().unwrap();
    assert!(!stack.is_clean());
}

/// Commands refuse out-of-order protocol use.
#[test]
fn protocol_violations_are_logic_errors() {
    use pcb_package_editor::undo::UndoCommand;

    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let polygons = footprint.borrow().polygons().clone();

    let mut cmd = CmdPolygonInsert::new(polygons, polygon(), None);
    assert!(matches!(cmd.undo(), Err(EditorError::LogicError { .. })));
    cmd.execute().unwrap();
    cmd.undo().unwrap();
    assert!(matches!(cmd.undo(), Err(EditorError::LogicError { .. })));
    cmd.redo().unwrap();
    assert!(matches!(cmd.redo(), Err(EditorError::LogicError { .. })));
    cmd.undo().unwrap();
}

/// Property 7: one event per effective mutation, none for no-ops.
#[test]
fn observers_see_exactly_one_event_per_change() {
    let package = test_package();
    let footprint = package.borrow().footprints().value(0).unwrap();
    let polygons = footprint.borrow().polygons().clone();

    let events = Rc::new(RefCell::new(0usize));
    let events2 = Rc::clone(&events);
    let _subscription = polygons.on_changed().subscribe(move |_| {
        *events2.borrow_mut() += 1;
    });

    let element = polygon();
    polygons.append(Shared::clone(&element));
    assert_eq!(*events.borrow(), 1); // added

    let mut stack = UndoStack::new();
    let mut edit = pcb_package_editor::commands::CmdPolygonEdit::new(Shared::clone(&element));
    edit.set_filled(true, false);
    stack.exec_cmd(Box::new(edit), false).unwrap();
    assert_eq!(*events.borrow(), 2); // edited (one field)

    let mut noop = pcb_package_editor::commands::CmdPolygonEdit::new(Shared::clone(&element));
    noop.set_filled(true, false); // same value
    stack.exec_cmd(Box::new(noop), false).unwrap();
    assert_eq!(*events.borrow(), 2); // nothing changed, no event
}
