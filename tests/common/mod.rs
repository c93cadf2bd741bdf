//! Shared helpers for the integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use uuid::Uuid;

use pcb_package_editor::editor::selection::ItemRef;
use pcb_package_editor::editor::settings::WorkspaceSettings;
use pcb_package_editor::editor::tab::EditorTab;
use pcb_package_editor::editor::{EditorUiAdapter, Feature};
use pcb_package_editor::library::fs::TransactionalFs;
use pcb_package_editor::library::{Footprint, Package, PackagePad};
use pcb_package_editor::types::{CircuitIdentifier, Point, Version};
use pcb_package_editor::{shared, Shared};

/// Records every UI callback so tests can assert on them.
#[derive(Default)]
pub struct RecordingAdapter {
    pub status_messages: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    pub ruler: RefCell<Option<(Point, Point)>>,
    pub properties_requests: RefCell<Vec<ItemRef>>,
    pub move_align_target: RefCell<Option<Point>>,
}

impl EditorUiAdapter for RecordingAdapter {
    fn set_status_bar_message(&self, message: &str) {
        self.status_messages.borrow_mut().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn set_ruler_positions(&self, positions: Option<(Point, Point)>) {
        *self.ruler.borrow_mut() = positions;
    }

    fn request_properties_dialog(&self, item: ItemRef) {
        self.properties_requests.borrow_mut().push(item);
    }

    fn request_move_align(&self, _center: Point) -> Option<Point> {
        *self.move_align_target.borrow()
    }

    fn available_features_changed(&self, _features: &BTreeSet<Feature>) {}
}

/// A package with three pads (`1`, `2`, `3`) and one empty footprint.
pub fn test_package() -> Shared<Package> {
    let package = Package::new(
        Uuid::new_v4(),
        "SOT-23".to_string(),
        Version::parse("0.1").unwrap(),
    );
    for name in ["1", "2", "3"] {
        package.pads().append(shared(PackagePad::new(
            Uuid::new_v4(),
            CircuitIdentifier::new(name).unwrap(),
        )));
    }
    package
        .footprints()
        .append(shared(Footprint::new(Uuid::new_v4(), "default".to_string())));
    shared(package)
}

/// An editor tab over [`test_package`] with a recording adapter and a
/// temporary directory as file store.
pub fn test_tab() -> (EditorTab, Rc<RecordingAdapter>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let package = test_package();
    let fs = shared(TransactionalFs::open(dir.path()));
    let adapter = Rc::new(RecordingAdapter::default());
    let settings = WorkspaceSettings::default();
    let tab = EditorTab::new(package, fs, Rc::clone(&adapter) as Rc<dyn EditorUiAdapter>, &settings);
    (tab, adapter, dir)
}
