//! Reversible edit commands over the library model.
//!
//! Every edit command records old/new snapshots of the fields it may touch
//! and follows the same life cycle: configure the new snapshot (optionally
//! with immediate feedback), execute through the undo stack, then toggle via
//! undo/redo. List-level structure changes go through the generic
//! insert/remove/swap commands.

mod attribute;
mod component;
mod drag;
mod geometry;
mod list;
mod pads;
mod reload;

pub use attribute::CmdAttributeEdit;
pub use component::{CmdComponentSignalEdit, CmdComponentSymbolVariantItemEdit,
                    CmdDevicePadSignalMapItemEdit};
pub use drag::{CmdDragSelectedFootprintItems, DragItems};
pub use geometry::{CmdCircleEdit, CmdHoleEdit, CmdNetLabelEdit, CmdNetLineEdit, CmdPolygonEdit,
                   CmdStrokeTextEdit, CmdTraceEdit, CmdZoneEdit};
pub use list::{CmdListElementInsert, CmdListElementRemove, CmdListElementsSwap};
pub use pads::{CmdFootprintPadEdit, CmdPackagePadEdit};
pub use reload::CmdPackageReload;

use crate::geometry::{Circle, Hole, Polygon, StrokeText, Zone};
use crate::library::{FootprintPad, PackagePad};

/// Inserts a circle into a footprint.
pub type CmdCircleInsert = CmdListElementInsert<Circle>;
/// Removes a circle from a footprint.
pub type CmdCircleRemove = CmdListElementRemove<Circle>;
/// Inserts a polygon into a footprint.
pub type CmdPolygonInsert = CmdListElementInsert<Polygon>;
/// Removes a polygon from a footprint.
pub type CmdPolygonRemove = CmdListElementRemove<Polygon>;
/// Inserts a hole into a footprint.
pub type CmdHoleInsert = CmdListElementInsert<Hole>;
/// Removes a hole from a footprint.
pub type CmdHoleRemove = CmdListElementRemove<Hole>;
/// Inserts a stroke text into a footprint.
pub type CmdStrokeTextInsert = CmdListElementInsert<StrokeText>;
/// Removes a stroke text from a footprint.
pub type CmdStrokeTextRemove = CmdListElementRemove<StrokeText>;
/// Inserts a zone into a footprint.
pub type CmdZoneInsert = CmdListElementInsert<Zone>;
/// Removes a zone from a footprint.
pub type CmdZoneRemove = CmdListElementRemove<Zone>;
/// Inserts a footprint pad into a footprint.
pub type CmdFootprintPadInsert = CmdListElementInsert<FootprintPad>;
/// Removes a footprint pad from a footprint.
pub type CmdFootprintPadRemove = CmdListElementRemove<FootprintPad>;
/// Inserts a package pad into a package.
pub type CmdPackagePadInsert = CmdListElementInsert<PackagePad>;
/// Removes a package pad from a package.
pub type CmdPackagePadRemove = CmdListElementRemove<PackagePad>;
/// Swaps two package pads in a package.
pub type CmdPackagePadsSwap = CmdListElementsSwap<PackagePad>;
