//! Strongly-typed scalar and geometric value types.
//!
//! Every constrained type validates at construction and fails with
//! [`EditorError::InvalidValue`](crate::error::EditorError::InvalidValue);
//! once a value exists it is valid by construction, so the entity layer's
//! setters never need to re-validate.

mod alignment;
mod angle;
mod identifiers;
mod layer;
mod length;
mod path;
mod point;
mod ratio;
mod version;

pub use alignment::{Alignment, HAlign, VAlign};
pub use angle::Angle;
pub use identifiers::{parse_uuid, AttributeKey, CircuitIdentifier};
pub use layer::{allowed_geometry_layers, allowed_text_layers, GraphicsLayerName};
pub use length::{Length, LengthUnit, PositiveLength, UnsignedLength};
pub use path::{Path, Vertex};
pub use point::{Orientation, Point};
pub use ratio::{Ratio, UnsignedLimitedRatio};
pub use version::Version;
