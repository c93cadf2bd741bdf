//! Geometric pads of a footprint.

use std::fmt;

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::geometry::{deserialize_angle, deserialize_path, deserialize_position,
                      deserialize_positive, deserialize_unsigned, serialize_path,
                      serialize_position, MaskConfig};
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Angle, Length, Path, Point, PositiveLength, Ratio,
                   UnsignedLength, UnsignedLimitedRatio, Version};

/// Geometric shape of a footprint pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PadShape {
    /// Rectangle with rounded corners; radius 0 % is a plain rectangle,
    /// 100 % a circle/obround.
    #[default]
    RoundedRect,
    /// Octagon with rounded corners.
    RoundedOctagon,
    /// Arbitrary outline given by the custom outline path.
    Custom,
}

impl PadShape {
    const fn token(self) -> &'static str {
        match self {
            Self::RoundedRect => "roundrect",
            Self::RoundedOctagon => "octagon",
            Self::Custom => "custom",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "roundrect" => Ok(Self::RoundedRect),
            "octagon" => Ok(Self::RoundedOctagon),
            "custom" => Ok(Self::Custom),
            other => Err(EditorError::invalid_value("PadShape", other)),
        }
    }
}

impl fmt::Display for PadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Electrical/mechanical function of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PadFunction {
    /// Ordinary signal pad.
    #[default]
    StandardPad,
    /// Thermal/exposed pad.
    ThermalPad,
    /// Ball grid array pad.
    BgaPad,
    /// Edge connector finger.
    EdgeConnectorPad,
    /// Test point.
    TestPad,
    /// Fiducial local to this footprint.
    LocalFiducial,
    /// Fiducial for the whole board.
    GlobalFiducial,
}

impl PadFunction {
    /// All functions, in UI order.
    pub const ALL: [Self; 7] = [
        Self::StandardPad,
        Self::ThermalPad,
        Self::BgaPad,
        Self::EdgeConnectorPad,
        Self::TestPad,
        Self::LocalFiducial,
        Self::GlobalFiducial,
    ];

    /// Whether this function is a fiducial (never connected to a package
    /// pad).
    #[must_use]
    pub const fn is_fiducial(self) -> bool {
        matches!(self, Self::LocalFiducial | Self::GlobalFiducial)
    }

    const fn token(self) -> &'static str {
        match self {
            Self::StandardPad => "standard",
            Self::ThermalPad => "thermal",
            Self::BgaPad => "bga",
            Self::EdgeConnectorPad => "edge_connector",
            Self::TestPad => "test",
            Self::LocalFiducial => "local_fiducial",
            Self::GlobalFiducial => "global_fiducial",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|function| function.token() == token)
            .ok_or_else(|| EditorError::invalid_value("PadFunction", token))
    }
}

impl fmt::Display for PadFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Which board side an SMT pad sits on; THT pads are on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentSide {
    /// Top side.
    #[default]
    Top,
    /// Bottom side.
    Bottom,
}

impl ComponentSide {
    /// The opposite side.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    const fn token(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(EditorError::invalid_value("ComponentSide", other)),
        }
    }
}

impl fmt::Display for ComponentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Field-change events of a [`FootprintPad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintPadEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The package pad reference changed.
    PackagePadChanged,
    /// The position changed.
    PositionChanged,
    /// The rotation changed.
    RotationChanged,
    /// The shape changed.
    ShapeChanged,
    /// The width changed.
    WidthChanged,
    /// The height changed.
    HeightChanged,
    /// The corner radius changed.
    RadiusChanged,
    /// The custom outline changed.
    CustomOutlineChanged,
    /// The drill diameter changed.
    DrillChanged,
    /// The component side changed.
    ComponentSideChanged,
    /// The function changed.
    FunctionChanged,
    /// The copper clearance changed.
    CopperClearanceChanged,
    /// The stop mask configuration changed.
    StopMaskChanged,
    /// The solder paste configuration changed.
    SolderPasteChanged,
}

/// A copper pad of a footprint, optionally realising a package pad.
///
/// A present drill makes the pad through-hole; an absent drill makes it
/// surface-mount on its component side.
#[derive(Debug)]
pub struct FootprintPad {
    uuid: Uuid,
    package_pad: Option<Uuid>,
    position: Point,
    rotation: Angle,
    shape: PadShape,
    width: PositiveLength,
    height: PositiveLength,
    radius: UnsignedLimitedRatio,
    custom_outline: Path,
    drill: Option<PositiveLength>,
    component_side: ComponentSide,
    function: PadFunction,
    copper_clearance: UnsignedLength,
    stop_mask: MaskConfig,
    solder_paste: MaskConfig,
    on_edited: Signal<FootprintPadEvent>,
}

impl FootprintPad {
    /// Creates a footprint pad.
    #[allow(clippy::too_many_arguments)] // mirrors the file format fields
    #[must_use]
    pub fn new(
        uuid: Uuid,
        package_pad: Option<Uuid>,
        position: Point,
        rotation: Angle,
        shape: PadShape,
        width: PositiveLength,
        height: PositiveLength,
        radius: UnsignedLimitedRatio,
        custom_outline: Path,
        drill: Option<PositiveLength>,
        component_side: ComponentSide,
        function: PadFunction,
        copper_clearance: UnsignedLength,
        stop_mask: MaskConfig,
        solder_paste: MaskConfig,
    ) -> Self {
        Self {
            uuid,
            package_pad,
            position,
            rotation,
            shape,
            width,
            height,
            radius,
            custom_outline,
            drill,
            component_side,
            function,
            copper_clearance,
            stop_mask,
            solder_paste,
            on_edited: Signal::new(),
        }
    }

    /// Copies `other`'s content under a new uuid.
    #[must_use]
    pub fn with_uuid(uuid: Uuid, other: &Self) -> Self {
        let mut copy = other.clone();
        copy.uuid = uuid;
        copy
    }

    /// The corner radius ratio giving an absolute corner radius of 0.25 mm
    /// on the smaller pad dimension, clamped to `[0 %, 50 %]`.
    #[must_use]
    pub fn recommended_radius(width: PositiveLength, height: PositiveLength) -> UnsignedLimitedRatio {
        let size = width.get().min(height.get());
        let target = Length::from_nm(250_000);
        let ratio = Ratio::from_normalized(target.to_nm() as f64 / size.to_nm() as f64)
            .unwrap_or(Ratio::ZERO);
        UnsignedLimitedRatio::clamped(ratio.min(Ratio::from_percent(50)))
    }

    /// The referenced package pad, if any.
    #[must_use]
    pub fn package_pad(&self) -> Option<Uuid> {
        self.package_pad
    }

    /// The position.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The rotation.
    #[must_use]
    pub fn rotation(&self) -> Angle {
        self.rotation
    }

    /// The shape.
    #[must_use]
    pub fn shape(&self) -> PadShape {
        self.shape
    }

    /// The width.
    #[must_use]
    pub fn width(&self) -> PositiveLength {
        self.width
    }

    /// The height.
    #[must_use]
    pub fn height(&self) -> PositiveLength {
        self.height
    }

    /// The corner radius ratio.
    #[must_use]
    pub fn radius(&self) -> UnsignedLimitedRatio {
        self.radius
    }

    /// The custom outline (only meaningful for [`PadShape::Custom`]).
    #[must_use]
    pub fn custom_outline(&self) -> &Path {
        &self.custom_outline
    }

    /// The drill diameter; present iff the pad is through-hole.
    #[must_use]
    pub fn drill(&self) -> Option<PositiveLength> {
        self.drill
    }

    /// Whether the pad is through-hole.
    #[must_use]
    pub fn is_tht(&self) -> bool {
        self.drill.is_some()
    }

    /// The component side.
    #[must_use]
    pub fn component_side(&self) -> ComponentSide {
        self.component_side
    }

    /// The function.
    #[must_use]
    pub fn function(&self) -> PadFunction {
        self.function
    }

    /// The copper clearance.
    #[must_use]
    pub fn copper_clearance(&self) -> UnsignedLength {
        self.copper_clearance
    }

    /// The stop mask configuration.
    #[must_use]
    pub fn stop_mask(&self) -> MaskConfig {
        self.stop_mask
    }

    /// The solder paste configuration.
    #[must_use]
    pub fn solder_paste(&self) -> MaskConfig {
        self.solder_paste
    }

    /// Sets the package pad reference. Returns whether the value changed.
    pub fn set_package_pad(&mut self, package_pad: Option<Uuid>) -> bool {
        if package_pad == self.package_pad {
            return false;
        }
        self.package_pad = package_pad;
        self.on_edited.notify(&FootprintPadEvent::PackagePadChanged);
        true
    }

    /// Sets the position. Returns whether the value changed.
    pub fn set_position(&mut self, position: Point) -> bool {
        if position == self.position {
            return false;
        }
        self.position = position;
        self.on_edited.notify(&FootprintPadEvent::PositionChanged);
        true
    }

    /// Sets the rotation. Returns whether the value changed.
    pub fn set_rotation(&mut self, rotation: Angle) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        self.on_edited.notify(&FootprintPadEvent::RotationChanged);
        true
    }

    /// Sets the shape. Returns whether the value changed.
    pub fn set_shape(&mut self, shape: PadShape) -> bool {
        if shape == self.shape {
            return false;
        }
        self.shape = shape;
        self.on_edited.notify(&FootprintPadEvent::ShapeChanged);
        true
    }

    /// Sets the width. Returns whether the value changed.
    pub fn set_width(&mut self, width: PositiveLength) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        self.on_edited.notify(&FootprintPadEvent::WidthChanged);
        true
    }

    /// Sets the height. Returns whether the value changed.
    pub fn set_height(&mut self, height: PositiveLength) -> bool {
        if height == self.height {
            return false;
        }
        self.height = height;
        self.on_edited.notify(&FootprintPadEvent::HeightChanged);
        true
    }

    /// Sets the corner radius ratio. Returns whether the value changed.
    pub fn set_radius(&mut self, radius: UnsignedLimitedRatio) -> bool {
        if radius == self.radius {
            return false;
        }
        self.radius = radius;
        self.on_edited.notify(&FootprintPadEvent::RadiusChanged);
        true
    }

    /// Sets the custom outline. Returns whether the value changed.
    pub fn set_custom_outline(&mut self, outline: Path) -> bool {
        if outline == self.custom_outline {
            return false;
        }
        self.custom_outline = outline;
        self.on_edited.notify(&FootprintPadEvent::CustomOutlineChanged);
        true
    }

    /// Sets the drill diameter. Returns whether the value changed.
    pub fn set_drill(&mut self, drill: Option<PositiveLength>) -> bool {
        if drill == self.drill {
            return false;
        }
        self.drill = drill;
        self.on_edited.notify(&FootprintPadEvent::DrillChanged);
        true
    }

    /// Sets the component side. Returns whether the value changed.
    pub fn set_component_side(&mut self, side: ComponentSide) -> bool {
        if side == self.component_side {
            return false;
        }
        self.component_side = side;
        self.on_edited.notify(&FootprintPadEvent::ComponentSideChanged);
        true
    }

    /// Sets the function. Returns whether the value changed.
    pub fn set_function(&mut self, function: PadFunction) -> bool {
        if function == self.function {
            return false;
        }
        self.function = function;
        self.on_edited.notify(&FootprintPadEvent::FunctionChanged);
        true
    }

    /// Sets the copper clearance. Returns whether the value changed.
    pub fn set_copper_clearance(&mut self, clearance: UnsignedLength) -> bool {
        if clearance == self.copper_clearance {
            return false;
        }
        self.copper_clearance = clearance;
        self.on_edited.notify(&FootprintPadEvent::CopperClearanceChanged);
        true
    }

    /// Sets the stop mask configuration. Returns whether the value changed.
    pub fn set_stop_mask(&mut self, config: MaskConfig) -> bool {
        if config == self.stop_mask {
            return false;
        }
        self.stop_mask = config;
        self.on_edited.notify(&FootprintPadEvent::StopMaskChanged);
        true
    }

    /// Sets the solder paste configuration. Returns whether the value
    /// changed.
    pub fn set_solder_paste(&mut self, config: MaskConfig) -> bool {
        if config == self.solder_paste {
            return false;
        }
        self.solder_paste = config;
        self.on_edited.notify(&FootprintPadEvent::SolderPasteChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&FootprintPadEvent::UuidChanged);
        }
        self.set_package_pad(other.package_pad);
        self.set_position(other.position);
        self.set_rotation(other.rotation);
        self.set_shape(other.shape);
        self.set_width(other.width);
        self.set_height(other.height);
        self.set_radius(other.radius);
        self.set_custom_outline(other.custom_outline.clone());
        self.set_drill(other.drill);
        self.set_component_side(other.component_side);
        self.set_function(other.function);
        self.set_copper_clearance(other.copper_clearance);
        self.set_stop_mask(other.stop_mask);
        self.set_solder_paste(other.solder_paste);
    }
}

impl Clone for FootprintPad {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            package_pad: self.package_pad,
            position: self.position,
            rotation: self.rotation,
            shape: self.shape,
            width: self.width,
            height: self.height,
            radius: self.radius,
            custom_outline: self.custom_outline.clone(),
            drill: self.drill,
            component_side: self.component_side,
            function: self.function,
            copper_clearance: self.copper_clearance,
            stop_mask: self.stop_mask,
            solder_paste: self.solder_paste,
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for FootprintPad {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.package_pad == other.package_pad
            && self.position == other.position
            && self.rotation == other.rotation
            && self.shape == other.shape
            && self.width == other.width
            && self.height == other.height
            && self.radius == other.radius
            && self.custom_outline == other.custom_outline
            && self.drill == other.drill
            && self.component_side == other.component_side
            && self.function == other.function
            && self.copper_clearance == other.copper_clearance
            && self.stop_mask == other.stop_mask
            && self.solder_paste == other.solder_paste
    }
}

impl ListItem for FootprintPad {
    const TAG: &'static str = "pad";
    type Event = FootprintPadEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<FootprintPadEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        match self.package_pad {
            Some(uuid) => root.push_value_child("package_pad", uuid),
            None => root.push_value_child("package_pad", "none"),
        }
        root.push_value_child("side", self.component_side);
        root.push_value_child("shape", self.shape);
        serialize_position(root, self.position);
        root.push_value_child("rotation", self.rotation);
        let size = root.append_child("size");
        size.push_token(self.width);
        size.push_token(self.height);
        root.push_value_child("radius", self.radius);
        match self.drill {
            Some(drill) => root.push_value_child("drill", drill),
            None => root.push_value_child("drill", "none"),
        }
        root.push_value_child("function", self.function);
        root.push_value_child("clearance", self.copper_clearance);
        root.push_value_child("stop_mask", self.stop_mask);
        root.push_value_child("solder_paste", self.solder_paste);
        if !self.custom_outline.is_empty() {
            serialize_path(root, &self.custom_outline);
        }
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let package_pad = match node.child_value("package_pad")? {
            "none" => None,
            token => Some(parse_uuid(token)?),
        };
        let size = node.child("size")?;
        let width = PositiveLength::new(Length::from_mm_str(size.value(0).ok_or_else(
            || EditorError::invalid_element("size", "missing width"),
        )?)?)?;
        let height = PositiveLength::new(Length::from_mm_str(size.value(1).ok_or_else(
            || EditorError::invalid_element("size", "missing height"),
        )?)?)?;
        let drill = match node.child_value("drill")? {
            "none" => None,
            token => Some(PositiveLength::new(Length::from_mm_str(token)?)?),
        };
        let shape = PadShape::from_token(node.child_value("shape")?)?;
        let custom_outline = deserialize_path(node)?;
        if shape == PadShape::Custom && custom_outline.is_empty() {
            return Err(EditorError::invalid_element(
                "pad",
                "custom shape requires a non-empty outline",
            ));
        }
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            package_pad,
            deserialize_position(node)?,
            deserialize_angle(node, "rotation")?,
            shape,
            width,
            height,
            UnsignedLimitedRatio::new(Ratio::from_percent_str(node.child_value("radius")?)?)?,
            custom_outline,
            drill,
            ComponentSide::from_token(node.child_value("side")?)?,
            PadFunction::from_token(node.child_value("function")?)?,
            deserialize_unsigned(node, "clearance")?,
            MaskConfig::from_token(node.child_value("stop_mask")?)?,
            MaskConfig::from_token(node.child_value("solder_paste")?)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;

    fn pad() -> FootprintPad {
        FootprintPad::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Point::from_nm(1_000_000, 0),
            Angle::DEG_90,
            PadShape::RoundedRect,
            PositiveLength::from_nm(1_000_000).unwrap(),
            PositiveLength::from_nm(2_000_000).unwrap(),
            UnsignedLimitedRatio::clamped(Ratio::from_percent(25)),
            Path::default(),
            None,
            ComponentSide::Top,
            PadFunction::StandardPad,
            UnsignedLength::ZERO,
            MaskConfig::Auto,
            MaskConfig::Auto,
        )
    }

    #[test]
    fn recommended_radius_targets_quarter_millimetre() {
        // 1 mm x 2 mm pad: 0.25 mm of 1 mm is 25 %.
        let radius = FootprintPad::recommended_radius(
            PositiveLength::from_nm(1_000_000).unwrap(),
            PositiveLength::from_nm(2_000_000).unwrap(),
        );
        assert_eq!(radius.get(), Ratio::from_percent(25));
        // Tiny pads clamp to 50 %.
        let clamped = FootprintPad::recommended_radius(
            PositiveLength::from_nm(300_000).unwrap(),
            PositiveLength::from_nm(300_000).unwrap(),
        );
        assert_eq!(clamped.get(), Ratio::from_percent(50));
    }

    #[test]
    fn tht_iff_drill_present() {
        let mut p = pad();
        assert!(!p.is_tht());
        p.set_drill(Some(PositiveLength::from_nm(800_000).unwrap()));
        assert!(p.is_tht());
    }

    #[test]
    fn serialization_roundtrip() {
        let p = pad();
        let mut node = SExpr::new(FootprintPad::TAG);
        p.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = FootprintPad::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, p);
    }

    #[test]
    fn tht_pad_roundtrip_keeps_drill() {
        let mut p = pad();
        p.set_drill(Some(PositiveLength::from_nm(800_000).unwrap()));
        p.set_package_pad(None);
        let mut node = SExpr::new(FootprintPad::TAG);
        p.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = FootprintPad::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, p);
        assert!(restored.is_tht());
        assert_eq!(restored.package_pad(), None);
    }

    #[test]
    fn custom_shape_requires_outline() {
        let mut p = pad();
        p.set_shape(PadShape::Custom);
        let mut node = SExpr::new(FootprintPad::TAG);
        p.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        assert!(FootprintPad::deserialize(&reparsed, &Version::current_file_format()).is_err());
    }
}
