//! Serialization round-trips over a fully populated package.

use uuid::Uuid;

use pcb_package_editor::geometry::{Circle, Hole, MaskConfig, Polygon, StrokeText,
                                   StrokeTextSpacing, Zone, ZoneLayers, ZoneRules};
use pcb_package_editor::library::fs::TransactionalFs;
use pcb_package_editor::library::{AssemblyType, ComponentSide, Footprint, FootprintPad, Package,
                                  PackageModel, PackagePad, PadFunction, PadShape};
use pcb_package_editor::list::ListItem;
use pcb_package_editor::sexp::{parser, writer};
use pcb_package_editor::types::{Alignment, Angle, CircuitIdentifier, GraphicsLayerName, HAlign,
                                Path, Point, PositiveLength, Ratio, UnsignedLength,
                                UnsignedLimitedRatio, VAlign, Version, Vertex};
use pcb_package_editor::shared;

fn populated_package() -> Package {
    let mut package = Package::new(
        Uuid::new_v4(),
        "LQFP-32".to_string(),
        Version::parse("1.0.2").unwrap(),
    );
    package.set_description("32-pin quad flat package".to_string());
    package.set_author("test".to_string());
    package.set_assembly_type(AssemblyType::Smt);

    let pad1 = shared(PackagePad::new(
        Uuid::new_v4(),
        CircuitIdentifier::new("1").unwrap(),
    ));
    package.pads().append(pad1.clone());
    package.pads().append(shared(PackagePad::new(
        Uuid::new_v4(),
        CircuitIdentifier::new("2").unwrap(),
    )));
    package
        .models()
        .append(shared(PackageModel::new(Uuid::new_v4(), "body".to_string())));

    let footprint = Footprint::new(Uuid::new_v4(), "default".to_string());
    footprint.pads().append(shared(FootprintPad::new(
        Uuid::new_v4(),
        Some(pad1.borrow().uuid()),
        Point::from_nm(-750_000, 0),
        Angle::DEG_90,
        PadShape::RoundedRect,
        PositiveLength::from_nm(600_000).unwrap(),
        PositiveLength::from_nm(1_200_000).unwrap(),
        UnsignedLimitedRatio::clamped(Ratio::from_percent(25)),
        Path::default(),
        None,
        ComponentSide::Top,
        PadFunction::StandardPad,
        UnsignedLength::ZERO,
        MaskConfig::Auto,
        MaskConfig::Auto,
    )));
    footprint.circles().append(shared(Circle::new(
        Uuid::new_v4(),
        GraphicsLayerName::top_legend(),
        UnsignedLength::from_nm(200_000).unwrap(),
        false,
        true,
        Point::from_nm(0, 1_000_000),
        PositiveLength::from_nm(300_000).unwrap(),
    )));
    footprint.polygons().append(shared(Polygon::new(
        Uuid::new_v4(),
        GraphicsLayerName::new("top_package_outlines").unwrap(),
        UnsignedLength::ZERO,
        true,
        false,
        Path::new(vec![
            Vertex::new(Point::from_nm(-1_000_000, -1_000_000)),
            Vertex::with_angle(Point::from_nm(1_000_000, -1_000_000), Angle::DEG_90),
            Vertex::new(Point::from_nm(1_000_000, 1_000_000)),
            Vertex::new(Point::from_nm(-1_000_000, -1_000_000)),
        ]),
    )));
    footprint.stroke_texts().append(shared(StrokeText::new(
        Uuid::new_v4(),
        GraphicsLayerName::top_names(),
        "{{NAME}}".to_string(),
        Point::from_nm(0, 2_000_000),
        Angle::DEG_0,
        PositiveLength::from_nm(1_000_000).unwrap(),
        UnsignedLength::from_nm(200_000).unwrap(),
        StrokeTextSpacing::Auto,
        StrokeTextSpacing::Ratio(Ratio::from_percent(120)),
        Alignment::new(HAlign::Center, VAlign::Bottom),
        false,
        true,
    )));
    footprint.zones().append(shared(Zone::new(
        Uuid::new_v4(),
        ZoneLayers::TOP | ZoneLayers::INNER,
        ZoneRules::NO_COPPER | ZoneRules::NO_EXPOSURE,
        Path::new(vec![
            Vertex::new(Point::from_nm(0, 0)),
            Vertex::new(Point::from_nm(500_000, 0)),
            Vertex::new(Point::from_nm(500_000, 500_000)),
            Vertex::new(Point::from_nm(0, 0)),
        ]),
    )));
    footprint.holes().append(shared(Hole::new(
        Uuid::new_v4(),
        Point::from_nm(0, -2_000_000),
        PositiveLength::from_nm(1_100_000).unwrap(),
        UnsignedLength::from_nm(600_000).unwrap(),
        Angle::DEG_45,
        MaskConfig::Manual(pcb_package_editor::types::Length::from_nm(50_000)),
    )));
    package.footprints().append(shared(footprint));
    package
}

#[test]
fn package_document_roundtrip() {
    let package = populated_package();
    let text = writer::write(&package.serialize());
    let reparsed = parser::parse(&text).unwrap();
    let restored = Package::deserialize(&reparsed).unwrap();
    assert_eq!(restored, package);
}

#[test]
fn roundtrip_is_textually_stable() {
    let package = populated_package();
    let first = writer::write(&package.serialize());
    let restored = Package::deserialize(&parser::parse(&first).unwrap()).unwrap();
    let second = writer::write(&restored.serialize());
    assert_eq!(first, second);
}

#[test]
fn save_and_reopen_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let package = populated_package();
    let mut fs = TransactionalFs::open(dir.path());
    package.write_to(&mut fs);
    fs.save().unwrap();

    let reopened = Package::open(&fs).unwrap();
    assert_eq!(reopened, package);
}

#[test]
fn documents_with_unknown_root_are_rejected() {
    let reparsed = parser::parse("(component abc (format_version 0.2))").unwrap();
    assert!(Package::deserialize(&reparsed).is_err());
}
