//! Stroke texts rendered with a vector font.

use std::cell::RefCell;
use std::fmt;

use uuid::Uuid;

use super::{deserialize_angle, deserialize_bool, deserialize_position, deserialize_positive,
            deserialize_unsigned, serialize_position};
use crate::error::{EditorError, EditorResult};
use crate::list::ListItem;
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::{parse_uuid, Alignment, Angle, GraphicsLayerName, Path, Point, PositiveLength,
                   Ratio, UnsignedLength, Version};

/// Letter or line spacing of a stroke text: automatic (from the font) or an
/// explicit ratio of the text height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrokeTextSpacing {
    /// Use the font's recommended spacing.
    #[default]
    Auto,
    /// Explicit spacing relative to the text height.
    Ratio(Ratio),
}

impl StrokeTextSpacing {
    /// Parses the file format token (`auto` or a percent value).
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] on malformed input.
    pub fn from_token(token: &str) -> EditorResult<Self> {
        match token {
            "auto" => Ok(Self::Auto),
            value => Ok(Self::Ratio(Ratio::from_percent_str(value)?)),
        }
    }
}

impl fmt::Display for StrokeTextSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Ratio(ratio) => ratio.fmt(f),
        }
    }
}

/// Produces stroke paths for a laid-out text. Implemented by the font
/// collaborator of the rendering layer; the core only caches the result.
pub trait StrokeFont {
    /// Lays out `text` and returns its stroke paths in text-local
    /// coordinates.
    fn layout(
        &self,
        text: &str,
        height: PositiveLength,
        stroke_width: UnsignedLength,
        letter_spacing: StrokeTextSpacing,
        line_spacing: StrokeTextSpacing,
        align: Alignment,
    ) -> Vec<Path>;
}

/// Field-change events of a [`StrokeText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeTextEvent {
    /// The uuid was reassigned.
    UuidChanged,
    /// The layer changed.
    LayerChanged,
    /// The text changed.
    TextChanged,
    /// The position changed.
    PositionChanged,
    /// The rotation changed.
    RotationChanged,
    /// The height changed.
    HeightChanged,
    /// The stroke width changed.
    StrokeWidthChanged,
    /// The letter spacing changed.
    LetterSpacingChanged,
    /// The line spacing changed.
    LineSpacingChanged,
    /// The alignment changed.
    AlignChanged,
    /// The mirror flag changed.
    MirroredChanged,
    /// The auto-rotate flag changed.
    AutoRotateChanged,
    /// The cached stroke paths were invalidated.
    PathsChanged,
}

/// A text drawn with stroke font paths on a footprint graphics layer.
///
/// The rendered paths are cached; every setter that affects layout drops the
/// cache and emits [`StrokeTextEvent::PathsChanged`] so the scene graph can
/// re-request them.
#[derive(Debug)]
pub struct StrokeText {
    uuid: Uuid,
    layer: GraphicsLayerName,
    text: String,
    position: Point,
    rotation: Angle,
    height: PositiveLength,
    stroke_width: UnsignedLength,
    letter_spacing: StrokeTextSpacing,
    line_spacing: StrokeTextSpacing,
    align: Alignment,
    mirrored: bool,
    auto_rotate: bool,
    cached_paths: RefCell<Option<Vec<Path>>>,
    on_edited: Signal<StrokeTextEvent>,
}

impl StrokeText {
    /// Creates a stroke text.
    #[allow(clippy::too_many_arguments)] // mirrors the file format fields
    #[must_use]
    pub fn new(
        uuid: Uuid,
        layer: GraphicsLayerName,
        text: String,
        position: Point,
        rotation: Angle,
        height: PositiveLength,
        stroke_width: UnsignedLength,
        letter_spacing: StrokeTextSpacing,
        line_spacing: StrokeTextSpacing,
        align: Alignment,
        mirrored: bool,
        auto_rotate: bool,
    ) -> Self {
        Self {
            uuid,
            layer,
            text,
            position,
            rotation,
            height,
            stroke_width,
            letter_spacing,
            line_spacing,
            align,
            mirrored,
            auto_rotate,
            cached_paths: RefCell::new(None),
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

    /// The layer.
    #[must_use]
    pub fn layer(&self) -> &GraphicsLayerName {
        &self.layer
    }

    /// The raw text, possibly containing `{{NAME}}`-style placeholders.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
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

    /// The glyph height.
    #[must_use]
    pub fn height(&self) -> PositiveLength {
        self.height
    }

    /// The stroke width.
    #[must_use]
    pub fn stroke_width(&self) -> UnsignedLength {
        self.stroke_width
    }

    /// The letter spacing.
    #[must_use]
    pub fn letter_spacing(&self) -> StrokeTextSpacing {
        self.letter_spacing
    }

    /// The line spacing.
    #[must_use]
    pub fn line_spacing(&self) -> StrokeTextSpacing {
        self.line_spacing
    }

    /// The text alignment relative to the position.
    #[must_use]
    pub fn align(&self) -> Alignment {
        self.align
    }

    /// Whether the text is mirrored for the bottom side.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Whether the text flips automatically to stay readable.
    #[must_use]
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// The text with `{{KEY}}` placeholders substituted through `lookup`.
    /// Unknown placeholders are kept verbatim.
    #[must_use]
    pub fn substituted_text(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match lookup(key.trim()) {
                        Some(value) => out.push_str(&value),
                        None => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// The cached stroke paths, laid out through `font` on a cache miss.
    #[must_use]
    pub fn paths(&self, font: &dyn StrokeFont) -> Vec<Path> {
        let mut cache = self.cached_paths.borrow_mut();
        if cache.is_none() {
            *cache = Some(font.layout(
                &self.text,
                self.height,
                self.stroke_width,
                self.letter_spacing,
                self.line_spacing,
                self.align,
            ));
        }
        cache.clone().unwrap_or_default()
    }

    fn invalidate_paths(&self) {
        if self.cached_paths.borrow_mut().take().is_some() {
            self.on_edited.notify(&StrokeTextEvent::PathsChanged);
        }
    }

    /// Sets the layer. Returns whether the value changed.
    pub fn set_layer(&mut self, layer: GraphicsLayerName) -> bool {
        if layer == self.layer {
            return false;
        }
        self.layer = layer;
        self.on_edited.notify(&StrokeTextEvent::LayerChanged);
        true
    }

    /// Sets the text. Returns whether the value changed.
    pub fn set_text(&mut self, text: String) -> bool {
        if text == self.text {
            return false;
        }
        self.text = text;
        self.on_edited.notify(&StrokeTextEvent::TextChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the position. Returns whether the value changed.
    pub fn set_position(&mut self, position: Point) -> bool {
        if position == self.position {
            return false;
        }
        self.position = position;
        self.on_edited.notify(&StrokeTextEvent::PositionChanged);
        true
    }

    /// Sets the rotation. Returns whether the value changed.
    pub fn set_rotation(&mut self, rotation: Angle) -> bool {
        if rotation == self.rotation {
            return false;
        }
        self.rotation = rotation;
        self.on_edited.notify(&StrokeTextEvent::RotationChanged);
        true
    }

    /// Sets the glyph height. Returns whether the value changed.
    pub fn set_height(&mut self, height: PositiveLength) -> bool {
        if height == self.height {
            return false;
        }
        self.height = height;
        self.on_edited.notify(&StrokeTextEvent::HeightChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the stroke width. Returns whether the value changed.
    pub fn set_stroke_width(&mut self, stroke_width: UnsignedLength) -> bool {
        if stroke_width == self.stroke_width {
            return false;
        }
        self.stroke_width = stroke_width;
        self.on_edited.notify(&StrokeTextEvent::StrokeWidthChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the letter spacing. Returns whether the value changed.
    pub fn set_letter_spacing(&mut self, spacing: StrokeTextSpacing) -> bool {
        if spacing == self.letter_spacing {
            return false;
        }
        self.letter_spacing = spacing;
        self.on_edited.notify(&StrokeTextEvent::LetterSpacingChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the line spacing. Returns whether the value changed.
    pub fn set_line_spacing(&mut self, spacing: StrokeTextSpacing) -> bool {
        if spacing == self.line_spacing {
            return false;
        }
        self.line_spacing = spacing;
        self.on_edited.notify(&StrokeTextEvent::LineSpacingChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the alignment. Returns whether the value changed.
    pub fn set_align(&mut self, align: Alignment) -> bool {
        if align == self.align {
            return false;
        }
        self.align = align;
        self.on_edited.notify(&StrokeTextEvent::AlignChanged);
        self.invalidate_paths();
        true
    }

    /// Sets the mirror flag. Returns whether the value changed.
    pub fn set_mirrored(&mut self, mirrored: bool) -> bool {
        if mirrored == self.mirrored {
            return false;
        }
        self.mirrored = mirrored;
        self.on_edited.notify(&StrokeTextEvent::MirroredChanged);
        true
    }

    /// Sets the auto-rotate flag. Returns whether the value changed.
    pub fn set_auto_rotate(&mut self, auto_rotate: bool) -> bool {
        if auto_rotate == self.auto_rotate {
            return false;
        }
        self.auto_rotate = auto_rotate;
        self.on_edited.notify(&StrokeTextEvent::AutoRotateChanged);
        true
    }

    /// Copies all fields from `other`, reassigning the uuid first and then
    /// emitting one event per actually changed field.
    pub fn assign(&mut self, other: &Self) {
        if self.uuid != other.uuid {
            self.uuid = other.uuid;
            self.on_edited.notify(&StrokeTextEvent::UuidChanged);
        }
        self.set_layer(other.layer.clone());
        self.set_text(other.text.clone());
        self.set_position(other.position);
        self.set_rotation(other.rotation);
        self.set_height(other.height);
        self.set_stroke_width(other.stroke_width);
        self.set_letter_spacing(other.letter_spacing);
        self.set_line_spacing(other.line_spacing);
        self.set_align(other.align);
        self.set_mirrored(other.mirrored);
        self.set_auto_rotate(other.auto_rotate);
    }
}

impl Clone for StrokeText {
    fn clone(&self) -> Self {
        Self {
            uuid: self.uuid,
            layer: self.layer.clone(),
            text: self.text.clone(),
            position: self.position,
            rotation: self.rotation,
            height: self.height,
            stroke_width: self.stroke_width,
            letter_spacing: self.letter_spacing,
            line_spacing: self.line_spacing,
            align: self.align,
            mirrored: self.mirrored,
            auto_rotate: self.auto_rotate,
            cached_paths: RefCell::new(None),
            on_edited: Signal::new(),
        }
    }
}

impl PartialEq for StrokeText {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.layer == other.layer
            && self.text == other.text
            && self.position == other.position
            && self.rotation == other.rotation
            && self.height == other.height
            && self.stroke_width == other.stroke_width
            && self.letter_spacing == other.letter_spacing
            && self.line_spacing == other.line_spacing
            && self.align == other.align
            && self.mirrored == other.mirrored
            && self.auto_rotate == other.auto_rotate
    }
}

impl ListItem for StrokeText {
    const TAG: &'static str = "stroke_text";
    type Event = StrokeTextEvent;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn on_edited(&self) -> &Signal<StrokeTextEvent> {
        &self.on_edited
    }

    fn serialize(&self, root: &mut SExpr) {
        root.push_token(self.uuid);
        root.push_value_child("layer", &self.layer);
        root.push_value_child("height", self.height);
        root.push_value_child("stroke_width", self.stroke_width);
        root.push_value_child("letter_spacing", self.letter_spacing);
        root.push_value_child("line_spacing", self.line_spacing);
        root.push_value_child("align", self.align);
        serialize_position(root, self.position);
        root.push_value_child("rotation", self.rotation);
        root.push_value_child("auto_rotate", self.auto_rotate);
        root.push_value_child("mirror", self.mirrored);
        root.push_text_child("value", self.text.clone());
    }

    fn deserialize(node: &SExpr, _format: &Version) -> EditorResult<Self> {
        let align_node = node.child("align")?;
        let align = Alignment::from_tokens(
            align_node
                .value(0)
                .ok_or_else(|| EditorError::invalid_element("align", "missing tokens"))?,
            align_node
                .value(1)
                .ok_or_else(|| EditorError::invalid_element("align", "missing tokens"))?,
        )?;
        Ok(Self::new(
            parse_uuid(node.first_value()?)?,
            GraphicsLayerName::new(node.child_value("layer")?)?,
            node.child_value("value")?.to_string(),
            deserialize_position(node)?,
            deserialize_angle(node, "rotation")?,
            deserialize_positive(node, "height")?,
            deserialize_unsigned(node, "stroke_width")?,
            StrokeTextSpacing::from_token(node.child_value("letter_spacing")?)?,
            StrokeTextSpacing::from_token(node.child_value("line_spacing")?)?,
            align,
            deserialize_bool(node, "mirror")?,
            deserialize_bool(node, "auto_rotate")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parser::parse;
    use crate::sexp::writer::write;
    use crate::types::{HAlign, VAlign};
    use std::rc::Rc;

    struct FakeFont;

    impl StrokeFont for FakeFont {
        fn layout(
            &self,
            text: &str,
            _height: PositiveLength,
            _stroke_width: UnsignedLength,
            _letter_spacing: StrokeTextSpacing,
            _line_spacing: StrokeTextSpacing,
            _align: Alignment,
        ) -> Vec<Path> {
            // One path per character is plenty for cache behavior tests.
            (0..text.chars().count()).map(|_| Path::default()).collect()
        }
    }

    fn text() -> StrokeText {
        StrokeText::new(
            Uuid::new_v4(),
            GraphicsLayerName::top_names(),
            "{{NAME}}".to_string(),
            Point::from_nm(0, 0),
            Angle::DEG_0,
            PositiveLength::from_nm(1_000_000).unwrap(),
            UnsignedLength::from_nm(200_000).unwrap(),
            StrokeTextSpacing::Auto,
            StrokeTextSpacing::Auto,
            Alignment::new(HAlign::Center, VAlign::Bottom),
            false,
            true,
        )
    }

    #[test]
    fn placeholder_substitution() {
        let t = text();
        let substituted = t.substituted_text(|key| match key {
            "NAME" => Some("R1".to_string()),
            _ => None,
        });
        assert_eq!(substituted, "R1");
        let kept = t.substituted_text(|_| None);
        assert_eq!(kept, "{{NAME}}");
    }

    #[test]
    fn cache_invalidation_emits_paths_changed() {
        let mut t = text();
        let events = Rc::new(RefCell::new(Vec::new()));
        let events2 = Rc::clone(&events);
        let _sub = t.on_edited().subscribe(move |e| events2.borrow_mut().push(*e));

        assert_eq!(t.paths(&FakeFont).len(), 8);
        t.set_height(PositiveLength::from_nm(2_000_000).unwrap());
        assert_eq!(
            *events.borrow(),
            vec![StrokeTextEvent::HeightChanged, StrokeTextEvent::PathsChanged]
        );
        // Moving does not affect layout, so the cache survives.
        events.borrow_mut().clear();
        let _ = t.paths(&FakeFont);
        t.set_position(Point::from_nm(1, 1));
        assert_eq!(*events.borrow(), vec![StrokeTextEvent::PositionChanged]);
    }

    #[test]
    fn serialization_roundtrip() {
        let t = text();
        let mut node = SExpr::new(StrokeText::TAG);
        t.serialize(&mut node);
        let reparsed = parse(&write(&node)).unwrap();
        let restored = StrokeText::deserialize(&reparsed, &Version::current_file_format()).unwrap();
        assert_eq!(restored, t);
    }
}
