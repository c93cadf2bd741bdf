//! Graphics layer names.
//!
//! Layer identity is the name itself; the predicate keeps names lowercase
//! snake case so they can be embedded into the file format verbatim.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{EditorError, EditorResult};

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[a-z][a-z0-9_]{0,39}$").expect("valid layer name regex"))
}

/// A validated graphics layer name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphicsLayerName(String);

impl GraphicsLayerName {
    /// Creates a layer name.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the name does not match
    /// `^[a-z][a-z0-9_]{0,39}$`.
    pub fn new(name: impl Into<String>) -> EditorResult<Self> {
        let name = name.into();
        if !name_regex().is_match(&name) {
            return Err(EditorError::invalid_value("GraphicsLayerName", name));
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maps `top_*` layers to `bot_*` and vice versa; side-less layers are
    /// returned unchanged.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        if let Some(rest) = self.0.strip_prefix("top_") {
            Self(format!("bot_{rest}"))
        } else if let Some(rest) = self.0.strip_prefix("bot_") {
            Self(format!("top_{rest}"))
        } else {
            self.clone()
        }
    }

    /// Whether polygons on this layer conventionally represent areas rather
    /// than outlines (drawn with zero line width).
    #[must_use]
    pub fn polygons_represent_areas(&self) -> bool {
        matches!(
            self.0.strip_prefix("top_").or_else(|| self.0.strip_prefix("bot_")),
            Some("stop_mask" | "solder_paste" | "glue" | "courtyard" | "package_outlines")
        )
    }

    fn known(name: &'static str) -> Self {
        debug_assert!(name_regex().is_match(name));
        Self(name.to_string())
    }

    /// The `top_legend` layer.
    #[must_use]
    pub fn top_legend() -> Self {
        Self::known("top_legend")
    }

    /// The `top_names` layer.
    #[must_use]
    pub fn top_names() -> Self {
        Self::known("top_names")
    }

    /// The `top_values` layer.
    #[must_use]
    pub fn top_values() -> Self {
        Self::known("top_values")
    }

    /// The `top_copper` layer.
    #[must_use]
    pub fn top_copper() -> Self {
        Self::known("top_copper")
    }

    /// The `top_documentation` layer.
    #[must_use]
    pub fn top_documentation() -> Self {
        Self::known("top_documentation")
    }

    /// The `top_stop_mask` layer.
    #[must_use]
    pub fn top_stop_mask() -> Self {
        Self::known("top_stop_mask")
    }

    /// The `top_courtyard` layer.
    #[must_use]
    pub fn top_courtyard() -> Self {
        Self::known("top_courtyard")
    }

    /// The `board_outlines` layer.
    #[must_use]
    pub fn board_outlines() -> Self {
        Self::known("board_outlines")
    }

    /// The `board_documentation` layer.
    #[must_use]
    pub fn board_documentation() -> Self {
        Self::known("board_documentation")
    }
}

impl fmt::Display for GraphicsLayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layers on which footprint texts may be placed.
#[must_use]
pub fn allowed_text_layers() -> Vec<GraphicsLayerName> {
    let mut layers = vec![
        GraphicsLayerName::board_outlines(),
        GraphicsLayerName::board_documentation(),
    ];
    for side in ["top", "bot"] {
        for kind in [
            "legend",
            "documentation",
            "names",
            "values",
            "copper",
            "courtyard",
            "glue",
            "solder_paste",
            "stop_mask",
        ] {
            layers.push(
                GraphicsLayerName::new(format!("{side}_{kind}")).expect("known layer name"),
            );
        }
    }
    layers
}

/// Layers on which footprint circles and polygons may be placed.
#[must_use]
pub fn allowed_geometry_layers() -> Vec<GraphicsLayerName> {
    let mut layers = allowed_text_layers();
    for side in ["top", "bot"] {
        for kind in ["hidden_grab_areas", "package_outlines"] {
            layers.push(
                GraphicsLayerName::new(format!("{side}_{kind}")).expect("known layer name"),
            );
        }
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate() {
        assert!(GraphicsLayerName::new("top_legend").is_ok());
        assert!(GraphicsLayerName::new("x").is_ok());
        assert!(GraphicsLayerName::new("Top_Legend").is_err());
        assert!(GraphicsLayerName::new("1layer").is_err());
        assert!(GraphicsLayerName::new("").is_err());
        assert!(GraphicsLayerName::new("a".repeat(41)).is_err());
        assert!(GraphicsLayerName::new("a".repeat(40)).is_ok());
    }

    #[test]
    fn mirroring_swaps_sides() {
        assert_eq!(
            GraphicsLayerName::top_legend().mirrored().as_str(),
            "bot_legend"
        );
        assert_eq!(
            GraphicsLayerName::new("bot_copper").unwrap().mirrored(),
            GraphicsLayerName::top_copper()
        );
        assert_eq!(
            GraphicsLayerName::board_outlines().mirrored(),
            GraphicsLayerName::board_outlines()
        );
    }

    #[test]
    fn area_layers() {
        assert!(GraphicsLayerName::top_stop_mask().polygons_represent_areas());
        assert!(!GraphicsLayerName::top_legend().polygons_represent_areas());
    }

    #[test]
    fn allowed_layer_sets() {
        let text = allowed_text_layers();
        let geometry = allowed_geometry_layers();
        assert!(text.contains(&GraphicsLayerName::top_names()));
        assert!(geometry.len() > text.len());
        assert!(!text
            .iter()
            .any(|l| l.as_str() == "top_hidden_grab_areas"));
    }
}
