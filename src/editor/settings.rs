//! Workspace settings of the package editor.
//!
//! Settings are persisted as a small JSON document in the platform's
//! configuration directory and validated on load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::types::{Length, LengthUnit, PositiveLength};

fn default_grid_interval_mm() -> f64 {
    0.635
}

fn default_line_width_mm() -> f64 {
    0.2
}

fn default_text_height_mm() -> f64 {
    1.0
}

/// Persisted editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default, skip_serializing_if = "Option::is_none")]
    _comment: Option<String>,

    /// Grid snap interval in millimetres.
    #[serde(default = "default_grid_interval_mm")]
    pub grid_interval_mm: f64,

    /// Display unit for lengths.
    #[serde(default)]
    pub length_unit: LengthUnit,

    /// Default line width of new polygons and circles, in millimetres.
    #[serde(default = "default_line_width_mm")]
    pub default_line_width_mm: f64,

    /// Default height of new texts, in millimetres.
    #[serde(default = "default_text_height_mm")]
    pub default_text_height_mm: f64,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            _comment: None,
            grid_interval_mm: default_grid_interval_mm(),
            length_unit: LengthUnit::default(),
            default_line_width_mm: default_line_width_mm(),
            default_text_height_mm: default_text_height_mm(),
        }
    }
}

impl WorkspaceSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UserError`] if any value is out of range.
    pub fn validate(&self) -> EditorResult<()> {
        if !(self.grid_interval_mm > 0.0) {
            return Err(EditorError::user(format!(
                "Invalid grid interval: {} mm",
                self.grid_interval_mm
            )));
        }
        if self.default_line_width_mm < 0.0 {
            return Err(EditorError::user(format!(
                "Invalid default line width: {} mm",
                self.default_line_width_mm
            )));
        }
        if !(self.default_text_height_mm > 0.0) {
            return Err(EditorError::user(format!(
                "Invalid default text height: {} mm",
                self.default_text_height_mm
            )));
        }
        Ok(())
    }

    /// The grid interval as a typed length.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] if the stored value is not a
    /// positive length.
    pub fn grid_interval(&self) -> EditorResult<PositiveLength> {
        PositiveLength::new(Length::from_mm(self.grid_interval_mm)?)
    }

    /// The default settings file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pcb-package-editor").join("settings.json"))
    }

    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns read, parse or validation errors.
    pub fn load(path: &Path) -> EditorResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| EditorError::file_read(path, source))?;
        let settings: Self = serde_json::from_str(&content).map_err(|source| {
            EditorError::user(format!("Failed to parse settings file: {source}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns write errors.
    pub fn save(&self, path: &Path) -> EditorResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| EditorError::file_write(parent.to_path_buf(), source))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|source| EditorError::user(format!("Failed to encode settings: {source}")))?;
        fs::write(path, content).map_err(|source| EditorError::file_write(path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = WorkspaceSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grid_interval().unwrap().to_nm(), 635_000);
    }

    #[test]
    fn parse_minimal_document() {
        let settings: WorkspaceSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.length_unit, LengthUnit::Millimeters);
    }

    #[test]
    fn reject_unknown_fields() {
        let result: Result<WorkspaceSettings, _> =
            serde_json::from_str(r#"{"unknown_field": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn reject_invalid_grid() {
        let settings: WorkspaceSettings =
            serde_json::from_str(r#"{"grid_interval_mm": 0.0}"#).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = WorkspaceSettings::default();
        settings.length_unit = LengthUnit::Mils;
        settings.save(&path).unwrap();
        let loaded = WorkspaceSettings::load(&path).unwrap();
        assert_eq!(loaded.length_unit, LengthUnit::Mils);
    }
}
