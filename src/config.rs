//! Configuration management
//!
//! Load and save user preferences to a TOML config file.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::Layout;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorPreferences,
    pub export: ExportPreferences,
    pub ui: UiPreferences,
}

impl Config {
    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Invalid config {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = project_dirs() {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("facecard.toml"))
        }
    }

    /// Directory holding the persisted editor state and the log file
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.editor.storage_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".facecard"))
    }

    /// Directory export files are written to
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "facecard", "facecard")
}

/// Editor preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

/// Export preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub pixel_ratio: f32,
    pub comparison_pixel_ratio: f32,
    pub gutter: u32,
    pub caption_height: u32,
    pub image_timeout_ms: u64,
    pub frame_padding_x: f32,
    pub frame_padding_y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_font_path: Option<PathBuf>,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            output_dir: None,
            pixel_ratio: 3.0,
            comparison_pixel_ratio: 2.0,
            gutter: 40,
            caption_height: 60,
            image_timeout_ms: 3000,
            frame_padding_x: 100.0,
            frame_padding_y: 120.0,
            font_path: None,
            bold_font_path: None,
        }
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Percentage the comparison slider moves per key press
    pub slider_step: u16,
    pub show_hints: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            slider_step: 5,
            show_hints: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.layout, Layout::Dual);
        assert_eq!(config.export.pixel_ratio, 3.0);
        assert_eq!(config.export.gutter, 40);
        assert_eq!(config.export.image_timeout_ms, 3000);
        assert!(config.ui.show_hints);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str("[editor]\nlayout = \"single\"\n").unwrap();
        assert_eq!(parsed.editor.layout, Layout::Single);
        assert_eq!(parsed.export.caption_height, 60);
        assert_eq!(parsed.ui.slider_step, 5);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg/config.toml");
        let mut config = Config::default();
        config.export.output_dir = Some(dir.path().to_path_buf());
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
