//! Configuration module for Thoth Studio
//!
//! This module handles:
//! - Application settings (`config.toml`): Brain server and editor defaults
//! - Application state persistence (`app_state.json`): recent pipelines, UI preferences
//! - Local pipeline files (`.thothpipe.json`) for import/export
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.thoth.studio/`
//! - **macOS**: `~/Library/Application Support/dev.thoth.studio/`
//! - **Windows**: `%APPDATA%\dev.thoth.studio\`
//!
//! # Example
//!
//! ```ignore
//! use thoth_studio::config::{AppConfig, AppState};
//!
//! let config = AppConfig::load_or_default();
//! let mut state = AppState::load_or_default();
//! state.add_recent_pipeline("p-17", "csi gestures");
//! state.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, ThothError};
use crate::pipeline::{DataType, PipelineDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.thoth.studio";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Settings filename
pub const CONFIG_FILE: &str = "config.toml";

/// Local pipeline file extension (without the leading dot)
pub const PIPELINE_FILE_EXTENSION: &str = "thothpipe.json";

/// Maximum number of recent pipelines to remember
pub const MAX_RECENT_PIPELINES: usize = 10;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        ThothError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            ThothError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

/// Get the path to the settings file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Recent Pipeline Entry ====================

/// A pipeline recently opened from or saved to the Brain server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPipeline {
    /// Server-assigned pipeline id
    pub id: String,

    pub name: String,

    pub opened_at: DateTime<Utc>,
}

impl RecentPipeline {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opened_at: Utc::now(),
        }
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// User history and preferences kept across sessions. Unsaved graphs are
/// never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Recently opened pipelines, most recent first
    #[serde(default)]
    pub recent_pipelines: Vec<RecentPipeline>,

    /// Data type selected when the app was last closed
    #[serde(default)]
    pub last_data_type: Option<DataType>,

    /// Directory of the last imported/exported pipeline file
    #[serde(default)]
    pub last_file_dir: Option<PathBuf>,

    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            recent_pipelines: Vec::new(),
            last_data_type: None,
            last_file_dir: None,
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            ThothError::Config("Could not determine app state path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load app state from `path`; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ThothError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| ThothError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ThothError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| ThothError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Add or refresh a recent pipeline
    pub fn add_recent_pipeline(&mut self, id: &str, name: &str) {
        self.recent_pipelines.retain(|p| p.id != id);
        self.recent_pipelines.insert(0, RecentPipeline::new(id, name));
        self.recent_pipelines.truncate(MAX_RECENT_PIPELINES);
    }

    /// Forget a pipeline (e.g. deleted on the server)
    pub fn remove_recent_pipeline(&mut self, id: &str) {
        self.recent_pipelines.retain(|p| p.id != id);
    }
}

/// UI preferences that persist across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Draw the background grid on the canvas
    #[serde(default = "default_true")]
    pub show_grid: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_grid: true,
        }
    }
}

// ==================== Pipeline File ====================

/// A pipeline document stored on the local filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFile {
    #[serde(default = "default_pipeline_file_version")]
    pub version: u32,

    /// Data type the pipeline was built for
    #[serde(default)]
    pub data_type: DataType,

    pub pipeline: PipelineDocument,
}

fn default_pipeline_file_version() -> u32 {
    1
}

impl PipelineFile {
    pub fn new(pipeline: PipelineDocument, data_type: DataType) -> Self {
        Self {
            version: 1,
            data_type,
            pipeline,
        }
    }

    /// Load a pipeline file from disk
    ///
    /// A bare `PipelineDocument` (as returned by the Brain API) is accepted
    /// too and gets the default data type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ThothError::Config(format!("Failed to read pipeline file {:?}: {}", path, e))
        })?;

        let file = match serde_json::from_str::<Self>(&content) {
            Ok(file) => file,
            Err(_) => serde_json::from_str::<PipelineDocument>(&content)
                .map(|doc| Self::new(doc, DataType::default()))
                .map_err(|e| {
                    ThothError::Config(format!("Failed to parse pipeline file {:?}: {}", path, e))
                })?,
        };
        file.pipeline.check_unique_ids()?;
        Ok(file)
    }

    /// Save the pipeline file to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ThothError::Config(format!("Failed to create pipeline directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ThothError::Config(format!("Failed to serialize pipeline: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ThothError::Config(format!("Failed to write pipeline file {:?}: {}", path, e))
        })
    }
}

/// Append the pipeline file extension unless already present
pub fn with_pipeline_extension(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let has_ext = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&format!(".{}", PIPELINE_FILE_EXTENSION)));
    if has_ext {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(format!(".{}", PIPELINE_FILE_EXTENSION));
        PathBuf::from(name)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::templates;

    #[test]
    fn test_app_state_default() {
        let state = AppState::default();
        assert!(state.recent_pipelines.is_empty());
        assert!(state.ui_preferences.dark_mode);
        assert_eq!(state.version, 1);
    }

    #[test]
    fn test_add_recent_pipeline() {
        let mut state = AppState::default();
        state.add_recent_pipeline("p-1", "Pipeline 1");
        state.add_recent_pipeline("p-2", "Pipeline 2");
        assert_eq!(state.recent_pipelines[0].id, "p-2"); // Most recent first

        // Same id again updates, not duplicates
        state.add_recent_pipeline("p-1", "Renamed");
        assert_eq!(state.recent_pipelines.len(), 2);
        assert_eq!(state.recent_pipelines[0].name, "Renamed");

        state.remove_recent_pipeline("p-2");
        assert_eq!(state.recent_pipelines.len(), 1);
    }

    #[test]
    fn test_recent_pipelines_max_limit() {
        let mut state = AppState::default();
        for i in 0..15 {
            state.add_recent_pipeline(&format!("p-{}", i), "x");
        }
        assert_eq!(state.recent_pipelines.len(), MAX_RECENT_PIPELINES);
    }

    #[test]
    fn test_app_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);

        let mut state = AppState::default();
        state.add_recent_pipeline("p-3", "imu windows");
        state.last_data_type = Some(DataType::Imu);
        state.ui_preferences.show_grid = false;
        state.save_to(&path).unwrap();

        let loaded = AppState::load_from(&path).unwrap();
        assert_eq!(loaded.recent_pipelines, state.recent_pipelines);
        assert_eq!(loaded.last_data_type, Some(DataType::Imu));
        assert!(!loaded.ui_preferences.show_grid);
    }

    #[test]
    fn test_app_state_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load_from(dir.path().join("nope.json")).unwrap();
        assert!(state.recent_pipelines.is_empty());
    }

    #[test]
    fn test_pipeline_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("basic.thothpipe.json");
        let template = templates::find("CSI basic").unwrap();

        PipelineFile::new(template.document(), template.data_type)
            .save(&path)
            .unwrap();
        let loaded = PipelineFile::load(&path).unwrap();
        assert_eq!(loaded.data_type, DataType::Csi);
        assert_eq!(loaded.pipeline, template.document());
    }

    #[test]
    fn test_pipeline_file_accepts_bare_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.json");
        std::fs::write(&path, r#"{"id": "p-1", "name": "bare", "blocks": [], "connections": []}"#)
            .unwrap();
        let loaded = PipelineFile::load(&path).unwrap();
        assert_eq!(loaded.pipeline.id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_with_pipeline_extension() {
        assert_eq!(
            with_pipeline_extension("/tmp/a"),
            PathBuf::from("/tmp/a.thothpipe.json")
        );
        assert_eq!(
            with_pipeline_extension("/tmp/a.thothpipe.json"),
            PathBuf::from("/tmp/a.thothpipe.json")
        );
    }
}
