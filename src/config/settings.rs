//! User-editable settings loaded from `config.toml`
//!
//! # Main Types
//!
//! - [`AppConfig`] - Top-level settings file
//! - [`BackendConfig`] - Brain server location, timeout and credentials
//! - [`EditorConfig`] - Canvas geometry, zoom limits and pipeline defaults
//!
//! Every field has a default, so a partial file (or none at all) is valid.
//! The backend URL can be overridden with the `THOTH_BRAIN_URL`
//! environment variable.

use super::{config_path, ensure_app_data_dir, CONFIG_FILE};
use crate::editor::viewport::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use crate::error::{Result, ThothError};
use crate::pipeline::{CanvasBounds, DataType, ShapeConvention};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`BackendConfig::base_url`]
pub const BRAIN_URL_ENV: &str = "THOTH_BRAIN_URL";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub editor: EditorConfig,
}

/// Brain server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the pipeline API, e.g. `http://localhost:8000/api`
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Optional bearer token sent with every request
    pub auth_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 10_000,
            auth_token: None,
        }
    }
}

/// Pipeline editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub block_width: f32,
    pub block_height: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,

    /// Data type of a fresh pipeline when no previous session is remembered
    pub default_data_type: DataType,

    pub shape_convention: ShapeConvention,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let bounds = CanvasBounds::default();
        Self {
            canvas_width: bounds.width,
            canvas_height: bounds.height,
            block_width: bounds.block_width,
            block_height: bounds.block_height,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            default_data_type: DataType::Csi,
            shape_convention: ShapeConvention::Graph,
        }
    }
}

impl EditorConfig {
    pub fn bounds(&self) -> CanvasBounds {
        CanvasBounds {
            width: self.canvas_width,
            height: self.canvas_height,
            block_width: self.block_width,
            block_height: self.block_height,
        }
    }

    /// Zoom limits with the bounds put in order.
    pub fn zoom_range(&self) -> (f32, f32) {
        let min = self.min_zoom.min(self.max_zoom);
        let max = self.min_zoom.max(self.max_zoom);
        (min, max)
    }
}

impl AppConfig {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        let path = config_path()
            .ok_or_else(|| ThothError::Config("Could not determine config path".to_string()))?;
        Self::load_from(&path)
    }

    /// Load settings from `path`; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ThothError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ThothError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load settings with environment overrides, falling back to defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        });
        config.apply_env_overrides();
        config
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ThothError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| ThothError::Config(format!("Failed to write config: {}", e)))
    }

    /// Apply `THOTH_BRAIN_URL` if set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BRAIN_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::info!("Using Brain URL from {}: {}", BRAIN_URL_ENV, url);
                self.backend.base_url = url.to_string();
            }
        }
    }
}
