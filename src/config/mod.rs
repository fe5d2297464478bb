use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{LayoutParams, Viewport};

pub const CONFIG_FILE: &str = "locograph.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub link_distance: Option<f64>,
    #[serde(default)]
    pub charge_strength: Option<f64>,
    #[serde(default)]
    pub center_strength: Option<f64>,
    #[serde(default)]
    pub collide_radius: Option<f64>,
    #[serde(default)]
    pub collide_iterations: Option<usize>,
    #[serde(default)]
    pub axis_strength: Option<f64>,
    #[serde(default)]
    pub friction: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewportConfig {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl AppConfig {
    /// File values override built-in defaults; CLI flags are applied on top
    /// by the caller.
    pub fn layout_params(&self) -> LayoutParams {
        let mut params = LayoutParams::default();
        if let Some(value) = self.layout.link_distance {
            params.link_distance = value;
        }
        if let Some(value) = self.layout.charge_strength {
            params.charge_strength = value;
        }
        if let Some(value) = self.layout.center_strength {
            params.center_strength = value;
        }
        if let Some(value) = self.layout.collide_radius {
            params.collide_radius = value;
        }
        if let Some(value) = self.layout.collide_iterations {
            params.collide_iterations = value;
        }
        if let Some(value) = self.layout.axis_strength {
            params.axis_strength = value;
        }
        if let Some(value) = self.layout.friction {
            params.friction = value;
        }
        params
    }

    pub fn viewport(&self) -> Viewport {
        let mut viewport = Viewport::default();
        if let Some(width) = self.viewport.width {
            viewport.width = width;
        }
        if let Some(height) = self.viewport.height {
            viewport.height = height;
        }
        viewport
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// An explicit path must exist; otherwise `locograph.toml` in the working
/// directory is used when present, else built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let local = Path::new(CONFIG_FILE);
    if local.is_file() {
        return load_config(local);
    }
    Ok(AppConfig::default())
}
