//! Configuration file handling for camview.
//!
//! Loads configuration from `<config dir>/camview/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Platform cameras (requires the `native-camera` feature)
    Camera,
    /// Generated test pattern
    Pattern,
}

impl Default for Source {
    fn default() -> Self {
        if cfg!(feature = "native-camera") {
            Source::Camera
        } else {
            Source::Pattern
        }
    }
}

/// Configuration file structure for camview.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct CameraConfig {
    /// Index into the device list to start with
    #[serde(default)]
    pub device: Option<usize>,
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct PermissionsConfig {
    /// Open System Settings when camera access is denied
    #[serde(default)]
    pub open_settings_on_denial: bool,
}

fn default_title() -> String {
    "camview".to_string()
}

fn default_width() -> u32 {
    960
}

fn default_height() -> u32 {
    540
}

impl Config {
    /// Load configuration.
    ///
    /// With no explicit path, a missing default file yields the defaults.
    /// An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("camview").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/camview/config.toml")
        })
}
