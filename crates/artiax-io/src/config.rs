//! User configuration, stored as TOML.
//!
//! All fields use `#[serde(default)]`, so a file that only sets
//! `[pixel_sizes]` or only `default_format` is valid.

use std::fs;
use std::path::Path;

use artiax_model::PixelSizes;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtiaxConfig {
    /// Format name or nickname used when neither a flag nor the file
    /// extension selects one.
    pub default_format: String,
    /// Pixel sizes applied to every list that is opened or created.
    pub pixel_sizes: PixelSizes,
}

impl Default for ArtiaxConfig {
    fn default() -> Self {
        Self {
            default_format: "stopgap".to_string(),
            pixel_sizes: PixelSizes::default(),
        }
    }
}

impl ArtiaxConfig {
    /// Load configuration from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RegistryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| RegistryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.pixel_sizes.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| RegistryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| RegistryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
