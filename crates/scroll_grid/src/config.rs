//! TOML configuration for window dimensions.
//!
//! ```toml
//! size = 9     # cells per side (x/y), must be odd
//! height = 5   # cells along z, 3D windows only, must be odd
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scroll::{ScrollingWindow, ScrollingWindow3D};

/// Window dimensions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
  /// Cells per side across x and y.
  pub size: u32,
  /// Cells along z for 3D windows.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub height: Option<u32>,
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      size: 9,
      height: None,
    }
  }
}

impl GridConfig {
  /// Parses a config from TOML text.
  pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(contents)?)
  }

  /// Reads and parses a config file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let config = Self::from_toml_str(&contents)?;
    log::debug!("Loaded grid config from {}: {:?}", path.display(), config);
    Ok(config)
  }

  /// Serializes the config to TOML.
  pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(self)
  }

  /// Builds an uninitialized 2D window. `height` is ignored.
  pub fn build_2d<T>(&self) -> Result<ScrollingWindow<T>, ConfigError> {
    Ok(ScrollingWindow::new(self.size)?)
  }

  /// Builds an uninitialized 3D window.
  pub fn build_3d<T>(&self) -> Result<ScrollingWindow3D<T>, ConfigError> {
    let height = self.height.ok_or(ConfigError::MissingHeight)?;
    Ok(ScrollingWindow3D::new(self.size, height)?)
  }
}
