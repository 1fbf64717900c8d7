use std::path::Path;

use scroll_grid::{ConfigError, GridConfig};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct DemoConfig {
  pub window: GridConfig,
  pub walk: WalkConfig,
  pub loader: LoaderConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WalkConfig {
  pub steps: usize,
  pub max_step: i32,
  pub seed: u64,
  #[serde(default)]
  pub pause_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoaderConfig {
  pub samples: usize,
}

impl DemoConfig {
  pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(contents)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_toml_str(&contents)
  }
}
