//! Error types for window construction, lifecycle and configuration.

use std::io;

/// Errors raised by window construction and lifecycle calls.
///
/// Reads and writes outside the window are not errors; they yield `None` or
/// are silently discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowError {
  /// A grid dimension was even (or zero). Centering needs a symmetric radius.
  InvalidDimension { name: &'static str, value: u32 },
  /// `initialize_at` was called on a window that is already initialized.
  AlreadyInitialized,
  /// `scroll_to` was called before `initialize_at`.
  NotInitialized,
  /// A window centered there would extend past the `i32` coordinate range.
  CenterOutOfRange,
}

impl std::fmt::Display for WindowError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidDimension { name, value } => {
        write!(f, "{} must be odd, got {}", name, value)
      }
      Self::AlreadyInitialized => write!(f, "cannot initialize an already initialized window"),
      Self::NotInitialized => write!(f, "window must be initialized before scrolling"),
      Self::CenterOutOfRange => write!(f, "window would extend past the i32 coordinate range"),
    }
  }
}

impl std::error::Error for WindowError {}

/// Errors raised while loading a [`GridConfig`](crate::GridConfig).
#[derive(Debug)]
pub enum ConfigError {
  /// The config file could not be read.
  Io(io::Error),
  /// The config file is not valid TOML for the expected shape.
  Parse(toml::de::Error),
  /// A 3D window was requested without a `height`.
  MissingHeight,
  /// The configured dimensions are rejected by the window.
  Window(WindowError),
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(e) => write!(f, "failed to read config: {}", e),
      Self::Parse(e) => write!(f, "failed to parse config: {}", e),
      Self::MissingHeight => write!(f, "3D window requires a height"),
      Self::Window(e) => write!(f, "invalid window config: {}", e),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io(e) => Some(e),
      Self::Parse(e) => Some(e),
      Self::MissingHeight => None,
      Self::Window(e) => Some(e),
    }
  }
}

impl From<io::Error> for ConfigError {
  fn from(e: io::Error) -> Self {
    Self::Io(e)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(e: toml::de::Error) -> Self {
    Self::Parse(e)
  }
}

impl From<WindowError> for ConfigError {
  fn from(e: WindowError) -> Self {
    Self::Window(e)
  }
}
