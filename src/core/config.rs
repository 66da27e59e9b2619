//! Scene runtime configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default number of items the upload scheduler processes per tick.
pub const DEFAULT_UPLOADS_PER_FRAME: usize = 4;

/// Scene runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Items drained from the upload queue per tick
    pub uploads_per_frame: usize,
    /// `env_logger` filter directives, e.g. `"info,scene_transform=debug"`
    pub log_filter: String,
    /// Refresh world-space bounds during propagation
    pub track_bounds: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            uploads_per_frame: DEFAULT_UPLOADS_PER_FRAME,
            log_filter: String::from("info"),
            track_bounds: true,
        }
    }
}

impl SceneConfig {
    /// Set the upload budget per tick
    pub fn with_uploads_per_frame(mut self, uploads: usize) -> Self {
        self.uploads_per_frame = uploads;
        self
    }

    /// Set the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Enable or disable bounds tracking
    pub fn with_track_bounds(mut self, track: bool) -> Self {
        self.track_bounds = track;
        self
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the upload budget is zero, which would never drain
    /// the queue
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uploads_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "uploads_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from a RON string
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid RON or the config is invalid
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Initialise `env_logger` with this config's filter
    ///
    /// Does nothing if a logger is already installed.
    pub fn init_logging(&self) {
        let result = env_logger::Builder::new()
            .parse_filters(&self.log_filter)
            .try_init();
        if result.is_err() {
            log::debug!("Logger already initialised");
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Parse error
    Parse(String),
    /// Parsed but unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
