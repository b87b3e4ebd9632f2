//! Application configuration
//!
//! Loaded from TOML. Every key is optional; missing keys take their defaults.
//! Environment variables override file values:
//! - `KILN_TIME_SCALE`: `time.time_scale`
//! - `KILN_LOG`: `logging.filter`

use crate::logging::LoggingConfig;
use kiln_asset::SlotDecl;
use kiln_core::{KilnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    /// Upper bound for one frame's delta in seconds
    #[serde(default = "default_max_delta_time")]
    pub max_delta_time: f64,
    /// Units per second of the timestamps passed to `tick`
    #[serde(default = "default_units_per_second")]
    pub units_per_second: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            max_delta_time: default_max_delta_time(),
            units_per_second: default_units_per_second(),
        }
    }
}

fn default_time_scale() -> f64 {
    1.0
}
fn default_max_delta_time() -> f64 {
    0.1
}
fn default_units_per_second() -> f64 {
    1000.0
}

/// Render phase toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Render every frame. When false, only frames after `request_render` render.
    #[serde(default = "default_true")]
    pub auto_render: bool,
    #[serde(default = "default_true")]
    pub batching: bool,
    #[serde(default = "default_true")]
    pub bake_lightmaps_on_start: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            auto_render: true,
            batching: true,
            bake_lightmaps_on_start: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `env_logger` filter string
    #[serde(default)]
    pub filter: Option<String>,
}

/// Extra material slots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub texture_slots: Vec<SlotDecl>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl AppConfig {
    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            KilnError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply `KILN_*` environment overrides
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(scale) = std::env::var("KILN_TIME_SCALE") {
            self.time.time_scale = scale.parse().map_err(|_| {
                KilnError::ConfigError(format!("KILN_TIME_SCALE is not a number: {}", scale))
            })?;
        }
        if let Ok(filter) = std::env::var("KILN_LOG") {
            self.logging.filter = Some(filter);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time.time_scale >= 0.0) {
            return Err(KilnError::ConfigError(format!(
                "time_scale must be >= 0, got {}",
                self.time.time_scale
            )));
        }
        if !(self.time.max_delta_time > 0.0) {
            return Err(KilnError::ConfigError(format!(
                "max_delta_time must be > 0, got {}",
                self.time.max_delta_time
            )));
        }
        if !(self.time.units_per_second > 0.0) {
            return Err(KilnError::ConfigError(format!(
                "units_per_second must be > 0, got {}",
                self.time.units_per_second
            )));
        }
        Ok(())
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.logging.filter.clone(),
            ..LoggingConfig::default()
        }
    }
}
