//! Configuration for the dashboard pipeline
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! missing) file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError};
use crate::generation::RetryConfig;
use crate::Result;

/// One hour between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub refresh: RefreshConfig,
    pub calendar: CalendarConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between background refresh ticks
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Window of calendar events considered for each pet, relative to now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub lookbehind_days: u32,
    pub lookahead_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            lookbehind_days: 30,
            lookahead_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Minimum milliseconds between calls to the generation service
    pub min_call_spacing_ms: u64,
    pub retry: RetryConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_call_spacing_ms: 250,
            retry: RetryConfig::default(),
        }
    }
}

impl GenerationConfig {
    pub fn min_call_spacing(&self) -> Duration {
        Duration::from_millis(self.min_call_spacing_ms)
    }
}

impl DashboardConfig {
    /// Default config location: `<config dir>/petcare/dashboard.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("petcare")
            .join("dashboard.toml")
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoError {
            operation: format!("read config {}", path.display()),
            cause: e,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No dashboard config found, using defaults");
            Ok(Self::default())
        }
    }

    fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field: "<root>".to_string(),
                expected: "valid dashboard TOML".to_string(),
                cause: ConfigError::TomlParse(e.to_string()),
            })?;
        config.validate().map_err(|cause| {
            let field = match &cause {
                ConfigError::InvalidValue { field, .. } => field.clone(),
                _ => "<root>".to_string(),
            };
            CoreError::ConfigurationError {
                config_path: path.display().to_string(),
                field,
                expected: "a positive value".to_string(),
                cause,
            }
        })?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CoreError::ConfigurationError {
            config_path: path.display().to_string(),
            field: "<root>".to_string(),
            expected: "serializable config".to_string(),
            cause: ConfigError::TomlSerialize(e.to_string()),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::IoError {
                operation: format!("create config dir {}", parent.display()),
                cause: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| CoreError::IoError {
            operation: format!("write config {}", path.display()),
            cause: e,
        })
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh.interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.calendar.lookbehind_days == 0 && self.calendar.lookahead_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calendar.lookahead_days".to_string(),
                reason: "calendar window is empty".to_string(),
            });
        }
        if self.generation.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.retry.max_attempts".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        Ok(())
    }
}
