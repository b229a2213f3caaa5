use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::PetId;

/// Configuration-specific errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failures reported by a calendar event provider.
///
/// The aggregation engine treats every variant as "no events"; the
/// distinction only matters for logging.
#[derive(Error, Diagnostic, Debug, Clone)]
pub enum CalendarError {
    #[error("Calendar access not authorized")]
    #[diagnostic(
        code(petcare_core::calendar_not_authorized),
        help("Grant calendar access to surface medication and vet events on the dashboard")
    )]
    NotAuthorized,

    #[error("Calendar unavailable: {0}")]
    #[diagnostic(code(petcare_core::calendar_unavailable))]
    Unavailable(String),
}

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Content generation failed for pet {pet_id}: {artifact}")]
    #[diagnostic(
        code(petcare_core::generation_failed),
        help("The generation service returned an error: {cause}")
    )]
    GenerationFailed {
        pet_id: PetId,
        artifact: String,
        cause: String,
    },

    #[error("Rate limited: {target} (cooldown: {cooldown_secs}s)")]
    #[diagnostic(
        code(petcare_core::rate_limited),
        help("Wait {cooldown_secs} seconds before sending another request to {target}")
    )]
    RateLimited { target: String, cooldown_secs: u64 },

    #[error("Calendar error for pet {pet_id}")]
    #[diagnostic(code(petcare_core::calendar_error))]
    Calendar {
        pet_id: PetId,
        #[source]
        cause: CalendarError,
    },

    #[error("Invalid configuration: {field}")]
    #[diagnostic(code(petcare_core::invalid_config), help("{reason}"))]
    InvalidConfig { field: String, reason: String },

    #[error("Configuration error for field '{field}'")]
    #[diagnostic(
        code(petcare_core::configuration_error),
        help("Check configuration file at {config_path}\nExpected: {expected}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },

    #[error("IO error: {operation} failed")]
    #[diagnostic(
        code(petcare_core::io_error),
        help("Check file permissions and that the path exists")
    )]
    IoError {
        operation: String,
        #[source]
        cause: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn generation_failed(
        pet_id: &PetId,
        artifact: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self::GenerationFailed {
            pet_id: pet_id.clone(),
            artifact: artifact.into(),
            cause: cause.into(),
        }
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Cooldown requested by the upstream service, if this is a rate limit.
    pub fn rate_limit_hint(&self) -> Option<std::time::Duration> {
        match self {
            CoreError::RateLimited { cooldown_secs, .. } => {
                Some(std::time::Duration::from_secs(*cooldown_secs))
            }
            _ => None,
        }
    }
}
