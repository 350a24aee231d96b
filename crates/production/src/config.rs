//! Process configuration.
//!
//! Loaded from a TOML file. Every section and field is optional; an empty
//! file yields the field-deployment defaults.
//!
//! ```toml
//! [topics]
//! arrival = "junction7/in"
//!
//! [controller]
//! emergency_radius_m = 150.0
//!
//! [controller.timing]
//! max_green_secs = 20
//!
//! [audit]
//! path = "/var/lib/itms/audit_log.csv"
//!
//! [logging]
//! filter = "info,itms_controller=debug"
//! directory = "/var/log/itms"
//! ```

use itms_controller::{ConfigValidationError, ControllerConfig};
use itms_core::TopicMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid controller settings: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Top-level configuration for the controller process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub topics: TopicMap,
    pub controller: ControllerConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.controller.validate()?;
        Ok(config)
    }

    /// Override the audit file location.
    pub fn with_audit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit.path = path.into();
        self
    }

    /// Override the log filter directive.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }
}

/// Audit trail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// CSV file appended to by the controller.
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("audit_log.csv"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Also write logs to a daily-rotated file in this directory.
    pub directory: Option<PathBuf>,

    /// File name prefix for rotated log files.
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            directory: None,
            file_prefix: "itms-controller".into(),
        }
    }
}
