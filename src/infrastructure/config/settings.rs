//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the orchestrator token is read
//! from the environment only.
//!
//! # Example
//!
//! ```no_run
//! use berth::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::catalog::{CatalogConfig, CatalogSourceConfig};
use super::logging::LoggingConfig;
use super::notifications::NotificationConfig;
use super::orchestrator::OrchestratorConfig;
use crate::application::InstallConfig;
use crate::error::{ConfigError, Result};

/// Longest name a DNS name permits.
const MAX_NAME_LENGTH: usize = 253;

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file, or `:memory:`.
    ///
    /// Defaults to "berth.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Package catalog source and sync loop.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Orchestrator endpoint and call timeouts.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Installation engine settings.
    #[serde(default)]
    pub install: InstallConfig,

    /// Notification sinks.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            catalog: CatalogConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            install: InstallConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

fn default_database_path() -> String {
    "berth.db".to_string()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

fn check_http_url(field: &'static str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(())
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present and values are within
    /// acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        if !self.logging.is_known_format() {
            return Err(invalid("logging.format", "must be \"pretty\" or \"json\""));
        }

        let orchestrator = &self.orchestrator;
        if orchestrator.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "orchestrator.endpoint",
            }
            .into());
        }
        check_http_url("orchestrator.endpoint", &orchestrator.endpoint)?;
        if orchestrator.liveness_timeout_ms == 0 {
            return Err(invalid("orchestrator.liveness_timeout_ms", "must be greater than 0"));
        }
        if orchestrator.call_timeout_ms == 0 {
            return Err(invalid("orchestrator.call_timeout_ms", "must be greater than 0"));
        }

        let install = &self.install;
        if install.poll_interval_ms == 0 {
            return Err(invalid("install.poll_interval_ms", "must be greater than 0"));
        }
        if install.stuck_threshold_secs == 0 {
            return Err(invalid("install.stuck_threshold_secs", "must be greater than 0"));
        }
        if install.stuck_threshold_secs.saturating_mul(1_000) <= install.poll_interval_ms {
            return Err(invalid(
                "install.stuck_threshold_secs",
                "must be longer than install.poll_interval_ms",
            ));
        }
        if !(1..=MAX_NAME_LENGTH).contains(&install.names.max_length) {
            return Err(invalid(
                "install.names.max_length",
                format!("must be between 1 and {MAX_NAME_LENGTH}"),
            ));
        }

        if self.catalog.sync_enabled && self.catalog.sync_interval_secs == 0 {
            return Err(invalid("catalog.sync_interval_secs", "must be greater than 0"));
        }
        match &self.catalog.source {
            CatalogSourceConfig::File { path } => {
                if path.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "catalog.source.path",
                    }
                    .into());
                }
            }
            CatalogSourceConfig::Http {
                url, timeout_ms, ..
            } => {
                if url.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "catalog.source.url",
                    }
                    .into());
                }
                check_http_url("catalog.source.url", url)?;
                if *timeout_ms == 0 {
                    return Err(invalid("catalog.source.timeout_ms", "must be greater than 0"));
                }
            }
        }

        if let Some(url) = &self.notifications.webhook_url {
            check_http_url("notifications.webhook_url", url)?;
            if self.notifications.webhook_timeout_ms == 0 {
                return Err(invalid(
                    "notifications.webhook_timeout_ms",
                    "must be greater than 0",
                ));
            }
        }

        Ok(())
    }
}
