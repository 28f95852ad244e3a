//! Catalog synchronization configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatalogSourceConfig {
    /// TOML file with `[[packages]]` tables.
    File { path: String },
    /// JSON endpoint.
    Http {
        url: String,
        #[serde(default = "default_http_timeout_ms")]
        timeout_ms: u64,
        #[serde(default = "default_retry_max_attempts")]
        retry_max_attempts: u32,
    },
}

impl Default for CatalogSourceConfig {
    fn default() -> Self {
        Self::File {
            path: "catalog.toml".into(),
        }
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Run the periodic sync loop. With sync disabled the catalog is loaded
    /// once at startup.
    #[serde(default = "default_sync_enabled")]
    pub sync_enabled: bool,
    /// Seconds between syncs.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(default)]
    pub source: CatalogSourceConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sync_enabled: default_sync_enabled(),
            sync_interval_secs: default_sync_interval_secs(),
            source: CatalogSourceConfig::default(),
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

const fn default_sync_enabled() -> bool {
    true
}

const fn default_sync_interval_secs() -> u64 {
    300
}

const fn default_http_timeout_ms() -> u64 {
    5_000
}

const fn default_retry_max_attempts() -> u32 {
    3
}
