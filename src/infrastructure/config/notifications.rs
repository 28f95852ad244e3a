//! Notification configuration.

use serde::Deserialize;

/// Notification sinks to enable.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Log every event through tracing.
    #[serde(default = "default_log")]
    pub log: bool,
    /// POST events as JSON to this URL.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_timeout_ms")]
    pub webhook_timeout_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            log: default_log(),
            webhook_url: None,
            webhook_timeout_ms: default_webhook_timeout_ms(),
        }
    }
}

const fn default_log() -> bool {
    true
}

const fn default_webhook_timeout_ms() -> u64 {
    5_000
}
