//! Orchestrator connection configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::CallTimeouts;

/// Orchestrator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Base URL of the orchestrator management API.
    #[serde(default)]
    pub endpoint: String,
    /// Answer liveness probes with this value instead of asking the
    /// orchestrator.
    #[serde(default)]
    pub force_online: Option<bool>,
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,
    /// Timeout for deploy, status and remove calls.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            force_online: None,
            liveness_timeout_ms: default_liveness_timeout_ms(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl OrchestratorConfig {
    #[must_use]
    pub const fn timeouts(&self) -> CallTimeouts {
        CallTimeouts {
            liveness: Duration::from_millis(self.liveness_timeout_ms),
            call: Duration::from_millis(self.call_timeout_ms),
        }
    }
}

const fn default_liveness_timeout_ms() -> u64 {
    2_000
}

const fn default_call_timeout_ms() -> u64 {
    10_000
}
