//! Installation engine configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::NameRules;

/// Configuration for the installation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallConfig {
    /// Delay between status polls of a provisioning instance.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Cumulative provisioning budget before an instance is marked stuck.
    #[serde(default = "default_stuck_threshold_secs")]
    pub stuck_threshold_secs: u64,
    /// Instance name rules.
    #[serde(default)]
    pub names: NameRules,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            stuck_threshold_secs: default_stuck_threshold_secs(),
            names: NameRules::default(),
        }
    }
}

impl InstallConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn stuck_threshold(&self) -> Duration {
        Duration::from_secs(self.stuck_threshold_secs)
    }
}

/// Per-call timeouts applied to orchestrator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    /// Bound on `is_online`; exceeding it counts as offline.
    pub liveness: Duration,
    /// Bound on `deploy`, `status` and `remove`.
    pub call: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            liveness: Duration::from_millis(2_000),
            call: Duration::from_millis(10_000),
        }
    }
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

const fn default_stuck_threshold_secs() -> u64 {
    15
}
