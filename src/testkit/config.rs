//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::time::Duration;

use crate::application::{CallTimeouts, InstallConfig};
use crate::domain::NameRules;

/// Install settings with a 1s poll and the default 15s stuck threshold.
#[must_use]
pub fn install() -> InstallConfig {
    InstallConfig {
        poll_interval_ms: 1_000,
        stuck_threshold_secs: 15,
        names: NameRules::default(),
    }
}

/// Short timeouts so timeout paths finish quickly under paused time.
#[must_use]
pub fn timeouts() -> CallTimeouts {
    CallTimeouts {
        liveness: Duration::from_millis(500),
        call: Duration::from_secs(2),
    }
}

/// Minimal valid TOML configuration using an in-memory database.
#[must_use]
pub fn minimal_toml() -> &'static str {
    r#"
database = ":memory:"

[orchestrator]
endpoint = "http://127.0.0.1:8080"
"#
}
