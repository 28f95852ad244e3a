use std::path::Path;

use miette::Result;
use serde_json::json;

use crate::adapter::inbound::cli::diagnostic::{report, ConnectionError};
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::orchestrator::HttpOrchestratorClient;
use crate::error::Error;
use crate::port::OrchestratorClient;

/// Probe the configured orchestrator endpoint for liveness.
///
/// `force_online` is ignored here: the probe always asks the endpoint.
pub async fn execute_orchestrator<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = config::load(config_path.as_ref())?;
    let orchestrator = &config.orchestrator;
    let timeouts = orchestrator.timeouts();
    let client = HttpOrchestratorClient::from_env(&orchestrator.endpoint, timeouts.liveness)
        .map_err(|e| report(Error::Config(e)))?;

    output::section("Orchestrator Check");
    output::field("Endpoint", client.base_url());
    if let Some(online) = orchestrator.force_online {
        output::warning(&format!(
            "force_online = {online} is set; probing the endpoint anyway"
        ));
    }

    let pb = output::spinner("Probing liveness...");
    let online = tokio::time::timeout(timeouts.liveness, client.is_online())
        .await
        .unwrap_or(false);

    if output::is_json() {
        output::json_output(json!({
            "command": "check.orchestrator",
            "endpoint": client.base_url(),
            "online": online,
        }));
    }

    if !online {
        output::spinner_fail(&pb, "Orchestrator offline");
        return Err(ConnectionError::new(format!(
            "{} did not answer the liveness probe within {}ms",
            client.base_url(),
            orchestrator.liveness_timeout_ms
        ))
        .into());
    }

    output::spinner_success(&pb, "Orchestrator online");
    Ok(())
}
