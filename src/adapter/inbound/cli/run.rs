//! Handler for the `run` command.

use miette::{IntoDiagnostic, Result};
use tokio::signal;
use tracing::info;

use super::command::ConfigPathArg;
use super::diagnostic::report;
use super::{config, output};
use crate::infrastructure::Engine;

/// Start the engine and keep it running until Ctrl-C.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = config::load(&args.config)?;
    config.init_logging();

    let engine = Engine::build(&config).map_err(report)?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Config", args.config.display());
    output::field("Database", &config.database);
    output::field("Orchestrator", &config.orchestrator.endpoint);
    output::field("Catalog", engine.catalog_source().describe());
    if let Some(online) = config.orchestrator.force_online {
        output::warning(&format!("Orchestrator liveness forced to {online}"));
    }

    let recovery = engine.installer().recover().map_err(|e| report(e.into()))?;
    if output::verbosity() > 0 || recovery.restored > 0 {
        output::field(
            "Recovered",
            format!(
                "{} restored, {} resumed, {} discarded",
                recovery.restored, recovery.resumed, recovery.discarded
            ),
        );
    }

    let sync = engine.start_catalog_sync().await;
    if sync.is_none() {
        output::field("Packages", engine.installer().catalog_store().len());
    }

    output::success("Engine running");
    output::hint("press Ctrl-C to stop");
    info!("berth started");

    signal::ctrl_c().await.into_diagnostic()?;
    info!("Shutdown signal received");

    if let Some(sync) = sync {
        sync.shutdown().await;
    }
    engine.installer().shutdown().await;

    output::success("Stopped");
    info!("berth stopped");
    Ok(())
}
