use std::path::Path;

use miette::Result;
use serde_json::json;

use crate::adapter::inbound::cli::diagnostic::ConnectionError;
use crate::adapter::inbound::cli::{config, output};
use crate::infrastructure::config::CatalogSourceConfig;
use crate::infrastructure::{health_check, HealthStatus};

/// Validate the configuration file and run the static health checks.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = config::load(path)?;
    let report = health_check(&config);

    if output::is_json() {
        let checks = report
            .checks()
            .iter()
            .map(|check| {
                let (status, details) = match check.status() {
                    HealthStatus::Healthy => ("healthy", None),
                    HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason.as_str())),
                };
                json!({
                    "name": check.name(),
                    "critical": check.critical(),
                    "status": status,
                    "details": details,
                })
            })
            .collect::<Vec<_>>();

        output::json_output(json!({
            "command": "check.config",
            "config": path.display().to_string(),
            "status": if report.is_healthy() { "healthy" } else { "unhealthy" },
            "checks": checks,
        }));
    } else {
        output::section("Configuration Check");
        output::field("Config", path.display());
        output::success("Configuration file is valid");

        output::section("Summary");
        output::field("Database", &config.database);
        output::field("Orchestrator", &config.orchestrator.endpoint);
        match &config.catalog.source {
            CatalogSourceConfig::File { path } => output::field("Catalog", format!("file {path}")),
            CatalogSourceConfig::Http { url, .. } => output::field("Catalog", format!("http {url}")),
        }
        output::field(
            "Catalog sync",
            if config.catalog.sync_enabled {
                format!("every {}s", config.catalog.sync_interval_secs)
            } else {
                "disabled".to_string()
            },
        );
        output::field("Stuck after", format!("{}s", config.install.stuck_threshold_secs));
        if let Some(online) = config.orchestrator.force_online {
            output::warning(&format!("Orchestrator liveness forced to {online}"));
        }

        output::section("Health");
        for check in report.checks() {
            let suffix = if check.critical() { " (critical)" } else { "" };
            let value = match check.status() {
                HealthStatus::Healthy => "healthy".to_string(),
                HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
            };
            output::field(&format!("{}{suffix}", check.name()), value);
        }
    }

    if !report.is_healthy() {
        output::error("Health check failed");
        return Err(ConnectionError::new("critical health check failed").into());
    }
    output::success("Configuration check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unhealthy_config_fails_the_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berth.toml");
        std::fs::write(
            &path,
            "database = \":memory:\"\n[orchestrator]\nendpoint = \"http://127.0.0.1:8080\"\n\
             [catalog.source]\ntype = \"file\"\npath = \"/nonexistent/catalog.toml\"\n",
        )
        .unwrap();

        assert!(execute_config(&path).is_err());
    }

    #[test]
    fn healthy_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.toml");
        std::fs::write(&catalog, "packages = []\n").unwrap();
        let path = dir.path().join("berth.toml");
        std::fs::write(
            &path,
            format!(
                "database = \":memory:\"\n[orchestrator]\nendpoint = \"http://127.0.0.1:8080\"\n\
                 [catalog.source]\ntype = \"file\"\npath = {:?}\n",
                catalog.to_string_lossy()
            ),
        )
        .unwrap();

        assert!(execute_config(&path).is_ok());
    }
}
