//! Static health reporting over a loaded configuration.

use std::path::Path;

use url::Url;

use crate::adapter::outbound::sqlite::database::connection::MEMORY_URL;
use crate::infrastructure::config::{CatalogSourceConfig, Config};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    /// True when every critical check passed.
    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy)
    }
}

fn status(problem: Option<String>) -> HealthStatus {
    problem.map_or(HealthStatus::Healthy, HealthStatus::Unhealthy)
}

fn http_url_problem(value: &str) -> Option<String> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => None,
        Ok(url) => Some(format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => Some(format!("invalid url '{value}': {e}")),
    }
}

fn database_problem(database: &str) -> Option<String> {
    if database.trim().is_empty() {
        return Some("database path is empty".to_string());
    }
    if database == MEMORY_URL {
        return None;
    }
    let parent = Path::new(database).parent()?;
    if parent.as_os_str().is_empty() || parent.is_dir() {
        None
    } else {
        Some(format!("directory {} does not exist", parent.display()))
    }
}

fn catalog_problem(source: &CatalogSourceConfig) -> Option<String> {
    match source {
        CatalogSourceConfig::File { path } if path.trim().is_empty() => {
            Some("catalog path is empty".to_string())
        }
        CatalogSourceConfig::File { path } if !Path::new(path).is_file() => {
            Some(format!("catalog file {path} not found"))
        }
        CatalogSourceConfig::File { .. } => None,
        CatalogSourceConfig::Http { url, .. } => http_url_problem(url),
    }
}

/// Run the static checks over `config`. Nothing here touches the network.
pub fn health_check(config: &Config) -> HealthReport {
    let notifications = &config.notifications;
    let checks = vec![
        HealthCheck {
            name: "database",
            critical: true,
            status: status(database_problem(&config.database)),
        },
        HealthCheck {
            name: "orchestrator_endpoint",
            critical: true,
            status: status(if config.orchestrator.endpoint.trim().is_empty() {
                Some("endpoint is empty".to_string())
            } else {
                http_url_problem(&config.orchestrator.endpoint)
            }),
        },
        HealthCheck {
            name: "catalog_source",
            critical: true,
            status: status(catalog_problem(&config.catalog.source)),
        },
        HealthCheck {
            name: "notifications",
            critical: false,
            status: status(
                (!notifications.log && notifications.webhook_url.is_none())
                    .then(|| "no notification sink enabled".to_string()),
            ),
        },
    ];

    HealthReport { checks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::NotificationConfig;

    fn check<'a>(report: &'a HealthReport, name: &str) -> &'a HealthCheck {
        report
            .checks()
            .iter()
            .find(|check| check.name() == name)
            .unwrap()
    }

    fn healthy_config(dir: &Path) -> Config {
        let catalog = dir.join("catalog.toml");
        std::fs::write(&catalog, "packages = []\n").unwrap();

        let mut config = Config::default();
        config.database = MEMORY_URL.to_string();
        config.orchestrator.endpoint = "http://192.168.99.100:8080".to_string();
        config.catalog.source = CatalogSourceConfig::File {
            path: catalog.to_string_lossy().into_owned(),
        };
        config
    }

    #[test]
    fn health_report_is_healthy_when_all_critical_pass() {
        let report = HealthReport {
            checks: vec![
                HealthCheck {
                    name: "critical_pass",
                    critical: true,
                    status: HealthStatus::Healthy,
                },
                HealthCheck {
                    name: "non_critical_fail",
                    critical: false,
                    status: HealthStatus::Unhealthy("warning".to_string()),
                },
            ],
        };

        assert!(report.is_healthy());
    }

    #[test]
    fn configured_deployment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let report = health_check(&healthy_config(dir.path()));

        assert!(report.is_healthy());
        assert!(report.checks().iter().all(HealthCheck::is_healthy));
    }

    #[test]
    fn default_config_is_unhealthy() {
        let report = health_check(&Config::default());

        assert!(!report.is_healthy());
        assert!(!check(&report, "orchestrator_endpoint").is_healthy());
    }

    #[test]
    fn missing_catalog_file_is_critical() {
        let mut config = healthy_config(tempfile::tempdir().unwrap().path());
        config.catalog.source = CatalogSourceConfig::File {
            path: "/nonexistent/catalog.toml".into(),
        };

        let report = health_check(&config);

        assert!(!report.is_healthy());
        assert_eq!(
            check(&report, "catalog_source").status(),
            &HealthStatus::Unhealthy("catalog file /nonexistent/catalog.toml not found".into())
        );
    }

    #[test]
    fn database_directory_must_exist() {
        assert!(database_problem("berth.db").is_none());
        assert!(database_problem(MEMORY_URL).is_none());
        assert!(database_problem("/nonexistent/dir/berth.db").is_some());
        assert!(database_problem("  ").is_some());
    }

    #[test]
    fn silent_notifications_are_not_critical() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = healthy_config(dir.path());
        config.notifications = NotificationConfig {
            log: false,
            ..NotificationConfig::default()
        };

        let report = health_check(&config);

        assert!(report.is_healthy());
        assert!(!check(&report, "notifications").is_healthy());
    }
}
