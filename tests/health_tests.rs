use std::collections::HashSet;

use berth::infrastructure::{health_check, Config, HealthStatus};

fn config(toml: &str) -> Config {
    Config::parse_toml(toml).expect("valid config")
}

#[test]
fn health_check_reports_every_dependency() {
    let report = health_check(&Config::default());
    let names: HashSet<&'static str> = report.checks().iter().map(|check| check.name()).collect();

    assert!(names.contains("database"), "Expected database check");
    assert!(
        names.contains("orchestrator_endpoint"),
        "Expected orchestrator endpoint check"
    );
    assert!(names.contains("catalog_source"), "Expected catalog check");
    assert!(names.contains("notifications"), "Expected notifications check");
}

#[test]
fn default_config_is_unhealthy_without_endpoint() {
    let report = health_check(&Config::default());
    assert!(!report.is_healthy());
}

#[test]
fn missing_notification_sinks_are_not_critical() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(&catalog, "").unwrap();

    let toml = format!(
        r#"
database = ":memory:"

[catalog.source]
type = "file"
path = "{}"

[orchestrator]
endpoint = "http://127.0.0.1:8080"

[notifications]
log = false
"#,
        catalog.display()
    );
    let report = health_check(&config(&toml));

    let notifications = report
        .checks()
        .iter()
        .find(|check| check.name() == "notifications")
        .expect("notifications check");
    assert!(matches!(notifications.status(), HealthStatus::Unhealthy(_)));
    assert!(!notifications.critical());
    assert!(report.is_healthy());
}
