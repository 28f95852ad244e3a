//! Configuration loading for CLI handlers.

use std::path::Path;

use miette::Result;

use super::diagnostic::{self, ConfigError};
use crate::error::{ConfigError as CrateConfigError, Error};
use crate::infrastructure::config::Config;

/// Read and validate the configuration at `path`.
///
/// Errors are rendered against the file content so parse failures show the
/// offending line.
pub fn load(path: &Path) -> Result<Config> {
    let name = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::from_config(&CrateConfigError::ReadFile(e), &name, "")
    })?;

    Config::parse_toml(&content).map_err(|e| match e {
        Error::Config(err) => ConfigError::from_config(&err, &name, &content).into(),
        other => diagnostic::report(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;

    #[test]
    fn loads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berth.toml");
        std::fs::write(&path, testkit::config::minimal_toml()).unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.database, ":memory:");
    }

    #[test]
    fn missing_file_is_a_diagnostic() {
        let err = load(Path::new("/nonexistent/berth.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn invalid_value_names_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berth.toml");
        std::fs::write(&path, "[orchestrator]\nendpoint = \"ftp://host\"\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("orchestrator.endpoint"));
    }
}
