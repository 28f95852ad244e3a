//! Miette-based error diagnostics for CLI error presentation.
//!
//! Converts crate errors into diagnostics carrying a stable code and, where
//! the user can act on it, a help line. Configuration parse errors point at
//! the offending span of the file.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError as CrateConfigError, Error, InstallError};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(berth::config))]
pub struct ConfigError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    /// Build a diagnostic for `err` raised while loading `path`.
    ///
    /// TOML parse errors carry a span into `content`; other errors point at
    /// nothing and only show the message.
    #[must_use]
    pub fn from_config(err: &CrateConfigError, path: &str, content: &str) -> Self {
        let span = match err {
            CrateConfigError::Parse(parse) => parse.span().map(|range| {
                SourceSpan::from((range.start, range.end.saturating_sub(range.start)))
            }),
            _ => None,
        };
        let help = match err {
            CrateConfigError::MissingField { field } => {
                Some(format!("add `{field}` to {path}"))
            }
            CrateConfigError::ReadFile(_) => {
                Some("pass the file with --config or create ~/.berth/config.toml".to_string())
            }
            _ => None,
        };

        Self {
            message: err.to_string(),
            src: NamedSource::new(path, content.to_string()),
            span,
            help,
        }
    }
}

/// Install operation error.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(berth::install))]
pub struct InstallDiagnostic {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl From<&InstallError> for InstallDiagnostic {
    fn from(err: &InstallError) -> Self {
        let help = match err {
            InstallError::InvalidName { .. } => {
                Some("names use letters, digits and single inner hyphens".to_string())
            }
            InstallError::UnknownPackage { .. } => {
                Some("run `berth catalog` to list available packages".to_string())
            }
            InstallError::OrchestratorOffline => {
                Some("run `berth check orchestrator` to probe the endpoint".to_string())
            }
            InstallError::RegistryConflict { .. } => {
                Some("wait for the running operation to finish".to_string())
            }
            InstallError::NotRetryable { .. } => {
                Some("only stuck or failed instances can be retried".to_string())
            }
            _ => None,
        };

        Self {
            message: format!("{}: {err}", err.user_message()),
            help,
        }
    }
}

/// Network connection error.
#[derive(Debug, Error, Diagnostic)]
#[error("connection failed: {message}")]
#[diagnostic(
    code(berth::connection),
    help("check the orchestrator endpoint and your network connection")
)]
pub struct ConnectionError {
    pub message: String,
}

impl ConnectionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Render any crate error as a diagnostic report.
#[must_use]
pub fn report(err: Error) -> miette::Report {
    match err {
        Error::Install(install) => InstallDiagnostic::from(&install).into(),
        Error::Orchestrator(orchestrator) => ConnectionError::new(orchestrator.to_string()).into(),
        Error::Connection(message) => ConnectionError::new(message).into(),
        other => miette::Report::msg(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_points_at_span() {
        let content = "[orchestrator\nendpoint = 1\n";
        let parse = toml::from_str::<toml::Value>(content).unwrap_err();
        let diagnostic =
            ConfigError::from_config(&CrateConfigError::Parse(parse), "berth.toml", content);

        assert!(diagnostic.span.is_some());
        assert!(diagnostic.help.is_none());
    }

    #[test]
    fn missing_field_suggests_fix() {
        let diagnostic = ConfigError::from_config(
            &CrateConfigError::MissingField {
                field: "orchestrator.endpoint",
            },
            "berth.toml",
            "",
        );

        assert!(diagnostic.span.is_none());
        assert_eq!(
            diagnostic.help.as_deref(),
            Some("add `orchestrator.endpoint` to berth.toml")
        );
    }

    #[test]
    fn install_diagnostic_leads_with_user_message() {
        let diagnostic = InstallDiagnostic::from(&InstallError::OrchestratorOffline);

        assert!(diagnostic
            .message
            .starts_with("Orchestrator connection failed!"));
        assert!(diagnostic.help.is_some());
    }
}
