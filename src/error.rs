use thiserror::Error;

use crate::domain::error::{InvalidNameReason, NameError, TransitionError};
use crate::domain::instance::InstanceState;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors reported by an orchestrator client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("orchestrator unreachable: {0}")]
    Unreachable(String),

    #[error("orchestrator {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("orchestrator rejected request: {0}")]
    Rejected(String),

    #[error("deployment status unknown: {0}")]
    StatusUnknown(String),

    #[error("unexpected orchestrator response: {0}")]
    Protocol(String),
}

/// Catalog synchronization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("invalid catalog batch: {0}")]
    InvalidBatch(String),
}

/// Instance registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("instance {id} not found")]
    NotFound { id: String },

    #[error("instance store error: {0}")]
    Storage(String),
}

/// Errors returned to callers of the install API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        name: String,
        reason: InvalidNameReason,
    },

    #[error("name '{name}' is already taken")]
    DuplicateName { name: String },

    #[error("unknown package '{package_id}'")]
    UnknownPackage { package_id: String },

    #[error("orchestrator is offline")]
    OrchestratorOffline,

    #[error("deployment failed: {reason}")]
    DeployFailure { reason: String },

    #[error("installation of '{name}' stuck after {waited_secs}s")]
    StuckInstallation { name: String, waited_secs: u64 },

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("another operation on '{name}' is in progress")]
    RegistryConflict { name: String },

    #[error("no instance named '{name}'")]
    NotFound { name: String },

    #[error("instance '{name}' cannot be retried from state {state}")]
    NotRetryable { name: String, state: InstanceState },

    #[error("instance store error: {0}")]
    Storage(String),
}

impl InstallError {
    /// Short message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "Please enter a valid name",
            Self::DuplicateName { .. } => "Application's name already taken",
            Self::UnknownPackage { .. } => "This application is not available",
            Self::OrchestratorOffline => "Orchestrator connection failed!",
            Self::DeployFailure { .. } => "Deployment failed!",
            Self::RegistryConflict { .. } => "An action is already running on this application",
            Self::NotFound { .. } => "Application not found",
            Self::NotRetryable { .. } => "This application cannot be retried",
            Self::StuckInstallation { .. }
            | Self::InvalidTransition(_)
            | Self::Storage(_) => "Internal error!",
        }
    }
}

impl From<NameError> for InstallError {
    fn from(err: NameError) -> Self {
        match err {
            NameError::Invalid { name, reason } => Self::InvalidName { name, reason },
            NameError::Duplicate { name } => Self::DuplicateName { name },
        }
    }
}

impl From<RegistryError> for InstallError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Name(err) => Self::from(err),
            RegistryError::InvalidTransition(transition) => Self::InvalidTransition(transition),
            RegistryError::NotFound { id } => Self::NotFound { name: id },
            RegistryError::Storage(reason) => Self::Storage(reason),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_errors_map_to_install_errors() {
        let invalid = NameError::Invalid {
            name: "Bad.Name".into(),
            reason: InvalidNameReason::IllegalCharacter { ch: '.' },
        };
        let err = InstallError::from(invalid);
        assert!(matches!(err, InstallError::InvalidName { .. }));
        assert_eq!(err.user_message(), "Please enter a valid name");

        let duplicate = InstallError::from(NameError::Duplicate {
            name: "myapp".into(),
        });
        assert_eq!(duplicate.user_message(), "Application's name already taken");
    }

    #[test]
    fn registry_duplicate_maps_to_duplicate_name() {
        let err = InstallError::from(RegistryError::Name(NameError::Duplicate {
            name: "myapp".into(),
        }));
        assert_eq!(
            err,
            InstallError::DuplicateName {
                name: "myapp".into()
            }
        );
    }

    #[test]
    fn user_messages_for_alerts() {
        assert_eq!(
            InstallError::OrchestratorOffline.user_message(),
            "Orchestrator connection failed!"
        );
        assert_eq!(
            InstallError::StuckInstallation {
                name: "myapp".into(),
                waited_secs: 15
            }
            .user_message(),
            "Internal error!"
        );
    }

    #[test]
    fn config_error_display_names_field() {
        let err = ConfigError::InvalidValue {
            field: "stuck_threshold_secs",
            reason: "must be greater than 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for stuck_threshold_secs: must be greater than 0"
        );
    }
}
