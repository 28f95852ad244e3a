//! Install API consumed by inbound adapters (HTTP layer, CLI).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Instance, InstanceState, Package, PackageId, UserId};
use crate::error::InstallError;

/// `POST install {user, name, packageId}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallRequest {
    pub user: UserId,
    pub name: String,
    pub package_id: PackageId,
}

impl InstallRequest {
    pub fn new(
        user: impl Into<UserId>,
        name: impl Into<String>,
        package_id: impl Into<PackageId>,
    ) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            package_id: package_id.into(),
        }
    }
}

/// `POST uninstall {user, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UninstallRequest {
    pub user: UserId,
    pub name: String,
}

impl UninstallRequest {
    pub fn new(user: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
        }
    }
}

/// Read-only projection of an instance returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceView {
    pub name: String,
    pub package_id: PackageId,
    pub state: InstanceState,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_status_check: Option<DateTime<Utc>>,
}

impl From<&Instance> for InstanceView {
    fn from(instance: &Instance) -> Self {
        Self {
            name: instance.name().to_string(),
            package_id: instance.package().clone(),
            state: instance.state(),
            error: instance.last_error().map(ToOwned::to_owned),
            created_at: instance.created_at(),
            updated_at: instance.updated_at(),
            last_status_check: instance.last_status_check(),
        }
    }
}

/// Operations the engine exposes to inbound adapters.
///
/// `install` returns as soon as the deployment has been dispatched; the
/// instance then reports `provisioning` until the reconciliation task
/// observes a terminal state.
#[async_trait]
pub trait InstallApi: Send + Sync {
    /// Validate, reserve and dispatch a new instance.
    async fn install(&self, request: InstallRequest) -> Result<InstanceView, InstallError>;

    /// Remove an instance and its deployment.
    async fn uninstall(&self, request: UninstallRequest) -> Result<(), InstallError>;

    /// Retry a stuck or failed instance.
    async fn retry(&self, user: &UserId, name: &str) -> Result<InstanceView, InstallError>;

    /// `GET instances?user=`.
    fn instances(&self, user: &UserId) -> Vec<InstanceView>;

    /// `GET catalog`.
    fn catalog(&self) -> Vec<Package>;
}
