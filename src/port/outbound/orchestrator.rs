//! Orchestrator port for deploying and supervising instances.
//!
//! The orchestrator is a remote capability; its transport is up to the
//! adapter. The engine treats every call here as a slow, unreliable network
//! call and bounds each one with its own timeout.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{DeploymentHandle, Instance, InstanceId, PackageId, UserId};
use crate::error::OrchestratorError;

/// What the orchestrator needs to deploy one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSpec {
    /// Engine-side instance identifier.
    pub instance_id: InstanceId,
    /// Owner of the instance.
    pub user_id: UserId,
    /// User-chosen instance name.
    pub name: String,
    /// Catalog package being installed.
    pub package_id: PackageId,
    /// Image or template reference from the catalog.
    pub image: String,
}

impl DeploymentSpec {
    /// Build the spec for `instance` deploying `image`.
    #[must_use]
    pub fn for_instance(instance: &Instance, image: impl Into<String>) -> Self {
        Self {
            instance_id: instance.id().clone(),
            user_id: instance.user().clone(),
            name: instance.name().to_string(),
            package_id: instance.package().clone(),
            image: image.into(),
        }
    }
}

/// Status of a deployment as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStatus {
    /// Still starting up.
    Provisioning,
    /// Up and serving.
    Running,
    /// Gave up; the reason is orchestrator-provided.
    Failed(String),
    /// The orchestrator does not know (yet).
    Unknown,
}

/// Client for a remote workload orchestrator.
#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    /// Fast liveness probe.
    async fn is_online(&self) -> bool;

    /// Start a deployment and return its handle.
    async fn deploy(&self, spec: &DeploymentSpec) -> Result<DeploymentHandle, OrchestratorError>;

    /// Query the status of a deployment.
    async fn status(&self, handle: &DeploymentHandle)
        -> Result<DeploymentStatus, OrchestratorError>;

    /// Tear a deployment down.
    async fn remove(&self, handle: &DeploymentHandle) -> Result<(), OrchestratorError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
