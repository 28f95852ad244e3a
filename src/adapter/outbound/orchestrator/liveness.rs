//! Liveness override wrapper.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DeploymentHandle;
use crate::error::OrchestratorError;
use crate::port::{DeploymentSpec, DeploymentStatus, OrchestratorClient};

/// Wraps a client and answers `is_online` with a fixed value.
///
/// Every other call is delegated. Used for the `orchestrator.force_online`
/// operational toggle.
pub struct LivenessOverride {
    inner: Arc<dyn OrchestratorClient>,
    online: bool,
}

impl LivenessOverride {
    pub fn new(inner: Arc<dyn OrchestratorClient>, online: bool) -> Self {
        Self { inner, online }
    }
}

#[async_trait]
impl OrchestratorClient for LivenessOverride {
    async fn is_online(&self) -> bool {
        self.online
    }

    async fn deploy(&self, spec: &DeploymentSpec) -> Result<DeploymentHandle, OrchestratorError> {
        self.inner.deploy(spec).await
    }

    async fn status(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<DeploymentStatus, OrchestratorError> {
        self.inner.status(handle).await
    }

    async fn remove(&self, handle: &DeploymentHandle) -> Result<(), OrchestratorError> {
        self.inner.remove(handle).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::orchestrator::ScriptedOrchestrator;

    #[tokio::test]
    async fn overrides_liveness_and_delegates_the_rest() {
        let inner = Arc::new(ScriptedOrchestrator::offline());
        let client = LivenessOverride::new(inner.clone(), true);

        assert!(client.is_online().await);
        let spec = crate::testkit::orchestrator::spec("myapp");
        let handle = client.deploy(&spec).await.unwrap();

        assert_eq!(inner.deploy_calls(), 1);
        assert_eq!(client.status(&handle).await.unwrap(), DeploymentStatus::Provisioning);
        assert_eq!(client.name(), "scripted");
    }

    #[tokio::test]
    async fn can_force_offline() {
        let inner = Arc::new(ScriptedOrchestrator::new());
        let client = LivenessOverride::new(inner, false);
        assert!(!client.is_online().await);
    }
}
