//! Scripted orchestrator for deterministic engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{DeploymentHandle, InstanceId, PackageId, UserId};
use crate::error::OrchestratorError;
use crate::port::{DeploymentSpec, DeploymentStatus, OrchestratorClient};

/// In-process [`OrchestratorClient`] whose answers are set by the test.
///
/// Deployments get handles `dep-1`, `dep-2`, ... and report
/// [`DeploymentStatus::Provisioning`] until told otherwise.
#[derive(Debug)]
pub struct ScriptedOrchestrator {
    online: AtomicBool,
    deploy_results: Mutex<VecDeque<Result<(), OrchestratorError>>>,
    remove_results: Mutex<VecDeque<Result<(), OrchestratorError>>>,
    status_results: Mutex<VecDeque<Result<DeploymentStatus, OrchestratorError>>>,
    statuses: Mutex<HashMap<DeploymentHandle, DeploymentStatus>>,
    default_status: Mutex<DeploymentStatus>,
    deployed: Mutex<Vec<DeploymentSpec>>,
    removed: Mutex<Vec<DeploymentHandle>>,
    deploy_delay: Mutex<Duration>,
    status_delay: Mutex<Duration>,
    remove_delay: Mutex<Duration>,
    liveness_delay: Mutex<Duration>,
    liveness_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl Default for ScriptedOrchestrator {
    fn default() -> Self {
        Self {
            online: AtomicBool::new(true),
            deploy_results: Mutex::new(VecDeque::new()),
            remove_results: Mutex::new(VecDeque::new()),
            status_results: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(HashMap::new()),
            default_status: Mutex::new(DeploymentStatus::Provisioning),
            deployed: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            deploy_delay: Mutex::new(Duration::ZERO),
            status_delay: Mutex::new(Duration::ZERO),
            remove_delay: Mutex::new(Duration::ZERO),
            liveness_delay: Mutex::new(Duration::ZERO),
            liveness_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedOrchestrator {
    /// Online orchestrator that accepts every deployment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orchestrator whose liveness probe answers `false`.
    #[must_use]
    pub fn offline() -> Self {
        let orchestrator = Self::default();
        orchestrator.set_online(false);
        orchestrator
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Make the next `deploy` call fail with `err`.
    pub fn fail_next_deploy(&self, err: OrchestratorError) {
        self.deploy_results.lock().push_back(Err(err));
    }

    /// Make the next `remove` call fail with `err`.
    pub fn fail_next_remove(&self, err: OrchestratorError) {
        self.remove_results.lock().push_back(Err(err));
    }

    /// Queue a one-off `status` answer, used before the per-handle status.
    pub fn push_status(&self, result: Result<DeploymentStatus, OrchestratorError>) {
        self.status_results.lock().push_back(result);
    }

    /// Status reported for `handle` from now on.
    pub fn set_status(&self, handle: &str, status: DeploymentStatus) {
        self.statuses
            .lock()
            .insert(DeploymentHandle::from(handle), status);
    }

    /// Status reported for every handle without its own status.
    pub fn set_default_status(&self, status: DeploymentStatus) {
        *self.default_status.lock() = status;
    }

    /// Delay every `deploy` call.
    pub fn set_deploy_delay(&self, delay: Duration) {
        *self.deploy_delay.lock() = delay;
    }

    /// Delay every `status` call.
    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock() = delay;
    }

    /// Delay every `remove` call.
    pub fn set_remove_delay(&self, delay: Duration) {
        *self.remove_delay.lock() = delay;
    }

    /// Delay every liveness probe.
    pub fn set_liveness_delay(&self, delay: Duration) {
        *self.liveness_delay.lock() = delay;
    }

    /// Specs passed to `deploy`, in call order.
    #[must_use]
    pub fn deployed(&self) -> Vec<DeploymentSpec> {
        self.deployed.lock().clone()
    }

    #[must_use]
    pub fn deploy_calls(&self) -> usize {
        self.deployed.lock().len()
    }

    /// Handles passed to `remove`, in call order.
    #[must_use]
    pub fn removed(&self) -> Vec<DeploymentHandle> {
        self.removed.lock().clone()
    }

    #[must_use]
    pub fn liveness_calls(&self) -> usize {
        self.liveness_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrchestratorClient for ScriptedOrchestrator {
    async fn is_online(&self) -> bool {
        self.liveness_calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.liveness_delay).await;
        self.online.load(Ordering::SeqCst)
    }

    async fn deploy(&self, spec: &DeploymentSpec) -> Result<DeploymentHandle, OrchestratorError> {
        pause(&self.deploy_delay).await;

        let mut deployed = self.deployed.lock();
        deployed.push(spec.clone());
        let handle = DeploymentHandle::new(format!("dep-{}", deployed.len()));
        drop(deployed);

        self.deploy_results
            .lock()
            .pop_front()
            .unwrap_or(Ok(()))
            .map(|()| handle)
    }

    async fn status(
        &self,
        handle: &DeploymentHandle,
    ) -> Result<DeploymentStatus, OrchestratorError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        pause(&self.status_delay).await;
        if let Some(result) = self.status_results.lock().pop_front() {
            return result;
        }
        let status = self.statuses.lock().get(handle).cloned();
        Ok(status.unwrap_or_else(|| self.default_status.lock().clone()))
    }

    async fn remove(&self, handle: &DeploymentHandle) -> Result<(), OrchestratorError> {
        pause(&self.remove_delay).await;
        self.removed.lock().push(handle.clone());
        self.remove_results.lock().pop_front().unwrap_or(Ok(()))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

async fn pause(delay: &Mutex<Duration>) {
    let delay = *delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Deployment spec for a `wordpress` instance called `name`.
#[must_use]
pub fn spec(name: &str) -> DeploymentSpec {
    DeploymentSpec {
        instance_id: InstanceId::new(),
        user_id: UserId::from("1"),
        name: name.to_string(),
        package_id: PackageId::from("wordpress"),
        image: "wordpress:6".to_string(),
    }
}
