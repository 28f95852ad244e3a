//! The [`Installer`] handle and its `InstallApi` implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::{CallTimeouts, InstallConfig};
use super::lock::{OperationGuard, OperationLocks};
use super::reconcile;
use crate::application::catalog::CatalogStore;
use crate::application::registry::InstanceRegistry;
use crate::domain::{Instance, InstanceId, InstanceState, Package, PackageId, UserId};
use crate::error::{InstallError, OrchestratorError, RegistryError};
use crate::port::{
    DeploymentSpec, Event, InstallApi, InstallRequest, InstanceEvent, InstanceStore, InstanceView,
    Notifier, OrchestratorClient, Severity, UninstallRequest,
};

const OFFLINE_MESSAGE: &str = "Orchestrator connection failed!";
const DEPLOY_FAILED_MESSAGE: &str = "Deployment failed!";
const INTERRUPTED: &str = "interrupted by restart";

/// State shared between the engine handle and its watch tasks.
pub(crate) struct Shared {
    pub(super) catalog: Arc<CatalogStore>,
    pub(super) registry: InstanceRegistry,
    pub(super) orchestrator: Arc<dyn OrchestratorClient>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) locks: OperationLocks,
    pub(super) tasks: DashMap<InstanceId, JoinHandle<()>>,
    pub(super) config: InstallConfig,
    pub(super) timeouts: CallTimeouts,
}

/// Summary of [`Installer::recover`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Instances loaded back into the registry.
    pub restored: usize,
    /// Provisioning instances whose polling resumed.
    pub resumed: usize,
    /// Instances interrupted mid-dispatch and discarded.
    pub discarded: usize,
}

/// The installation engine. Cheap to clone.
#[derive(Clone)]
pub struct Installer {
    shared: Arc<Shared>,
}

impl Installer {
    pub fn new(
        catalog: Arc<CatalogStore>,
        orchestrator: Arc<dyn OrchestratorClient>,
        store: Arc<dyn InstanceStore>,
        notifier: Arc<dyn Notifier>,
        config: InstallConfig,
        timeouts: CallTimeouts,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                catalog,
                registry: InstanceRegistry::new(store, config.names.clone()),
                orchestrator,
                notifier,
                locks: OperationLocks::new(),
                tasks: DashMap::new(),
                config,
                timeouts,
            }),
        }
    }

    /// The catalog this engine installs from.
    #[must_use]
    pub fn catalog_store(&self) -> &Arc<CatalogStore> {
        &self.shared.catalog
    }

    /// Current view of one instance.
    #[must_use]
    pub fn instance(&self, user: &UserId, name: &str) -> Option<InstanceView> {
        self.shared
            .registry
            .get(user, name)
            .map(|instance| InstanceView::from(&instance))
    }

    /// Number of live watch tasks.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.shared.tasks.len()
    }

    /// Load persisted instances and resume supervising them.
    ///
    /// `Provisioning` instances resume polling with whatever is left of their
    /// stuck budget. Instances caught in `Validating` or `Dispatching` never
    /// got a deployment handle back and are discarded as `DispatchFailed`.
    /// An interrupted removal leaves the instance `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Storage`] if the store cannot be read.
    pub fn recover(&self) -> Result<RecoveryReport, InstallError> {
        let persisted = self.shared.registry.load_persisted()?;
        let ids: Vec<InstanceId> = persisted.iter().map(|i| i.id().clone()).collect();
        let mut report = RecoveryReport {
            restored: self.shared.registry.restore(persisted),
            ..RecoveryReport::default()
        };

        for id in ids {
            let Some(instance) = self.shared.registry.get_by_id(&id) else {
                continue;
            };
            match instance.state() {
                InstanceState::Provisioning => {
                    let Some(guard) = self.try_lock(&instance) else {
                        continue;
                    };
                    reconcile::spawn_watch(&self.shared, &instance, guard);
                    report.resumed += 1;
                }
                InstanceState::Requested
                | InstanceState::Validating
                | InstanceState::Dispatching => {
                    self.discard(&instance, DEPLOY_FAILED_MESSAGE, INTERRUPTED.to_string());
                    report.discarded += 1;
                }
                InstanceState::Removing => {
                    let detail = format!("removal {INTERRUPTED}");
                    self.record(&instance, InstanceState::Failed, Some(detail));
                }
                _ => {}
            }
        }

        info!(
            restored = report.restored,
            resumed = report.resumed,
            discarded = report.discarded,
            "Recovered persisted instances"
        );
        Ok(report)
    }

    /// Stop all watch tasks and clear the registry.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Storage`] if the store could not be cleared.
    pub async fn reset(&self) -> Result<(), InstallError> {
        self.shutdown().await;
        self.shared.registry.clear()?;
        info!("Installation engine reset");
        Ok(())
    }

    /// Stop all watch tasks. Instances keep their current state.
    pub async fn shutdown(&self) {
        let ids: Vec<InstanceId> = self
            .shared
            .tasks
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for id in ids {
            if let Some((_, task)) = self.shared.tasks.remove(&id) {
                task.abort();
                let _ = task.await;
            }
        }
    }

    /// Wait until an instance leaves the in-flight states.
    ///
    /// Returns `None` if the instance no longer exists. On timeout, returns
    /// the instance as it is at that point.
    pub async fn wait_for_settled(
        &self,
        user: &UserId,
        name: &str,
        timeout: Duration,
    ) -> Option<InstanceView> {
        let deadline = Instant::now() + timeout;
        let step = self.shared.config.poll_interval().min(Duration::from_millis(100));
        loop {
            let view = self.instance(user, name)?;
            if !view.state.is_in_flight() || Instant::now() >= deadline {
                return Some(view);
            }
            tokio::time::sleep(step).await;
        }
    }

    fn try_lock(&self, instance: &Instance) -> Option<OperationGuard> {
        self.shared
            .locks
            .try_acquire(instance.user(), instance.name())
    }

    /// Take the operation guard for `name`, then read the instance under it.
    ///
    /// Anything read before the guard is held may already be stale: a watch
    /// can settle, or the name can be freed and reserved again.
    fn claim(&self, user: &UserId, name: &str) -> Result<(Instance, OperationGuard), InstallError> {
        let guard = self
            .shared
            .locks
            .try_acquire(user, name)
            .ok_or_else(|| InstallError::RegistryConflict {
                name: name.to_string(),
            })?;
        let instance = self
            .shared
            .registry
            .get(user, name)
            .ok_or_else(|| InstallError::NotFound {
                name: name.to_string(),
            })?;
        Ok((instance, guard))
    }

    fn package(&self, package_id: &PackageId) -> Result<Package, InstallError> {
        self.shared
            .catalog
            .get(package_id)
            .ok_or_else(|| InstallError::UnknownPackage {
                package_id: package_id.to_string(),
            })
    }

    fn transition(
        &self,
        instance: &Instance,
        state: InstanceState,
        detail: Option<String>,
    ) -> Result<Instance, InstallError> {
        self.shared
            .registry
            .transition(instance.id(), state, detail)
            .map_err(|e| registry_error(instance, e))
    }

    /// Transition where the caller has no way to act on a failure.
    fn record(&self, instance: &Instance, state: InstanceState, detail: Option<String>) {
        let _ = self.transition(instance, state, detail);
    }

    fn alert(&self, instance: &Instance, message: &str, detail: Option<String>) {
        let event = reconcile::alert(instance, Severity::Error, message, detail);
        self.shared.notifier.notify(event);
    }

    /// Record `DispatchFailed`, notify, then free the name.
    fn discard(&self, instance: &Instance, message: &str, detail: String) {
        warn!(
            user = %instance.user(),
            instance = %instance.id(),
            name = instance.name(),
            reason = %detail,
            "Dispatch failed"
        );
        self.record(instance, InstanceState::DispatchFailed, Some(detail.clone()));
        self.alert(instance, message, Some(detail));
        self.shared.registry.remove(instance.id());
    }

    async fn is_online(&self) -> bool {
        let timeout = self.shared.timeouts.liveness;
        match tokio::time::timeout(timeout, self.shared.orchestrator.is_online()).await {
            Ok(online) => online,
            Err(_) => {
                warn!(
                    orchestrator = self.shared.orchestrator.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Liveness probe timed out"
                );
                false
            }
        }
    }

    async fn call<T, F>(&self, operation: &'static str, call: F) -> Result<T, OrchestratorError>
    where
        F: std::future::Future<Output = Result<T, OrchestratorError>>,
    {
        let timeout = self.shared.timeouts.call;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(OrchestratorError::Timeout {
                    operation,
                    timeout_ms: timeout.as_millis() as u64,
                })
            })
    }

    /// Deploy an instance that is in `Dispatching` and hand it to a watch task.
    async fn dispatch(
        &self,
        instance: Instance,
        package: &Package,
        guard: OperationGuard,
    ) -> Result<InstanceView, InstallError> {
        let spec = DeploymentSpec::for_instance(&instance, package.image.clone());
        let deployed = self
            .call("deploy", self.shared.orchestrator.deploy(&spec))
            .await;

        let handle = match deployed {
            Ok(handle) => handle,
            Err(e) => {
                let reason = e.to_string();
                self.discard(&instance, DEPLOY_FAILED_MESSAGE, reason.clone());
                return Err(InstallError::DeployFailure { reason });
            }
        };

        self.shared
            .registry
            .attach_handle(instance.id(), handle)
            .map_err(|e| registry_error(&instance, e))?;
        let provisioning = self.transition(&instance, InstanceState::Provisioning, None)?;
        reconcile::spawn_watch(&self.shared, &provisioning, guard);
        Ok(InstanceView::from(&provisioning))
    }

    async fn retry_failed(
        &self,
        instance: Instance,
        guard: OperationGuard,
    ) -> Result<InstanceView, InstallError> {
        let package = self.package(instance.package())?;

        if !self.is_online().await {
            self.alert(&instance, OFFLINE_MESSAGE, None);
            return Err(InstallError::OrchestratorOffline);
        }

        if let Some(handle) = instance.handle() {
            if let Err(e) = self
                .call("remove", self.shared.orchestrator.remove(handle))
                .await
            {
                debug!(instance = %instance.id(), error = %e, "Old deployment not removed");
            }
        }

        let dispatching = self.transition(&instance, InstanceState::Dispatching, None)?;
        self.dispatch(dispatching, &package, guard).await
    }
}

/// Map a registry failure on `instance`, naming the instance rather than its id.
fn registry_error(instance: &Instance, err: RegistryError) -> InstallError {
    match err {
        RegistryError::NotFound { .. } => InstallError::NotFound {
            name: instance.name().to_string(),
        },
        RegistryError::InvalidTransition(transition) => {
            error!(instance = %instance.id(), error = %transition, "Invalid state transition");
            InstallError::InvalidTransition(transition)
        }
        other => InstallError::from(other),
    }
}

#[async_trait]
impl InstallApi for Installer {
    async fn install(&self, request: InstallRequest) -> Result<InstanceView, InstallError> {
        let InstallRequest {
            user,
            name,
            package_id,
        } = request;

        // Rejections are recorded on a draft that is never stored.
        let mut draft = Instance::new(user.clone(), name.clone(), package_id.clone());
        let _ = draft.advance(InstanceState::Validating, None);

        let checked = self
            .shared
            .config
            .names
            .validate_syntax(&name)
            .map_err(InstallError::from)
            .and_then(|()| self.package(&package_id));
        let package = match checked {
            Ok(package) => package,
            Err(e) => {
                let _ = draft.advance(InstanceState::Rejected, Some(e.to_string()));
                debug!(
                    user = %user,
                    name = %name,
                    state = %draft.state(),
                    error = %e,
                    "Install rejected"
                );
                return Err(e);
            }
        };

        let instance = self
            .shared
            .registry
            .reserve(&user, &name, &package_id)
            .inspect_err(|e| debug!(user = %user, name = %name, error = %e, "Install rejected"))?;

        let Some(guard) = self.try_lock(&instance) else {
            self.shared.registry.remove(instance.id());
            return Err(InstallError::RegistryConflict { name });
        };

        info!(
            user = %user,
            instance = %instance.id(),
            name = %name,
            package = %package_id,
            "Install requested"
        );

        if !self.is_online().await {
            self.discard(&instance, OFFLINE_MESSAGE, "orchestrator offline".to_string());
            return Err(InstallError::OrchestratorOffline);
        }

        let dispatching = self.transition(&instance, InstanceState::Dispatching, None)?;
        self.dispatch(dispatching, &package, guard).await
    }

    async fn uninstall(&self, request: UninstallRequest) -> Result<(), InstallError> {
        let UninstallRequest { user, name } = request;
        let (instance, _guard) = self.claim(&user, &name)?;
        if !instance.state().is_removable() {
            return Err(InstallError::RegistryConflict { name });
        }

        let removing = self.transition(&instance, InstanceState::Removing, None)?;

        if let Some(handle) = removing.handle() {
            if let Err(e) = self
                .call("remove", self.shared.orchestrator.remove(handle))
                .await
            {
                let reason = e.to_string();
                warn!(
                    user = %user,
                    instance = %removing.id(),
                    name = %name,
                    error = %reason,
                    "Uninstall failed"
                );
                self.record(&removing, InstanceState::Failed, Some(reason.clone()));
                return Err(InstallError::DeployFailure { reason });
            }
        }

        self.shared.registry.remove(removing.id());
        info!(user = %user, instance = %removing.id(), name = %name, "Instance removed");
        self.shared
            .notifier
            .notify(Event::InstanceRemoved(InstanceEvent::from(&removing)));
        Ok(())
    }

    async fn retry(&self, user: &UserId, name: &str) -> Result<InstanceView, InstallError> {
        let (instance, guard) = self.claim(user, name)?;

        info!(
            user = %user,
            instance = %instance.id(),
            name = name,
            state = %instance.state(),
            "Retry requested"
        );

        match instance.state() {
            InstanceState::Stuck => {
                let provisioning =
                    self.transition(&instance, InstanceState::Provisioning, None)?;
                reconcile::spawn_watch(&self.shared, &provisioning, guard);
                Ok(InstanceView::from(&provisioning))
            }
            InstanceState::Failed => self.retry_failed(instance, guard).await,
            state => Err(InstallError::NotRetryable {
                name: name.to_string(),
                state,
            }),
        }
    }

    fn instances(&self, user: &UserId) -> Vec<InstanceView> {
        self.shared
            .registry
            .list_active(user)
            .iter()
            .map(InstanceView::from)
            .collect()
    }

    fn catalog(&self) -> Vec<Package> {
        self.shared.catalog.list().as_ref().clone()
    }
}
