use std::sync::Arc;
use std::time::Duration;

use berth::adapter::outbound::memory::MemoryInstanceStore;
use berth::application::{CatalogStore, Installer};
use berth::domain::UserId;
use berth::error::InstallError;
use berth::port::{InstallApi, InstallRequest, InstanceStore, InstanceView};
use berth::testkit::catalog::packages;
use berth::testkit::config;
use berth::testkit::notifier::RecordingNotifier;
use berth::testkit::orchestrator::ScriptedOrchestrator;

/// An installer wired to scripted collaborators.
pub struct TestEngine {
    pub installer: Installer,
    pub orchestrator: Arc<ScriptedOrchestrator>,
    pub notifier: RecordingNotifier,
    pub store: Arc<dyn InstanceStore>,
    pub catalog: Arc<CatalogStore>,
}

impl TestEngine {
    /// Online orchestrator, sample catalog, in-memory store.
    pub fn new() -> Self {
        Self::with(
            Arc::new(ScriptedOrchestrator::new()),
            Arc::new(MemoryInstanceStore::new()),
        )
    }

    pub fn offline() -> Self {
        Self::with(
            Arc::new(ScriptedOrchestrator::offline()),
            Arc::new(MemoryInstanceStore::new()),
        )
    }

    pub fn with(orchestrator: Arc<ScriptedOrchestrator>, store: Arc<dyn InstanceStore>) -> Self {
        let catalog = Arc::new(CatalogStore::with_packages(packages()).expect("sample catalog"));
        let notifier = RecordingNotifier::new();
        let installer = Installer::new(
            Arc::clone(&catalog),
            orchestrator.clone(),
            Arc::clone(&store),
            Arc::new(notifier.clone()),
            config::install(),
            config::timeouts(),
        );

        Self {
            installer,
            orchestrator,
            notifier,
            store,
            catalog,
        }
    }

    /// A fresh engine over the same store and orchestrator, as after a
    /// process restart.
    pub fn restart(&self) -> Self {
        Self::with(Arc::clone(&self.orchestrator), Arc::clone(&self.store))
    }

    pub async fn install(&self, name: &str, package: &str) -> Result<InstanceView, InstallError> {
        self.installer
            .install(InstallRequest::new(user(), name, package))
            .await
    }

    pub async fn settle(&self, name: &str) -> InstanceView {
        self.installer
            .wait_for_settled(&user(), name, Duration::from_secs(120))
            .await
            .expect("instance exists")
    }

    pub fn instance(&self, name: &str) -> Option<InstanceView> {
        self.installer.instance(&user(), name)
    }

    pub fn alert_messages(&self) -> Vec<String> {
        self.notifier
            .alerts()
            .into_iter()
            .map(|alert| alert.message)
            .collect()
    }
}

/// The user every fixture acts as.
pub fn user() -> UserId {
    UserId::from("1")
}
