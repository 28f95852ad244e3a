//! Composition root: builds the engine and its adapters from [`Config`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::adapter::outbound::catalog::{FileCatalogSource, HttpCatalogSource};
use crate::adapter::outbound::notifier::{WebhookConfig, WebhookNotifier};
use crate::adapter::outbound::orchestrator::{HttpOrchestratorClient, LivenessOverride};
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteInstanceStore};
use crate::application::{
    sync_once, CatalogStore, CatalogSyncHandle, CatalogSyncService, Installer, SyncOutcome,
};
use crate::error::Result;
use crate::infrastructure::config::{
    CatalogConfig, CatalogSourceConfig, Config, NotificationConfig, OrchestratorConfig,
};
use crate::port::{CatalogSource, InstanceStore, LogNotifier, NotifierRegistry, OrchestratorClient};

/// Build the catalog source named by `[catalog.source]`.
pub fn build_catalog_source(config: &CatalogConfig) -> Arc<dyn CatalogSource> {
    match &config.source {
        CatalogSourceConfig::File { path } => Arc::new(FileCatalogSource::new(path)),
        CatalogSourceConfig::Http {
            url,
            timeout_ms,
            retry_max_attempts,
        } => Arc::new(HttpCatalogSource::new(
            url.clone(),
            Duration::from_millis(*timeout_ms),
            *retry_max_attempts,
        )),
    }
}

/// Build the orchestrator client, applying `force_online` if set.
///
/// The bearer token is read from the environment only.
#[allow(clippy::result_large_err)]
pub fn build_orchestrator(config: &OrchestratorConfig) -> Result<Arc<dyn OrchestratorClient>> {
    let timeouts = config.timeouts();
    let client: Arc<dyn OrchestratorClient> = Arc::new(HttpOrchestratorClient::from_env(
        &config.endpoint,
        timeouts.call,
    )?);

    Ok(match config.force_online {
        Some(online) => {
            info!(online, "Orchestrator liveness forced by configuration");
            Arc::new(LivenessOverride::new(client, online))
        }
        None => client,
    })
}

/// Open the SQLite database and apply pending migrations.
#[allow(clippy::result_large_err)]
pub fn build_store(database: &str) -> Result<Arc<dyn InstanceStore>> {
    let pool = create_pool(database)?;
    run_migrations(&pool)?;
    debug!(database, "Instance store ready");
    Ok(Arc::new(SqliteInstanceStore::new(pool)))
}

/// Build the notifier registry from `[notifications]`.
///
/// Must be called from within a tokio runtime when a webhook is configured.
pub fn build_notifier_registry(config: &NotificationConfig) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    if config.log {
        registry.register(Box::new(LogNotifier));
    }
    if let Some(url) = &config.webhook_url {
        registry.register(Box::new(WebhookNotifier::new(WebhookConfig {
            timeout: Duration::from_millis(config.webhook_timeout_ms),
            ..WebhookConfig::new(url.clone())
        })));
        info!(url = %url, "Webhook notifier enabled");
    }
    if registry.is_empty() {
        warn!("No notification sinks enabled, alerts will be dropped");
    }
    registry
}

/// A fully wired engine plus the catalog source feeding it.
pub struct Engine {
    installer: Installer,
    catalog_source: Arc<dyn CatalogSource>,
    catalog: CatalogConfig,
}

impl Engine {
    /// Wire every adapter named by `config`.
    ///
    /// The catalog starts empty; call [`Engine::load_catalog`] or
    /// [`Engine::start_catalog_sync`] to populate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestrator endpoint is invalid or the
    /// database cannot be opened.
    #[allow(clippy::result_large_err)]
    pub fn build(config: &Config) -> Result<Self> {
        let orchestrator = build_orchestrator(&config.orchestrator)?;
        let store = build_store(&config.database)?;
        let notifier = Arc::new(build_notifier_registry(&config.notifications));

        let installer = Installer::new(
            Arc::new(CatalogStore::new()),
            orchestrator,
            store,
            notifier,
            config.install.clone(),
            config.orchestrator.timeouts(),
        );

        Ok(Self {
            installer,
            catalog_source: build_catalog_source(&config.catalog),
            catalog: config.catalog.clone(),
        })
    }

    /// The installation engine.
    #[must_use]
    pub fn installer(&self) -> &Installer {
        &self.installer
    }

    /// The catalog source the engine syncs from.
    #[must_use]
    pub fn catalog_source(&self) -> &Arc<dyn CatalogSource> {
        &self.catalog_source
    }

    /// Fetch the catalog once.
    ///
    /// # Errors
    ///
    /// Returns the catalog source error; the store keeps its contents.
    pub async fn load_catalog(&self) -> Result<SyncOutcome> {
        let outcome = sync_once(self.catalog_source.as_ref(), self.installer.catalog_store()).await?;
        Ok(outcome)
    }

    /// Start the periodic sync loop, or load once when sync is disabled.
    ///
    /// Returns `None` when sync is disabled.
    pub async fn start_catalog_sync(&self) -> Option<CatalogSyncHandle> {
        if !self.catalog.sync_enabled {
            info!("Catalog sync disabled, loading once");
            if let Err(e) = self.load_catalog().await {
                warn!(source = %self.catalog_source.describe(), error = %e, "Initial catalog load failed");
            }
            return None;
        }

        let service = CatalogSyncService::new(
            Arc::clone(&self.catalog_source),
            Arc::clone(self.installer.catalog_store()),
            self.catalog.sync_interval(),
        );
        info!(
            source = %self.catalog_source.describe(),
            interval_secs = self.catalog.sync_interval_secs,
            "Catalog sync started"
        );
        Some(service.start())
    }
}
