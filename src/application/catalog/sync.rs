//! Periodic catalog synchronization.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::store::{CatalogStore, SyncOutcome};
use crate::error::CatalogError;
use crate::port::CatalogSource;

/// Fetch the full catalog once and replace the store's contents.
///
/// On any failure the store keeps its last good catalog. An empty answer
/// never wipes a populated store; emptying the catalog is done with
/// [`CatalogStore::clear`].
///
/// # Errors
///
/// Returns the source error, or [`CatalogError::InvalidBatch`] when the
/// fetched list is rejected by the store.
pub async fn sync_once(
    source: &dyn CatalogSource,
    store: &CatalogStore,
) -> Result<SyncOutcome, CatalogError> {
    let packages = source.fetch().await?;
    if packages.is_empty() && !store.is_empty() {
        let kept = store.len();
        warn!(
            source = %source.describe(),
            kept,
            "Catalog source returned no packages, keeping last good catalog"
        );
        return Ok(SyncOutcome::EmptyIgnored { kept });
    }
    let outcome = store.replace(packages)?;

    match outcome {
        SyncOutcome::Replaced { packages } => {
            info!(source = %source.describe(), packages, "Catalog updated");
        }
        SyncOutcome::Unchanged { packages } => {
            debug!(source = %source.describe(), packages, "Catalog unchanged");
        }
        SyncOutcome::EmptyIgnored { .. } => {}
    }

    Ok(outcome)
}

/// Handle to control the sync service.
pub struct CatalogSyncHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CatalogSyncHandle {
    /// Signal the service to stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

/// Background service that keeps a [`CatalogStore`] in sync with its source.
pub struct CatalogSyncService {
    source: Arc<dyn CatalogSource>,
    store: Arc<CatalogStore>,
    interval: Duration,
}

impl CatalogSyncService {
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<CatalogStore>, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
        }
    }

    /// Start the periodic sync loop.
    ///
    /// The first tick fires immediately, so the store is populated as soon
    /// as the source answers.
    pub fn start(self) -> CatalogSyncHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let Self {
            source,
            store,
            interval,
        } = self;

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Catalog sync shutting down");
                        break;
                    }
                    _ = timer.tick() => {
                        if let Err(e) = sync_once(source.as_ref(), &store).await {
                            warn!(
                                source = %source.describe(),
                                error = %e,
                                packages = store.len(),
                                "Catalog sync failed, keeping last good catalog"
                            );
                        }
                    }
                }
            }
        });

        CatalogSyncHandle { shutdown_tx, task }
    }
}
