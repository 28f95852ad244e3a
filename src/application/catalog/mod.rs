//! Package catalog: the store and its synchronization loop.

mod store;
mod sync;

pub use store::{CatalogStore, SyncOutcome};
pub use sync::{sync_once, CatalogSyncHandle, CatalogSyncService};
