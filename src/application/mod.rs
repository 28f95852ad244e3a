//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod catalog;
pub mod install;
pub mod registry;

pub use catalog::{sync_once, CatalogStore, CatalogSyncHandle, CatalogSyncService, SyncOutcome};
pub use install::{CallTimeouts, InstallConfig, Installer, RecoveryReport};
pub use registry::InstanceRegistry;
