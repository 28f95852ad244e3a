//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (orchestrators, catalog sources, databases, notification services).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!      InstallApi ──▶│      Application        │
//!                    │  (Installer, Registry,  │
//!     ┌──────────────┤   CatalogStore)         ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                    │            │                     │
//!     ▼                    ▼            ▼                     ▼
//! ┌────────────┐   ┌─────────────┐ ┌──────────┐        ┌───────────┐
//! │Orchestrator│   │  Catalog    │ │ Instance │        │ Notifier  │
//! │  Adapter   │   │  Source     │ │  Store   │        │  Adapter  │
//! └────────────┘   └─────────────┘ └──────────┘        └───────────┘
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::install::{InstallApi, InstallRequest, InstanceView, UninstallRequest};
pub use outbound::catalog::CatalogSource;
pub use outbound::notifier::{
    Alert, Event, InstanceEvent, LogNotifier, Notifier, NotifierRegistry, NullNotifier, Severity,
};
pub use outbound::orchestrator::{DeploymentSpec, DeploymentStatus, OrchestratorClient};
pub use outbound::store::InstanceStore;
