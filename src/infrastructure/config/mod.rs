//! Infrastructure configuration modules.

pub mod catalog;
pub mod logging;
pub mod notifications;
pub mod orchestrator;
pub mod settings;

pub use catalog::{CatalogConfig, CatalogSourceConfig};
pub use logging::LoggingConfig;
pub use notifications::NotificationConfig;
pub use orchestrator::OrchestratorConfig;
pub use settings::Config;
