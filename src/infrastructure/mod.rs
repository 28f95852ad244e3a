//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration loading, wiring adapters into an engine, and
//! static health checks.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`health`] - Health report over a loaded configuration

pub mod bootstrap;
pub mod config;
pub mod health;

pub use bootstrap::Engine;
pub use config::Config;
pub use health::{health_check, HealthCheck, HealthReport, HealthStatus};
