//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`orchestrator`] - `ScriptedOrchestrator`, a scriptable
//!   [`OrchestratorClient`](crate::port::OrchestratorClient)
//! - [`catalog`] - `StaticCatalogSource` and a sample package list
//! - [`notifier`] - `RecordingNotifier` for notification assertions
//! - [`config`] - Canonical test configurations

pub mod catalog;
pub mod config;
pub mod notifier;
pub mod orchestrator;
