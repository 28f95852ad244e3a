//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the orchestrator,
//! the catalog source, instance persistence and notifications.

pub mod catalog;
pub mod notifier;
pub mod orchestrator;
pub mod store;
