//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving adapters (the `berth` CLI)
//! - [`outbound`] - Driven adapters (orchestrator, catalog sources,
//!   persistence, notifiers)

pub mod inbound;
pub mod outbound;
