//! Configuration and orchestrator validation command handlers.

pub mod config;
pub mod orchestrator;
