//! Orchestrator client adapters.

pub mod http;
pub mod liveness;

pub use http::HttpOrchestratorClient;
pub use liveness::LivenessOverride;
