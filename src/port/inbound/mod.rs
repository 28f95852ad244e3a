//! Inbound ports (driving side): the API the engine exposes to adapters.

pub mod install;
