//! berth - install self-hosted applications from a catalog onto a remote
//! orchestrator.
//!
//! A user picks a package from the catalog and names the instance. The engine
//! validates the name, reserves it, checks that the orchestrator is reachable,
//! dispatches the deployment and then polls it in the background until it is
//! running, has failed, or has been provisioning for too long.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Identifiers, packages, instances and the lifecycle state
//!   machine, name rules
//! - [`port`] - Traits at the boundaries: [`port::InstallApi`] inbound;
//!   orchestrator, catalog source, instance store and notifier outbound
//! - [`application`] - The [`application::Installer`] engine, the instance
//!   registry and catalog synchronization
//! - [`adapter`] - The CLI and the HTTP, SQLite and webhook adapters
//! - [`infrastructure`] - Configuration, wiring and health checks
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Expose scripted test doubles under [`testkit`] for
//!   integration tests
//!
//! # Example
//!
//! ```no_run
//! use berth::infrastructure::{Config, Engine};
//! use berth::port::{InstallApi, InstallRequest};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("berth.toml")?;
//! let engine = Engine::build(&config)?;
//! engine.installer().recover()?;
//! engine.load_catalog().await?;
//!
//! let view = engine
//!     .installer()
//!     .install(InstallRequest::new("1", "myapp", "wordpress"))
//!     .await?;
//! println!("{} is {}", view.name, view.state);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
