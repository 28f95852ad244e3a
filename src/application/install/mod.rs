//! Installation engine.
//!
//! [`Installer`] validates and reserves instance names, dispatches
//! deployments to the orchestrator and supervises each provisioning
//! instance from a background task until it settles.
//!
//! Lifecycle of one install:
//!
//! 1. Syntax and package checks on a local draft (never stored)
//! 2. Atomic reservation in the registry (`Validating`)
//! 3. Liveness probe; offline means `DispatchFailed`
//! 4. `deploy()`; success means `Provisioning` and a watch task is spawned
//! 5. The watch task moves the instance to `Running`, `Failed` or `Stuck`
//!
//! Operations on the same (user, name) are serialized with
//! [`OperationLocks`]; the guard taken by an install travels into the
//! watch task, so the instance stays busy until provisioning settles.

mod config;
mod installer;
mod lock;
mod reconcile;

pub use config::{CallTimeouts, InstallConfig};
pub use installer::{Installer, RecoveryReport};
pub use lock::{OperationGuard, OperationLocks};
