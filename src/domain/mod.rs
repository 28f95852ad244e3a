//! Orchestrator-agnostic domain types.
//!
//! - [`id`] - Newtype identifiers for users, packages, instances, deployments
//! - [`package`] - Catalog entries
//! - [`instance`] - Instances and the lifecycle state machine
//! - [`name`] - Instance name rules
//! - [`error`] - Domain validation errors

pub mod error;
pub mod id;
pub mod instance;
pub mod name;
pub mod package;

pub use error::{InvalidNameReason, NameError, TransitionError};
pub use id::{DeploymentHandle, InstanceId, PackageId, UserId};
pub use instance::{Instance, InstanceState};
pub use name::{name_key, NameRules};
pub use package::Package;
