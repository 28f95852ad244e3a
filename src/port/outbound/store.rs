//! Persistence port for instances.

use crate::domain::{Instance, InstanceId};
use crate::error::Result;

/// Durable storage for the instance registry.
///
/// Calls are synchronous: implementations are local (SQLite, memory) and
/// the registry invokes them while holding its write lock, which keeps the
/// persisted copy in the same order as in-memory mutations.
pub trait InstanceStore: Send + Sync {
    /// Insert or replace an instance.
    fn save(&self, instance: &Instance) -> Result<()>;

    /// Delete an instance. Returns whether a row was removed.
    fn delete(&self, id: &InstanceId) -> Result<bool>;

    /// Load every persisted instance.
    fn load_all(&self) -> Result<Vec<Instance>>;

    /// Remove everything.
    fn clear(&self) -> Result<()>;
}
