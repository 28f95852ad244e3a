//! Per-name operation locks.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{name_key, UserId};

type Key = (UserId, String);

/// Set of (user, name) keys with an operation in flight.
///
/// Acquiring never waits: a held key means the caller gets a "busy"
/// answer instead of queueing behind the running operation.
#[derive(Debug, Clone, Default)]
pub struct OperationLocks {
    held: Arc<Mutex<HashSet<Key>>>,
}

impl OperationLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start an operation on `name` for `user`.
    ///
    /// Returns `None` if another operation holds the key.
    #[must_use]
    pub fn try_acquire(&self, user: &UserId, name: &str) -> Option<OperationGuard> {
        let key = (user.clone(), name_key(name));
        if !self.held.lock().insert(key.clone()) {
            return None;
        }
        Some(OperationGuard {
            held: Arc::clone(&self.held),
            key,
        })
    }
}

/// Releases its key when dropped.
///
/// The guard is `Send + 'static`, so an operation can hand it to the
/// background task that finishes the work.
#[derive(Debug)]
pub struct OperationGuard {
    held: Arc<Mutex<HashSet<Key>>>,
    key: Key,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.held.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let locks = OperationLocks::new();
        let user = UserId::from("1");

        let guard = locks.try_acquire(&user, "myapp").unwrap();
        assert!(locks.try_acquire(&user, "myapp").is_none());

        drop(guard);
        assert!(locks.try_acquire(&user, "myapp").is_some());
    }

    #[test]
    fn keys_are_case_insensitive_and_per_user() {
        let locks = OperationLocks::new();
        let _guard = locks.try_acquire(&UserId::from("1"), "MyApp").unwrap();

        assert!(locks.try_acquire(&UserId::from("1"), "myapp").is_none());
        assert!(locks.try_acquire(&UserId::from("2"), "myapp").is_some());
    }

    #[tokio::test]
    async fn guard_released_from_another_task() {
        let locks = OperationLocks::new();
        let user = UserId::from("1");
        let guard = locks.try_acquire(&user, "myapp").unwrap();

        tokio::spawn(async move { drop(guard) }).await.unwrap();

        assert!(locks.try_acquire(&user, "myapp").is_some());
    }
}
