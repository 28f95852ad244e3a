//! Instance registry: the single source of truth for instance state.
//!
//! All mutations take one write lock, so the name check and the insertion
//! of a reservation are a single critical section. Every mutation
//! is written through to the configured [`InstanceStore`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::{
    name_key, DeploymentHandle, Instance, InstanceId, InstanceState, NameRules, PackageId, UserId,
};
use crate::error::RegistryError;
use crate::port::InstanceStore;

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<InstanceId, Instance>,
    by_name: HashMap<(UserId, String), InstanceId>,
}

impl Entries {
    fn names_of<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a str> + 'a {
        self.by_id
            .values()
            .filter(move |instance| instance.user() == user)
            .map(Instance::name)
    }

    fn insert(&mut self, instance: Instance) {
        self.by_name.insert(
            (instance.user().clone(), name_key(instance.name())),
            instance.id().clone(),
        );
        self.by_id.insert(instance.id().clone(), instance);
    }

    fn remove(&mut self, id: &InstanceId) -> Option<Instance> {
        let instance = self.by_id.remove(id)?;
        self.by_name
            .remove(&(instance.user().clone(), name_key(instance.name())));
        Some(instance)
    }
}

/// In-memory registry of instances backed by an [`InstanceStore`].
pub struct InstanceRegistry {
    entries: RwLock<Entries>,
    store: Arc<dyn InstanceStore>,
    rules: NameRules,
}

impl InstanceRegistry {
    pub fn new(store: Arc<dyn InstanceStore>, rules: NameRules) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            store,
            rules,
        }
    }

    /// Atomically validate the name against the user's active names and
    /// insert a new instance in `Validating`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Name`] if the name breaks the naming rules or the
    ///   user already has an instance with this name (case-insensitive)
    /// - [`RegistryError::Storage`] if the store refused the write; nothing
    ///   is reserved in that case
    pub fn reserve(
        &self,
        user: &UserId,
        name: &str,
        package: &PackageId,
    ) -> Result<Instance, RegistryError> {
        let mut entries = self.entries.write();
        self.rules.validate(name, entries.names_of(user))?;

        let mut instance = Instance::new(user.clone(), name, package.clone());
        instance.advance(InstanceState::Validating, None)?;

        self.store
            .save(&instance)
            .map_err(|e| RegistryError::Storage(e.to_string()))?;

        entries.insert(instance.clone());
        Ok(instance)
    }

    /// Move an instance to `next`, optionally recording an error detail.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] for an unknown id
    /// - [`RegistryError::InvalidTransition`] if the state machine forbids
    ///   the move; the instance is unchanged
    pub fn transition(
        &self,
        id: &InstanceId,
        next: InstanceState,
        error: Option<String>,
    ) -> Result<Instance, RegistryError> {
        self.update(id, |instance| {
            let from = instance.state();
            instance.advance(next, error)?;
            info!(
                user = %instance.user(),
                instance = %instance.id(),
                name = instance.name(),
                from = %from,
                state = %next,
                "Instance state changed"
            );
            Ok(())
        })
    }

    /// Store the deployment handle returned by the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn attach_handle(
        &self,
        id: &InstanceId,
        handle: DeploymentHandle,
    ) -> Result<Instance, RegistryError> {
        self.update(id, |instance| {
            instance.attach_handle(handle);
            Ok(())
        })
    }

    /// Stamp the last status check time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn record_poll(&self, id: &InstanceId) -> Result<Instance, RegistryError> {
        self.update(id, |instance| {
            instance.record_poll();
            Ok(())
        })
    }

    fn update<F>(&self, id: &InstanceId, mutate: F) -> Result<Instance, RegistryError>
    where
        F: FnOnce(&mut Instance) -> Result<(), RegistryError>,
    {
        let mut entries = self.entries.write();
        let current = entries
            .by_id
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })?;

        let mut next = current.clone();
        mutate(&mut next)?;
        *current = next.clone();

        if let Err(e) = self.store.save(&next) {
            warn!(instance = %id, error = %e, "Failed to persist instance");
        }
        Ok(next)
    }

    /// Look up a user's instance by name (case-insensitive).
    #[must_use]
    pub fn get(&self, user: &UserId, name: &str) -> Option<Instance> {
        let entries = self.entries.read();
        let id = entries.by_name.get(&(user.clone(), name_key(name)))?;
        entries.by_id.get(id).cloned()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &InstanceId) -> Option<Instance> {
        self.entries.read().by_id.get(id).cloned()
    }

    /// A user's instances, oldest first.
    #[must_use]
    pub fn list_active(&self, user: &UserId) -> Vec<Instance> {
        let mut instances: Vec<Instance> = self
            .entries
            .read()
            .by_id
            .values()
            .filter(|instance| instance.user() == user)
            .cloned()
            .collect();
        instances.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.name().cmp(b.name()))
        });
        instances
    }

    /// Delete an instance, freeing its name.
    pub fn remove(&self, id: &InstanceId) -> Option<Instance> {
        let mut entries = self.entries.write();
        let removed = entries.remove(id)?;
        if let Err(e) = self.store.delete(id) {
            warn!(instance = %id, error = %e, "Failed to delete persisted instance");
        }
        Some(removed)
    }

    /// Drop every instance from memory and from the store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the store could not be cleared;
    /// memory is cleared regardless.
    pub fn clear(&self) -> Result<(), RegistryError> {
        let mut entries = self.entries.write();
        *entries = Entries::default();
        self.store
            .clear()
            .map_err(|e| RegistryError::Storage(e.to_string()))
    }

    /// Read every persisted instance from the store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the store cannot be read.
    pub fn load_persisted(&self) -> Result<Vec<Instance>, RegistryError> {
        self.store
            .load_all()
            .map_err(|e| RegistryError::Storage(e.to_string()))
    }

    /// Put previously persisted instances back into memory.
    ///
    /// Instances whose (user, name) is already taken are skipped. Returns
    /// the number restored.
    pub fn restore(&self, instances: Vec<Instance>) -> usize {
        let mut entries = self.entries.write();
        let mut restored = 0;
        for instance in instances {
            let key = (instance.user().clone(), name_key(instance.name()));
            if entries.by_name.contains_key(&key) || entries.by_id.contains_key(instance.id()) {
                warn!(
                    instance = %instance.id(),
                    name = instance.name(),
                    "Skipping persisted instance with a conflicting name"
                );
                continue;
            }
            entries.insert(instance);
            restored += 1;
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryInstanceStore;
    use crate::domain::{InvalidNameReason, NameError};
    use crate::error::{Error, Result};

    fn registry() -> (InstanceRegistry, Arc<MemoryInstanceStore>) {
        let store = Arc::new(MemoryInstanceStore::new());
        (
            InstanceRegistry::new(store.clone(), NameRules::default()),
            store,
        )
    }

    fn failing() -> InstanceRegistry {
        InstanceRegistry::new(Arc::new(FailingStore), NameRules::default())
    }

    fn user() -> UserId {
        UserId::from("1")
    }

    fn wordpress() -> PackageId {
        PackageId::from("wordpress")
    }

    struct FailingStore;

    impl InstanceStore for FailingStore {
        fn save(&self, _: &Instance) -> Result<()> {
            Err(Error::Database("disk full".into()))
        }
        fn delete(&self, _: &InstanceId) -> Result<bool> {
            Err(Error::Database("disk full".into()))
        }
        fn load_all(&self) -> Result<Vec<Instance>> {
            Ok(vec![])
        }
        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn reserve_starts_in_validating_and_persists() {
        let (registry, store) = registry();
        let instance = registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        assert_eq!(instance.state(), InstanceState::Validating);
        assert_eq!(store.len(), 1);
        assert_eq!(registry.get(&user(), "myapp").unwrap().id(), instance.id());
    }

    #[test]
    fn reserve_rejects_case_insensitive_duplicate() {
        let (registry, _) = registry();
        registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        let err = registry.reserve(&user(), "MyApp", &wordpress()).unwrap_err();

        assert_eq!(
            err,
            RegistryError::Name(NameError::Duplicate {
                name: "MyApp".into()
            })
        );
        assert_eq!(registry.list_active(&user()).len(), 1);
    }

    #[test]
    fn reserve_applies_naming_rules() {
        let (registry, store) = registry();
        let err = registry.reserve(&user(), "my app", &wordpress()).unwrap_err();

        assert_eq!(
            err,
            RegistryError::Name(NameError::Invalid {
                name: "my app".into(),
                reason: InvalidNameReason::IllegalCharacter { ch: ' ' },
            })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn same_name_is_free_for_another_user() {
        let (registry, _) = registry();
        registry.reserve(&user(), "myapp", &wordpress()).unwrap();
        assert!(registry
            .reserve(&UserId::from("2"), "myapp", &wordpress())
            .is_ok());
    }

    #[test]
    fn reserve_rolls_back_when_store_fails() {
        let registry = failing();
        let err = registry.reserve(&user(), "myapp", &wordpress()).unwrap_err();

        assert!(matches!(err, RegistryError::Storage(_)));
        assert!(registry.get(&user(), "myapp").is_none());
    }

    #[test]
    fn transition_failure_after_reserve_keeps_memory_authoritative() {
        let registry = failing();
        let mut entries = registry.entries.write();
        let mut instance = Instance::new(user(), "myapp", wordpress());
        instance.advance(InstanceState::Validating, None).unwrap();
        let id = instance.id().clone();
        entries.insert(instance);
        drop(entries);

        let updated = registry
            .transition(&id, InstanceState::Dispatching, None)
            .unwrap();

        assert_eq!(updated.state(), InstanceState::Dispatching);
    }

    #[test]
    fn invalid_transition_leaves_state() {
        let (registry, _) = registry();
        let instance = registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        let err = registry
            .transition(instance.id(), InstanceState::Running, None)
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidTransition(_)));
        assert_eq!(
            registry.get_by_id(instance.id()).unwrap().state(),
            InstanceState::Validating
        );
    }

    #[test]
    fn transition_unknown_id_is_not_found() {
        let (registry, _) = registry();
        let err = registry
            .transition(&InstanceId::new(), InstanceState::Dispatching, None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn remove_frees_the_name() {
        let (registry, store) = registry();
        let instance = registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        registry.remove(instance.id()).unwrap();

        assert!(registry.get(&user(), "myapp").is_none());
        assert!(store.is_empty());
        assert!(registry.reserve(&user(), "myapp", &wordpress()).is_ok());
    }

    #[test]
    fn list_active_is_per_user() {
        let (registry, _) = registry();
        registry.reserve(&user(), "first", &wordpress()).unwrap();
        registry.reserve(&user(), "second", &wordpress()).unwrap();
        registry
            .reserve(&UserId::from("2"), "other", &wordpress())
            .unwrap();

        let names: Vec<String> = registry
            .list_active(&user())
            .iter()
            .map(|instance| instance.name().to_string())
            .collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn restore_skips_conflicts() {
        let (registry, _) = registry();
        registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        let restored = registry.restore(vec![
            Instance::new(user(), "MYAPP", wordpress()),
            Instance::new(user(), "blog", wordpress()),
        ]);

        assert_eq!(restored, 1);
        assert_eq!(registry.list_active(&user()).len(), 2);
    }

    #[test]
    fn clear_empties_memory_and_store() {
        let (registry, store) = registry();
        registry.reserve(&user(), "myapp", &wordpress()).unwrap();

        registry.clear().unwrap();

        assert!(registry.list_active(&user()).is_empty());
        assert!(store.is_empty());
    }
}
