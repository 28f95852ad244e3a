//! In-memory instance store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::{Instance, InstanceId};
use crate::error::Result;
use crate::port::InstanceStore;

/// Volatile [`InstanceStore`]; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryInstanceStore {
    rows: Mutex<HashMap<InstanceId, Instance>>,
}

impl MemoryInstanceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

impl InstanceStore for MemoryInstanceStore {
    fn save(&self, instance: &Instance) -> Result<()> {
        self.rows
            .lock()
            .insert(instance.id().clone(), instance.clone());
        Ok(())
    }

    fn delete(&self, id: &InstanceId) -> Result<bool> {
        Ok(self.rows.lock().remove(id).is_some())
    }

    fn load_all(&self) -> Result<Vec<Instance>> {
        let mut instances: Vec<Instance> = self.rows.lock().values().cloned().collect();
        instances.sort_by_key(Instance::created_at);
        Ok(instances)
    }

    fn clear(&self) -> Result<()> {
        self.rows.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageId, UserId};

    #[test]
    fn save_overwrites_by_id() {
        let store = MemoryInstanceStore::new();
        let mut instance = Instance::new(UserId::from("1"), "myapp", PackageId::from("wordpress"));
        store.save(&instance).unwrap();

        instance.record_poll();
        store.save(&instance).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.load_all().unwrap()[0].last_status_check().is_some());
    }

    #[test]
    fn delete_and_clear() {
        let store = MemoryInstanceStore::new();
        let instance = Instance::new(UserId::from("1"), "myapp", PackageId::from("wordpress"));
        store.save(&instance).unwrap();

        assert!(store.delete(instance.id()).unwrap());
        assert!(!store.delete(instance.id()).unwrap());

        store.save(&instance).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
