//! In-memory catalog of installable packages.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{Package, PackageId};
use crate::error::CatalogError;

/// Result of replacing the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The catalog now holds a different package list.
    Replaced { packages: usize },
    /// The new list was identical to the current one.
    Unchanged { packages: usize },
    /// The source answered with no packages; the current list was kept.
    EmptyIgnored { kept: usize },
}

#[derive(Debug, Default)]
struct Snapshot {
    packages: Arc<Vec<Package>>,
    synced_at: Option<DateTime<Utc>>,
}

/// Catalog store with atomic whole-catalog replacement.
///
/// Readers clone an `Arc` to the current package list, so a concurrent
/// replacement never exposes a partially written catalog.
#[derive(Debug, Default)]
pub struct CatalogStore {
    snapshot: RwLock<Snapshot>,
}

impl CatalogStore {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog already holding `packages`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBatch`] if the list has duplicate or
    /// empty ids.
    pub fn with_packages(packages: Vec<Package>) -> Result<Self, CatalogError> {
        let store = Self::new();
        store.replace(packages)?;
        Ok(store)
    }

    /// Current packages in synchronized order.
    #[must_use]
    pub fn list(&self) -> Arc<Vec<Package>> {
        Arc::clone(&self.snapshot.read().packages)
    }

    /// Look up a package by id.
    #[must_use]
    pub fn get(&self, id: &PackageId) -> Option<Package> {
        self.snapshot
            .read()
            .packages
            .iter()
            .find(|package| &package.id == id)
            .cloned()
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.read().packages.len()
    }

    /// True when no packages are available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.read().packages.is_empty()
    }

    /// When the catalog was last replaced or confirmed unchanged.
    #[must_use]
    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().synced_at
    }

    /// Replace the whole catalog.
    ///
    /// The batch is validated before anything is swapped; an invalid batch
    /// leaves the previous catalog in place.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBatch`] for duplicate or empty ids.
    pub fn replace(&self, packages: Vec<Package>) -> Result<SyncOutcome, CatalogError> {
        validate_batch(&packages)?;

        let mut snapshot = self.snapshot.write();
        snapshot.synced_at = Some(Utc::now());
        if *snapshot.packages == packages {
            return Ok(SyncOutcome::Unchanged {
                packages: packages.len(),
            });
        }

        let count = packages.len();
        snapshot.packages = Arc::new(packages);
        Ok(SyncOutcome::Replaced { packages: count })
    }

    /// Remove every package (explicit empty-store mode).
    pub fn clear(&self) {
        let mut snapshot = self.snapshot.write();
        snapshot.packages = Arc::new(Vec::new());
        snapshot.synced_at = None;
    }
}

fn validate_batch(packages: &[Package]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(packages.len());
    for package in packages {
        if package.id.as_str().trim().is_empty() {
            return Err(CatalogError::InvalidBatch(format!(
                "package '{}' has an empty id",
                package.name
            )));
        }
        if !seen.insert(package.id.as_str()) {
            return Err(CatalogError::InvalidBatch(format!(
                "duplicate package id '{}'",
                package.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages() -> Vec<Package> {
        vec![
            Package::new("wordpress", "WordPress", "wordpress:6", "Blog"),
            Package::new("mattermost", "Mattermost", "mattermost:9", "Chat"),
            Package::new("ghost", "Ghost", "ghost:5", "Blog"),
        ]
    }

    #[test]
    fn new_store_is_empty() {
        let store = CatalogStore::new();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
        assert!(store.last_synced_at().is_none());
    }

    #[test]
    fn replace_keeps_insertion_order() {
        let store = CatalogStore::new();
        let outcome = store.replace(packages()).unwrap();

        assert_eq!(outcome, SyncOutcome::Replaced { packages: 3 });
        let ids: Vec<_> = store.list().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, ["wordpress", "mattermost", "ghost"]);
        assert_eq!(store.list().last().unwrap().category, "Blog");
    }

    #[test]
    fn identical_replace_is_unchanged() {
        let store = CatalogStore::with_packages(packages()).unwrap();
        let outcome = store.replace(packages()).unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged { packages: 3 });
    }

    #[test]
    fn invalid_batch_keeps_previous_catalog() {
        let store = CatalogStore::with_packages(packages()).unwrap();
        let mut bad = packages();
        bad.push(Package::new("ghost", "Ghost again", "ghost:4", "Blog"));

        let err = store.replace(bad).unwrap_err();

        assert!(matches!(err, CatalogError::InvalidBatch(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn empty_id_is_rejected() {
        let store = CatalogStore::new();
        let err = store
            .replace(vec![Package::new("", "Nameless", "x", "Misc")])
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidBatch(_)));
    }

    #[test]
    fn readers_keep_their_snapshot_across_replace() {
        let store = CatalogStore::with_packages(packages()).unwrap();
        let before = store.list();

        store
            .replace(vec![Package::new("nextcloud", "Nextcloud", "nextcloud:28", "Files")])
            .unwrap();

        assert_eq!(before.len(), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_empties_catalog() {
        let store = CatalogStore::with_packages(packages()).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.get(&PackageId::from("ghost")).is_none());
    }

    #[test]
    fn get_finds_package() {
        let store = CatalogStore::with_packages(packages()).unwrap();
        let package = store.get(&PackageId::from("mattermost")).unwrap();
        assert_eq!(package.image, "mattermost:9");
    }
}
