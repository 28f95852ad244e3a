//! Catalog fixtures.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::Package;
use crate::error::CatalogError;
use crate::port::CatalogSource;

/// A small catalog with three packages.
#[must_use]
pub fn packages() -> Vec<Package> {
    vec![
        Package::new("wordpress", "WordPress", "wordpress:6", "Blog"),
        Package::new("mattermost", "Mattermost", "mattermost:9", "Chat"),
        Package::new("nextcloud", "Nextcloud", "nextcloud:28", "Files"),
    ]
}

/// [`CatalogSource`] answering from a script, then repeating its last answer.
#[derive(Debug)]
pub struct StaticCatalogSource {
    script: Mutex<VecDeque<Result<Vec<Package>, CatalogError>>>,
    last: Mutex<Result<Vec<Package>, CatalogError>>,
    fetches: Mutex<usize>,
}

impl StaticCatalogSource {
    /// Source that always returns `packages`.
    #[must_use]
    pub fn new(packages: Vec<Package>) -> Self {
        Self::scripted(vec![Ok(packages)])
    }

    /// Source that always fails.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self::scripted(vec![Err(CatalogError::Unavailable(reason.to_string()))])
    }

    /// Source answering `script` in order; the final answer repeats.
    #[must_use]
    pub fn scripted(script: Vec<Result<Vec<Package>, CatalogError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Ok(Vec::new())),
            fetches: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn fetches(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<Vec<Package>, CatalogError> {
        *self.fetches.lock() += 1;
        let mut last = self.last.lock();
        if let Some(next) = self.script.lock().pop_front() {
            *last = next;
        }
        last.clone()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
