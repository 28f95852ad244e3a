//! Catalog source port.

use async_trait::async_trait;

use crate::domain::Package;
use crate::error::CatalogError;

/// Upstream source of installable packages.
///
/// Each fetch returns the complete catalog; the store replaces its
/// contents wholesale with whatever a successful fetch returns.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full package list.
    async fn fetch(&self) -> Result<Vec<Package>, CatalogError>;

    /// Short description for logs (e.g. the file path or URL).
    fn describe(&self) -> String;
}
