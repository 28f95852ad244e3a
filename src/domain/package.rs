//! Catalog package types.

use serde::{Deserialize, Serialize};

use super::id::PackageId;

/// An installable application as published by the catalog.
///
/// Packages are immutable once synchronized. A sync replaces the whole
/// catalog rather than editing entries in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Stable catalog identifier.
    pub id: PackageId,
    /// Human-readable name shown in the store.
    pub name: String,
    /// Image or template reference handed to the orchestrator.
    pub image: String,
    /// Store category (e.g. "Blog", "Chat").
    #[serde(default)]
    pub category: String,
}

impl Package {
    /// Create a package entry.
    pub fn new(
        id: impl Into<PackageId>,
        name: impl Into<String>,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_deserializes_without_category() {
        let package: Package =
            serde_json::from_str(r#"{"id":"ghost","name":"Ghost","image":"ghost:5"}"#).unwrap();
        assert_eq!(package.id.as_str(), "ghost");
        assert!(package.category.is_empty());
    }
}
