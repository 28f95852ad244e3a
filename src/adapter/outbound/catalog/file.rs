//! Catalog source backed by a TOML file.
//!
//! ```toml
//! [[packages]]
//! id = "wordpress"
//! name = "WordPress"
//! image = "wordpress:6"
//! category = "Blog"
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::Package;
use crate::error::CatalogError;
use crate::port::CatalogSource;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    packages: Vec<Package>,
}

/// Reads the full catalog from a TOML file on every fetch.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse catalog TOML content.
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] for malformed content.
pub fn parse_catalog(content: &str) -> Result<Vec<Package>, CatalogError> {
    toml::from_str::<CatalogFile>(content)
        .map(|file| file.packages)
        .map_err(|e| CatalogError::Parse(e.to_string()))
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<Vec<Package>, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CatalogError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        parse_catalog(&content)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"
[[packages]]
id = "wordpress"
name = "WordPress"
image = "wordpress:6"
category = "Blog"

[[packages]]
id = "mattermost"
name = "Mattermost"
image = "mattermost:9"
"#;

    #[test]
    fn parses_packages_in_order() {
        let packages = parse_catalog(CATALOG).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].id.as_str(), "wordpress");
        assert_eq!(packages[1].category, "");
    }

    #[test]
    fn empty_file_is_an_empty_catalog() {
        assert!(parse_catalog("").unwrap().is_empty());
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let err = parse_catalog("[[packages]]\nid = \"x\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn fetch_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let source = FileCatalogSource::new(file.path());
        let packages = source.fetch().await.unwrap();

        assert_eq!(packages.len(), 2);
        assert!(source.describe().starts_with("file:"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = FileCatalogSource::new("/nonexistent/catalog.toml");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
