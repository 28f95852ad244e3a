//! Handler for the `catalog` command.

use miette::Result;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::ConfigPathArg;
use super::diagnostic::report;
use super::{config, output};
use crate::application::{sync_once, CatalogStore};
use crate::domain::Package;
use crate::infrastructure::bootstrap::build_catalog_source;

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Image")]
    image: String,
}

impl From<&Package> for PackageRow {
    fn from(package: &Package) -> Self {
        Self {
            id: package.id.to_string(),
            name: package.name.clone(),
            category: package.category.clone(),
            image: package.image.clone(),
        }
    }
}

/// Fetch the catalog once and print it.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = config::load(&args.config)?;
    let source = build_catalog_source(&config.catalog);
    let store = CatalogStore::new();

    let pb = output::spinner(&format!("Fetching catalog from {}", source.describe()));
    if let Err(e) = sync_once(source.as_ref(), &store).await {
        output::spinner_fail(&pb, "Catalog fetch failed");
        return Err(report(e.into()));
    }
    let packages = store.list();
    output::spinner_success(&pb, &format!("{} packages", packages.len()));

    if output::is_json() {
        output::json_output(json!({
            "command": "catalog",
            "source": source.describe(),
            "packages": packages.as_ref(),
        }));
        return Ok(());
    }

    if packages.is_empty() {
        output::warning("Catalog is empty");
        return Ok(());
    }

    let rows: Vec<PackageRow> = packages.iter().map(PackageRow::from).collect();
    output::table(Table::new(rows));
    Ok(())
}
