//! Handler for the `list` command.

use miette::Result;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::ListArgs;
use super::diagnostic::report;
use super::{config, output};
use crate::application::InstanceRegistry;
use crate::domain::UserId;
use crate::infrastructure::bootstrap::build_store;
use crate::port::InstanceView;

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&InstanceView> for InstanceRow {
    fn from(view: &InstanceView) -> Self {
        Self {
            name: view.name.clone(),
            package: view.package_id.to_string(),
            state: view.state.to_string(),
            updated: view.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            error: view.error.clone().unwrap_or_default(),
        }
    }
}

/// List a user's persisted instances.
///
/// Reads the database only; the orchestrator is not contacted.
pub fn execute(args: &ListArgs) -> Result<()> {
    let config = config::load(&args.config.config)?;
    let store = build_store(&config.database).map_err(report)?;
    let registry = InstanceRegistry::new(store, config.install.names.clone());
    let persisted = registry
        .load_persisted()
        .map_err(|e| report(e.into()))?;
    registry.restore(persisted);

    let user = UserId::from(args.user.as_str());
    let views: Vec<InstanceView> = registry
        .list_active(&user)
        .iter()
        .map(InstanceView::from)
        .collect();

    if output::is_json() {
        output::json_output(json!({
            "command": "list",
            "user": user,
            "instances": views,
        }));
        return Ok(());
    }

    if views.is_empty() {
        output::warning(&format!("No instances for user {user}"));
        return Ok(());
    }

    let rows: Vec<InstanceRow> = views.iter().map(InstanceRow::from).collect();
    output::table(Table::new(rows));
    Ok(())
}
