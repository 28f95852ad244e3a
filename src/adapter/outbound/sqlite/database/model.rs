//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::instances;

/// Database row for an instance.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = instances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstanceRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub name_key: String,
    pub package_id: String,
    pub state: String,
    pub handle: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_status_check: Option<String>,
    pub provisioning_since: Option<String>,
}
