//! SQLite instance store implementation.
//!
//! Provides persistent storage for instances using SQLite and Diesel ORM.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::InstanceRow;
use crate::adapter::outbound::sqlite::database::schema::instances;
use crate::domain::{
    name_key, DeploymentHandle, Instance, InstanceId, InstanceState, PackageId, UserId,
};
use crate::error::{Error, Result};
use crate::port::InstanceStore;

/// SQLite-backed instance store.
pub struct SqliteInstanceStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteInstanceStore {
    /// Create a new SQLite instance store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(instance: &Instance) -> InstanceRow {
        InstanceRow {
            id: instance.id().to_string(),
            user_id: instance.user().to_string(),
            name: instance.name().to_string(),
            name_key: name_key(instance.name()),
            package_id: instance.package().to_string(),
            state: instance.state().as_str().to_string(),
            handle: instance.handle().map(ToString::to_string),
            last_error: instance.last_error().map(ToOwned::to_owned),
            created_at: instance.created_at().to_rfc3339(),
            updated_at: instance.updated_at().to_rfc3339(),
            last_status_check: instance.last_status_check().map(|t| t.to_rfc3339()),
            provisioning_since: instance.provisioning_since().map(|t| t.to_rfc3339()),
        }
    }

    fn from_row(row: InstanceRow) -> Result<Instance> {
        let state = InstanceState::parse(&row.state)
            .ok_or_else(|| Error::Parse(format!("unknown instance state '{}'", row.state)))?;

        Ok(Instance {
            id: InstanceId::from(row.id),
            user: UserId::from(row.user_id),
            name: row.name,
            package: PackageId::from(row.package_id),
            state,
            handle: row.handle.map(DeploymentHandle::from),
            last_error: row.last_error,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
            last_status_check: row.last_status_check.as_deref().map(parse_time).transpose()?,
            provisioning_since: row.provisioning_since.as_deref().map(parse_time).transpose()?,
        })
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}

impl InstanceStore for SqliteInstanceStore {
    fn save(&self, instance: &Instance) -> Result<()> {
        let row = Self::to_row(instance);
        let mut conn = self.conn()?;

        diesel::replace_into(instances::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    fn delete(&self, id: &InstanceId) -> Result<bool> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(instances::table.find(id.as_str()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    fn load_all(&self) -> Result<Vec<Instance>> {
        let mut conn = self.conn()?;

        let rows: Vec<InstanceRow> = instances::table
            .select(InstanceRow::as_select())
            .order(instances::created_at.asc())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn clear(&self) -> Result<()> {
        let mut conn = self.conn()?;

        diesel::delete(instances::table)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{
        create_pool, run_migrations, MEMORY_URL,
    };

    fn setup() -> SqliteInstanceStore {
        let pool = create_pool(MEMORY_URL).unwrap();
        run_migrations(&pool).unwrap();
        SqliteInstanceStore::new(pool)
    }

    fn provisioning_instance() -> Instance {
        let mut instance = Instance::new(UserId::from("1"), "myapp", PackageId::from("wordpress"));
        instance.advance(InstanceState::Validating, None).unwrap();
        instance.advance(InstanceState::Dispatching, None).unwrap();
        instance.attach_handle(DeploymentHandle::from("dep-1"));
        instance.advance(InstanceState::Provisioning, None).unwrap();
        instance.record_poll();
        instance
    }

    #[test]
    fn save_and_load_round_trips_all_fields() {
        let store = setup();
        let instance = provisioning_instance();

        store.save(&instance).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded.len(), 1);
        let loaded = &loaded[0];
        assert_eq!(loaded.id(), instance.id());
        assert_eq!(loaded.state(), InstanceState::Provisioning);
        assert_eq!(loaded.handle().map(DeploymentHandle::as_str), Some("dep-1"));
        assert!(loaded.provisioning_since().is_some());
        assert!(loaded.last_status_check().is_some());
    }

    #[test]
    fn save_replaces_existing_row() {
        let store = setup();
        let mut instance = provisioning_instance();
        store.save(&instance).unwrap();

        instance
            .advance(InstanceState::Failed, Some("image pull failed".into()))
            .unwrap();
        store.save(&instance).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].state(), InstanceState::Failed);
        assert_eq!(loaded[0].last_error(), Some("image pull failed"));
    }

    #[test]
    fn delete_reports_whether_row_existed() {
        let store = setup();
        let instance = provisioning_instance();
        store.save(&instance).unwrap();

        assert!(store.delete(instance.id()).unwrap());
        assert!(!store.delete(instance.id()).unwrap());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let store = setup();
        store.save(&provisioning_instance()).unwrap();
        store
            .save(&Instance::new(UserId::from("2"), "blog", PackageId::from("ghost")))
            .unwrap();

        store.clear().unwrap();

        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn unknown_state_is_a_parse_error() {
        let row = InstanceRow {
            state: "hibernating".into(),
            ..SqliteInstanceStore::to_row(&provisioning_instance())
        };
        let err = SqliteInstanceStore::from_row(row).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
