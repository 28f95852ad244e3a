use std::path::{Path, PathBuf};
use std::sync::Arc;

use berth::adapter::outbound::sqlite::{create_pool, run_migrations, DbPool, SqliteInstanceStore};
use berth::port::InstanceStore;
use tempfile::TempDir;

/// Temporary on-disk SQLite database for integration tests.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("berth.db");
        let pool = create_pool(path.to_str().expect("utf-8 temp path")).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> Arc<dyn InstanceStore> {
        Arc::new(SqliteInstanceStore::new(self.pool.clone()))
    }
}
