//! Async access for tokio-based front ends.
//!
//! Every call checks out a pooled connection and runs the blocking SQLite
//! work on tokio's blocking thread pool, so async callers never stall a
//! runtime worker on a database lock.

use crate::{
    attr::{Attributes, DirEntry},
    config::StoreConfig,
    error::{InoDbError, Result},
    pool::InoDbPool,
    repair::RepairReport,
    schema::Ino,
    store::InoDb,
};
use std::sync::Arc;

/// Cloneable async handle over an [`InoDbPool`].
#[derive(Clone)]
pub struct AsyncInoDb {
    pool: Arc<InoDbPool>,
}

impl AsyncInoDb {
    /// Opens the pool on a blocking thread.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let pool = tokio::task::spawn_blocking(move || InoDbPool::new(config))
            .await
            .map_err(|e| InoDbError::TaskJoin(e.to_string()))??;
        Ok(Self::from_pool(Arc::new(pool)))
    }

    pub fn from_pool(pool: Arc<InoDbPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<InoDbPool> {
        &self.pool
    }

    /// Runs `f` against a pooled connection on a blocking thread.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut InoDb) -> Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            let mut db = pool.get()?;
            f(&mut *db)
        })
        .await
        .map_err(|e| InoDbError::TaskJoin(e.to_string()))?
    }

    pub async fn get_attributes(&self, ino: Ino) -> Result<Attributes> {
        self.with_db(move |db| db.get_attributes(ino)).await
    }

    pub async fn lookup(&self, parent: Ino, name: impl Into<String>) -> Result<Ino> {
        let name = name.into();
        self.with_db(move |db| db.lookup(parent, &name)).await
    }

    pub async fn resolve(&self, path: impl Into<String>) -> Result<Ino> {
        let path = path.into();
        self.with_db(move |db| db.resolve(&path)).await
    }

    pub async fn list_directory(&self, ino: Ino) -> Result<Vec<DirEntry>> {
        self.with_db(move |db| db.list_directory(ino)).await
    }

    pub async fn check_and_repair(&self) -> Result<RepairReport> {
        self.with_db(InoDb::check_and_repair).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ROOT_INO;

    #[tokio::test]
    async fn test_async_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let db = AsyncInoDb::open(StoreConfig::new(dir.path().join("meta.db")))
            .await
            .unwrap();

        let ino = db
            .with_db(|db| db.make_directory(ROOT_INO, "docs", 0o755, 0, 0))
            .await
            .unwrap();
        assert_eq!(db.lookup(ROOT_INO, "docs").await.unwrap(), ino);
        assert_eq!(db.resolve("/docs/").await.unwrap(), ino);
        assert_eq!(db.list_directory(ino).await.unwrap().len(), 2);
        assert!(db.get_attributes(ino).await.unwrap().is_directory());
        assert!(db.check_and_repair().await.unwrap().is_clean());
    }

    #[tokio::test]
    async fn test_async_errors_keep_their_kind() {
        let dir = tempfile::tempdir().unwrap();
        let db = AsyncInoDb::open(StoreConfig::new(dir.path().join("meta.db")))
            .await
            .unwrap();
        let err = db.lookup(ROOT_INO, "missing").await.unwrap_err();
        assert!(matches!(err, InoDbError::NotFound(_)));
    }
}
