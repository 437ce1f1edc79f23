//! Connection-per-worker pool.
//!
//! SQLite connections must not be shared between concurrent callers, so
//! each worker checks out its own [`InoDb`] handle. The pool only keeps
//! idle handles around; it never limits how many are open at once, since
//! SQLite's own locking arbitrates writers.

use crate::{config::StoreConfig, error::Result, store::InoDb};
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// A small pool of store connections sharing one database file.
pub struct InoDbPool {
    config: StoreConfig,
    idle: Mutex<Vec<InoDb>>,
}

impl InoDbPool {
    /// Creates the pool, initializing the schema through its first
    /// connection.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let first = InoDb::open(&config)?;
        Ok(Self {
            config,
            idle: Mutex::new(vec![first]),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Checks out a connection, opening a new one if none is idle.
    pub fn get(&self) -> Result<PooledInoDb<'_>> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let db = match reused {
            Some(db) => db,
            None => {
                debug!(path = %self.config.path.display(), "opening pooled connection");
                InoDb::connect(&self.config)?
            }
        };
        Ok(PooledInoDb {
            pool: self,
            db: ManuallyDrop::new(db),
        })
    }

    /// Number of connections waiting to be reused.
    pub fn idle_count(&self) -> usize {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, db: InoDb) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.config.max_idle {
            idle.push(db);
        }
    }
}

/// A checked-out connection; returns to its pool on drop.
pub struct PooledInoDb<'a> {
    pool: &'a InoDbPool,
    db: ManuallyDrop<InoDb>,
}

impl PooledInoDb<'_> {
    /// Detaches the connection from the pool.
    pub fn detach(self) -> InoDb {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `db` is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.db) }
    }
}

impl Deref for PooledInoDb<'_> {
    type Target = InoDb;

    fn deref(&self) -> &InoDb {
        &self.db
    }
}

impl DerefMut for PooledInoDb<'_> {
    fn deref_mut(&mut self) -> &mut InoDb {
        &mut self.db
    }
}

impl Drop for PooledInoDb<'_> {
    fn drop(&mut self) {
        // SAFETY: `db` is not touched again after drop.
        let db = unsafe { ManuallyDrop::take(&mut self.db) };
        self.pool.release(db);
    }
}
