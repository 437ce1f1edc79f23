//! Store configuration.
//!
//! Configuration can be built in code with the builder-style setters or
//! loaded from JSON, e.g.
//!
//! ```json
//! { "path": "/var/lib/yatfs/inodes.db", "busy_timeout_ms": 10000 }
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lock-wait timeout before SQLite reports `SQLITE_BUSY` (5 seconds).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Default number of idle connections kept by [`crate::InoDbPool`].
pub const DEFAULT_MAX_IDLE: usize = 4;

/// SQLite `synchronous` pragma setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Synchronous {
    Off,
    #[default]
    Normal,
    Full,
}

impl Synchronous {
    pub(crate) fn as_pragma(self) -> &'static str {
        match self {
            Synchronous::Off => "OFF",
            Synchronous::Normal => "NORMAL",
            Synchronous::Full => "FULL",
        }
    }
}

/// Configuration for an inode store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `":memory:"` opens a private in-memory database per
    /// connection, which only makes sense for a single handle.
    pub path: PathBuf,

    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Durability level for WAL commits.
    pub synchronous: Synchronous,

    /// Idle connections retained by the pool.
    pub max_idle: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inodb.sqlite"),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            synchronous: Synchronous::default(),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Creates a configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn is_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Sets the lock-wait timeout.
    #[must_use]
    pub fn busy_timeout_ms(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = millis;
        self
    }

    /// Sets the `synchronous` pragma.
    #[must_use]
    pub fn synchronous(mut self, synchronous: Synchronous) -> Self {
        self.synchronous = synchronous;
        self
    }

    /// Sets the number of idle pooled connections.
    #[must_use]
    pub fn max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }
}
