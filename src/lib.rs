//! # InoDb - Inode Metadata Store for Virtual Filesystems
//!
//! InoDb keeps the metadata of a virtual directory tree (inode attributes,
//! directory entries, and a few persisted settings) in a single SQLite
//! file. File bytes live elsewhere: a regular file only records a content
//! reference (`hash`, `index`) that the caller resolves against its own
//! content store.
//!
//! ## Layout
//!
//! - **attr**: one row per inode (mode, link count, owner, size, times,
//!   content reference, symlink target)
//! - **dirent**: `(parent, name) -> inode`, including `.` and `..`
//! - **global**: opaque name/value settings
//!
//! Link counts are maintained by triggers on `dirent`, and every multi-row
//! change is a single immediate transaction.
//!
//! ## Example
//!
//! ```rust,no_run
//! use inodb::{ContentRef, InoDb, StoreConfig, ROOT_INO};
//!
//! fn main() -> inodb::Result<()> {
//!     let mut db = InoDb::open(&StoreConfig::new("/var/lib/yatfs/inodes.db"))?;
//!
//!     let docs = db.make_directory(ROOT_INO, "docs", 0o755, 1000, 1000)?;
//!     let content = ContentRef { hash: "9f86d08".into(), index: 0 };
//!     let readme = db.make_file(docs, "README", 0o644, Some(&content), 1024, 1000, 1000)?;
//!
//!     assert_eq!(db.resolve("/docs/README")?, readme);
//!     for entry in db.list_directory(docs)? {
//!         println!("{} -> {}", entry.name, entry.ino());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Concurrent workers each take their own connection from an
//! [`InoDbPool`]; tokio front ends can use `AsyncInoDb` (feature `async`).

pub mod attr;
pub mod config;
pub mod error;
pub mod path;
pub mod pool;
pub mod repair;
pub mod schema;
pub mod store;

#[cfg(feature = "async")]
pub mod async_store;

pub use attr::{Attributes, ContentRef, DirEntry, FileKind, SetAttributes, Timestamp};
pub use config::{StoreConfig, Synchronous};
pub use error::{InoDbError, Result};
pub use path::ResolvePath;
pub use pool::{InoDbPool, PooledInoDb};
pub use repair::RepairReport;
pub use schema::{mode, Ino, ROOT_INO};
pub use store::{InoDb, StoreStats};

#[cfg(feature = "async")]
pub use async_store::AsyncInoDb;
