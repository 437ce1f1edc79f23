//! Error types for InoDb

use crate::schema::Ino;
use thiserror::Error;

/// Result type for InoDb operations
pub type Result<T> = std::result::Result<T, InoDbError>;

/// Metadata store error types
///
/// The first group mirrors the POSIX failure a VFS front end reports to the
/// kernel; the second group carries engine and ambient failures unchanged.
#[derive(Error, Debug)]
pub enum InoDbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a directory: inode {0}")]
    NotADirectory(Ino),

    #[error("Is a directory: inode {0}")]
    IsADirectory(Ino),

    #[error("Directory not empty: inode {0}")]
    DirectoryNotEmpty(Ino),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Blocking task failed: {0}")]
    TaskJoin(String),
}

impl InoDbError {
    pub(crate) fn inode_not_found(ino: Ino) -> Self {
        InoDbError::NotFound(format!("inode {ino}"))
    }

    pub(crate) fn entry_not_found(parent: Ino, name: &str) -> Self {
        InoDbError::NotFound(format!("'{name}' in directory {parent}"))
    }

    pub(crate) fn entry_exists(parent: Ino, name: &str) -> Self {
        InoDbError::AlreadyExists(format!("'{name}' in directory {parent}"))
    }

    /// Returns true when the engine gave up waiting for a lock.
    ///
    /// Such failures are safe to retry once contention drops.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            InoDbError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }

    /// Converts this error to a libc error code for a VFS front end.
    pub fn to_errno(&self) -> i32 {
        match self {
            InoDbError::NotFound(_) => libc::ENOENT,
            InoDbError::AlreadyExists(_) => libc::EEXIST,
            InoDbError::NotADirectory(_) => libc::ENOTDIR,
            InoDbError::IsADirectory(_) => libc::EISDIR,
            InoDbError::DirectoryNotEmpty(_) => libc::ENOTEMPTY,
            InoDbError::InvalidArgument(_) => libc::EINVAL,
            _ if self.is_busy() => libc::EBUSY,
            InoDbError::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
            InoDbError::Consistency(_)
            | InoDbError::Sqlite(_)
            | InoDbError::Serialization(_)
            | InoDbError::TaskJoin(_) => libc::EIO,
        }
    }
}

/// Maps a UNIQUE violation on `dirent` to `AlreadyExists`.
pub(crate) fn map_entry_conflict(err: rusqlite::Error, parent: Ino, name: &str) -> InoDbError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            InoDbError::entry_exists(parent, name)
        }
        _ => InoDbError::Sqlite(err),
    }
}
