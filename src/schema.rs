//! Database schema definitions for InoDb
//!
//! The store uses the classic inode/dirent split: `attr` holds one row per
//! filesystem object, `dirent` names objects inside directories, and
//! `global` keeps opaque process-wide settings.

/// File type constants for mode field
pub mod mode {
    pub const S_IFMT: u32 = 0o170000;   // File type mask
    pub const S_IFREG: u32 = 0o100000;  // Regular file
    pub const S_IFDIR: u32 = 0o040000;  // Directory
    pub const S_IFLNK: u32 = 0o120000;  // Symbolic link

    // Default permissions
    pub const DEFAULT_FILE_MODE: u32 = S_IFREG | 0o644; // Regular file, rw-r--r--
    pub const DEFAULT_DIR_MODE: u32 = S_IFDIR | 0o755;  // Directory, rwxr-xr-x
    pub const DEFAULT_SYMLINK_MODE: u32 = S_IFLNK | 0o777;
}

/// Inode number type (SQLite `INTEGER PRIMARY KEY`).
pub type Ino = i64;

/// Root inode number (always 1)
pub const ROOT_INO: Ino = 1;

/// Name of the self entry every directory carries.
pub const DOT: &str = ".";

/// Name of the parent entry every directory carries.
pub const DOTDOT: &str = "..";

/// DDL for the store, applied by [`crate::InoDb::initialize`].
pub const SCHEMA: &str = include_str!("../migrations/sqlite.sql");
