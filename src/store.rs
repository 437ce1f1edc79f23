//! SQLite-backed inode store
//!
//! [`InoDb`] owns exactly one SQLite connection. Concurrent callers each
//! hold their own handle (see [`crate::InoDbPool`]); SQLite's WAL locking
//! serializes writers and every multi-row change runs in one immediate
//! transaction.

use crate::{
    attr::{self, Attributes, ContentRef, DirEntry, FileKind, SetAttributes, ATTR_COLUMNS},
    config::StoreConfig,
    error::{map_entry_conflict, InoDbError, Result},
    path::{validate_name, ResolvePath},
    schema::{mode, Ino, DOT, DOTDOT, ROOT_INO, SCHEMA},
};
use rusqlite::{
    params, params_from_iter, types::Value, Connection, OptionalExtension, Transaction,
    TransactionBehavior,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Inode and directory-entry metadata store.
pub struct InoDb {
    pub(crate) conn: Connection,
}

/// Object counts for `statfs`-style reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub inodes: u64,
    pub directories: u64,
    pub files: u64,
    pub symlinks: u64,
    pub dirents: u64,
    pub total_size: u64,
}

/// Attribute values for a new `attr` row.
struct NewInode<'a> {
    mode: u32,
    uid: u32,
    gid: u32,
    size: i64,
    content: Option<&'a ContentRef>,
    link: Option<&'a str>,
}

impl InoDb {
    /// Opens the store and makes sure the schema and root directory exist.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mut db = Self::connect(config)?;
        db.initialize()?;
        Ok(db)
    }

    /// Opens a private in-memory store, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Opens a connection without touching the schema.
    ///
    /// The database file's parent directory is created if missing.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let conn = if config.is_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(&config.path)?
        };

        conn.busy_timeout(config.busy_timeout())?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        if !config.is_memory() && !journal_mode.eq_ignore_ascii_case("wal") {
            warn!(path = %config.path.display(), journal_mode = %journal_mode, "WAL journal mode unavailable");
        }
        conn.execute_batch(&format!(
            "PRAGMA synchronous = {}",
            config.synchronous.as_pragma()
        ))?;

        debug!(path = %config.path.display(), "opened inode store connection");
        Ok(Self { conn })
    }

    /// Creates the schema and seeds the root directory.
    ///
    /// Idempotent, and safe to race against other processes opening the
    /// same file.
    pub fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;

        let tx = self.write_txn()?;
        let seeded = tx
            .query_row(
                "SELECT 1 FROM attr WHERE st_ino = ?1",
                params![ROOT_INO],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !seeded {
            let now = attr::now();
            tx.execute(
                "INSERT INTO attr (st_ino, st_mode, st_nlink, st_uid, st_gid, st_size,
                                   st_atime, st_mtime, st_ctime)
                 VALUES (?1, ?2, 0, 0, 0, 0, ?3, ?3, ?3)",
                params![ROOT_INO, mode::DEFAULT_DIR_MODE, now],
            )?;
            insert_dirent(&tx, ROOT_INO, ROOT_INO, DOT)?;
            insert_dirent(&tx, ROOT_INO, ROOT_INO, DOTDOT)?;
            info!(root = ROOT_INO, "initialized inode store");
        }
        tx.commit()?;
        Ok(())
    }

    pub(crate) fn write_txn(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Fetches the attribute row of `ino`.
    pub fn get_attributes(&self, ino: Ino) -> Result<Attributes> {
        load_attr(&self.conn, ino)
    }

    /// Updates the fields present in `changes` and returns the new row.
    ///
    /// Content references are accepted only on regular files. A `mode` carrying
    /// file-type bits must match the inode's type; only permission bits are
    /// ever changed. An empty change set succeeds without touching the
    /// database and returns `None`.
    pub fn set_attributes(
        &mut self,
        ino: Ino,
        changes: &SetAttributes,
    ) -> Result<Option<Attributes>> {
        if changes.is_empty() {
            return Ok(None);
        }

        let tx = self.write_txn()?;
        let current = load_attr(&tx, ino)?;

        if changes.touches_content() && current.kind() != Some(FileKind::RegularFile) {
            return Err(InoDbError::InvalidArgument(format!(
                "inode {ino} is not a regular file and cannot reference content"
            )));
        }

        let mut columns: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(new_mode) = changes.mode {
            let type_bits = new_mode & mode::S_IFMT;
            let current_type = current.mode & mode::S_IFMT;
            if type_bits != 0 && type_bits != current_type {
                return Err(InoDbError::InvalidArgument(format!(
                    "mode {new_mode:o} would change the file type of inode {ino}"
                )));
            }
            columns.push("st_mode");
            values.push(Value::Integer(i64::from(
                current_type | (new_mode & !mode::S_IFMT),
            )));
        }
        if let Some(uid) = changes.uid {
            columns.push("st_uid");
            values.push(Value::Integer(i64::from(uid)));
        }
        if let Some(gid) = changes.gid {
            columns.push("st_gid");
            values.push(Value::Integer(i64::from(gid)));
        }
        if let Some(size) = changes.size {
            if size < 0 {
                return Err(InoDbError::InvalidArgument(format!(
                    "negative size {size}"
                )));
            }
            columns.push("st_size");
            values.push(Value::Integer(size));
        }
        for (column, ts) in [
            ("st_atime", changes.atime),
            ("st_mtime", changes.mtime),
            ("st_ctime", changes.ctime),
        ] {
            if let Some(ts) = ts {
                columns.push(column);
                values.push(Value::Real(ts));
            }
        }
        if let Some(hash) = &changes.hash {
            columns.push("t_hash");
            values.push(Value::Text(hash.clone()));
        }
        if let Some(index) = changes.index {
            columns.push("t_index");
            values.push(Value::Integer(index));
        }

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE attr SET {} WHERE st_ino = ?{}",
            assignments.join(", "),
            values.len() + 1
        );
        values.push(Value::Integer(ino));
        tx.execute(&sql, params_from_iter(values.iter()))?;

        let updated = load_attr(&tx, ino)?;
        tx.commit()?;
        debug!(ino, fields = ?columns, "updated attributes");
        Ok(Some(updated))
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Resolves one name inside directory `parent`.
    pub fn lookup(&self, parent: Ino, name: &str) -> Result<Ino> {
        require_dir(&self.conn, parent)?;
        find_entry(&self.conn, parent, name)?
            .ok_or_else(|| InoDbError::entry_not_found(parent, name))
    }

    /// Walks `path` from the root one segment at a time.
    ///
    /// The returned iterator is lazy: each `next` performs at most one
    /// lookup, and the walk stops after the first error.
    pub fn resolve_path(&self, path: &str) -> ResolvePath<'_> {
        ResolvePath::new(self, path)
    }

    /// Resolves `path` to its target inode.
    pub fn resolve(&self, path: &str) -> Result<Ino> {
        self.resolve_path(path).target()
    }

    /// Fetches the attributes of the object at `path`.
    pub fn path_attributes(&self, path: &str) -> Result<Attributes> {
        let ino = self.resolve(path)?;
        self.get_attributes(ino)
    }

    /// Lists every entry of directory `ino`, `.` and `..` included, in
    /// creation order.
    ///
    /// A nonexistent inode yields an empty list.
    pub fn list_directory(&self, ino: Ino) -> Result<Vec<DirEntry>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {ATTR_COLUMNS}, d_name FROM dirent
             JOIN attr ON st_ino = d_ino
             WHERE d_parent = ?1
             ORDER BY dirent.rowid"
        ))?;
        let entries = stmt
            .query_map(params![ino], |row| {
                Ok(DirEntry {
                    name: row.get(12)?,
                    attr: Attributes::from_row(row)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Creates directory `name` under `parent`.
    ///
    /// Only the permission bits of `perm` are used. The new directory ends
    /// with a link count of 2 and the parent's count grows by one.
    pub fn make_directory(
        &mut self,
        parent: Ino,
        name: &str,
        perm: u32,
        uid: u32,
        gid: u32,
    ) -> Result<Ino> {
        validate_name(name)?;
        let tx = self.write_txn()?;
        ensure_absent(&tx, parent, name)?;

        let ino = insert_attr(
            &tx,
            &NewInode {
                mode: FileKind::Directory.type_bits() | (perm & !mode::S_IFMT),
                uid,
                gid,
                size: 0,
                content: None,
                link: None,
            },
        )?;
        insert_dirent(&tx, parent, ino, name)?;
        insert_dirent(&tx, ino, ino, DOT)?;
        insert_dirent(&tx, ino, parent, DOTDOT)?;
        touch_dir(&tx, parent)?;
        tx.commit()?;

        debug!(parent, name, ino, "created directory");
        Ok(ino)
    }

    /// Creates regular file `name` under `parent` pointing at `content`.
    #[allow(clippy::too_many_arguments)]
    pub fn make_file(
        &mut self,
        parent: Ino,
        name: &str,
        perm: u32,
        content: Option<&ContentRef>,
        size: i64,
        uid: u32,
        gid: u32,
    ) -> Result<Ino> {
        validate_name(name)?;
        if size < 0 {
            return Err(InoDbError::InvalidArgument(format!(
                "negative size {size}"
            )));
        }
        let tx = self.write_txn()?;
        ensure_absent(&tx, parent, name)?;

        let ino = insert_attr(
            &tx,
            &NewInode {
                mode: FileKind::RegularFile.type_bits() | (perm & !mode::S_IFMT),
                uid,
                gid,
                size,
                content,
                link: None,
            },
        )?;
        insert_dirent(&tx, parent, ino, name)?;
        touch_dir(&tx, parent)?;
        tx.commit()?;

        debug!(parent, name, ino, size, "created file");
        Ok(ino)
    }

    /// Creates symlink `name` under `parent` pointing at `target`.
    pub fn make_symlink(
        &mut self,
        parent: Ino,
        name: &str,
        target: &str,
        uid: u32,
        gid: u32,
    ) -> Result<Ino> {
        validate_name(name)?;
        if target.is_empty() {
            return Err(InoDbError::InvalidArgument(
                "symlink target is empty".to_string(),
            ));
        }
        let tx = self.write_txn()?;
        ensure_absent(&tx, parent, name)?;

        let ino = insert_attr(
            &tx,
            &NewInode {
                mode: mode::DEFAULT_SYMLINK_MODE,
                uid,
                gid,
                size: target.len() as i64,
                content: None,
                link: Some(target),
            },
        )?;
        insert_dirent(&tx, parent, ino, name)?;
        touch_dir(&tx, parent)?;
        tx.commit()?;

        debug!(parent, name, ino, target, "created symlink");
        Ok(ino)
    }

    /// Returns the target of symlink `ino`.
    pub fn read_link(&self, ino: Ino) -> Result<String> {
        let attr = load_attr(&self.conn, ino)?;
        if !attr.is_symlink() {
            return Err(InoDbError::InvalidArgument(format!(
                "inode {ino} is not a symlink"
            )));
        }
        attr.link
            .ok_or_else(|| InoDbError::Consistency(format!("symlink {ino} has no target")))
    }

    /// Adds a hard link `new_name` in `new_parent` to the file or symlink
    /// `ino`, returning its updated attributes.
    pub fn link(&mut self, ino: Ino, new_parent: Ino, new_name: &str) -> Result<Attributes> {
        validate_name(new_name)?;
        let tx = self.write_txn()?;

        let target = load_attr(&tx, ino)?;
        if target.is_directory() {
            return Err(InoDbError::IsADirectory(ino));
        }
        ensure_absent(&tx, new_parent, new_name)?;

        insert_dirent(&tx, new_parent, ino, new_name)?;
        set_ctime(&tx, ino)?;
        touch_dir(&tx, new_parent)?;
        let updated = load_attr(&tx, ino)?;
        tx.commit()?;

        debug!(ino, new_parent, new_name, nlink = updated.nlink, "linked");
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Removes the file or symlink entry `name` from `parent`.
    ///
    /// When that was the last link the inode is deleted and its final
    /// attributes are returned, so the caller can release the content it
    /// referenced.
    pub fn unlink(&mut self, parent: Ino, name: &str) -> Result<Option<Attributes>> {
        validate_name(name)?;
        let tx = self.write_txn()?;

        require_dir(&tx, parent)?;
        let ino = find_entry(&tx, parent, name)?
            .ok_or_else(|| InoDbError::entry_not_found(parent, name))?;
        let target = load_attr(&tx, ino)?;
        if target.is_directory() {
            return Err(InoDbError::IsADirectory(ino));
        }

        delete_dirent(&tx, parent, name)?;
        touch_dir(&tx, parent)?;

        let after = load_attr(&tx, ino)?;
        let released = match after.nlink {
            n if n < 0 => {
                return Err(InoDbError::Consistency(format!(
                    "inode {ino} link count dropped to {n}"
                )));
            }
            0 => {
                tx.execute("DELETE FROM attr WHERE st_ino = ?1", params![ino])?;
                Some(after)
            }
            _ => {
                set_ctime(&tx, ino)?;
                None
            }
        };
        tx.commit()?;

        debug!(parent, name, ino, released = released.is_some(), "unlinked");
        Ok(released)
    }

    /// Removes the empty directory `name` from `parent`.
    pub fn remove_directory(&mut self, parent: Ino, name: &str) -> Result<()> {
        validate_name(name)?;
        let tx = self.write_txn()?;

        require_dir(&tx, parent)?;
        let ino = find_entry(&tx, parent, name)?
            .ok_or_else(|| InoDbError::entry_not_found(parent, name))?;
        let target = load_attr(&tx, ino)?;
        if !target.is_directory() {
            return Err(InoDbError::NotADirectory(ino));
        }
        if target.nlink < 2 {
            return Err(InoDbError::Consistency(format!(
                "directory {ino} has link count {}",
                target.nlink
            )));
        }
        if target.nlink > 2 || child_count(&tx, ino)? > 0 {
            return Err(InoDbError::DirectoryNotEmpty(ino));
        }

        tx.execute("DELETE FROM dirent WHERE d_parent = ?1", params![ino])?;
        delete_dirent(&tx, parent, name)?;
        tx.execute("DELETE FROM attr WHERE st_ino = ?1", params![ino])?;
        touch_dir(&tx, parent)?;
        tx.commit()?;

        debug!(parent, name, ino, "removed directory");
        Ok(())
    }

    /// Moves entry `name` of `parent` to `new_name` in `new_parent`.
    ///
    /// The destination must not exist. A directory cannot be moved below
    /// itself; its `..` entry follows it to the new parent.
    pub fn rename(
        &mut self,
        parent: Ino,
        name: &str,
        new_parent: Ino,
        new_name: &str,
    ) -> Result<()> {
        validate_name(name)?;
        validate_name(new_name)?;
        let tx = self.write_txn()?;

        require_dir(&tx, parent)?;
        let ino = find_entry(&tx, parent, name)?
            .ok_or_else(|| InoDbError::entry_not_found(parent, name))?;
        if parent == new_parent && name == new_name {
            return Ok(());
        }
        ensure_absent(&tx, new_parent, new_name)?;

        let target = load_attr(&tx, ino)?;
        let reparent_dir = target.is_directory() && parent != new_parent;
        if reparent_dir && is_ancestor(&tx, ino, new_parent)? {
            return Err(InoDbError::InvalidArgument(format!(
                "cannot move directory {ino} into its own subtree"
            )));
        }

        tx.execute(
            "UPDATE dirent SET d_parent = ?1, d_name = ?2 WHERE d_parent = ?3 AND d_name = ?4",
            params![new_parent, new_name, parent, name],
        )
        .map_err(|e| map_entry_conflict(e, new_parent, new_name))?;
        if reparent_dir {
            delete_dirent(&tx, ino, DOTDOT)?;
            insert_dirent(&tx, ino, new_parent, DOTDOT)?;
        }
        set_ctime(&tx, ino)?;
        touch_dir(&tx, parent)?;
        if new_parent != parent {
            touch_dir(&tx, new_parent)?;
        }
        tx.commit()?;

        debug!(parent, name, new_parent, new_name, ino, "renamed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn stats(&self) -> Result<StoreStats> {
        let (inodes, directories, files, symlinks, total_size): (i64, i64, i64, i64, i64) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM((st_mode & ?1) = ?2), 0),
                        COALESCE(SUM((st_mode & ?1) = ?3), 0),
                        COALESCE(SUM((st_mode & ?1) = ?4), 0),
                        COALESCE(SUM(st_size), 0)
                 FROM attr",
                params![mode::S_IFMT, mode::S_IFDIR, mode::S_IFREG, mode::S_IFLNK],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;
        let dirents: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dirent", [], |row| row.get(0))?;

        let count = |n: i64| u64::try_from(n).unwrap_or(0);
        Ok(StoreStats {
            inodes: count(inodes),
            directories: count(directories),
            files: count(files),
            symlinks: count(symlinks),
            dirents: count(dirents),
            total_size: count(total_size),
        })
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Reads a persisted setting.
    pub fn get_setting(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM global WHERE name = ?1",
                params![name],
                |row| row.get::<_, Option<Vec<u8>>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    /// Writes a persisted setting, replacing any previous value.
    pub fn set_setting(&self, name: &str, value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO global (name, value) VALUES (?1, ?2)",
            params![name, value],
        )?;
        Ok(())
    }

    /// Deletes a setting, returning whether it existed.
    pub fn delete_setting(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM global WHERE name = ?1", params![name])?;
        Ok(affected > 0)
    }

    /// Reads a JSON-encoded setting.
    pub fn get_setting_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get_setting(name)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Writes a setting encoded as JSON.
    pub fn set_setting_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set_setting(name, &bytes)
    }
}

// ----------------------------------------------------------------------
// Row helpers, shared by plain connections and open transactions
// ----------------------------------------------------------------------

pub(crate) fn load_attr(conn: &Connection, ino: Ino) -> Result<Attributes> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ATTR_COLUMNS} FROM attr WHERE st_ino = ?1"
    ))?;
    stmt.query_row(params![ino], Attributes::from_row)
        .optional()?
        .ok_or_else(|| InoDbError::inode_not_found(ino))
}

fn require_dir(conn: &Connection, ino: Ino) -> Result<Attributes> {
    let attr = load_attr(conn, ino)?;
    if !attr.is_directory() {
        return Err(InoDbError::NotADirectory(ino));
    }
    Ok(attr)
}

fn find_entry(conn: &Connection, parent: Ino, name: &str) -> Result<Option<Ino>> {
    let mut stmt =
        conn.prepare_cached("SELECT d_ino FROM dirent WHERE d_parent = ?1 AND d_name = ?2")?;
    Ok(stmt
        .query_row(params![parent, name], |row| row.get(0))
        .optional()?)
}

/// Checks that `parent` is a directory without an entry called `name`.
fn ensure_absent(conn: &Connection, parent: Ino, name: &str) -> Result<()> {
    require_dir(conn, parent)?;
    if find_entry(conn, parent, name)?.is_some() {
        return Err(InoDbError::entry_exists(parent, name));
    }
    Ok(())
}

fn child_count(conn: &Connection, dir: Ino) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM dirent WHERE d_parent = ?1 AND d_name NOT IN ('.', '..')",
        params![dir],
        |row| row.get(0),
    )?)
}

fn insert_attr(conn: &Connection, new: &NewInode<'_>) -> Result<Ino> {
    let now = attr::now();
    conn.execute(
        "INSERT INTO attr (st_mode, st_nlink, st_uid, st_gid, st_size,
                           st_atime, st_mtime, st_ctime, t_hash, t_index, link)
         VALUES (?1, 0, ?2, ?3, ?4, ?5, ?5, ?5, ?6, ?7, ?8)",
        params![
            new.mode,
            new.uid,
            new.gid,
            new.size,
            now,
            new.content.map(|c| c.hash.as_str()),
            new.content.map(|c| c.index),
            new.link,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts one entry; the `dirent` trigger bumps the target's link count.
fn insert_dirent(conn: &Connection, parent: Ino, ino: Ino, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO dirent (d_parent, d_ino, d_name) VALUES (?1, ?2, ?3)",
        params![parent, ino, name],
    )
    .map_err(|e| map_entry_conflict(e, parent, name))?;
    Ok(())
}

fn delete_dirent(conn: &Connection, parent: Ino, name: &str) -> Result<()> {
    let affected = conn.execute(
        "DELETE FROM dirent WHERE d_parent = ?1 AND d_name = ?2",
        params![parent, name],
    )?;
    if affected == 0 {
        return Err(InoDbError::entry_not_found(parent, name));
    }
    Ok(())
}

fn touch_dir(conn: &Connection, dir: Ino) -> Result<()> {
    conn.execute(
        "UPDATE attr SET st_mtime = ?1, st_ctime = ?1 WHERE st_ino = ?2",
        params![attr::now(), dir],
    )?;
    Ok(())
}

fn set_ctime(conn: &Connection, ino: Ino) -> Result<()> {
    conn.execute(
        "UPDATE attr SET st_ctime = ?1 WHERE st_ino = ?2",
        params![attr::now(), ino],
    )?;
    Ok(())
}

/// Returns true if `dir` is `node` or one of its ancestors.
fn is_ancestor(conn: &Connection, dir: Ino, node: Ino) -> Result<bool> {
    let mut current = node;
    let mut seen = HashSet::new();
    loop {
        if current == dir {
            return Ok(true);
        }
        if current == ROOT_INO {
            return Ok(false);
        }
        if !seen.insert(current) {
            return Err(InoDbError::Consistency(format!(
                "parent chain of inode {node} loops at {current}"
            )));
        }
        current = find_entry(conn, current, DOTDOT)?.ok_or_else(|| {
            InoDbError::Consistency(format!("directory {current} has no '..' entry"))
        })?;
    }
}
