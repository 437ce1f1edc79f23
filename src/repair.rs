//! Offline consistency check for the inode store.
//!
//! Meant to run at startup after an unclean shutdown, or whenever a
//! [`InoDbError::Consistency`](crate::InoDbError::Consistency) is reported.
//! Link counts are recomputed from `dirent` rows rather than trusted, so a
//! single pass always leaves the store consistent.

use crate::{
    attr,
    error::Result,
    schema::{mode, DOT, DOTDOT, ROOT_INO},
    store::InoDb,
};
use rusqlite::params;
use tracing::{info, warn};

/// What a [`InoDb::check_and_repair`] pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// The root inode or one of its `.`/`..` entries had to be recreated.
    pub root_restored: bool,
    /// Entries whose parent or target inode no longer existed.
    pub dangling_dirents: usize,
    /// Inodes no named entry referred to.
    pub orphan_inodes: usize,
    /// `.` or `..` entries recreated for non-root directories.
    pub dot_entries_restored: usize,
    /// Directories or symlinks that carried a content reference.
    pub content_cleared: usize,
    /// Inodes whose stored link count disagreed with their entries.
    pub nlink_fixed: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl InoDb {
    /// Repairs link counts, dangling entries and orphaned inodes.
    ///
    /// Runs as one transaction in four stages:
    /// 1. entries pointing at, or living in, a missing inode are deleted;
    /// 2. inodes without any named entry (other than the root) are deleted;
    /// 3. every surviving directory gets back a missing `.` or `..`;
    /// 4. every `st_nlink` is recomputed from the remaining entries.
    ///
    /// Stages 1 and 2 repeat until neither removes anything, so detached
    /// subtrees are collected completely and a second call is a no-op.
    pub fn check_and_repair(&mut self) -> Result<RepairReport> {
        let tx = self.write_txn()?;
        let mut report = RepairReport::default();

        let root_attr = tx.execute(
            "INSERT OR IGNORE INTO attr (st_ino, st_mode, st_nlink, st_atime, st_mtime, st_ctime)
             VALUES (?1, ?2, 0, ?3, ?3, ?3)",
            params![ROOT_INO, mode::DEFAULT_DIR_MODE, attr::now()],
        )?;
        let mut root_entries = 0;
        for name in [DOT, DOTDOT] {
            root_entries += tx.execute(
                "INSERT OR IGNORE INTO dirent (d_parent, d_ino, d_name) VALUES (?1, ?1, ?2)",
                params![ROOT_INO, name],
            )?;
        }
        if root_attr + root_entries > 0 {
            warn!(root_attr, root_entries, "restored root directory");
            report.root_restored = true;
        }

        loop {
            let dangling = tx.execute(
                "DELETE FROM dirent
                 WHERE d_ino NOT IN (SELECT st_ino FROM attr)
                    OR d_parent NOT IN (SELECT st_ino FROM attr)",
                [],
            )?;
            let orphans = tx.execute(
                "DELETE FROM attr
                 WHERE st_ino != ?1
                   AND st_ino NOT IN (
                       SELECT d_ino FROM dirent WHERE d_name NOT IN (?2, ?3)
                   )",
                params![ROOT_INO, DOT, DOTDOT],
            )?;
            if dangling > 0 {
                warn!(count = dangling, "deleted dangling directory entries");
            }
            if orphans > 0 {
                warn!(count = orphans, "deleted orphaned inodes");
            }
            report.dangling_dirents += dangling;
            report.orphan_inodes += orphans;
            if dangling == 0 && orphans == 0 {
                break;
            }
        }

        let dots = tx.execute(
            "INSERT OR IGNORE INTO dirent (d_parent, d_ino, d_name)
             SELECT st_ino, st_ino, ?3 FROM attr
             WHERE (st_mode & ?1) = ?2 AND st_ino != ?4",
            params![mode::S_IFMT, mode::S_IFDIR, DOT, ROOT_INO],
        )?;
        // A directory has one named entry; its parent is where `..` points.
        let dotdots = tx.execute(
            "INSERT OR IGNORE INTO dirent (d_parent, d_ino, d_name)
             SELECT d.d_ino, MIN(d.d_parent), ?3 FROM dirent d
             JOIN attr a ON a.st_ino = d.d_ino
             WHERE (a.st_mode & ?1) = ?2 AND d.d_ino != ?5
               AND d.d_name NOT IN (?3, ?4)
             GROUP BY d.d_ino",
            params![mode::S_IFMT, mode::S_IFDIR, DOTDOT, DOT, ROOT_INO],
        )?;
        report.dot_entries_restored = dots + dotdots;
        if report.dot_entries_restored > 0 {
            warn!(dots, dotdots, "restored directory self and parent entries");
        }

        report.content_cleared = tx.execute(
            "UPDATE attr SET t_hash = NULL, t_index = NULL
             WHERE (st_mode & ?1) != ?2
               AND (t_hash IS NOT NULL OR t_index IS NOT NULL)",
            params![mode::S_IFMT, mode::S_IFREG],
        )?;
        if report.content_cleared > 0 {
            warn!(
                count = report.content_cleared,
                "cleared content references on non-regular files"
            );
        }

        report.nlink_fixed = tx.execute(
            "UPDATE attr
             SET st_nlink = (SELECT COUNT(*) FROM dirent WHERE d_ino = attr.st_ino)
             WHERE st_nlink != (SELECT COUNT(*) FROM dirent WHERE d_ino = attr.st_ino)",
            [],
        )?;
        if report.nlink_fixed > 0 {
            warn!(count = report.nlink_fixed, "corrected link counts");
        }

        tx.commit()?;
        info!(?report, "consistency check finished");
        Ok(report)
    }
}
