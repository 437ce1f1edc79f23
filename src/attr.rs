//! Inode attribute records and the partial-update struct.

use crate::schema::{mode, Ino};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Column list matching [`Attributes::from_row`].
pub(crate) const ATTR_COLUMNS: &str = "st_ino, st_mode, st_nlink, st_uid, st_gid, st_size, \
     st_atime, st_mtime, st_ctime, t_hash, t_index, link";

/// Seconds since the Unix epoch, sub-second precision.
pub type Timestamp = f64;

/// Current time as a [`Timestamp`].
pub fn now() -> Timestamp {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Converts a [`Timestamp`] to a UTC date-time, if representable.
pub fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1_000_000_000.0).round() as u32;
    Utc.timestamp_opt(secs as i64, nanos.min(999_999_999)).single()
}

/// Object type encoded in the `S_IFMT` bits of a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Directory,
    RegularFile,
    Symlink,
}

impl FileKind {
    /// Classifies a mode. Types the store never creates yield `None`.
    pub fn from_mode(st_mode: u32) -> Option<Self> {
        match st_mode & mode::S_IFMT {
            mode::S_IFDIR => Some(FileKind::Directory),
            mode::S_IFREG => Some(FileKind::RegularFile),
            mode::S_IFLNK => Some(FileKind::Symlink),
            _ => None,
        }
    }

    pub fn type_bits(self) -> u32 {
        match self {
            FileKind::Directory => mode::S_IFDIR,
            FileKind::RegularFile => mode::S_IFREG,
            FileKind::Symlink => mode::S_IFLNK,
        }
    }
}

/// Reference into the external content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub hash: String,
    pub index: i64,
}

/// One row of the `attr` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub ino: Ino,
    pub mode: u32,
    pub nlink: i64,
    pub uid: u32,
    pub gid: u32,
    pub size: i64,
    pub atime: Timestamp,
    pub mtime: Timestamp,
    pub ctime: Timestamp,
    pub hash: Option<String>,
    pub index: Option<i64>,
    pub link: Option<String>,
}

impl Attributes {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ino: row.get(0)?,
            mode: row.get(1)?,
            nlink: row.get(2)?,
            uid: row.get(3)?,
            gid: row.get(4)?,
            size: row.get(5)?,
            atime: row.get(6)?,
            mtime: row.get(7)?,
            ctime: row.get(8)?,
            hash: row.get(9)?,
            index: row.get(10)?,
            link: row.get(11)?,
        })
    }

    pub fn kind(&self) -> Option<FileKind> {
        FileKind::from_mode(self.mode)
    }

    pub fn is_directory(&self) -> bool {
        (self.mode & mode::S_IFMT) == mode::S_IFDIR
    }

    pub fn is_file(&self) -> bool {
        (self.mode & mode::S_IFMT) == mode::S_IFREG
    }

    pub fn is_symlink(&self) -> bool {
        (self.mode & mode::S_IFMT) == mode::S_IFLNK
    }

    /// Permission bits without the file type.
    pub fn permissions(&self) -> u32 {
        self.mode & !mode::S_IFMT
    }

    /// Content reference, present only when both halves are set.
    pub fn content(&self) -> Option<ContentRef> {
        match (&self.hash, self.index) {
            (Some(hash), Some(index)) => Some(ContentRef {
                hash: hash.clone(),
                index,
            }),
            _ => None,
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.mtime)
    }
}

/// Fields to change in [`crate::InoDb::set_attributes`].
///
/// Only fields set to `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetAttributes {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<i64>,
    pub atime: Option<Timestamp>,
    pub mtime: Option<Timestamp>,
    pub ctime: Option<Timestamp>,
    pub hash: Option<String>,
    pub index: Option<i64>,
}

impl SetAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn touches_content(&self) -> bool {
        self.hash.is_some() || self.index.is_some()
    }

    #[must_use]
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = Some(uid);
        self.gid = Some(gid);
        self
    }

    #[must_use]
    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn times(mut self, atime: Timestamp, mtime: Timestamp) -> Self {
        self.atime = Some(atime);
        self.mtime = Some(mtime);
        self
    }

    #[must_use]
    pub fn ctime(mut self, ctime: Timestamp) -> Self {
        self.ctime = Some(ctime);
        self
    }

    #[must_use]
    pub fn content(mut self, content: ContentRef) -> Self {
        self.hash = Some(content.hash);
        self.index = Some(content.index);
        self
    }
}

/// A directory entry joined with its target's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub attr: Attributes,
}

impl DirEntry {
    pub fn ino(&self) -> Ino {
        self.attr.ino
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(mode: u32) -> Attributes {
        Attributes {
            ino: 5,
            mode,
            nlink: 1,
            uid: 0,
            gid: 0,
            size: 0,
            atime: 0.0,
            mtime: 1_700_000_000.5,
            ctime: 0.0,
            hash: None,
            index: None,
            link: None,
        }
    }

    #[test]
    fn test_kind_from_mode() {
        assert_eq!(FileKind::from_mode(mode::DEFAULT_DIR_MODE), Some(FileKind::Directory));
        assert_eq!(FileKind::from_mode(mode::DEFAULT_FILE_MODE), Some(FileKind::RegularFile));
        assert_eq!(FileKind::from_mode(mode::S_IFLNK | 0o777), Some(FileKind::Symlink));
        assert_eq!(FileKind::from_mode(0o020000 | 0o600), None); // char device

        for kind in [FileKind::Directory, FileKind::RegularFile, FileKind::Symlink] {
            assert_eq!(FileKind::from_mode(kind.type_bits() | 0o640), Some(kind));
        }
    }

    #[test]
    fn test_attribute_predicates() {
        let dir = sample(mode::DEFAULT_DIR_MODE);
        assert!(dir.is_directory());
        assert!(!dir.is_file());
        assert_eq!(dir.kind(), Some(FileKind::Directory));
        assert_eq!(dir.permissions(), 0o755);

        let mut file = sample(mode::DEFAULT_FILE_MODE);
        assert!(file.is_file());
        assert_eq!(file.content(), None);
        file.hash = Some("H".into());
        assert_eq!(file.content(), None);
        file.index = Some(3);
        assert_eq!(
            file.content(),
            Some(ContentRef {
                hash: "H".into(),
                index: 3
            })
        );
    }

    #[test]
    fn test_modified_datetime() {
        let attr = sample(mode::DEFAULT_FILE_MODE);
        let mtime = attr.modified().unwrap();
        assert_eq!(mtime.timestamp(), 1_700_000_000);
        assert_eq!(mtime.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_set_attributes_builder() {
        assert!(SetAttributes::new().is_empty());

        let set = SetAttributes::new().owner(10, 20).size(42);
        assert!(!set.is_empty());
        assert!(!set.touches_content());
        assert_eq!(set.uid, Some(10));
        assert_eq!(set.gid, Some(20));

        let set = SetAttributes::new().content(ContentRef {
            hash: "abc".into(),
            index: 1,
        });
        assert!(set.touches_content());
    }
}
