//! Path resolution on top of single-segment `lookup`.

use crate::error::{InoDbError, Result};
use crate::schema::{Ino, ROOT_INO};
use crate::store::InoDb;

/// Splits a path into lookup segments.
///
/// One leading and one trailing slash are dropped before splitting on `/`,
/// so `"/a/b/"` and `"a/b"` both give `["a", "b"]` and `""`/`"/"` give no
/// segments. Empty segments from doubled slashes are kept and fail lookup.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/').collect()
}

/// Splits a path into its parent path and final name.
///
/// Returns `None` for the root, which has no name.
pub fn split_parent(path: &str) -> Option<(String, &str)> {
    let mut segments = split_path(path);
    let name = segments.pop()?;
    Some((format!("/{}", segments.join("/")), name))
}

/// Lazy walk from the root to a path's target.
///
/// Yields `(None, ROOT_INO)` first, then one `(Some(name), ino)` per
/// segment. The first failing lookup is yielded as an error and ends the
/// walk, so a caller can observe how far resolution got.
pub struct ResolvePath<'a> {
    db: &'a InoDb,
    segments: std::vec::IntoIter<String>,
    current: Option<Ino>,
    done: bool,
}

impl<'a> ResolvePath<'a> {
    pub(crate) fn new(db: &'a InoDb, path: &str) -> Self {
        let segments: Vec<String> = split_path(path).into_iter().map(str::to_owned).collect();
        Self {
            db,
            segments: segments.into_iter(),
            current: None,
            done: false,
        }
    }

    /// Drives the walk to the end and returns the final inode.
    pub fn target(self) -> Result<Ino> {
        let mut last = ROOT_INO;
        for step in self {
            last = step?.1;
        }
        Ok(last)
    }
}

impl Iterator for ResolvePath<'_> {
    type Item = Result<(Option<String>, Ino)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(parent) = self.current else {
            self.current = Some(ROOT_INO);
            return Some(Ok((None, ROOT_INO)));
        };
        let name = self.segments.next()?;
        match self.db.lookup(parent, &name) {
            Ok(ino) => {
                self.current = Some(ino);
                Some(Ok((Some(name), ino)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Rejects names that cannot be stored as a single directory entry.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(InoDbError::InvalidArgument(format!(
            "'{name}' is not a valid entry name"
        )));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(InoDbError::InvalidArgument(format!(
            "entry name '{}' contains a reserved character",
            name.escape_default()
        )));
    }
    Ok(())
}
