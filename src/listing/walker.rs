//! Directory traversal.
//!
//! # Responsibilities
//! - Open the walk root, failing the whole listing if it is unreadable
//! - Yield entries lazily, one level deep or fully recursive
//! - Log and skip entries that cannot be read
//!
//! # Design Decisions
//! - Two error tiers: a root failure is fatal, an entry failure is advisory
//! - Flat walks reuse the `read_dir` handle opened for the root check
//! - Recursive walks use `walkdir` depth-first, root first, links not followed
//! - Enumeration order is whatever the filesystem returns; callers must not
//!   rely on it being sorted

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// A walked filesystem item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Failure while walking a directory tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The walk root could not be opened. Nothing was listed.
    #[error("cannot read directory {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single entry could not be read. The walk carries on without it.
    #[error("cannot read entry {}: {source}", entry_path(.path))]
    Entry {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

fn entry_path(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

impl From<walkdir::Error> for WalkError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf);
        WalkError::Entry {
            path,
            source: io::Error::from(err),
        }
    }
}

enum Traversal {
    Flat(fs::ReadDir),
    Recursive(walkdir::IntoIter),
}

/// Lazy sequence of [`Entry`] values rooted at a directory.
pub struct Walker {
    root: PathBuf,
    traversal: Traversal,
    skipped: usize,
}

impl Walker {
    /// Open `root` for walking.
    ///
    /// Only a failure to read `root` itself is returned here; per-entry
    /// failures surface later as skipped entries.
    pub fn open(root: &Path, recursive: bool) -> Result<Self, WalkError> {
        let read_dir = fs::read_dir(root).map_err(|source| WalkError::Root {
            path: root.to_path_buf(),
            source,
        })?;

        let traversal = if recursive {
            Traversal::Recursive(WalkDir::new(root).follow_links(false).into_iter())
        } else {
            Traversal::Flat(read_dir)
        };

        Ok(Self {
            root: root.to_path_buf(),
            traversal,
            skipped: 0,
        })
    }

    /// Number of entries skipped so far because they could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_step(&mut self) -> Option<Result<Entry, WalkError>> {
        match &mut self.traversal {
            Traversal::Flat(read_dir) => {
                let item = read_dir.next()?;
                Some(flat_entry(&self.root, item))
            }
            Traversal::Recursive(iter) => {
                let item = iter.next()?;
                Some(item.map_err(WalkError::from).map(|entry| Entry {
                    is_dir: entry.file_type().is_dir(),
                    path: entry.into_path(),
                }))
            }
        }
    }
}

fn flat_entry(root: &Path, item: io::Result<fs::DirEntry>) -> Result<Entry, WalkError> {
    let entry = item.map_err(|source| WalkError::Entry {
        path: Some(root.to_path_buf()),
        source,
    })?;
    let path = entry.path();

    match entry.file_type() {
        Ok(file_type) => Ok(Entry {
            is_dir: file_type.is_dir(),
            path,
        }),
        Err(source) => Err(WalkError::Entry {
            path: Some(path),
            source,
        }),
    }
}

impl Iterator for Walker {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        loop {
            match self.next_step()? {
                Ok(entry) => return Some(entry),
                Err(err) => {
                    self.skipped += 1;
                    tracing::warn!(
                        root = %self.root.display(),
                        error = %err,
                        "Error when walking served directory, skipping entry"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();
        fs::write(dir.path().join("sub/deeper/c.txt"), "c").unwrap();
        dir
    }

    fn relative(root: &Path, entries: Vec<Entry>) -> HashSet<(String, bool)> {
        entries
            .into_iter()
            .map(|e| {
                let rel = e.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                (rel, e.is_dir)
            })
            .collect()
    }

    #[test]
    fn flat_walk_lists_immediate_children() {
        let dir = tree();
        let entries: Vec<_> = Walker::open(dir.path(), false).unwrap().collect();

        let expected: HashSet<_> = [("a.txt".to_string(), false), ("sub".to_string(), true)]
            .into_iter()
            .collect();
        assert_eq!(relative(dir.path(), entries), expected);
    }

    #[test]
    fn recursive_walk_visits_everything_once_including_root() {
        let dir = tree();
        let entries: Vec<_> = Walker::open(dir.path(), true).unwrap().collect();
        assert_eq!(entries.len(), 6);

        let expected: HashSet<_> = [
            ("".to_string(), true),
            ("a.txt".to_string(), false),
            ("sub".to_string(), true),
            ("sub/b.txt".to_string(), false),
            ("sub/deeper".to_string(), true),
            ("sub/deeper/c.txt".to_string(), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(relative(dir.path(), entries), expected);
    }

    #[test]
    fn recursive_walk_is_depth_first_from_root() {
        let dir = tree();
        let mut walker = Walker::open(dir.path(), true).unwrap();
        let first = walker.next().unwrap();
        assert_eq!(first.path, dir.path());
        assert!(first.is_dir);
        assert_eq!(walker.skipped(), 0);
    }

    #[test]
    fn missing_root_is_root_error() {
        let dir = TempDir::new().unwrap();
        let result = Walker::open(&dir.path().join("nope"), true);
        assert!(matches!(result, Err(WalkError::Root { .. })));
    }

    #[test]
    fn file_root_is_root_error() {
        let dir = tree();
        let result = Walker::open(&dir.path().join("a.txt"), false);
        assert!(matches!(result, Err(WalkError::Root { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("link")).unwrap();

        let entries: Vec<_> = Walker::open(dir.path(), true).unwrap().collect();
        let link = entries
            .iter()
            .find(|e| e.path.ends_with("link"))
            .unwrap();
        assert!(!link.is_dir);
        assert!(!entries.iter().any(|e| e.path == dir.path().join("link").join("b.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "h").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop a privileged user.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut walker = Walker::open(dir.path(), true).unwrap();
        let entries: Vec<_> = walker.by_ref().collect();
        let skipped = walker.skipped();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(skipped >= 1);
        let seen = relative(dir.path(), entries);
        assert!(seen.contains(&("a.txt".to_string(), false)));
        assert!(seen.contains(&("sub/deeper/c.txt".to_string(), false)));
        assert!(seen.contains(&("locked".to_string(), true)));
        assert!(!seen.contains(&("locked/hidden.txt".to_string(), false)));
    }
}
