//! Listing request: validation, start path resolution, and line output.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::listing::error::ListingError;
use crate::listing::filter::FileType;
use crate::listing::walker::Walker;

/// Validated listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub file_type: FileType,
    pub recursive: bool,
    /// Directory to list, relative to the served root.
    pub starts_with: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            recursive: true,
            starts_with: String::new(),
        }
    }
}

impl ListingQuery {
    /// Validate raw parameter values.
    ///
    /// `recursive` accepts the literals `yes` and `no` only.
    pub fn parse(file_type: &str, recursive: &str, starts_with: &str) -> Result<Self, ListingError> {
        let file_type = file_type
            .parse::<FileType>()
            .map_err(|_| ListingError::InvalidParameter {
                name: "type",
                value: file_type.to_string(),
            })?;

        let recursive = match recursive {
            "yes" => true,
            "no" => false,
            other => {
                return Err(ListingError::InvalidParameter {
                    name: "recursive",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            file_type,
            recursive,
            starts_with: starts_with.to_string(),
        })
    }
}

/// A listing bound to a served root.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    served_root: PathBuf,
    query: ListingQuery,
}

impl ListingRequest {
    pub fn new(served_root: impl Into<PathBuf>, query: ListingQuery) -> Self {
        Self {
            served_root: served_root.into(),
            query,
        }
    }

    /// Join `startswith` onto the served root.
    ///
    /// `..` and absolute components are refused, and the canonical target
    /// must stay under the canonical root so symlinks cannot escape it.
    pub fn resolve_target(&self) -> Result<PathBuf, ListingError> {
        let invalid = || ListingError::InvalidStartPath {
            start: self.query.starts_with.clone(),
        };

        let mut target = self.served_root.clone();
        let relative = self.query.starts_with.trim_start_matches('/');
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(name) => target.push(name),
                Component::CurDir => continue,
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    tracing::warn!(start = %self.query.starts_with, "Rejected start path outside served root");
                    return Err(invalid());
                }
            }
        }

        match fs::metadata(&target) {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Err(invalid()),
        }

        let canonical_root = self.served_root.canonicalize().map_err(|_| invalid())?;
        let canonical_target = target.canonicalize().map_err(|_| invalid())?;
        if !canonical_target.starts_with(&canonical_root) {
            tracing::warn!(
                start = %self.query.starts_with,
                resolved = %canonical_target.display(),
                "Start path resolves outside served root"
            );
            return Err(invalid());
        }

        Ok(target)
    }

    /// Resolve the target and open the walk.
    ///
    /// Every failure that should change the response status happens here,
    /// before any output is produced.
    pub fn open(self) -> Result<Listing, ListingError> {
        let target = self.resolve_target()?;
        let walker =
            Walker::open(&target, self.query.recursive).map_err(ListingError::DirectoryAccess)?;

        tracing::debug!(
            target = %target.display(),
            file_type = %self.query.file_type,
            recursive = self.query.recursive,
            "Listing opened"
        );

        Ok(Listing {
            served_root: self.served_root,
            file_type: self.query.file_type,
            walker,
        })
    }

    /// Run the whole listing into `output`, returning the number of lines written.
    pub fn handle<W: Write>(self, output: &mut W) -> Result<u64, ListingError> {
        self.open()?.write_to(output).map_err(ListingError::Sink)
    }
}

/// An opened listing, yielding output lines lazily.
pub struct Listing {
    served_root: PathBuf,
    file_type: FileType,
    walker: Walker,
}

impl Listing {
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Write one line per emitted entry.
    ///
    /// Each line goes out in a single `write_all`, so a sink that turns one
    /// write into one message never splits a line. Stops at the first write
    /// failure.
    pub fn write_to<W: Write>(self, output: &mut W) -> io::Result<u64> {
        let mut written = 0;
        for mut line in self {
            line.push('\n');
            output.write_all(line.as_bytes())?;
            written += 1;
        }
        output.flush()?;
        Ok(written)
    }
}

impl Iterator for Listing {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let entry = self.walker.next()?;
            if !self.file_type.should_emit(entry.is_dir) {
                continue;
            }
            if let Some(line) = display_path(&self.served_root, &entry.path) {
                return Some(line);
            }
        }
    }
}

/// Render `path` relative to the served root as `/a/b`.
///
/// The served root itself has no display form. Output is UTF-8 text, so
/// bytes in a name that are not valid UTF-8 become U+FFFD.
fn display_path(served_root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(served_root).ok()?;

    let mut line = String::new();
    for component in relative.components() {
        line.push('/');
        line.push_str(&component.as_os_str().to_string_lossy());
    }

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
