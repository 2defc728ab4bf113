//! Entry type filtering.

use std::fmt;
use std::str::FromStr;

/// Which kinds of entries a listing emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    /// Files and directories.
    Any,
    /// Everything that is not a directory.
    #[default]
    File,
    /// Directories only.
    Dir,
}

impl FileType {
    /// Decide whether an entry with the given directory status is emitted.
    pub fn should_emit(self, is_dir: bool) -> bool {
        match self {
            FileType::Any => true,
            FileType::File => !is_dir,
            FileType::Dir => is_dir,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Any => "any",
            FileType::File => "file",
            FileType::Dir => "dir",
        }
    }
}

impl FromStr for FileType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(FileType::Any),
            "file" => Ok(FileType::File),
            "dir" => Ok(FileType::Dir),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
