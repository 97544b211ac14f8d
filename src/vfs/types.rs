//! Core virtual filesystem types
//!
//! Path-based value records: no inodes, no OS handles. Both records
//! carry a `renamed` adapter so decorators can present an entry under
//! a different public name without touching the rest of the record.

use std::time::SystemTime;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }
}

/// File metadata as reported by [`crate::vfs::Vfs::stat`].
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Base name under which the record is reported.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permission bits (e.g. 0o644).
    pub perm: u32,
    /// Last modification time.
    pub modified: SystemTime,
}

impl Metadata {
    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// The same metadata reported under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Metadata {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Directory entry as reported by [`crate::vfs::Vfs::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name (not a full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        DirEntry {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }

    /// Returns true if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// The same entry reported under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        DirEntry {
            name: name.into(),
            kind: self.kind,
        }
    }
}
