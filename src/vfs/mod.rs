//! Virtual filesystem capability set
//!
//! A small read-only contract the decorators are written against and
//! expose themselves: open/stat/read_dir/read_file/glob over named,
//! slash-separated paths. [`LocalFs`] is the directory-backed
//! implementation (the analog of mounting a local directory as the
//! store).
//!
//! Contract notes:
//! - paths are relative, slash-separated, no leading slash; `""` and
//!   `"."` both name the root
//! - `read_dir` returns entries sorted by name
//! - not-found errors must stay classifiable via
//!   [`Error::is_not_found`](crate::error::Error::is_not_found); any
//!   other failure must not be mapped to not-found

mod glob;
mod local;
pub mod path;
mod types;
mod walk;

pub use self::glob::glob_walk;
pub use self::local::LocalFs;
pub use self::types::{DirEntry, FileType, Metadata};
pub use self::walk::walk;

use std::io::Read;

use crate::error::Result;

/// Read-only filesystem capability set.
pub trait Vfs: Send + Sync {
    /// Open a file or directory for reading.
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>>;

    /// Return metadata for a path.
    fn stat(&self, name: &str) -> Result<Metadata>;

    /// Return the entries of a directory, sorted by name.
    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>>;

    /// Read a whole file into memory.
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Return all paths matching a glob pattern, in walk order.
    ///
    /// `*`, `?` and `[..]` do not cross path separators.
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;
}

/// An open handle returned by [`Vfs::open`].
///
/// Regular files serve bytes through [`Read`]; directory handles serve
/// entries through [`VfsFile::read_entries`].
pub trait VfsFile: Read + Send {
    /// Return metadata for the open file.
    fn stat(&mut self) -> Result<Metadata>;

    /// Incrementally list a directory.
    ///
    /// `Some(n)` returns at most `n` further entries and an empty
    /// vector once the directory is exhausted; `None` returns all
    /// remaining entries at once. Fails with
    /// [`Error::NotADirectory`](crate::error::Error::NotADirectory)
    /// on a non-directory handle.
    fn read_entries(&mut self, batch: Option<usize>) -> Result<Vec<DirEntry>>;
}
