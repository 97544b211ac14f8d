//! fslayer - read-only filesystem decorators
//!
//! This library wraps an existing virtual filesystem ([`vfs::Vfs`])
//! without altering it:
//!
//! - [`HashFs`] serves files under names with a content-hash token
//!   embedded, for maximal HTTP caching, and resolves those public
//!   names back to the real files.
//! - [`BackupFs`] snapshots a filesystem into a directory at
//!   construction and transparently falls back to the snapshot until
//!   its time-to-live expires.

pub mod backupfs;
pub mod error;
pub mod hasher;
pub mod hashfs;
pub mod vfs;

pub use backupfs::BackupFs;
pub use error::{Error, Result};
pub use hasher::{Blake3Hasher, Hasher};
pub use hashfs::HashFs;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::hasher::{Blake3Hasher, Hasher};
    pub use crate::vfs::{DirEntry, FileType, LocalFs, Metadata, Vfs, VfsFile};
    pub use crate::{BackupFs, HashFs};
}
