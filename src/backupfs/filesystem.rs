//! Backup filesystem implementation
//!
//! Construction (validate, snapshot, arm the deadline) and the merged
//! read operations over the primary/snapshot pair.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::vfs::{DirEntry, LocalFs, Metadata, Vfs, VfsFile};

use super::cleaner::Cleaner;
use super::copy;
use super::handle::BackupFile;

/// Filesystem that snapshots another filesystem into a directory at
/// construction and falls back to the snapshot for paths the primary
/// no longer has, until the snapshot's time-to-live expires.
///
/// The whole snapshot directory is deleted when the deadline fires;
/// make sure it contains nothing else.
pub struct BackupFs {
    fsys: Arc<dyn Vfs>,
    backup: Arc<dyn Vfs>,
    cleaner: Cleaner,
}

impl BackupFs {
    /// Snapshots `fsys` into `dir` and arms the deletion deadline.
    ///
    /// Validation of `dir` and any copy failure abort construction;
    /// no usable instance is returned alongside an error.
    pub fn new(fsys: Arc<dyn Vfs>, dir: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let display = dir.to_string_lossy().into_owned();
        if !copy::validate_backup_dir(&display) {
            return Err(Error::BackupDir(display));
        }

        copy::snapshot(fsys.as_ref(), &dir)?;
        debug!(dir = %dir.display(), ttl_ms = ttl.as_millis() as u64, "backup snapshot ready");

        let backup = Arc::new(LocalFs::new(dir.clone()));
        let cleaner = Cleaner::arm(dir, ttl)?;

        Ok(BackupFs {
            fsys,
            backup,
            cleaner,
        })
    }

    /// Blocks until the snapshot has been deleted.
    pub fn wait_cleaned(&self) {
        self.cleaner.wait();
    }

    /// Waits up to `timeout` for the snapshot deletion; returns
    /// whether it finished.
    pub fn wait_cleaned_timeout(&self, timeout: Duration) -> bool {
        self.cleaner.wait_timeout(timeout)
    }

    /// Returns whether the snapshot has been deleted.
    pub fn is_cleaned(&self) -> bool {
        self.cleaner.is_done()
    }

    /// The latched snapshot deletion error. Only meaningful once the
    /// deletion has completed; never raised anywhere else.
    pub fn cleaning_err(&self) -> Option<Arc<io::Error>> {
        self.cleaner.error()
    }

    /// Cancels the pending snapshot deletion. Also runs on drop, so
    /// discarding the instance releases the background task without
    /// deleting anything.
    pub fn cancel_cleaning(&self) {
        self.cleaner.cancel();
    }
}

impl Drop for BackupFs {
    fn drop(&mut self) {
        self.cleaner.cancel();
    }
}

impl Vfs for BackupFs {
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        debug!(name, "backupfs open");
        let file = match self.fsys.open(name) {
            Ok(file) => file,
            Err(err) if err.is_not_found() => self.backup.open(name)?,
            Err(err) => return Err(err),
        };
        Ok(Box::new(BackupFile::new(
            name.to_string(),
            file,
            Arc::clone(&self.backup),
        )))
    }

    fn stat(&self, name: &str) -> Result<Metadata> {
        match self.fsys.stat(name) {
            Ok(meta) => Ok(meta),
            Err(err) if err.is_not_found() => self.backup.stat(name),
            Err(err) => Err(err),
        }
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        let mut primary_missing = false;
        let primary = match self.fsys.read_dir(name) {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => {
                primary_missing = true;
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        let snapshot = match self.backup.read_dir(name) {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => {
                if primary_missing {
                    return Err(err);
                }
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        Ok(merge_entries(primary, snapshot))
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        match self.fsys.read_file(name) {
            Ok(data) => Ok(data),
            Err(err) if err.is_not_found() => self.backup.read_file(name),
            Err(err) => Err(err),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let mut matches = self.fsys.glob(pattern)?;
        matches.append(&mut self.backup.glob(pattern)?);
        matches.sort();
        matches.dedup();
        Ok(matches)
    }
}

/// Concatenates primary and snapshot listings, stable-sorts by name
/// and collapses consecutive duplicates keeping the first occurrence,
/// so for equal names the primary's entry wins.
pub(super) fn merge_entries(primary: Vec<DirEntry>, snapshot: Vec<DirEntry>) -> Vec<DirEntry> {
    let mut merged = primary;
    merged.extend(snapshot);
    merged.sort_by(|a, b| a.name.cmp(&b.name));
    merged.dedup_by(|a, b| a.name == b.name);
    merged
}
