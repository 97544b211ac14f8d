//! Open handles served by the backup filesystem
//!
//! Non-directory handles pass through unchanged. Directory handles
//! merge entries with the snapshot's directory of the same name; while
//! both sides are open only read-all requests are supported, since the
//! merge needs complete per-call listings from each side.

use std::io::{self, Read};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::vfs::{DirEntry, Metadata, Vfs, VfsFile};

use super::filesystem::merge_entries;

/// Handle wrapping an open file of the primary (or snapshot)
/// filesystem. Dropping it closes both underlying handles together.
pub(super) struct BackupFile {
    name: String,
    file: Box<dyn VfsFile>,
    backup: Arc<dyn Vfs>,
    state: Option<DirState>,
}

struct DirState {
    is_dir: bool,
    /// The snapshot's directory of the same name, when it exists.
    snapshot: Option<Box<dyn VfsFile>>,
}

impl BackupFile {
    pub(super) fn new(name: String, file: Box<dyn VfsFile>, backup: Arc<dyn Vfs>) -> Self {
        BackupFile {
            name,
            file,
            backup,
            state: None,
        }
    }
}

/// Resolves a handle's directory state on first use: stats the primary
/// side and opens the snapshot's directory of the same name, keeping
/// the snapshot handle only when it exists and is a directory.
fn init_dir_state<'a>(
    state: &'a mut Option<DirState>,
    file: &mut dyn VfsFile,
    backup: &dyn Vfs,
    name: &str,
) -> Result<&'a mut DirState> {
    let current = match state.take() {
        Some(current) => current,
        None => {
            let is_dir = file.stat()?.is_dir();
            let snapshot = match backup.open(name) {
                Ok(mut handle) => {
                    if handle.stat()?.is_dir() {
                        Some(handle)
                    } else {
                        None
                    }
                }
                Err(err) if err.is_not_found() => None,
                Err(err) => return Err(err),
            };
            DirState { is_dir, snapshot }
        }
    };
    Ok(state.insert(current))
}

impl Read for BackupFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl VfsFile for BackupFile {
    fn stat(&mut self) -> Result<Metadata> {
        self.file.stat()
    }

    fn read_entries(&mut self, batch: Option<usize>) -> Result<Vec<DirEntry>> {
        let state = init_dir_state(
            &mut self.state,
            &mut *self.file,
            self.backup.as_ref(),
            &self.name,
        )?;
        if !state.is_dir {
            return Err(Error::NotADirectory(self.name.clone()));
        }

        match &mut state.snapshot {
            // Only one side: batched reads delegate unchanged.
            None => self.file.read_entries(batch),
            Some(_) if batch.is_some() => Err(Error::UnsupportedBatchRead(self.name.clone())),
            Some(snapshot) => {
                let primary = self.file.read_entries(None)?;
                Ok(merge_entries(primary, snapshot.read_entries(None)?))
            }
        }
    }
}
