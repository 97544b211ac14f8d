//! Snapshot construction
//!
//! Destination validation and the recursive copy of a source
//! filesystem into the snapshot directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use crate::error::Result;
use crate::vfs::{walk, Vfs};

/// Owner write bit, forced on every copied file so the snapshot can be
/// deleted unattended later.
#[cfg(unix)]
const PERM_USER_WRITE: u32 = 0o200;

/// Returns whether `dir` is a safe target for a later recursive
/// deletion. Rejects the current and parent directories in all their
/// spellings, a bare separator, and anything ending in `..`.
pub(super) fn validate_backup_dir(dir: &str) -> bool {
    let sep = MAIN_SEPARATOR;
    let trimmed = dir.trim_end_matches(sep);
    if matches!(trimmed, "" | "." | "..") {
        return false;
    }
    if trimmed == format!("{sep}.") {
        return false;
    }
    !trimmed.ends_with(&format!("{sep}.."))
}

/// Copies the whole tree of `fsys` under `dest`, creating matching
/// directories and copying every regular file's bytes. Source
/// permission bits are preserved with the owner write bit forced on.
/// The first failure aborts the copy; partial state is left for the
/// caller to discard.
pub(super) fn snapshot(fsys: &dyn Vfs, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;

    walk(fsys, "", &mut |name, entry| {
        let target = os_path(dest, name);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            return Ok(());
        }

        let mut reader = fsys.open(name)?;
        let mut writer = fs::File::create(&target)?;
        io::copy(&mut reader, &mut writer)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perm = fsys.stat(name)?.perm | PERM_USER_WRITE;
            fs::set_permissions(&target, fs::Permissions::from_mode(perm))?;
        }

        debug!(name, "copied into backup snapshot");
        Ok(())
    })
}

/// Maps a slash path into an OS path under `dest`.
fn os_path(dest: &Path, name: &str) -> PathBuf {
    let mut p = dest.to_path_buf();
    for segment in name.split('/').filter(|s| !s.is_empty()) {
        p.push(segment);
    }
    p
}
