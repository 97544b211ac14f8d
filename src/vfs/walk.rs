//! Recursive traversal over a [`Vfs`]

use crate::error::Result;

use super::{path, DirEntry, Vfs};

/// Walks the tree under `root` in sorted pre-order, calling `visit`
/// with each entry's full slash path. The root itself is not visited.
///
/// The first error from the filesystem or the visitor aborts the walk.
pub fn walk<F>(fsys: &dyn Vfs, root: &str, visit: &mut F) -> Result<()>
where
    F: FnMut(&str, &DirEntry) -> Result<()>,
{
    for entry in fsys.read_dir(root)? {
        let entry_path = path::join(root, &entry.name);
        visit(&entry_path, &entry)?;
        if entry.is_dir() {
            walk(fsys, &entry_path, visit)?;
        }
    }
    Ok(())
}
