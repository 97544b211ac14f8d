//! Open handles served by the hash filesystem
//!
//! Byte reads pass through untouched; directory handles rename each
//! batch of entries to public (hashed) names with the same rule the
//! whole-directory listing uses.

use std::io::{self, Read};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::vfs::{DirEntry, Metadata, VfsFile};

use super::filesystem::Shared;

/// Handle wrapping an open file of the underlying filesystem.
pub(super) struct HashFile {
    /// Name the handle was opened under (the requested public name).
    name: String,
    file: Box<dyn VfsFile>,
    shared: Arc<Shared>,
    /// Lazily resolved on the first entry read.
    is_dir: Option<bool>,
}

impl HashFile {
    pub(super) fn new(name: String, file: Box<dyn VfsFile>, shared: Arc<Shared>) -> Self {
        HashFile {
            name,
            file,
            shared,
            is_dir: None,
        }
    }
}

impl Read for HashFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl VfsFile for HashFile {
    fn stat(&mut self) -> Result<Metadata> {
        self.file.stat()
    }

    fn read_entries(&mut self, batch: Option<usize>) -> Result<Vec<DirEntry>> {
        let is_dir = match self.is_dir {
            Some(is_dir) => is_dir,
            None => {
                let is_dir = self.file.stat()?.is_dir();
                self.is_dir = Some(is_dir);
                is_dir
            }
        };
        if !is_dir {
            return Err(Error::NotADirectory(self.name.clone()));
        }

        let entries = self.file.read_entries(batch)?;
        self.shared.rename_entries(&self.name, entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::hasher::{Blake3Hasher, Hasher};
    use crate::vfs::{LocalFs, Vfs};
    use crate::HashFs;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_handle_read_entries_renames() {
        let dir = tempdir().unwrap();
        let assets = dir.path().join("assets");
        fs::create_dir_all(assets.join("subdir")).unwrap();

        let hasher = Blake3Hasher::new(8).unwrap();
        let mut want = vec!["subdir".to_string()];
        for (name, content) in [("one.txt", "first"), ("two.txt", "second"), ("three", "third")] {
            fs::write(assets.join(name), content).unwrap();
            let token = hasher.hash(&mut content.as_bytes()).unwrap();
            match name.rsplit_once('.') {
                Some((stem, ext)) => want.push(format!("{stem}.{token}.{ext}")),
                None => want.push(format!("{name}.{token}")),
            }
        }
        want.sort();

        let fsys = HashFs::new(
            Arc::new(LocalFs::new(dir.path())),
            Blake3Hasher::new(8).unwrap(),
        );

        // Read-all and batched reads yield the same renamed set.
        let mut f = fsys.open("assets").unwrap();
        let mut got: Vec<_> = f
            .read_entries(None)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        got.sort();
        assert_eq!(got, want);

        let mut f = fsys.open("assets").unwrap();
        let mut got = Vec::new();
        loop {
            let batch = f.read_entries(Some(2)).unwrap();
            if batch.is_empty() {
                break;
            }
            got.extend(batch.into_iter().map(|e| e.name));
        }
        got.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn test_handle_read_entries_on_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.css"), "body {}").unwrap();

        let fsys = HashFs::new(
            Arc::new(LocalFs::new(dir.path())),
            Blake3Hasher::new(6).unwrap(),
        );
        let public = fsys.hashed_path("main.css").unwrap();
        let mut f = fsys.open(&public).unwrap();
        assert!(f.read_entries(None).is_err());
    }
}
