//! Directory-backed virtual filesystem
//!
//! Serves a local directory through the [`Vfs`] contract. This is the
//! store the backup decorator snapshots into, and the usual store
//! under everything else.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

use super::{glob_walk, path, DirEntry, FileType, Metadata, Vfs, VfsFile};

/// Read-only [`Vfs`] over a local directory root.
pub struct LocalFs {
    /// Root directory all paths resolve under.
    root: PathBuf,
}

impl LocalFs {
    /// Create a filesystem rooted at `root`. The directory does not
    /// have to exist yet; operations report not-found until it does.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFs { root: root.into() }
    }

    /// Root directory of this filesystem.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slash path under the root.
    fn resolve(&self, name: &str) -> PathBuf {
        if path::is_root(name) {
            return self.root.clone();
        }
        let mut p = self.root.clone();
        for segment in name.split('/').filter(|s| !s.is_empty() && *s != ".") {
            p.push(segment);
        }
        p
    }

    fn metadata(&self, name: &str) -> Result<fs::Metadata> {
        fs::metadata(self.resolve(name)).map_err(|e| map_io(name, e))
    }
}

impl Vfs for LocalFs {
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        let meta = self.metadata(name)?;
        let reported = reported_name(name);
        if meta.is_dir() {
            let entries = self.read_dir(name)?;
            return Ok(Box::new(LocalDir {
                meta: convert_metadata(&reported, &meta),
                entries,
                pos: 0,
            }));
        }
        let file = fs::File::open(self.resolve(name)).map_err(|e| map_io(name, e))?;
        Ok(Box::new(LocalFile {
            meta: convert_metadata(&reported, &meta),
            file,
        }))
    }

    fn stat(&self, name: &str) -> Result<Metadata> {
        let meta = self.metadata(name)?;
        Ok(convert_metadata(&reported_name(name), &meta))
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        let dir = self.resolve(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| map_io(name, e))? {
            let entry = entry.map_err(|e| map_io(name, e))?;
            let file_type = entry.file_type().map_err(|e| map_io(name, e))?;
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy().to_string(),
                convert_file_type(file_type),
            ));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.resolve(name)).map_err(|e| map_io(name, e))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        glob_walk(self, pattern)
    }
}

/// Open handle over a regular local file.
struct LocalFile {
    meta: Metadata,
    file: fs::File,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl VfsFile for LocalFile {
    fn stat(&mut self) -> Result<Metadata> {
        Ok(self.meta.clone())
    }

    fn read_entries(&mut self, _batch: Option<usize>) -> Result<Vec<DirEntry>> {
        Err(Error::NotADirectory(self.meta.name.clone()))
    }
}

/// Open handle over a local directory. Entries are captured sorted at
/// open time and served in batches from there.
struct LocalDir {
    meta: Metadata,
    entries: Vec<DirEntry>,
    pos: usize,
}

impl Read for LocalDir {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("is a directory: {}", self.meta.name),
        ))
    }
}

impl VfsFile for LocalDir {
    fn stat(&mut self) -> Result<Metadata> {
        Ok(self.meta.clone())
    }

    fn read_entries(&mut self, batch: Option<usize>) -> Result<Vec<DirEntry>> {
        let remaining = self.entries.len() - self.pos;
        let take = match batch {
            Some(n) => n.min(remaining),
            None => remaining,
        };
        let out = self.entries[self.pos..self.pos + take].to_vec();
        self.pos += take;
        Ok(out)
    }
}

fn reported_name(name: &str) -> String {
    if path::is_root(name) {
        ".".to_string()
    } else {
        path::base(name).to_string()
    }
}

fn map_io(name: &str, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::NotFound(name.to_string())
    } else {
        Error::Io(err)
    }
}

fn convert_file_type(t: fs::FileType) -> FileType {
    if t.is_dir() {
        FileType::Directory
    } else if t.is_symlink() {
        FileType::Symlink
    } else {
        FileType::File
    }
}

fn convert_metadata(name: &str, meta: &fs::Metadata) -> Metadata {
    Metadata {
        name: name.to_string(),
        size: meta.len(),
        kind: convert_file_type(meta.file_type()),
        perm: permission_bits(meta),
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_read() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("test.txt"), b"hello world").unwrap();

        let fsys = LocalFs::new(dir.path());

        let mut f = fsys.open("test.txt").unwrap();
        let mut content = Vec::new();
        f.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"hello world");

        let meta = f.stat().unwrap();
        assert_eq!(meta.name, "test.txt");
        assert_eq!(meta.size, 11);
        assert!(meta.is_file());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let fsys = LocalFs::new(dir.path());

        let err = fsys.open("nope.txt").err().unwrap();
        assert!(err.is_not_found());
        let err = fsys.stat("nope.txt").unwrap_err();
        assert!(err.is_not_found());
        let err = fsys.read_file("nope.txt").unwrap_err();
        assert!(err.is_not_found());
        let err = fsys.read_dir("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_dir_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"2").unwrap();
        fs::write(dir.path().join("a.txt"), b"1").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let fsys = LocalFs::new(dir.path());
        let entries = fsys.read_dir("").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "sub"]);
        assert!(entries[2].is_dir());
    }

    #[test]
    fn test_dir_handle_batches() {
        let dir = tempdir().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let fsys = LocalFs::new(dir.path());
        let mut d = fsys.open("").unwrap();

        let first = d.read_entries(Some(2)).unwrap();
        assert_eq!(first.len(), 2);
        let rest = d.read_entries(None).unwrap();
        assert_eq!(rest.len(), 3);
        assert!(d.read_entries(Some(2)).unwrap().is_empty());
    }

    #[test]
    fn test_read_entries_on_file_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), b"x").unwrap();

        let fsys = LocalFs::new(dir.path());
        let mut f = fsys.open("f.txt").unwrap();
        assert!(matches!(
            f.read_entries(None),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_root_stat() {
        let dir = tempdir().unwrap();
        let fsys = LocalFs::new(dir.path());
        let meta = fsys.stat("").unwrap();
        assert_eq!(meta.name, ".");
        assert!(meta.is_dir());
    }
}
