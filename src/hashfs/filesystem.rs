//! Hash filesystem implementation
//!
//! Name resolution, the lazily populated path→token cache, and the
//! rewritten read operations.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::vfs::{path, DirEntry, Metadata, Vfs, VfsFile};

use super::handle::HashFile;

/// Filesystem that injects a content-hash token into file names from
/// another filesystem. If a requested name already carries the correct
/// token it resolves to the real file; a bare name of a file that
/// requires a token does not resolve. [`HashFs::hashed_path`] builds
/// the public name for a file without opening it.
pub struct HashFs {
    shared: Arc<Shared>,
}

/// State shared between the filesystem and its open directory handles.
pub(super) struct Shared {
    fsys: Arc<dyn Vfs>,
    hasher: Box<dyn Hasher>,
    /// Canonical path → token. Populated on first access, never
    /// invalidated: content is assumed immutable for the process
    /// lifetime. Locked only around lookup/insert, never around I/O.
    hashes: RwLock<HashMap<String, String>>,
}

impl HashFs {
    /// Create a new hash filesystem over `fsys` using `hasher`.
    pub fn new(fsys: Arc<dyn Vfs>, hasher: impl Hasher + 'static) -> Self {
        HashFs {
            shared: Arc::new(Shared {
                fsys,
                hasher: Box::new(hasher),
                hashes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Returns the public name for `name`: the canonical name with the
    /// content-hash token injected into the filename. Directories and
    /// tokenless files come back unchanged.
    pub fn hashed_path(&self, name: &str) -> Result<String> {
        let (canonical, hash) = self.shared.canonical_name(name)?;
        Ok(hashed_path(&canonical, &hash))
    }
}

impl Vfs for HashFs {
    fn open(&self, name: &str) -> Result<Box<dyn VfsFile>> {
        debug!(name, "hashfs open");
        let (canonical, hash) = self.shared.canonical_name(name)?;
        if !hash.is_empty() && canonical == name {
            // The caller asked for the bare name of a file that is
            // only servable under its hashed public name.
            return Err(Error::NotFound(name.to_string()));
        }
        let file = self.shared.fsys.open(&canonical)?;
        Ok(Box::new(HashFile::new(
            name.to_string(),
            file,
            Arc::clone(&self.shared),
        )))
    }

    fn stat(&self, name: &str) -> Result<Metadata> {
        let (canonical, hash) = self.shared.canonical_name(name)?;
        if !hash.is_empty() && canonical == name {
            return Err(Error::NotFound(name.to_string()));
        }
        let meta = self.shared.fsys.stat(&canonical)?;
        Ok(meta.renamed(path::base(name)))
    }

    fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        let entries = self.shared.fsys.read_dir(name)?;
        self.shared.rename_entries(name, entries)
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let (canonical, hash) = self.shared.canonical_name(name)?;
        if !hash.is_empty() && canonical == name {
            return Err(Error::NotFound(name.to_string()));
        }
        self.shared.fsys.read_file(&canonical)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let mut matches = Vec::new();
        for entry_path in self.shared.fsys.glob(pattern)? {
            match self.shared.canonical_name(&entry_path) {
                Ok((canonical, hash)) => matches.push(hashed_path(&canonical, &hash)),
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(matches)
    }
}

impl Shared {
    /// Resolves a requested name to its canonical (hash-free) name and
    /// the content-hash token of that file.
    ///
    /// The final path segment is split on dots; the candidate token
    /// position is the second-to-last part when there are more than
    /// two parts (except for a dotfile with a single extension),
    /// otherwise the last part. A candidate that fails [`Hasher::is_hash`]
    /// leaves the name untouched.
    ///
    /// Files whose real names merely look hash-bearing resolve to
    /// themselves: when the token extracted from the request does not
    /// match the canonical file's hash, the literal requested path is
    /// hashed as a fallback before the request is declared stale.
    pub(super) fn canonical_name(&self, name: &str) -> Result<(String, String)> {
        let (dir, file) = path::split(name);

        let parts: Vec<&str> = file.split('.').collect();
        let count = parts.len();
        let index = if count > 2 && !(count == 3 && parts[0].is_empty()) {
            2
        } else {
            1
        };

        let mut hash_from_name = "";
        let mut rebuilt = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i + index == count && self.hasher.is_hash(part) {
                hash_from_name = part;
                continue;
            }
            if i != 0 {
                rebuilt.push('.');
            }
            rebuilt.push_str(part);
        }

        let canonical = format!("{dir}{rebuilt}");

        let mut hash = match self.hash(&canonical) {
            Ok(hash) => hash,
            Err(err) if err.is_not_found() => self.hash(name)?,
            Err(err) => return Err(err),
        };

        if !hash_from_name.is_empty() && hash_from_name != hash {
            hash = self.hash(name)?;
            if hash_from_name != hash {
                // The requested name does not correspond to any valid
                // hashed alias; leave it unresolved.
                return Ok((name.to_string(), hash));
            }
            return Ok((name.to_string(), String::new()));
        }

        Ok((canonical, hash))
    }

    /// Returns the content-hash token for `name`, computing and
    /// caching it on first access. Directories have no hash.
    fn hash(&self, name: &str) -> Result<String> {
        if let Some(hash) = self.hashes.read().get(name) {
            return Ok(hash.clone());
        }

        let mut file = self
            .fsys
            .open(name)
            .map_err(|err| Error::hashing("open file", name, err))?;
        let meta = file
            .stat()
            .map_err(|err| Error::hashing("stat file", name, err))?;
        if meta.is_dir() {
            return Ok(String::new());
        }

        let hash = self
            .hasher
            .hash(&mut *file)
            .map_err(|err| Error::hashing("hash file", name, err))?;
        debug!(name, %hash, "computed content hash");

        // Concurrent first accesses may both get here; they insert the
        // same value, so last writer wins with an equal token.
        self.hashes.write().insert(name.to_string(), hash.clone());
        Ok(hash)
    }

    /// Resolves and renames a directory listing: files get their
    /// hashed public base name, subdirectories pass through, entries
    /// that fail to resolve as not-found are dropped.
    pub(super) fn rename_entries(
        &self,
        dir: &str,
        entries: Vec<DirEntry>,
    ) -> Result<Vec<DirEntry>> {
        let mut renamed = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_dir() {
                renamed.push(entry);
                continue;
            }
            match self.canonical_name(&path::join(dir, &entry.name)) {
                Ok((canonical, hash)) => {
                    let name = hashed_path(path::base(&canonical), &hash);
                    renamed.push(entry.renamed(name));
                }
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(renamed)
    }
}

/// Injects a token into a name, immediately before the last extension
/// of the final segment, or appended when there is no extension. An
/// empty token leaves the name unchanged.
pub(super) fn hashed_path(name: &str, hash: &str) -> String {
    if hash.is_empty() {
        return name.to_string();
    }

    let (dir, file) = path::split(name);
    match file.rfind('.') {
        Some(i) if i > 0 => format!("{dir}{}.{hash}{}", &file[..i], &file[i..]),
        _ => format!("{dir}{file}.{hash}"),
    }
}
