//! Error types for fslayer
//!
//! The one distinction every decorator must preserve is not-found vs
//! any other I/O failure. [`Error::is_not_found`] classifies an error
//! through arbitrary layers of context wrapping.

use std::io;

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the virtual filesystem and its decorators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested path has no resolvable file.
    #[error("path not found: {0}")]
    NotFound(String),

    /// The operation requires a directory but the path is not one.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A directory handle was asked for a batched read it cannot serve.
    #[error("unsupported directory read on {0}: merged handles only support reading all remaining entries")]
    UnsupportedBatchRead(String),

    /// Hash token length rejected at hasher construction.
    #[error("hash length {len} out of range 1..={max}")]
    HashLength { len: usize, max: usize },

    /// Backup destination directory rejected at construction.
    #[error("unsupported backup directory: {0:?}")]
    BackupDir(String),

    /// A hashing step failed; the source keeps its classification.
    #[error("{stage} {path}: {source}")]
    Hashing {
        stage: &'static str,
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if this error means the requested path does not exist,
    /// looking through context wrapping and raw I/O errors.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(err) => err.kind() == io::ErrorKind::NotFound,
            Error::Hashing { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Wraps an error with a hashing stage and the path it was working on.
    pub(crate) fn hashing(stage: &'static str, path: &str, source: Error) -> Self {
        Error::Hashing {
            stage,
            path: path.to_string(),
            source: Box::new(source),
        }
    }
}
