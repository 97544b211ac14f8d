//! Content-hash injecting filesystem
//!
//! Wraps another [`Vfs`](crate::vfs::Vfs) and serves every file under
//! a public name with a content-hash token embedded before the last
//! extension, so served names change exactly when content changes and
//! can be cached forever. Hashed public names resolve back to the
//! real files; bare names of files that require a hash do not resolve.

mod filesystem;
mod handle;

pub use filesystem::HashFs;
