//! Time-limited backup filesystem
//!
//! Wraps another [`Vfs`](crate::vfs::Vfs), copies its whole tree into
//! a snapshot directory at construction, and merges reads across the
//! primary and the snapshot (primary wins). A background deadline
//! deletes the snapshot after a time-to-live, after which only the
//! primary remains authoritative. The intended use is keeping an older
//! generation of embedded assets servable for a short grace period
//! after a deployment swaps in new ones.

mod cleaner;
mod copy;
mod filesystem;
mod handle;

pub use filesystem::BackupFs;
