//! Snapshot lifetime management
//!
//! A background thread parks on a channel for the configured
//! time-to-live, then deletes the snapshot directory exactly once and
//! latches the outcome. Disconnecting the channel cancels the
//! deletion; the thread exits without touching the directory.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Cancellable deadline that deletes a directory when it fires.
pub(super) struct Cleaner {
    state: Arc<State>,
    cancel: Mutex<Option<mpsc::Sender<()>>>,
}

struct State {
    status: Mutex<Status>,
    signal: Condvar,
}

enum Status {
    Pending,
    Done(Option<Arc<io::Error>>),
}

impl Cleaner {
    /// Arms the deadline: after `ttl`, `dir` and everything under it
    /// is removed and the outcome latched.
    pub(super) fn arm(dir: PathBuf, ttl: Duration) -> Result<Self> {
        let state = Arc::new(State {
            status: Mutex::new(Status::Pending),
            signal: Condvar::new(),
        });

        let (tx, rx) = mpsc::channel::<()>();
        let thread_state = Arc::clone(&state);
        thread::Builder::new()
            .name("backupfs-cleaner".to_string())
            .spawn(move || match rx.recv_timeout(ttl) {
                Err(RecvTimeoutError::Timeout) => {
                    info!(dir = %dir.display(), "backup lifetime expired, removing snapshot");
                    let result = fs::remove_dir_all(&dir);
                    if let Err(err) = &result {
                        warn!(dir = %dir.display(), %err, "failed to remove backup snapshot");
                    }
                    thread_state.complete(result.err());
                }
                _ => {
                    debug!(dir = %dir.display(), "backup cleaner cancelled");
                }
            })?;

        Ok(Cleaner {
            state,
            cancel: Mutex::new(Some(tx)),
        })
    }

    /// Cancels the deadline if it has not fired yet. Idempotent.
    pub(super) fn cancel(&self) {
        // Dropping the sender disconnects the channel and wakes the
        // thread immediately.
        drop(self.cancel.lock().take());
    }

    /// Blocks until the deadline has fired and the deletion finished.
    pub(super) fn wait(&self) {
        let mut status = self.state.status.lock();
        while matches!(*status, Status::Pending) {
            self.state.signal.wait(&mut status);
        }
    }

    /// Like [`Cleaner::wait`] but gives up after `timeout`; returns
    /// whether the deletion finished.
    pub(super) fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = self.state.status.lock();
        while matches!(*status, Status::Pending) {
            if self.state.signal.wait_until(&mut status, deadline).timed_out() {
                break;
            }
        }
        !matches!(*status, Status::Pending)
    }

    /// Returns whether the deletion has finished.
    pub(super) fn is_done(&self) -> bool {
        !matches!(*self.state.status.lock(), Status::Pending)
    }

    /// The latched deletion error, if the deletion finished and failed.
    pub(super) fn error(&self) -> Option<Arc<io::Error>> {
        match &*self.state.status.lock() {
            Status::Done(err) => err.clone(),
            Status::Pending => None,
        }
    }
}

impl State {
    fn complete(&self, err: Option<io::Error>) {
        let mut status = self.status.lock();
        if matches!(*status, Status::Pending) {
            *status = Status::Done(err.map(Arc::new));
            self.signal.notify_all();
        }
    }
}
