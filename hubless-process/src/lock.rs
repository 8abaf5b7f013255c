//! Project lock marker inspection.
//!
//! A running editor keeps its lock marker open and locked. A crash leaves
//! the file behind with nobody holding it, so presence alone means nothing:
//! the only reliable test is trying to take the lock ourselves.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use fs2::FileExt;
use hubless_core::EditorProfile;

use crate::error::{io_err, ProcessError};

/// Result of inspecting a lock marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No marker file.
    Absent,
    /// Marker present, nobody holds it.
    Stale,
    /// Marker held by a live process, or its state could not be established.
    Held,
}

/// Platform lock test.
pub trait LockInspector: Send + Sync {
    fn inspect(&self, marker: &Path) -> LockState;
}

/// Exclusive open + non-blocking exclusive lock via `fs2`.
///
/// On Windows the editor opens the marker without sharing, so the open
/// itself fails with a sharing violation; on unix the open succeeds and the
/// `flock` attempt reports contention.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLockInspector;

impl LockInspector for FileLockInspector {
    fn inspect(&self, marker: &Path) -> LockState {
        let file = match OpenOptions::new().read(true).write(true).open(marker) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return LockState::Absent,
            Err(err) if is_contention(&err) => {
                tracing::debug!(path = %marker.display(), "lock marker open refused: in use");
                return LockState::Held;
            }
            Err(err) => {
                tracing::warn!(path = %marker.display(), error = %err, "cannot open lock marker; treating as held");
                return LockState::Held;
            }
        };

        match file.try_lock_exclusive() {
            Ok(()) => {
                if let Err(err) = FileExt::unlock(&file) {
                    tracing::debug!(path = %marker.display(), error = %err, "unlock after probe failed");
                }
                LockState::Stale
            }
            Err(err) if is_contention(&err) => LockState::Held,
            Err(err) => {
                tracing::warn!(path = %marker.display(), error = %err, "lock probe failed; treating as held");
                LockState::Held
            }
        }
    }
}

/// Sharing/locking-specific failures, as opposed to permissions or I/O faults.
fn is_contention(err: &std::io::Error) -> bool {
    if err.kind() == ErrorKind::WouldBlock {
        return true;
    }
    if err.raw_os_error().is_some()
        && err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
    {
        return true;
    }
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}

/// Lock-marker policy for one editor profile.
#[derive(Clone)]
pub struct LockGuard {
    inspector: Arc<dyn LockInspector>,
    profile: EditorProfile,
}

impl LockGuard {
    pub fn new(inspector: Arc<dyn LockInspector>, profile: EditorProfile) -> Self {
        Self { inspector, profile }
    }

    /// Lock state of the project at `project_root`.
    pub fn check(&self, project_root: &Path) -> LockState {
        let marker = self.profile.lock_marker_path(project_root);
        let state = self.inspector.inspect(&marker);
        tracing::debug!(path = %marker.display(), state = ?state, "inspected lock marker");
        state
    }

    /// Remove the marker and the scratch directory containing it.
    pub fn clear_stale(&self, project_root: &Path) -> Result<(), ProcessError> {
        let marker = self.profile.lock_marker_path(project_root);
        match std::fs::remove_file(&marker) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(io_err(&marker, err)),
        }

        let scratch = self.profile.scratch_dir_path(project_root);
        match std::fs::remove_dir_all(&scratch) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(io_err(&scratch, err)),
        }
        tracing::info!(path = %scratch.display(), "removed stale lock and scratch directory");
        Ok(())
    }

    /// Refuse on `Held`, clean up on `Stale`, pass on `Absent`.
    pub fn prepare_launch(&self, project_root: &Path) -> Result<LockState, ProcessError> {
        match self.check(project_root) {
            LockState::Held => Err(ProcessError::LockHeld {
                path: self.profile.lock_marker_path(project_root),
            }),
            LockState::Stale => {
                self.clear_stale(project_root)?;
                Ok(LockState::Stale)
            }
            LockState::Absent => Ok(LockState::Absent),
        }
    }
}
