use crate::classify::{Classification, classify};
use crate::error::OpenError;
use crate::model::{RepoSnapshot, RepoState, RepoTask};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, Default)]
struct RepoStatus {
    state: RepoState,
    task: RepoTask,
    message: String,
}

impl From<Classification> for RepoStatus {
    fn from(classification: Classification) -> Self {
        Self {
            state: classification.state,
            task: RepoTask::None,
            message: classification.note.unwrap_or_default(),
        }
    }
}

/// A discovered working tree and its live status.
///
/// `path` and the native handle never change after [`Repository::open`].
/// The handle mutex is held by a worker for the whole duration of a task;
/// the status mutex is only ever held for a field copy, so the dashboard
/// can read it every frame while a worker is running.
pub struct Repository {
    path: PathBuf,
    handle: Mutex<git2::Repository>,
    status: Mutex<RepoStatus>,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let handle = git2::Repository::open(path).map_err(|source| OpenError::Git {
            path: path.to_path_buf(),
            source,
        })?;
        if handle.is_bare() {
            return Err(OpenError::Bare(path.to_path_buf()));
        }
        let status = RepoStatus::from(classify(&handle));
        Ok(Self {
            path: path.to_path_buf(),
            handle: Mutex::new(handle),
            status: Mutex::new(status),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> RepoState {
        self.lock_status().state
    }

    pub fn task(&self) -> RepoTask {
        self.lock_status().task
    }

    pub fn message(&self) -> String {
        self.lock_status().message.clone()
    }

    pub fn snapshot(&self) -> RepoSnapshot {
        let status = self.lock_status();
        RepoSnapshot {
            path: self.path.clone(),
            state: status.state,
            task: status.task,
            message: status.message.clone(),
        }
    }

    /// Claims the repository for `task`, moving it to `Processing`.
    ///
    /// Returns false, leaving everything untouched, when another task is
    /// pending or in flight or when `task` is not an operation.
    pub(crate) fn begin_task(&self, task: RepoTask) -> bool {
        if !task.is_operation() {
            return false;
        }
        let mut status = self.lock_status();
        if status.task != RepoTask::None {
            return false;
        }
        status.task = RepoTask::Processing;
        status.state = RepoState::Processing;
        true
    }

    /// Publishes a task outcome and releases the repository for the next task.
    pub(crate) fn finish_task(&self, state: RepoState, message: String) {
        debug_assert_ne!(state, RepoState::Processing);
        let mut status = self.lock_status();
        status.state = state;
        status.task = RepoTask::None;
        status.message = message;
    }

    pub(crate) fn lock_handle(&self) -> MutexGuard<'_, git2::Repository> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_status(&self) -> MutexGuard<'_, RepoStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("status", &*self.lock_status())
            .finish_non_exhaustive()
    }
}
