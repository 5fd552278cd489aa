use crate::classify::classify;
use crate::credentials::CredentialStore;
use crate::git_ops::{fast_forward, fetch_origin, push_current_branch};
use crate::model::{RepoState, RepoTask};
use crate::repository::Repository;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Outcome of one finished task, as published on the repository.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskEvent {
    pub path: PathBuf,
    pub task: RepoTask,
    pub state: RepoState,
    pub message: String,
}

/// Runs fetch, fast-forward and push off the caller's thread.
///
/// One worker thread per accepted task. At most one task per repository is
/// in flight; tasks on different repositories run concurrently. Tasks are
/// never cancelled and have no timeout.
pub struct TaskExecutor {
    credentials: Arc<dyn CredentialStore>,
    events: Sender<TaskEvent>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskExecutor {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> (Self, Receiver<TaskEvent>) {
        let (events, rx) = mpsc::channel();
        let executor = Self {
            credentials,
            events,
            workers: Mutex::new(Vec::new()),
        };
        (executor, rx)
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Starts `task` on `repo` unless it already has one.
    ///
    /// On acceptance the repository reads as `Processing` before this returns.
    pub fn submit(&self, repo: &Arc<Repository>, task: RepoTask) -> bool {
        if !task.is_operation() {
            debug!(path = %repo.path().display(), task = %task, "Task rejected; not runnable");
            return false;
        }
        if !repo.begin_task(task) {
            debug!(path = %repo.path().display(), task = %task, "Task rejected; repository busy");
            return false;
        }
        info!(path = %repo.path().display(), task = %task, "Task accepted");

        let worker_repo = Arc::clone(repo);
        let credentials = Arc::clone(&self.credentials);
        let events = self.events.clone();
        let spawned = thread::Builder::new()
            .name(format!("gitdash-{task}"))
            .spawn(move || {
                let event = run_task(&worker_repo, task, credentials.as_ref());
                let _ = events.send(event);
            });

        match spawned {
            Ok(handle) => {
                let mut workers = self.lock_workers();
                workers.retain(|worker| !worker.is_finished());
                workers.push(handle);
            }
            Err(err) => {
                error!(path = %repo.path().display(), error = %err, "Failed to spawn task worker");
                repo.finish_task(RepoState::Error, format!("start {task} worker: {err}"));
            }
        }
        true
    }

    pub fn in_flight(&self) -> usize {
        self.lock_workers()
            .iter()
            .filter(|worker| !worker.is_finished())
            .count()
    }

    /// Blocks until every submitted task has finished.
    pub fn wait_idle(&self) {
        let workers = std::mem::take(&mut *self.lock_workers());
        for worker in workers {
            if worker.join().is_err() {
                warn!("Task worker exited abnormally");
            }
        }
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn run_task(repo: &Repository, task: RepoTask, credentials: &dyn CredentialStore) -> TaskEvent {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let handle = repo.lock_handle();
        let result = match task {
            RepoTask::Fetch => fetch_origin(&handle, credentials),
            RepoTask::FastForward => fast_forward(&handle, credentials),
            RepoTask::Push => push_current_branch(&handle, credentials),
            RepoTask::None | RepoTask::Processing => {
                Err(anyhow::anyhow!("{task} is not a runnable task"))
            }
        };
        result.map(|message| (classify(&handle).state, message))
    }));

    let (state, message) = match outcome {
        Ok(Ok(done)) => done,
        Ok(Err(err)) => (RepoState::Error, format!("{err:#}")),
        Err(_) => (RepoState::Error, format!("{task} task panicked")),
    };
    if state == RepoState::Error {
        warn!(path = %repo.path().display(), task = %task, message = %message, "Task failed");
    } else {
        info!(path = %repo.path().display(), task = %task, state = %state, "Task finished");
    }

    repo.finish_task(state, message.clone());
    TaskEvent {
        path: repo.path().to_path_buf(),
        task,
        state,
        message,
    }
}
