use crate::credentials::{Credential, CredentialStore};
use crate::error::{CredentialError, SubmitError};
use crate::executor::{TaskEvent, TaskExecutor};
use crate::model::{RepoSnapshot, RepoTask};
use crate::registry::{Registry, ScanReport};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use tracing::{debug, info};

/// Everything the dashboard talks to, owned by the host.
pub struct AppContext {
    registry: Registry,
    executor: TaskExecutor,
}

impl AppContext {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> (Self, Receiver<TaskEvent>) {
        let (executor, events) = TaskExecutor::new(credentials);
        let context = Self {
            registry: Registry::new(),
            executor,
        };
        (context, events)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    pub fn rescan(&self, root: &Path) -> ScanReport {
        self.registry.rescan(root)
    }

    pub fn try_snapshot(&self) -> Option<Vec<RepoSnapshot>> {
        self.registry.try_snapshot()
    }

    pub fn snapshot(&self) -> Vec<RepoSnapshot> {
        self.registry.snapshot()
    }

    /// Submits `task` to the repository at `path`.
    pub fn submit_task(&self, path: &Path, task: RepoTask) -> Result<(), SubmitError> {
        if !task.is_operation() {
            return Err(SubmitError::NotRunnable(task));
        }
        let Some(repos) = self.registry.try_repositories() else {
            debug!(path = %path.display(), task = %task, "Registry busy; task not submitted");
            return Err(SubmitError::RegistryBusy);
        };
        let Some(repo) = repos.iter().find(|repo| repo.path() == path) else {
            debug!(path = %path.display(), task = %task, "No repository at path");
            return Err(SubmitError::UnknownRepository(path.to_path_buf()));
        };
        if self.executor.submit(repo, task) {
            Ok(())
        } else {
            Err(SubmitError::RepositoryBusy(path.to_path_buf()))
        }
    }

    /// Submits `task` to every idle repository; returns how many accepted it.
    pub fn submit_bulk_task(&self, task: RepoTask) -> usize {
        let Some(repos) = self.registry.try_repositories() else {
            debug!(task = %task, "Registry busy; bulk task not submitted");
            return 0;
        };
        let accepted = repos
            .iter()
            .filter(|repo| self.executor.submit(repo, task))
            .count();
        info!(task = %task, accepted, total = repos.len(), "Bulk task submitted");
        accepted
    }

    pub fn submit_credential(&self, username: &str, secret: &str) -> Result<(), CredentialError> {
        self.executor
            .credentials()
            .write(&Credential::new(username, secret))?;
        info!(username, "Stored origin credential");
        Ok(())
    }

    pub fn wait_idle(&self) {
        self.executor.wait_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::model::RepoState;
    use crate::test_support::{advance_origin, repo_with_origin, seed_repo};
    use tempfile::TempDir;

    fn context() -> (AppContext, Receiver<TaskEvent>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let (context, events) = AppContext::new(store.clone());
        (context, events, store)
    }

    #[test]
    fn submit_task_targets_one_repository() {
        let tmp = TempDir::new().unwrap();
        let (origin, work) = repo_with_origin(tmp.path(), "work");
        let (_other_origin, other) = repo_with_origin(tmp.path(), "other");
        advance_origin(&origin, 1);

        let (context, events, _store) = context();
        context.rescan(tmp.path());
        assert_eq!(context.snapshot().len(), 2);

        assert_eq!(context.submit_task(&work, RepoTask::Fetch), Ok(()));
        context.wait_idle();

        let event = events.recv().unwrap();
        assert_eq!(event.path, work);
        assert_eq!(event.state, RepoState::FastForward);
        let snapshot = context.snapshot();
        let other_entry = snapshot.iter().find(|entry| entry.path == other).unwrap();
        assert_eq!(other_entry.state, RepoState::UpToDate);
        assert!(other_entry.message.is_empty());
    }

    #[test]
    fn submit_task_to_unknown_path_is_rejected() {
        let tmp = TempDir::new().unwrap();
        seed_repo(&tmp.path().join("repo"), 0, 0);
        let (context, _events, _store) = context();
        context.rescan(tmp.path());

        let missing = tmp.path().join("nope");
        assert_eq!(
            context.submit_task(&missing, RepoTask::Fetch),
            Err(SubmitError::UnknownRepository(missing.clone()))
        );
        assert_eq!(
            context.submit_task(&tmp.path().join("repo"), RepoTask::None),
            Err(SubmitError::NotRunnable(RepoTask::None))
        );
        assert_eq!(context.snapshot()[0].task, RepoTask::None);
    }

    #[test]
    fn submit_task_during_rescan_reports_registry_busy() {
        let tmp = TempDir::new().unwrap();
        seed_repo(&tmp.path().join("repo"), 0, 0);
        let (context, events, _store) = context();
        context.rescan(tmp.path());

        let guard = context.registry().write();
        let err = context
            .submit_task(&tmp.path().join("repo"), RepoTask::Fetch)
            .unwrap_err();
        drop(guard);

        assert_eq!(err, SubmitError::RegistryBusy);
        assert!(err.to_string().contains("retry"));
        assert_eq!(context.snapshot()[0].task, RepoTask::None);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn bulk_task_skips_busy_repositories() {
        let tmp = TempDir::new().unwrap();
        let (_a_origin, a) = repo_with_origin(tmp.path(), "a");
        repo_with_origin(tmp.path(), "b");
        repo_with_origin(tmp.path(), "c");
        let (context, events, _store) = context();
        context.rescan(tmp.path());

        let busy = context.registry().try_find(&a).unwrap();
        let guard = busy.lock_handle();
        assert_eq!(context.submit_task(&a, RepoTask::Fetch), Ok(()));
        assert_eq!(
            context.submit_task(&a, RepoTask::Fetch),
            Err(SubmitError::RepositoryBusy(a.clone()))
        );
        assert_eq!(context.submit_bulk_task(RepoTask::Fetch), 2);
        drop(guard);

        context.wait_idle();
        assert_eq!(events.try_iter().count(), 3);
        assert!(
            context
                .snapshot()
                .iter()
                .all(|entry| entry.task == RepoTask::None && entry.state == RepoState::UpToDate)
        );
    }

    #[test]
    fn submit_credential_writes_through_to_store() {
        let (context, _events, store) = context();
        context.submit_credential("alice", "s3cret").unwrap();
        let stored = store.read().unwrap().unwrap();
        assert_eq!(stored.username, "alice");
        assert_eq!(stored.secret, "s3cret");
    }
}
