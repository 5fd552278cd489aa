use crate::model::RepoSnapshot;
use crate::repository::Repository;
use crate::scanner::find_repositories;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanReport {
    pub found: usize,
    pub opened: usize,
    pub skipped: usize,
}

/// Every repository discovered by the last rescan.
///
/// The collection lock only guards insertion and removal. A rescan holds it
/// exclusively from clear to repopulate, so readers see either the old or
/// the new collection in full.
#[derive(Debug, Default)]
pub struct Registry {
    repos: RwLock<Vec<Arc<Repository>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every repository. Handles are released once no in-flight task
    /// still references them.
    pub fn clear(&self) {
        let mut repos = self.write();
        info!(count = repos.len(), "Clearing repository registry");
        repos.clear();
    }

    pub fn rescan(&self, root: &Path) -> ScanReport {
        let mut repos = self.write();
        info!(root = %root.display(), previous = repos.len(), "Rescanning");
        repos.clear();

        let mut report = ScanReport::default();
        for path in find_repositories(root) {
            report.found += 1;
            match Repository::open(&path) {
                Ok(repo) => {
                    report.opened += 1;
                    repos.push(Arc::new(repo));
                }
                Err(err) => {
                    report.skipped += 1;
                    debug!(path = %path.display(), error = %err, "Skipping repository");
                }
            }
        }

        info!(
            root = %root.display(),
            found = report.found,
            opened = report.opened,
            skipped = report.skipped,
            "Rescan finished"
        );
        report
    }

    /// Non-blocking read; `None` while a rescan holds the lock.
    pub fn try_snapshot(&self) -> Option<Vec<RepoSnapshot>> {
        self.try_read()
            .map(|repos| repos.iter().map(|repo| repo.snapshot()).collect())
    }

    pub fn snapshot(&self) -> Vec<RepoSnapshot> {
        self.read().iter().map(|repo| repo.snapshot()).collect()
    }

    /// Non-blocking lookup; `None` when busy or when no repository lives at `path`.
    pub fn try_find(&self, path: &Path) -> Option<Arc<Repository>> {
        self.try_read()?
            .iter()
            .find(|repo| repo.path() == path)
            .cloned()
    }

    /// Non-blocking copy of every handle; `None` while a rescan holds the lock.
    pub fn try_repositories(&self) -> Option<Vec<Arc<Repository>>> {
        self.try_read().map(|repos| repos.clone())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_read(&self) -> Option<RwLockReadGuard<'_, Vec<Arc<Repository>>>> {
        match self.repos.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Repository>>> {
        self.repos.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Repository>>> {
        self.repos.write().unwrap_or_else(PoisonError::into_inner)
    }
}
