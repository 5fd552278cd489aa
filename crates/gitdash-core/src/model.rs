use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Synchronization state of a repository relative to its upstream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoState {
    #[default]
    None,
    UpToDate,
    Push,
    FastForward,
    Diverged,
    Rebase,
    Processing,
    Error,
}

impl RepoState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoState::None => "none",
            RepoState::UpToDate => "up-to-date",
            RepoState::Push => "push",
            RepoState::FastForward => "fast-forward",
            RepoState::Diverged => "diverged",
            RepoState::Rebase => "rebase",
            RepoState::Processing => "processing",
            RepoState::Error => "error",
        }
    }
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending or in-flight operation on a repository.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoTask {
    #[default]
    None,
    Fetch,
    FastForward,
    Push,
    Processing,
}

impl RepoTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoTask::None => "none",
            RepoTask::Fetch => "fetch",
            RepoTask::FastForward => "fast-forward",
            RepoTask::Push => "push",
            RepoTask::Processing => "processing",
        }
    }

    /// True for the tasks a caller may submit.
    pub fn is_operation(self) -> bool {
        matches!(self, RepoTask::Fetch | RepoTask::FastForward | RepoTask::Push)
    }
}

impl fmt::Display for RepoTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of a repository's observable fields.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RepoSnapshot {
    pub path: PathBuf,
    pub state: RepoState,
    pub task: RepoTask,
    pub message: String,
}
