use crate::model::RepoTask;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("open repository {path}: {source}")]
    Git {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("repository {0} has no working tree")]
    Bare(PathBuf),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
    #[error("stored credential is malformed: {0}")]
    Malformed(String),
}

/// Why a task submission was not accepted.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SubmitError {
    #[error("{0} is not a runnable task")]
    NotRunnable(RepoTask),
    #[error("registry busy rescanning; retry")]
    RegistryBusy,
    #[error("no repository at {0}")]
    UnknownRepository(PathBuf),
    #[error("{0} already has a task running")]
    RepositoryBusy(PathBuf),
}
