use crate::model::RepoState;
use git2::{Branch, ErrorCode, Repository, RepositoryState};
use tracing::{info, warn};

/// Result of comparing the current branch with its upstream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub state: RepoState,
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
    /// Why the state could not be determined, when it could not.
    pub note: Option<String>,
}

impl Classification {
    fn unknown(note: impl Into<String>) -> Self {
        Self {
            state: RepoState::None,
            ahead: None,
            behind: None,
            note: Some(note.into()),
        }
    }
}

pub fn state_for(ahead: usize, behind: usize) -> RepoState {
    match (ahead, behind) {
        (0, 0) => RepoState::UpToDate,
        (0, _) => RepoState::FastForward,
        (_, 0) => RepoState::Push,
        _ => RepoState::Diverged,
    }
}

/// Classifies the checked-out branch against its upstream.
///
/// Never fails: anything that prevents a comparison is logged and reported
/// as [`RepoState::None`] with a note.
pub fn classify(repo: &Repository) -> Classification {
    let label = repo_label(repo);

    if matches!(
        repo.state(),
        RepositoryState::Rebase | RepositoryState::RebaseInteractive | RepositoryState::RebaseMerge
    ) {
        info!(path = %label, "Rebase in progress");
        return Classification {
            state: RepoState::Rebase,
            ahead: None,
            behind: None,
            note: Some("rebase in progress".to_string()),
        };
    }

    let head = match repo.head() {
        Ok(head) => head,
        Err(err) => {
            warn!(path = %label, error = %err, "Error retrieving HEAD");
            return Classification::unknown(format!("cannot resolve HEAD: {}", err.message()));
        }
    };

    if !head.is_branch() {
        info!(path = %label, "HEAD is detached");
        return Classification::unknown("HEAD is detached");
    }

    let Some(branch_name) = head.shorthand().map(str::to_string) else {
        warn!(path = %label, "Error determining branch name");
        return Classification::unknown("cannot determine branch name");
    };

    let local_oid = head.target();
    let branch = Branch::wrap(head);
    let upstream = match branch.upstream() {
        Ok(upstream) => upstream,
        Err(err) if err.code() == ErrorCode::NotFound => {
            info!(path = %label, branch = %branch_name, "No upstream branch configured");
            return Classification::unknown("no upstream configured");
        }
        Err(err) => {
            warn!(path = %label, branch = %branch_name, error = %err, "Error getting upstream branch");
            return Classification::unknown(format!("cannot resolve upstream: {}", err.message()));
        }
    };

    let (Some(local_oid), Some(upstream_oid)) = (local_oid, upstream.get().target()) else {
        warn!(path = %label, branch = %branch_name, "Branch or upstream has no target commit");
        return Classification::unknown("branch has no target commit");
    };

    match repo.graph_ahead_behind(local_oid, upstream_oid) {
        Ok((ahead, behind)) => Classification {
            state: state_for(ahead, behind),
            ahead: Some(ahead),
            behind: Some(behind),
            note: None,
        },
        Err(err) => {
            warn!(path = %label, error = %err, "Error calculating ahead/behind");
            Classification::unknown(format!("cannot compute ahead/behind: {}", err.message()))
        }
    }
}

pub(crate) fn repo_label(repo: &Repository) -> String {
    repo.workdir()
        .unwrap_or_else(|| repo.path())
        .display()
        .to_string()
}
