use crate::classify::repo_label;
use crate::credentials::CredentialStore;
use anyhow::Context;
use git2::{Cred, CredentialType, FetchOptions, Oid, PushOptions, RemoteCallbacks, Repository};
use std::cell::RefCell;
use tracing::{debug, info, warn};

pub const REMOTE: &str = "origin";

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

pub fn fetch_origin(repo: &Repository, credentials: &dyn CredentialStore) -> anyhow::Result<String> {
    let mut remote = repo.find_remote(REMOTE).context("find origin remote")?;
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(remote_callbacks(credentials));
    info!(path = %repo_label(repo), "Fetching origin");
    remote
        .fetch(&[] as &[&str], Some(&mut fo), None)
        .context("fetch origin")?;
    let received = remote.stats().received_objects();
    Ok(format!("Fetched {REMOTE}: {received} objects received"))
}

/// Fetches, then moves the current branch ref to `refs/remotes/origin/<branch>`.
///
/// Only the reference moves; the index and working tree are left as they were.
pub fn fast_forward(repo: &Repository, credentials: &dyn CredentialStore) -> anyhow::Result<String> {
    let branch = current_branch(repo)?;
    let local_ref = format!("refs/heads/{branch}");
    let remote_ref = format!("refs/remotes/{REMOTE}/{branch}");

    fetch_origin(repo, credentials)?;
    ensure_no_conflicts(repo)?;

    let remote_oid = repo
        .refname_to_id(&remote_ref)
        .with_context(|| format!("resolve {remote_ref}"))?;
    let local_oid = repo
        .refname_to_id(&local_ref)
        .with_context(|| format!("resolve {local_ref}"))?;

    if local_oid == remote_oid {
        return Ok(format!("{branch} already up to date with {REMOTE}"));
    }
    let descends = repo
        .graph_descendant_of(remote_oid, local_oid)
        .context("compare local and remote")?;
    if !descends {
        anyhow::bail!("{branch} is not a fast-forward of {remote_ref}");
    }

    update_branch_ref(repo, &local_ref, remote_oid)?;
    info!(path = %repo_label(repo), branch = %branch, target = %remote_oid, "Fast-forwarded branch");
    Ok(format!("Fast-forwarded {branch} to {}", short_id(remote_oid)))
}

pub fn push_current_branch(
    repo: &Repository,
    credentials: &dyn CredentialStore,
) -> anyhow::Result<String> {
    let branch = current_branch(repo)?;
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    let mut remote = repo.find_remote(REMOTE).context("find origin remote")?;
    let rejection: RefCell<Option<String>> = RefCell::new(None);

    {
        let mut callbacks = remote_callbacks(credentials);
        callbacks.push_update_reference(|refname, status| {
            if let Some(status) = status {
                *rejection.borrow_mut() = Some(format!("{refname}: {status}"));
            }
            Ok(())
        });
        let mut po = PushOptions::new();
        po.remote_callbacks(callbacks);
        info!(path = %repo_label(repo), branch = %branch, "Pushing to origin");
        remote
            .push(&[refspec.as_str()], Some(&mut po))
            .context("push to origin")?;
    }

    if let Some(reason) = rejection.into_inner() {
        anyhow::bail!("origin rejected {reason}");
    }
    Ok(format!("Pushed {branch} to {REMOTE}"))
}

fn current_branch(repo: &Repository) -> anyhow::Result<String> {
    let head = repo.head().context("resolve HEAD")?;
    if !head.is_branch() {
        anyhow::bail!("HEAD is detached; check out a branch first");
    }
    head.shorthand()
        .map(str::to_string)
        .context("read branch name")
}

fn ensure_no_conflicts(repo: &Repository) -> anyhow::Result<()> {
    let mut index = repo.index().context("open index")?;
    index.read(false).context("read index")?;
    if index.has_conflicts() {
        anyhow::bail!("index has unresolved conflicts; resolve them before fast-forwarding");
    }
    Ok(())
}

fn update_branch_ref(repo: &Repository, local_ref: &str, target: Oid) -> anyhow::Result<()> {
    let mut reference = repo
        .find_reference(local_ref)
        .with_context(|| format!("find local ref {local_ref}"))?;
    reference
        .set_target(target, "gitdash: fast-forward")
        .context("set local ref target")?;
    Ok(())
}

fn short_id(oid: Oid) -> String {
    let mut id = oid.to_string();
    id.truncate(7);
    id
}

fn remote_callbacks(credentials: &dyn CredentialStore) -> RemoteCallbacks<'_> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("origin rejected the supplied credentials"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            match credentials.read() {
                Ok(Some(credential)) => {
                    return Cred::userpass_plaintext(&credential.username, &credential.secret);
                }
                Ok(None) => debug!(url, "No stored credential for origin"),
                Err(err) => warn!(url, error = %err, "Credential store read failed"),
            }
        }
        if allowed.contains(CredentialType::SSH_KEY)
            && let Some(username) = username_from_url
        {
            return Cred::ssh_key_from_agent(username);
        }
        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        Err(git2::Error::from_str(
            "origin requested credentials but none are stored",
        ))
    });
    callbacks
}
