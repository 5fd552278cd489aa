use git2::{
    BranchType, Commit, IndexEntry, IndexTime, Oid, Repository, RepositoryInitOptions, Signature,
};
use std::path::{Path, PathBuf};

pub(crate) const BRANCH: &str = "main";

pub(crate) fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(BRANCH);
    Repository::init_opts(path, &opts).unwrap()
}

/// Writes a commit adding `name` on top of `parent` without touching any ref.
pub(crate) fn commit_on(repo: &Repository, parent: Option<Oid>, name: &str, contents: &str) -> Oid {
    let parent_commit = parent.map(|oid| repo.find_commit(oid).unwrap());
    let base_tree = parent_commit.as_ref().map(|commit| commit.tree().unwrap());
    let mut builder = repo.treebuilder(base_tree.as_ref()).unwrap();
    let blob = repo.blob(contents.as_bytes()).unwrap();
    builder.insert(name, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();
    let parents: Vec<&Commit<'_>> = parent_commit.iter().collect();
    let sig = Signature::now("tester", "tester@example.com").unwrap();
    repo.commit(None, &sig, &sig, &format!("add {name}"), &tree, &parents)
        .unwrap()
}

pub(crate) fn commit_chain(repo: &Repository, base: Oid, count: usize, prefix: &str) -> Oid {
    (0..count).fold(base, |parent, idx| {
        commit_on(repo, Some(parent), &format!("{prefix}-{idx}.txt"), prefix)
    })
}

/// Repository whose `main` is `ahead` commits past and `behind` commits
/// short of `origin/main`. The remote URL is never contacted.
pub(crate) fn seed_repo(path: &Path, ahead: usize, behind: usize) -> Repository {
    let repo = init_repo(path);
    let base = commit_on(&repo, None, "base.txt", "base");
    let local = commit_chain(&repo, base, ahead, "local");
    let remote = commit_chain(&repo, base, behind, "remote");
    repo.reference("refs/heads/main", local, true, "local main")
        .unwrap();
    repo.remote("origin", "https://example.invalid/repo.git")
        .unwrap();
    repo.reference("refs/remotes/origin/main", remote, true, "origin main")
        .unwrap();
    repo.find_branch(BRANCH, BranchType::Local)
        .unwrap()
        .set_upstream(Some("origin/main"))
        .unwrap();
    repo
}

/// Bare origin at `<root>/<name>-origin.git` with one commit, cloned to
/// `<root>/<name>`. Returns `(origin, working tree)`.
pub(crate) fn repo_with_origin(root: &Path, name: &str) -> (PathBuf, PathBuf) {
    let origin_path = root.join(format!("{name}-origin.git"));
    let mut opts = RepositoryInitOptions::new();
    opts.bare(true).initial_head(BRANCH);
    let origin = Repository::init_opts(&origin_path, &opts).unwrap();
    let base = commit_on(&origin, None, "base.txt", "base");
    origin
        .reference("refs/heads/main", base, true, "seed")
        .unwrap();

    let work_path = root.join(name);
    Repository::clone(origin_path.to_str().unwrap(), &work_path).unwrap();
    (origin_path, work_path)
}

/// Adds `count` commits to the origin's `main`, as another clone pushing would.
pub(crate) fn advance_origin(origin_path: &Path, count: usize) -> Oid {
    let origin = Repository::open_bare(origin_path).unwrap();
    let tip = origin.refname_to_id("refs/heads/main").unwrap();
    let new_tip = commit_chain(&origin, tip, count, "upstream");
    origin
        .reference("refs/heads/main", new_tip, true, "advance")
        .unwrap();
    new_tip
}

pub(crate) fn advance_local(work_path: &Path, count: usize) -> Oid {
    let repo = Repository::open(work_path).unwrap();
    let tip = repo.refname_to_id("refs/heads/main").unwrap();
    let new_tip = commit_chain(&repo, tip, count, "local");
    repo.reference("refs/heads/main", new_tip, true, "advance")
        .unwrap();
    new_tip
}

/// Records a three-way conflict on `path` in the on-disk index: the stage-0
/// entry is replaced by ancestor, ours and theirs entries at stages 1-3.
pub(crate) fn add_index_conflict(work_path: &Path, path: &str) {
    let repo = Repository::open(work_path).unwrap();
    let entry = |stage: u16, contents: &str| IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode: 0o100644,
        uid: 0,
        gid: 0,
        file_size: contents.len() as u32,
        id: repo.blob(contents.as_bytes()).unwrap(),
        flags: stage << 12,
        flags_extended: 0,
        path: path.as_bytes().to_vec(),
    };
    let mut index = repo.index().unwrap();
    let _ = index.remove(Path::new(path), 0);
    for (stage, contents) in [(1, "base"), (2, "ours"), (3, "theirs")] {
        index.add(&entry(stage, contents)).unwrap();
    }
    index.write().unwrap();
}
