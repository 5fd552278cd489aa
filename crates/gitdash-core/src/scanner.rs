use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const GIT_DIR_NAME: &str = ".git";

/// Working-tree roots under `root`: the parent of every directory named `.git`.
///
/// Unreadable subtrees are logged and skipped. `.git` directories themselves
/// are not descended into; working trees are, so nested repositories are found.
pub fn find_repositories(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut entries = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    path = ?err.path().map(Path::display),
                    error = %err,
                    "Skipping unreadable directory"
                );
                continue;
            }
        };
        if !entry.file_type().is_dir() || entry.file_name() != GIT_DIR_NAME {
            continue;
        }
        if let Some(parent) = entry.path().parent() {
            debug!(path = %parent.display(), "Found repository");
            found.push(parent.to_path_buf());
        }
        entries.skip_current_dir();
    }

    found
}
