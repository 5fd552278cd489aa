use super::*;

/// Label and colour the dashboard shows for a state.
pub(in crate::tui) fn state_display(state: RepoState) -> (&'static str, Style) {
    match state {
        RepoState::UpToDate => ("UP-TO-DATE", Style::default().fg(Color::Green)),
        RepoState::FastForward => ("PULL", Style::default().fg(Color::Yellow)),
        RepoState::Push => ("PUSH", Style::default().fg(Color::Cyan)),
        RepoState::Diverged => ("DIVERGED", Style::default().fg(Color::Magenta)),
        RepoState::Rebase => ("REBASE", Style::default().fg(Color::Blue)),
        RepoState::Processing => ("...", Style::default().fg(Color::Gray)),
        RepoState::Error => ("ERROR", Style::default().fg(Color::Red)),
        RepoState::None => ("NONE", Style::default()),
    }
}

/// Path relative to `root`; the directory name when `path` is the root or
/// lies outside it.
pub(crate) fn display_name(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.display().to_string(),
        _ => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}

/// Non-zero state counts in display order, e.g. `2 PULL, 1 ERROR`.
pub(in crate::tui) fn state_summary(rows: &[RepoSnapshot]) -> String {
    const ORDER: [RepoState; 8] = [
        RepoState::UpToDate,
        RepoState::FastForward,
        RepoState::Push,
        RepoState::Diverged,
        RepoState::Rebase,
        RepoState::Processing,
        RepoState::Error,
        RepoState::None,
    ];
    ORDER
        .iter()
        .filter_map(|state| {
            let count = rows.iter().filter(|row| row.state == *state).count();
            (count > 0).then(|| format!("{count} {}", state_display(*state).0))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(in crate::tui) fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

pub(in crate::tui) fn adjust_scroll(
    selected: usize,
    scroll: usize,
    height: usize,
    len: usize,
) -> usize {
    if len == 0 || height == 0 {
        return 0;
    }
    if selected < scroll {
        return selected;
    }
    let last_visible = scroll.saturating_add(height).saturating_sub(1);
    if selected > last_visible {
        return selected.saturating_sub(height - 1);
    }
    scroll.min(len.saturating_sub(height))
}

pub(in crate::tui) fn help_text(view: View) -> &'static str {
    match view {
        View::Repos => {
            "r rescan | f/u/p fetch/pull/push | F/U/P all | b base dir | c credentials | q quit"
        }
        View::BaseDir | View::Credentials => "Enter save | Tab next field | Esc cancel",
    }
}
