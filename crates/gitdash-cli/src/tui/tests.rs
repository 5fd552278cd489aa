use super::*;
use gitdash_core::credentials::{CredentialStore, MemoryCredentialStore};
use std::fs;
use tempfile::TempDir;

fn app_with_store(root: &Path, config_path: PathBuf) -> (TuiApp, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let (context, events) = AppContext::new(store.clone());
    let settings = TuiSettings {
        context: Arc::new(context),
        events,
        config_path,
        config: AppConfig::default(),
        root: root.to_path_buf(),
    };
    (TuiApp::new(settings, LogBuffer::new(10)), store)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut TuiApp, text: &str) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch)));
    }
}

fn wait_for_scan(app: &mut TuiApp) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while app.scan_rx.is_some() && Instant::now() < deadline {
        app.poll_scan_events();
        thread::sleep(Duration::from_millis(10));
    }
    assert!(app.scan_rx.is_none(), "rescan did not finish");
}

fn row(path: &str, state: RepoState) -> RepoSnapshot {
    RepoSnapshot {
        path: PathBuf::from(path),
        state,
        task: RepoTask::None,
        message: String::new(),
    }
}

#[test]
fn state_labels_match_dashboard_legend() {
    assert_eq!(state_display(RepoState::FastForward).0, "PULL");
    assert_eq!(state_display(RepoState::UpToDate).0, "UP-TO-DATE");
    assert_eq!(state_display(RepoState::Processing).0, "...");
    assert_eq!(
        state_display(RepoState::Error).1,
        Style::default().fg(Color::Red)
    );
    assert_eq!(state_display(RepoState::None).1, Style::default());
}

#[test]
fn state_summary_skips_empty_states() {
    let rows = vec![
        row("/code/a", RepoState::Error),
        row("/code/b", RepoState::FastForward),
        row("/code/c", RepoState::FastForward),
    ];
    assert_eq!(state_summary(&rows), "2 PULL, 1 ERROR");
    assert_eq!(state_summary(&[]), "");
}

#[test]
fn display_name_is_relative_to_root() {
    let root = Path::new("/code");
    assert_eq!(display_name(Path::new("/code/team/api"), root), "team/api");
    assert_eq!(display_name(Path::new("/code"), root), "code");
    assert_eq!(display_name(Path::new("/elsewhere/tool"), root), "tool");
}

#[test]
fn scroll_follows_selection() {
    assert_eq!(clamp_index(5, 0), 0);
    assert_eq!(clamp_index(5, 3), 2);
    assert_eq!(adjust_scroll(0, 0, 5, 0), 0);
    assert_eq!(adjust_scroll(7, 0, 5, 10), 3);
    assert_eq!(adjust_scroll(2, 4, 5, 10), 2);
    assert_eq!(adjust_scroll(6, 4, 5, 10), 4);
}

#[test]
fn navigation_clamps_to_rows() {
    let tmp = TempDir::new().unwrap();
    let (mut app, _store) = app_with_store(tmp.path(), tmp.path().join("config.json"));
    app.rows = vec![
        row("/code/a", RepoState::UpToDate),
        row("/code/b", RepoState::Push),
    ];

    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Down));
    assert_eq!(app.selected, 1);
    app.handle_key(key(KeyCode::Up));
    app.handle_key(key(KeyCode::Up));
    assert_eq!(app.selected, 0);
    app.handle_key(key(KeyCode::End));
    assert_eq!(app.selected, 1);
}

#[test]
fn quit_without_tasks_exits_immediately() {
    let tmp = TempDir::new().unwrap();
    let (mut app, _store) = app_with_store(tmp.path(), tmp.path().join("config.json"));
    assert!(app.handle_key(key(KeyCode::Char('q'))));
    assert!(app.handle_key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL
    )));
}

#[test]
fn task_keys_without_selection_report_it() {
    let tmp = TempDir::new().unwrap();
    let (mut app, _store) = app_with_store(tmp.path(), tmp.path().join("config.json"));
    assert!(!app.handle_key(key(KeyCode::Char('f'))));
    assert_eq!(app.message, "No repository selected");
    app.handle_key(key(KeyCode::Char('P')));
    assert_eq!(app.message, "push started for 0 repositories");
}

#[test]
fn task_on_unknown_repository_explains_rejection() {
    let tmp = TempDir::new().unwrap();
    let (mut app, _store) = app_with_store(Path::new("/code"), tmp.path().join("config.json"));
    app.rows = vec![row("/code/api", RepoState::UpToDate)];

    app.handle_key(key(KeyCode::Char('u')));
    assert_eq!(
        app.message,
        "fast-forward not started: no repository at /code/api"
    );
}

#[test]
fn credentials_form_stores_credential() {
    let tmp = TempDir::new().unwrap();
    let (mut app, store) = app_with_store(tmp.path(), tmp.path().join("config.json"));

    app.handle_key(key(KeyCode::Char('c')));
    assert_eq!(app.view, View::Credentials);
    type_text(&mut app, "alice");
    app.handle_key(key(KeyCode::Tab));
    type_text(&mut app, "s3cret");
    assert_eq!(app.input_fields[1].display_value(), "******");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.view, View::Repos);
    assert_eq!(app.message, "Credential stored for alice");
    let stored = store.read().unwrap().unwrap();
    assert_eq!(stored.username, "alice");
    assert_eq!(stored.secret, "s3cret");
}

#[test]
fn credentials_form_requires_both_fields() {
    let tmp = TempDir::new().unwrap();
    let (mut app, store) = app_with_store(tmp.path(), tmp.path().join("config.json"));

    app.handle_key(key(KeyCode::Char('c')));
    type_text(&mut app, "alice");
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.view, View::Credentials);
    assert!(store.read().unwrap().is_none());

    app.handle_key(key(KeyCode::Esc));
    assert_eq!(app.view, View::Repos);
    assert!(app.input_fields.is_empty());
}

#[test]
fn base_dir_form_rejects_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("config.json");
    let (mut app, _store) = app_with_store(tmp.path(), config_path.clone());

    app.handle_key(key(KeyCode::Char('b')));
    assert_eq!(app.input_fields[0].value, tmp.path().display().to_string());
    type_text(&mut app, "/missing");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.view, View::BaseDir);
    assert!(app.message.ends_with("is not a directory"));
    assert!(!config_path.exists());
}

#[test]
fn base_dir_form_saves_config_and_rescans() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("config.json");
    let code = tmp.path().join("code");
    fs::create_dir_all(code.join("broken").join(".git")).unwrap();
    let (mut app, _store) = app_with_store(tmp.path(), config_path.clone());

    app.handle_key(key(KeyCode::Char('b')));
    app.input_fields[0].value = code.display().to_string();
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.view, View::Repos);
    let saved = AppConfig::load(&config_path).unwrap();
    assert_eq!(saved.base_dir, Some(code.canonicalize().unwrap()));
    assert_eq!(app.root, code.canonicalize().unwrap());
    assert!(app.scanning);

    wait_for_scan(&mut app);
    assert!(!app.scanning);
    assert!(app.rows.is_empty());
    assert_eq!(app.message, "Found 0 repositories (1 could not be opened)");
}

#[test]
fn task_events_update_message() {
    let tmp = TempDir::new().unwrap();
    let (mut app, _store) = app_with_store(Path::new("/code"), tmp.path().join("config.json"));
    let (tx, rx) = mpsc::channel();
    app.task_rx = rx;
    tx.send(TaskEvent {
        path: PathBuf::from("/code/api"),
        task: RepoTask::Push,
        state: RepoState::Error,
        message: "push rejected".to_string(),
    })
    .unwrap();

    app.poll_task_events();
    assert_eq!(app.message, "push api: push rejected");
}
