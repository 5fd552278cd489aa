use super::*;

pub(super) fn handle_tui(args: RootArgs, log_buffer: logging::LogBuffer) -> anyhow::Result<()> {
    let (config_path, config) = load_config()?;
    let root = resolve_root(&config, args.root.as_deref())?;
    let (context, events) = new_context();
    tui::run_tui(
        tui::TuiSettings {
            context,
            events,
            config_path,
            config,
            root,
        },
        log_buffer,
    )
}

pub(super) fn handle_status(args: StatusArgs) -> anyhow::Result<()> {
    let (_, config) = load_config()?;
    let root = resolve_root(&config, args.root.root.as_deref())?;
    let (context, _events) = new_context();
    let report = context.rescan(&root);
    let rows = context.snapshot();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("serialize status")?;
        println!("{json}");
        return Ok(());
    }
    if rows.is_empty() {
        println!("No repositories under {}", root.display());
    }
    for row in &rows {
        println!("{}", format_status_line(row, &root));
    }
    if report.skipped > 0 {
        println!("{} repositories could not be opened", report.skipped);
    }
    Ok(())
}

pub(super) fn handle_task(args: TaskArgs, task: RepoTask) -> anyhow::Result<()> {
    let (_, config) = load_config()?;
    let root = resolve_root(&config, args.root.root.as_deref())?;
    let (context, events) = new_context();
    context.rescan(&root);

    let submitted = match args.repo {
        Some(repo) => {
            let repo = repo
                .canonicalize()
                .with_context(|| format!("resolve repository {}", repo.display()))?;
            context
                .submit_task(&repo, task)
                .with_context(|| format!("submit {task} under {}", root.display()))?;
            1
        }
        None => context.submit_bulk_task(task),
    };
    info!(task = %task, submitted, "Waiting for tasks");
    context.wait_idle();

    let results = collect_events(&events);
    for event in &results {
        println!("{}", format_event_line(event, &root));
    }
    let failed = count_failed(&results);
    if failed > 0 {
        anyhow::bail!("{failed} of {} {task} task(s) failed", results.len());
    }
    if results.is_empty() {
        println!("No repositories to {task}");
    }
    Ok(())
}

pub(super) fn handle_config(args: ConfigArgs) -> anyhow::Result<()> {
    let (config_path, mut config) = load_config()?;
    match args.command {
        ConfigCommands::Show => {
            println!("Config: {}", config_path.display());
            match &config.base_dir {
                Some(base_dir) => println!("Base directory: {}", base_dir.display()),
                None => println!("Base directory: (not set, current directory is scanned)"),
            }
        }
        ConfigCommands::SetRoot(args) => {
            let path = args
                .path
                .canonicalize()
                .with_context(|| format!("resolve {}", args.path.display()))?;
            if !path.is_dir() {
                anyhow::bail!("{} is not a directory", path.display());
            }
            config.base_dir = Some(path.clone());
            config.save(&config_path)?;
            info!(base_dir = %path.display(), "Base directory saved");
            println!("Base directory set to {}", path.display());
        }
    }
    Ok(())
}

pub(super) fn handle_credentials(args: CredentialsArgs) -> anyhow::Result<()> {
    match args.command {
        CredentialsCommands::Set(args) => {
            let secret = match args.secret {
                Some(secret) => secret,
                None => read_secret(io::stdin().lock())?,
            };
            if args.username.trim().is_empty() || secret.is_empty() {
                anyhow::bail!("username and secret must not be empty");
            }
            let (context, _events) = new_context();
            context
                .submit_credential(args.username.trim(), &secret)
                .context("store credential")?;
            println!("Credential stored for {}", args.username.trim());
        }
    }
    Ok(())
}

fn load_config() -> anyhow::Result<(PathBuf, AppConfig)> {
    let config_path = default_config_path()?;
    let config = AppConfig::load(&config_path)?;
    Ok((config_path, config))
}

fn resolve_root(config: &AppConfig, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let root = config.resolve_root(explicit, &cwd);
    root.canonicalize()
        .with_context(|| format!("resolve root {}", root.display()))
}

fn new_context() -> (Arc<AppContext>, Receiver<TaskEvent>) {
    let (context, events) = AppContext::new(Arc::new(KeyringCredentialStore::new()));
    (Arc::new(context), events)
}

/// Reads one line from `input`, prompting on stderr when it is a terminal.
pub(super) fn read_secret(mut input: impl BufRead) -> anyhow::Result<String> {
    if io::stdin().is_terminal() {
        eprint!("Secret: ");
        io::stderr().flush().ok();
    }
    let mut line = String::new();
    input.read_line(&mut line).context("read secret")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub(super) fn collect_events(events: &Receiver<TaskEvent>) -> Vec<TaskEvent> {
    let mut results: Vec<TaskEvent> = events.try_iter().collect();
    results.sort_by(|a, b| a.path.cmp(&b.path));
    results
}

pub(super) fn count_failed(results: &[TaskEvent]) -> usize {
    let failed = results
        .iter()
        .filter(|event| event.state == RepoState::Error)
        .count();
    if failed > 0 {
        warn!(failed, total = results.len(), "Some tasks failed");
    }
    failed
}

pub(super) fn format_status_line(row: &RepoSnapshot, root: &Path) -> String {
    let name = tui::display_name(&row.path, root);
    if row.message.is_empty() {
        format!("{:<12} {name}", row.state.as_str())
    } else {
        format!("{:<12} {name}  {}", row.state.as_str(), row.message)
    }
}

pub(super) fn format_event_line(event: &TaskEvent, root: &Path) -> String {
    format!(
        "{:<12} {}  {}",
        event.state.as_str(),
        tui::display_name(&event.path, root),
        event.message
    )
}
