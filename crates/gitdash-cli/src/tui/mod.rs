use crate::logging::LogBuffer;
use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gitdash_core::config::AppConfig;
use gitdash_core::context::AppContext;
use gitdash_core::error::SubmitError;
use gitdash_core::executor::TaskEvent;
use gitdash_core::model::{RepoSnapshot, RepoState, RepoTask};
use gitdash_core::registry::ScanReport;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

mod draw;
mod handle;
mod helpers;
mod jobs;
#[cfg(test)]
mod tests;

pub(crate) use helpers::display_name;
use helpers::*;

const TICK_RATE: Duration = Duration::from_millis(200);
const LOG_PANEL_HEIGHT: u16 = 7;
const LOG_PANEL_BORDER_HEIGHT: u16 = 2;

/// What the host hands the dashboard.
pub struct TuiSettings {
    pub context: Arc<AppContext>,
    pub events: Receiver<TaskEvent>,
    pub config_path: PathBuf,
    pub config: AppConfig,
    pub root: PathBuf,
}

pub fn run_tui(settings: TuiSettings, log_buffer: LogBuffer) -> anyhow::Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    info!(root = %settings.root.display(), "Starting TUI");
    let result = run_app(&mut terminal, TuiApp::new(settings, log_buffer));

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = &result {
        error!(error = %err, "TUI exited with error");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: TuiApp,
) -> anyhow::Result<()> {
    app.start_rescan();
    let mut last_tick = Instant::now();
    debug!(
        tick_rate_ms = TICK_RATE.as_millis(),
        "TUI event loop started"
    );

    loop {
        app.refresh_rows();
        terminal.draw(|frame| app.draw(frame))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key)
        {
            let abandoned = app.context.executor().in_flight();
            if abandoned > 0 {
                warn!(abandoned, "Exiting with tasks still running");
            }
            info!("TUI exiting");
            return Ok(());
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }

        app.poll_scan_events();
        app.poll_task_events();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    Repos,
    BaseDir,
    Credentials,
}

struct InputField {
    label: &'static str,
    value: String,
    mask: bool,
}

impl InputField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            mask: false,
        }
    }

    fn with_value(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            mask: false,
        }
    }

    fn with_mask(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            mask: true,
        }
    }

    fn display_value(&self) -> String {
        if self.mask {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

struct TuiApp {
    context: Arc<AppContext>,
    task_rx: Receiver<TaskEvent>,
    scan_rx: Option<Receiver<ScanReport>>,
    config_path: PathBuf,
    config: AppConfig,
    root: PathBuf,
    view: View,
    rows: Vec<RepoSnapshot>,
    scanning: bool,
    selected: usize,
    scroll: usize,
    input_fields: Vec<InputField>,
    input_index: usize,
    message: String,
    quit_armed: bool,
    log_buffer: LogBuffer,
}

impl TuiApp {
    fn new(settings: TuiSettings, log_buffer: LogBuffer) -> Self {
        Self {
            context: settings.context,
            task_rx: settings.events,
            scan_rx: None,
            config_path: settings.config_path,
            config: settings.config,
            root: settings.root,
            view: View::Repos,
            rows: Vec::new(),
            scanning: false,
            selected: 0,
            scroll: 0,
            input_fields: Vec::new(),
            input_index: 0,
            message: String::new(),
            quit_armed: false,
            log_buffer,
        }
    }

    fn selected_row(&self) -> Option<&RepoSnapshot> {
        self.rows.get(self.selected)
    }

    fn show_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}
