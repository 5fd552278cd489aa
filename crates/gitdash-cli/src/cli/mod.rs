use crate::{logging, tui};
use anyhow::Context;
use clap::Parser;
use gitdash_core::config::{AppConfig, default_config_path};
use gitdash_core::context::AppContext;
use gitdash_core::executor::TaskEvent;
use gitdash_core::model::{RepoSnapshot, RepoState, RepoTask};
use gitdash_credentials::KeyringCredentialStore;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod args;
mod commands;

use args::*;
use commands::*;

const LOG_CAPACITY: usize = 200;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_buffer = logging::LogBuffer::new(LOG_CAPACITY);
    let interactive = matches!(cli.command, None | Some(Commands::Tui(_)));
    init_tracing(&log_buffer, interactive);
    info!(command = command_label(cli.command.as_ref()), "Running command");

    match cli.command {
        None => handle_tui(RootArgs::default(), log_buffer),
        Some(Commands::Tui(args)) => handle_tui(args, log_buffer),
        Some(Commands::Status(args)) => handle_status(args),
        Some(Commands::Fetch(args)) => handle_task(args, RepoTask::Fetch),
        Some(Commands::FastForward(args)) => handle_task(args, RepoTask::FastForward),
        Some(Commands::Push(args)) => handle_task(args, RepoTask::Push),
        Some(Commands::Config(args)) => handle_config(args),
        Some(Commands::Credentials(args)) => handle_credentials(args),
    }
}

fn init_tracing(log_buffer: &logging::LogBuffer, interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = (!interactive).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(logging::LogLayer::new(log_buffer.clone()))
        .init();
}

fn command_label(command: Option<&Commands>) -> &'static str {
    match command {
        None | Some(Commands::Tui(_)) => "tui",
        Some(Commands::Status(_)) => "status",
        Some(Commands::Fetch(_)) => "fetch",
        Some(Commands::FastForward(_)) => "fast-forward",
        Some(Commands::Push(_)) => "push",
        Some(Commands::Config(_)) => "config",
        Some(Commands::Credentials(_)) => "credentials",
    }
}
