use crate::config::Config;
use crate::errors::display_user_error;
use crate::repl::Repl;
use crate::shell::{APP_NAME, Shell};
use anyhow::{Context as _, Result};
use clap::Parser;
use msh_types::Context;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod errors;
pub mod parser;
pub mod process;
pub mod proxy;
pub mod repl;
pub mod shell;

/// Environment variable holding the tracing filter, e.g. `MSH_LOG=debug`.
pub const LOG_ENV: &str = "MSH_LOG";
/// When set, logs go to stderr instead of the log file.
pub const LOG_STDERR_ENV: &str = "MSH_LOG_STDERR";
const LOG_FILE: &str = "msh.log";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run a single command line and exit
    #[arg(short, long)]
    pub command: Option<String>,

    /// Config file to use instead of $XDG_CONFIG_HOME/msh/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn lib_main() -> ExitCode {
    init_tracing();
    setup_panic_handler();
    run_shell()
}

pub fn run_shell() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            display_user_error(&err);
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new(config);
    let ctx = Context::new(shell.pid);

    if let Some(command) = cli.command.as_deref() {
        execute_command(&mut shell, &ctx, command)
    } else {
        run_interactive(&mut shell, &ctx)
    }
}

fn open_log_file() -> Result<File> {
    let dirs = xdg::BaseDirectories::with_prefix(APP_NAME)
        .context("failed to resolve xdg directories")?;
    let path = dirs
        .place_cache_file(LOG_FILE)
        .context("failed to create cache directory")?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Logs go to `$XDG_CACHE_HOME/msh/msh.log`. When that file cannot be opened the
/// shell still starts, logging to stderr instead.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let log_file = if std::env::var_os(LOG_STDERR_ENV).is_some() {
        None
    } else {
        match open_log_file() {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("{APP_NAME}: logging to stderr: {err:#}");
                None
            }
        }
    };

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .with_writer(Arc::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        let location = if let Some(location) = panic_info.location() {
            format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )
        } else {
            "Unknown location".to_string()
        };

        tracing::error!("PANIC OCCURRED: {} at {}", payload, location);
        eprintln!("{APP_NAME}: internal error: {payload} ({location})");
    }));
}

fn execute_command(shell: &mut Shell, ctx: &Context, command: &str) -> ExitCode {
    debug!("run command mode {:?}", command);
    if let Err(err) = shell.eval_str(ctx, command) {
        display_user_error(&err);
    }
    if let Err(err) = shell.reap_finished(ctx) {
        display_user_error(&err);
    }
    ExitCode::SUCCESS
}

fn run_interactive(shell: &mut Shell, ctx: &Context) -> ExitCode {
    debug!("start shell (interactive: {})", ctx.interactive);
    if ctx.interactive {
        shell.set_signals();
    }

    let stdin = std::io::stdin();
    let mut repl = Repl::new(shell);
    if let Err(err) = repl.run(ctx, stdin.lock()) {
        display_user_error(&err);
    }
    ExitCode::SUCCESS
}
