//! EventHorizon CLI - binary entry point and terminal session management.
//!
//! Bridges [`horizon_engine`] (application state) and [`horizon_tui`]
//! (rendering). The terminal is owned by an RAII [`TerminalSession`] so raw
//! mode and the alternate screen are restored on every exit path.
//!
//! ```text
//! main() -> Cli::parse() -> simulate  -> headless::run()  -> stdout summary
//!                        \-> (none)   -> TerminalSession -> run_app() -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! The interactive UI renders at a fixed ~30 FPS cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`horizon_tui::InputPump`])
//! 3. Advance application state (`app.tick()`), which also polls the running simulation
//! 4. Render frame

mod cli;
mod headless;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tokio::time::{MissedTickBehavior, interval};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use horizon_engine::{App, AppSettings, HorizonConfig};
use horizon_tui::{InputPump, draw, handle_events};

use crate::cli::{Cli, Commands};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing() {
    let env_filter = env_filter("info");
    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than scribble over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

/// Headless runs own the terminal, so logs go to stderr.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter("warn"))
        .init();
}

fn open_log_file() -> (Option<(PathBuf, File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.eventhorizon/logs/eventhorizon.log
    if let Some(config_path) = HorizonConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("eventhorizon.log"));
    }

    candidates.push(
        PathBuf::from(".eventhorizon")
            .join("logs")
            .join("eventhorizon.log"),
    );
    candidates
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = Write::flush(self.terminal.backend_mut());
        let _ = self.terminal.show_cursor();
    }
}

fn interactive_settings(cli: &Cli) -> AppSettings {
    let mut settings = AppSettings::load(cli.config.as_deref());
    if let Some(seed) = cli.seed {
        settings.params.seed = seed;
    }
    settings.ui.ascii_only |= cli.ascii;
    settings.ui.high_contrast |= cli.high_contrast;
    settings.ui.reduced_motion |= cli.reduced_motion;
    settings
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Simulate(args)) = &cli.command {
        init_stderr_tracing();
        let base = AppSettings::load(cli.config.as_deref());
        for notice in &base.notices {
            eprintln!("warning: {notice}");
        }
        return headless::run(&base, cli.seed, args);
    }

    init_tracing();
    let mut app = App::new(interactive_settings(&cli));

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = &result {
        tracing::error!("Terminal loop failed: {err:?}");
    }
    result
}

const FRAME_DURATION: Duration = Duration::from_millis(33);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        app.tick();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{interactive_settings, log_file_candidates};
    use crate::cli::Cli;

    #[test]
    fn cli_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        let path = config.to_str().unwrap();
        let cli = Cli::parse_from([
            "eventhorizon",
            "--config",
            path,
            "--seed",
            "99",
            "--ascii",
        ]);
        let settings = interactive_settings(&cli);
        assert_eq!(settings.params.seed, 99);
        assert!(settings.ui.ascii_only);
        assert!(!settings.ui.high_contrast);
        assert_eq!(settings.config_path.as_deref(), Some(config.as_path()));
    }

    #[test]
    fn log_falls_back_to_working_dir() {
        let candidates = log_file_candidates();
        let last = candidates.last().unwrap();
        assert!(last.ends_with("eventhorizon.log"));
        assert!(last.starts_with(".eventhorizon"));
    }
}
