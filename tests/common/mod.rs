//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use horizon_engine::{App, AppSettings, ExportSettings, SimulationRun};
use horizon_tui::apply_event;
use tempfile::TempDir;
use tokio::time::sleep;

/// Runs in these tests are tiny; anything slower than this is a hang.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// An app whose config and exports live inside `dir`.
pub fn new_app(dir: &TempDir) -> App {
    let mut settings = AppSettings {
        config_path: Some(dir.path().join("config.toml")),
        export: ExportSettings {
            directory: dir.path().join("exports"),
            ..ExportSettings::default()
        },
        ..AppSettings::default()
    };
    settings.params.seed = 42;
    App::new(settings)
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Feed a sequence of key presses. Returns true if any of them quit.
pub fn press(app: &mut App, codes: &[KeyCode]) -> bool {
    let mut quit = false;
    for &code in codes {
        quit |= apply_event(app, key(code));
    }
    quit
}

/// Tick the app until its run finishes.
pub async fn wait_for_run(app: &mut App) -> Arc<SimulationRun> {
    let started = Instant::now();
    loop {
        app.tick();
        if let Some(run) = app.ready_run() {
            return Arc::clone(run);
        }
        assert!(
            app.is_running(),
            "run stopped without a result: {}",
            app.run_state().label()
        );
        assert!(started.elapsed() < RUN_TIMEOUT, "run timed out");
        sleep(Duration::from_millis(10)).await;
    }
}

/// Switch the scenario to the three-body binary and shorten the run to the
/// minimum time span.
pub fn select_short_binary(app: &mut App) {
    // Scenario row is selected first; Right cycles to the binary.
    press(app, &[KeyCode::Right]);
    // Time span sits two rows below.
    press(app, &[KeyCode::Down, KeyCode::Down]);
    let mut previous = f64::INFINITY;
    while app.params().time_span < previous {
        previous = app.params().time_span;
        press(app, &[KeyCode::Left]);
    }
    assert_eq!(app.params().time_span, 1.0, "time span bottoms out at 1.0");
}
