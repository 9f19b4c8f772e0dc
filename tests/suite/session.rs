//! Full interactive sessions driven through the key map.

use std::fs;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use horizon_engine::{AppSettings, RunState, Scenario, StatusLevel};
use tokio::time::sleep;

use crate::common::{RUN_TIMEOUT, new_app, press, select_short_binary, wait_for_run};

#[tokio::test]
async fn run_play_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = new_app(&dir);
    select_short_binary(&mut app);
    assert_eq!(app.params().scenario, Scenario::BinaryPlanet);
    assert_eq!(app.params().time_span, 1.0);

    press(&mut app, &[KeyCode::Enter]);
    assert!(app.is_running());
    let run = wait_for_run(&mut app).await;
    assert_eq!(run.body_count(), 3);
    assert_eq!(run.params.seed, 42);

    let done = app.status().latest().unwrap();
    assert_eq!(done.level, StatusLevel::Success);
    assert!(done.message.starts_with("Run complete"), "{}", done.message);

    // Stepping pauses playback.
    press(&mut app, &[KeyCode::Char('.')]);
    assert!(!app.playback().is_playing());
    press(&mut app, &[KeyCode::Char('g'), KeyCode::Char('.'), KeyCode::Char('.')]);
    assert_eq!(app.current_frame(), 2);
    press(&mut app, &[KeyCode::Char(',')]);
    assert_eq!(app.current_frame(), 1);

    press(&mut app, &[KeyCode::Char('e')]);
    let exported: Vec<_> = fs::read_dir(dir.path().join("exports"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(exported.len(), 1);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported[0]).unwrap()).unwrap();
    assert_eq!(json["seed"], 42);
    assert_eq!(json["bodies"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn params_lock_while_running_then_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = new_app(&dir);
    // Largest vortex so the run is still going when we cancel.
    press(&mut app, &[KeyCode::Down]);
    for _ in 0..60 {
        press(&mut app, &[KeyCode::Right]);
    }
    press(&mut app, &[KeyCode::Down]);
    for _ in 0..60 {
        press(&mut app, &[KeyCode::Right]);
    }
    let params = *app.params();
    assert_eq!(params.body_count, 60);

    press(&mut app, &[KeyCode::Enter]);
    assert!(app.is_running());
    press(&mut app, &[KeyCode::Left]);
    assert_eq!(app.params().time_span, params.time_span);
    assert_eq!(
        app.status().latest().unwrap().level,
        StatusLevel::Warning,
        "locked parameters warn"
    );

    press(&mut app, &[KeyCode::Esc]);
    let started = Instant::now();
    while app.is_running() {
        assert!(started.elapsed() < RUN_TIMEOUT, "cancel timed out");
        sleep(Duration::from_millis(10)).await;
        app.tick();
    }
    assert!(matches!(app.run_state(), RunState::Idle));
    assert_eq!(app.status().latest().unwrap().message, "Simulation cancelled");
}

#[test]
fn save_defaults_then_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = new_app(&dir);
    select_short_binary(&mut app);
    press(&mut app, &[KeyCode::Char('p')]);

    let settings = AppSettings::load(Some(&dir.path().join("config.toml")));
    assert!(settings.notices.is_empty());
    assert_eq!(settings.params.scenario, Scenario::BinaryPlanet);
    assert_eq!(settings.params.time_span, 1.0);
    assert_eq!(settings.params.seed, 42);
}

#[test]
fn quit_from_anywhere() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = new_app(&dir);
    assert!(!press(&mut app, &[KeyCode::Char('?')]));
    // The overlay swallows the first key.
    assert!(!press(&mut app, &[KeyCode::Char('j')]));
    assert!(press(&mut app, &[KeyCode::Char('q')]));
    assert!(app.should_quit());
}
