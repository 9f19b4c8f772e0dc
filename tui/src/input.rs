//! Input handling for the EventHorizon TUI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use horizon_engine::{App, Direction, InputMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads crossterm events on a blocking task and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = Arc::clone(&stop);

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close first so a sender blocked on a full queue wakes up.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; never block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Bounded queue: apply backpressure instead of dropping events.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Apply pending input to `app`. Returns `true` once the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
        processed += 1;
    }
    if processed == MAX_EVENTS_PER_FRAME {
        debug!(backlog = input.rx.len(), "Input backlog deferred to next frame");
    }
    Ok(app.should_quit())
}

/// Apply one terminal event. Returns `true` once the app should quit.
pub fn apply_event(app: &mut App, event: Event) -> bool {
    let Event::Key(key) = event else {
        return app.should_quit();
    };
    if matches!(key.kind, KeyEventKind::Release) {
        return app.should_quit();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return true;
    }

    match app.input_mode() {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Help => handle_help_mode(app, key),
    }
    app.should_quit()
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        _ => app.close_help(),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('?') => app.toggle_help(),

        // Command Center
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust_selected(Direction::Decrease),
        KeyCode::Right | KeyCode::Char('l') => app.adjust_selected(Direction::Increase),
        KeyCode::Enter | KeyCode::Char('r') => app.start_simulation(),
        KeyCode::Esc => app.cancel_simulation(),
        KeyCode::Char('n') => app.reseed(),
        KeyCode::Char('e') => {
            // Outcome is reported in the status log.
            let _ = app.export_run();
        }
        KeyCode::Char('p') => {
            let _ = app.save_defaults();
        }

        // Playback
        KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Char(']') => app.faster(),
        KeyCode::Char('[') => app.slower(),
        KeyCode::Char('.') => app.step_frame(1),
        KeyCode::Char(',') => app.step_frame(-1),
        KeyCode::Char('g') => app.restart_playback(),
        KeyCode::Char('L') => app.toggle_looping(),

        // Camera
        KeyCode::Char('a') => app.rotate_left(),
        KeyCode::Char('d') => app.rotate_right(),
        KeyCode::Char('w') => app.tilt_up(),
        KeyCode::Char('s') => app.tilt_down(),
        KeyCode::Char('+' | '=') => app.zoom_in(),
        KeyCode::Char('-' | '_') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_camera(),
        KeyCode::Char('t') => app.toggle_trails(),
        _ => {}
    }
}
