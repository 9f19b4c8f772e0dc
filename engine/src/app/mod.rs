use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use horizon_config::{ExportSettings, RenderSettings};
use horizon_core::{SimulationRun, SimulationSettings};
use horizon_types::{InputMode, ModalEffect, ParamField, SimulationParams, UiOptions};
use tracing::debug;

use crate::camera::Camera;
use crate::playback::Playback;
use crate::run::RunState;
use crate::status::{StatusLevel, StatusLog};

mod init;
mod params;
mod persistence;
mod simulation;
mod view;


pub use init::AppSettings;

/// Spinner cadence, independent of render FPS.
const UI_TICK: Duration = Duration::from_millis(100);
const HELP_POP_DURATION: Duration = Duration::from_millis(180);

struct UiState {
    options: UiOptions,
    input_mode: InputMode,
    modal_effect: Option<ModalEffect>,
    camera: Camera,
    show_trails: bool,
    should_quit: bool,
    last_ui_tick: Instant,
    last_frame: Instant,
}

struct CoreState {
    params: SimulationParams,
    selected: ParamField,
    simulation: SimulationSettings,
    render: RenderSettings,
    export: ExportSettings,
    config_path: Option<PathBuf>,
    run: RunState,
    playback: Playback,
    status: StatusLog,
}

struct RuntimeState {
    tick: usize,
    last_playback: Instant,
}

/// All runtime state of the dashboard. Rendering reads it; input mutates it.
pub struct App {
    ui: UiState,
    core: CoreState,
    runtime: RuntimeState,
}

impl App {
    pub fn should_quit(&self) -> bool {
        self.ui.should_quit
    }

    pub fn request_quit(&mut self) {
        self.ui.should_quit = true;
    }

    pub fn ui_options(&self) -> UiOptions {
        self.ui.options
    }

    pub fn tick_count(&self) -> usize {
        self.runtime.tick
    }

    pub fn status(&self) -> &StatusLog {
        &self.core.status
    }

    pub fn run_state(&self) -> &RunState {
        &self.core.run
    }

    pub fn is_running(&self) -> bool {
        self.core.run.is_running()
    }

    /// The finished run being played back, if any.
    pub fn ready_run(&self) -> Option<&Arc<SimulationRun>> {
        self.core.run.ready()
    }

    /// `(done, total)` frames of the run in flight.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match &self.core.run {
            RunState::Running(active) => Some(active.progress()),
            _ => None,
        }
    }

    pub fn simulation_settings(&self) -> &SimulationSettings {
        &self.core.simulation
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.core.render
    }

    pub fn export_settings(&self) -> &ExportSettings {
        &self.core.export
    }

    pub(crate) fn push_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        let message = message.into();
        debug!(?level, "{message}");
        self.core.status.push(level, message);
    }

    /// Drain run events and advance playback. Call once per frame.
    pub fn tick(&mut self) {
        self.poll_run();

        let now = Instant::now();
        if now.duration_since(self.ui.last_ui_tick) >= UI_TICK {
            self.ui.last_ui_tick = now;
            self.runtime.tick = self.runtime.tick.wrapping_add(1);
        }

        let elapsed = now.duration_since(self.runtime.last_playback);
        self.runtime.last_playback = now;
        self.core.playback.advance(elapsed, self.core.render.fps);
    }

    /// Time since the previous call, for driving UI animations.
    pub fn frame_elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.ui.last_frame);
        self.ui.last_frame = now;
        elapsed
    }

    pub fn input_mode(&self) -> InputMode {
        self.ui.input_mode
    }

    pub fn modal_effect_mut(&mut self) -> Option<&mut ModalEffect> {
        self.ui.modal_effect.as_mut()
    }

    pub fn clear_modal_effect(&mut self) {
        self.ui.modal_effect = None;
    }

    pub fn toggle_help(&mut self) {
        match self.ui.input_mode {
            InputMode::Help => self.close_help(),
            InputMode::Normal => {
                self.ui.input_mode = InputMode::Help;
                self.ui.modal_effect = if self.ui.options.reduced_motion {
                    None
                } else {
                    Some(ModalEffect::pop_scale(HELP_POP_DURATION))
                };
                self.ui.last_frame = Instant::now();
            }
        }
    }

    pub fn close_help(&mut self) {
        self.ui.input_mode = InputMode::Normal;
        self.ui.modal_effect = None;
    }
}
