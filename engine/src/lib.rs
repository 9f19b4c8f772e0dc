//! Core engine for EventHorizon - state machine and orchestration.
//!
//! This crate contains the `App` state machine without TUI dependencies:
//! - **Parameters**: sidebar selection and editing
//! - **Runs**: the solver on a blocking task, progress over a channel, cancellation
//! - **Playback**: frame clock, speed, looping
//! - **Camera**: orthographic projection of the 3D scene
//! - **Status log**: timestamped messages for the Command Center
//! - **Export**: JSON and CSV files of a finished run
//!
//! The TUI layer (`horizon_tui`) reads state from `App` and forwards input to it.

mod app;
mod camera;
mod export;
mod playback;
mod run;
mod status;

pub use app::{App, AppSettings};
pub use camera::{Camera, DEFAULT_AZIMUTH, DEFAULT_ELEVATION, MAX_ZOOM, MIN_ZOOM, Projected};
pub use export::{export_file_stem, write_export};
pub use playback::{MAX_SPEED, MIN_SPEED, Playback};
pub use run::{ActiveRun, RunPhase, RunState};
pub use status::{STATUS_CAPACITY, StatusEntry, StatusLevel, StatusLog};

pub use horizon_config::{ExportSettings, HorizonConfig, RenderSettings};
pub use horizon_core::{
    BodyFate, ConservationReport, Fate, IntegratorKind, Normalization, SimulationRun,
    SimulationSettings, StabilityReport, StepStats, Verdict,
};
pub use horizon_types::{
    BodyKind, Direction, InputMode, ModalEffect, ModalEffectKind, ParamField, Scenario,
    SimulationParams, UiOptions, Vec3,
};
