//! Core domain types for EventHorizon.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod body;
mod params;
mod state;
pub mod ui;
mod vec3;

pub use body::{Body, BodyKind};
pub use params::{
    BINARY_BODY_COUNT, Direction, GravityPreset, ParamError, ParamField, Scenario,
    SimulationParams, UnknownGravity, UnknownScenario,
};
pub use state::PhaseState;
pub use ui::{InputMode, ModalEffect, ModalEffectKind, UiOptions};
pub use vec3::Vec3;
