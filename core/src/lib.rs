//! N-body physics for EventHorizon.
//!
//! Everything here is synchronous and free of terminal or file IO. The engine
//! runs [`simulate`] on a blocking task and reads the [`SimulationRun`] it returns.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod diagnostics;
pub mod export;
pub mod gravity;
pub mod integrator;
pub mod scenario;
pub mod simulation;
pub mod stability;
pub mod units;

pub use diagnostics::{ConservationReport, Invariants};
pub use export::{ExportError, ExportFormat, RunExport, UnknownFormat};
pub use gravity::{Dynamics, GravityModel};
pub use integrator::{
    IntegrationError, Integrator, IntegratorKind, IntegratorSettings, StepStats, UnknownIntegrator,
};
pub use scenario::{BLACK_HOLE_MASS, ScenarioError, random_seed};
pub use simulation::{
    DEFAULT_SAMPLES, MAX_SAMPLES, MIN_SAMPLES, Progress, SimulationError, SimulationRun,
    SimulationSettings, simulate,
};
pub use stability::{BodyFate, DEFAULT_DRIFT_TOLERANCE, Fate, StabilityReport, Verdict};
pub use units::Normalization;
