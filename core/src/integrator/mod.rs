//! Time integrators for the N-body equations.
//!
//! All integrators advance a [`PhaseState`] in place over `[t0, t1]` and land
//! exactly on `t1`, so the simulation driver can sample output frames at fixed
//! times regardless of the internal step size.

mod dopri;
mod leapfrog;
mod rk4;

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use horizon_types::PhaseState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gravity::Dynamics;

pub use dopri::DormandPrince;
pub use leapfrog::Leapfrog;
pub use rk4::RungeKutta4;

pub const DEFAULT_RTOL: f64 = 1e-6;
pub const DEFAULT_ATOL: f64 = 1e-9;
pub const DEFAULT_SUBSTEPS: u32 = 20;
pub const DEFAULT_MAX_STEPS: usize = 200_000;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IntegrationError {
    #[error("step size underflow at t = {t:.6} (h = {h:e})")]
    StepSizeUnderflow { t: f64, h: f64 },
    #[error("exceeded {limit} steps before reaching the next output time (t = {t:.6})")]
    StepLimitExceeded { t: f64, limit: usize },
    #[error("state became non-finite at t = {t:.6}")]
    NonFinite { t: f64 },
    #[error("invalid integration interval [{t0}, {t1}]")]
    InvalidInterval { t0: f64, t1: f64 },
}

/// Work counters, summed over a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Right-hand side (acceleration) evaluations.
    pub evaluations: usize,
}

impl AddAssign for StepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.accepted += rhs.accepted;
        self.rejected += rhs.rejected;
        self.evaluations += rhs.evaluations;
    }
}

pub trait Integrator: Send {
    fn kind(&self) -> IntegratorKind;

    /// Advance `state` from `t0` to `t1` in place.
    fn advance(
        &mut self,
        dynamics: &dyn Dynamics,
        state: &mut PhaseState,
        t0: f64,
        t1: f64,
    ) -> Result<StepStats, IntegrationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntegratorKind {
    /// Adaptive embedded Runge-Kutta 5(4).
    #[default]
    #[serde(rename = "dopri5")]
    DormandPrince,
    #[serde(rename = "rk4")]
    RungeKutta4,
    /// Kick-drift-kick velocity Verlet.
    #[serde(rename = "leapfrog")]
    Leapfrog,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 3] = [
        IntegratorKind::DormandPrince,
        IntegratorKind::RungeKutta4,
        IntegratorKind::Leapfrog,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IntegratorKind::DormandPrince => "dopri5",
            IntegratorKind::RungeKutta4 => "rk4",
            IntegratorKind::Leapfrog => "leapfrog",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IntegratorKind::DormandPrince => "Dormand-Prince 5(4)",
            IntegratorKind::RungeKutta4 => "Runge-Kutta 4",
            IntegratorKind::Leapfrog => "Leapfrog (KDK)",
        }
    }

    #[must_use]
    pub fn is_adaptive(self) -> bool {
        matches!(self, IntegratorKind::DormandPrince)
    }

    #[must_use]
    pub fn build(self, settings: &IntegratorSettings) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::DormandPrince => Box::new(DormandPrince::new(
                settings.rtol,
                settings.atol,
                settings.max_step,
                settings.max_steps,
            )),
            IntegratorKind::RungeKutta4 => Box::new(RungeKutta4::new(settings.substeps)),
            IntegratorKind::Leapfrog => Box::new(Leapfrog::new(settings.substeps)),
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown integrator '{0}' (expected dopri5, rk4 or leapfrog)")]
pub struct UnknownIntegrator(pub String);

impl FromStr for IntegratorKind {
    type Err = UnknownIntegrator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dopri5" | "dopri" | "rk45" | "dormand-prince" => Ok(IntegratorKind::DormandPrince),
            "rk4" | "runge-kutta" => Ok(IntegratorKind::RungeKutta4),
            "leapfrog" | "verlet" | "kdk" => Ok(IntegratorKind::Leapfrog),
            other => Err(UnknownIntegrator(other.to_string())),
        }
    }
}

/// Resolved integrator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorSettings {
    pub kind: IntegratorKind,
    pub rtol: f64,
    pub atol: f64,
    /// Upper bound on the adaptive step (dimensionless time).
    pub max_step: Option<f64>,
    /// Fixed steps per output interval (RK4, leapfrog).
    pub substeps: u32,
    /// Adaptive steps allowed per output interval.
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            kind: IntegratorKind::DormandPrince,
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
            max_step: None,
            substeps: DEFAULT_SUBSTEPS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl IntegratorSettings {
    #[must_use]
    pub fn with_kind(mut self, kind: IntegratorKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn build(&self) -> Box<dyn Integrator> {
        self.kind.build(self)
    }
}

fn check_interval(t0: f64, t1: f64) -> Result<(), IntegrationError> {
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return Err(IntegrationError::InvalidInterval { t0, t1 });
    }
    Ok(())
}

/// Size scratch buffers to match the state.
fn ensure_len(buffer: &mut PhaseState, len: usize) {
    if buffer.len() != len {
        *buffer = PhaseState::zeros(len);
    }
}
