//! Conserved quantities and how well a run preserved them.

use horizon_types::{PhaseState, Vec3};
use serde::{Deserialize, Serialize};

use crate::gravity::GravityModel;

/// Conserved quantities of one snapshot, in dimensionless units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Invariants {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
    pub momentum: Vec3,
    pub angular_momentum: Vec3,
    pub center_of_mass: Vec3,
}

impl Invariants {
    #[must_use]
    pub fn measure(gravity: &GravityModel, state: &PhaseState) -> Self {
        let kinetic = gravity.kinetic_energy(&state.velocities);
        let potential = gravity.potential_energy(&state.positions);

        let mut momentum = Vec3::ZERO;
        let mut angular_momentum = Vec3::ZERO;
        let mut weighted = Vec3::ZERO;
        for ((r, v), &m) in state
            .positions
            .iter()
            .zip(&state.velocities)
            .zip(gravity.masses())
        {
            momentum += *v * m;
            angular_momentum += r.cross(*v * m);
            weighted += *r * m;
        }
        let total_mass = gravity.total_mass();
        let center_of_mass = if total_mass > 0.0 {
            weighted / total_mass
        } else {
            Vec3::ZERO
        };

        Self {
            kinetic,
            potential,
            total: kinetic + potential,
            momentum,
            angular_momentum,
            center_of_mass,
        }
    }
}

/// Relative change `|x − x₀| / |x₀|`, or the absolute change when `x₀ == 0`.
#[must_use]
pub fn relative_drift(initial: f64, current: f64) -> f64 {
    let delta = (current - initial).abs();
    if initial == 0.0 {
        delta
    } else {
        delta / initial.abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConservationReport {
    pub initial: Invariants,
    #[serde(rename = "final")]
    pub last: Invariants,
    /// Relative energy drift at the last frame.
    pub energy_drift: f64,
    /// Largest relative energy drift over every frame.
    pub max_energy_drift: f64,
    /// `|P − P₀|` at the last frame.
    pub momentum_drift: f64,
    /// `|L − L₀|` at the last frame.
    pub angular_momentum_drift: f64,
}

impl ConservationReport {
    /// Summarize a per-frame series. Returns `None` for an empty series.
    #[must_use]
    pub fn from_series(series: &[Invariants]) -> Option<Self> {
        let initial = *series.first()?;
        let last = *series.last()?;
        let max_energy_drift = series
            .iter()
            .map(|inv| relative_drift(initial.total, inv.total))
            .fold(0.0, f64::max);

        Some(Self {
            initial,
            last,
            energy_drift: relative_drift(initial.total, last.total),
            max_energy_drift,
            momentum_drift: (last.momentum - initial.momentum).norm(),
            angular_momentum_drift: (last.angular_momentum - initial.angular_momentum).norm(),
        })
    }
}
