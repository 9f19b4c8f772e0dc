//! Classifies each body as bound or escaping from its specific orbital
//! energy in the centre-of-mass frame.

use std::fmt;

use horizon_types::{BodyKind, PhaseState, Vec3};
use serde::{Deserialize, Serialize};

use crate::gravity::GravityModel;

/// Runs whose energy drifted more than this are not trusted.
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 1e-2;

/// Escaping fraction at or above which the system counts as disrupted.
const DISRUPTED_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fate {
    Bound,
    Escaping,
}

impl Fate {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Fate::Bound => "bound",
            Fate::Escaping => "escaping",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyFate {
    pub index: usize,
    pub kind: BodyKind,
    pub fate: Fate,
    /// Distance from the centre of mass.
    pub distance: f64,
    /// Kinetic plus potential energy per unit mass.
    pub specific_energy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every body is bound.
    Stable,
    /// Fewer than half the bodies escape.
    Evaporating,
    /// At least half the bodies escape.
    Disrupted,
    /// Energy drift exceeded the tolerance, so the fates can't be trusted.
    Unreliable,
}

impl Verdict {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Stable => "Stable",
            Verdict::Evaporating => "Evaporating",
            Verdict::Disrupted => "Disrupted",
            Verdict::Unreliable => "Unreliable",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub fates: Vec<BodyFate>,
    pub bound: usize,
    pub escaping: usize,
    pub verdict: Verdict,
}

/// Classify every body in `state`.
///
/// `max_energy_drift` is the worst relative energy error of the run; above
/// `drift_tolerance` the verdict is [`Verdict::Unreliable`] whatever the fates say.
#[must_use]
pub fn classify(
    gravity: &GravityModel,
    kinds: &[BodyKind],
    state: &PhaseState,
    max_energy_drift: f64,
    drift_tolerance: f64,
) -> StabilityReport {
    let masses = gravity.masses();
    let total_mass = gravity.total_mass();
    let (com, v_com) = if total_mass > 0.0 {
        let mut r = Vec3::ZERO;
        let mut v = Vec3::ZERO;
        for ((ri, vi), &m) in state.positions.iter().zip(&state.velocities).zip(masses) {
            r += *ri * m;
            v += *vi * m;
        }
        (r / total_mass, v / total_mass)
    } else {
        (Vec3::ZERO, Vec3::ZERO)
    };

    let fates: Vec<BodyFate> = (0..state.len())
        .map(|i| {
            let v_rel = state.velocities[i] - v_com;
            let specific_energy = 0.5 * gravity.k2() * v_rel.norm_squared()
                + gravity.specific_potential(&state.positions, i);
            BodyFate {
                index: i,
                kind: kinds.get(i).copied().unwrap_or_default(),
                fate: if specific_energy < 0.0 {
                    Fate::Bound
                } else {
                    Fate::Escaping
                },
                distance: (state.positions[i] - com).norm(),
                specific_energy,
            }
        })
        .collect();

    let escaping = fates.iter().filter(|f| f.fate == Fate::Escaping).count();
    let bound = fates.len() - escaping;

    let verdict = if !max_energy_drift.is_finite() || max_energy_drift > drift_tolerance {
        Verdict::Unreliable
    } else if escaping == 0 {
        Verdict::Stable
    } else if (escaping as f64) / (fates.len() as f64) < DISRUPTED_FRACTION {
        Verdict::Evaporating
    } else {
        Verdict::Disrupted
    };

    StabilityReport {
        fates,
        bound,
        escaping,
        verdict,
    }
}
