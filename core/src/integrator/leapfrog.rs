use horizon_types::{PhaseState, Vec3};

use super::{IntegrationError, Integrator, IntegratorKind, StepStats, check_interval};
use crate::gravity::Dynamics;

/// Kick-drift-kick leapfrog. Symplectic, so energy error stays bounded
/// instead of drifting, at second-order accuracy.
#[derive(Debug)]
pub struct Leapfrog {
    substeps: u32,
    accel: Vec<Vec3>,
}

impl Leapfrog {
    #[must_use]
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps: substeps.max(1),
            accel: Vec::new(),
        }
    }

    fn kick(&self, state: &mut PhaseState, dt: f64) {
        for (v, a) in state.velocities.iter_mut().zip(&self.accel) {
            *v += *a * dt;
        }
    }
}

impl Integrator for Leapfrog {
    fn kind(&self) -> IntegratorKind {
        IntegratorKind::Leapfrog
    }

    fn advance(
        &mut self,
        dynamics: &dyn Dynamics,
        state: &mut PhaseState,
        t0: f64,
        t1: f64,
    ) -> Result<StepStats, IntegrationError> {
        check_interval(t0, t1)?;
        let mut stats = StepStats::default();
        if t1 == t0 {
            return Ok(stats);
        }

        self.accel.resize(state.len(), Vec3::ZERO);
        dynamics.accelerations(&state.positions, &mut self.accel);
        stats.evaluations += 1;

        let h = (t1 - t0) / f64::from(self.substeps);
        let c = dynamics.drift_coefficient();
        for n in 0..self.substeps {
            self.kick(state, 0.5 * h);
            for (r, v) in state.positions.iter_mut().zip(&state.velocities) {
                *r += *v * (c * h);
            }
            dynamics.accelerations(&state.positions, &mut self.accel);
            self.kick(state, 0.5 * h);
            stats.accepted += 1;
            stats.evaluations += 1;

            if !state.is_finite() {
                return Err(IntegrationError::NonFinite {
                    t: t0 + h * f64::from(n + 1),
                });
            }
        }
        Ok(stats)
    }
}
