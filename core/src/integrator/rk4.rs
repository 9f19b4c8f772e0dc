use std::mem;

use horizon_types::PhaseState;

use super::{IntegrationError, Integrator, IntegratorKind, StepStats, check_interval, ensure_len};
use crate::gravity::Dynamics;

/// Classic fourth-order Runge-Kutta with a fixed number of steps per interval.
#[derive(Debug)]
pub struct RungeKutta4 {
    substeps: u32,
    k1: PhaseState,
    k2: PhaseState,
    k3: PhaseState,
    k4: PhaseState,
    stage: PhaseState,
}

impl RungeKutta4 {
    #[must_use]
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps: substeps.max(1),
            k1: PhaseState::default(),
            k2: PhaseState::default(),
            k3: PhaseState::default(),
            k4: PhaseState::default(),
            stage: PhaseState::default(),
        }
    }

    fn step(&mut self, dynamics: &dyn Dynamics, state: &mut PhaseState, h: f64) {
        let Self {
            ref mut k1,
            ref mut k2,
            ref mut k3,
            ref mut k4,
            ref mut stage,
            ..
        } = *self;

        dynamics.derivatives(state, k1);
        stage.set_linear_combination(state, &[(0.5 * h, &*k1)]);
        dynamics.derivatives(stage, k2);
        stage.set_linear_combination(state, &[(0.5 * h, &*k2)]);
        dynamics.derivatives(stage, k3);
        stage.set_linear_combination(state, &[(h, &*k3)]);
        dynamics.derivatives(stage, k4);

        stage.set_linear_combination(
            state,
            &[
                (h / 6.0, &*k1),
                (h / 3.0, &*k2),
                (h / 3.0, &*k3),
                (h / 6.0, &*k4),
            ],
        );
        mem::swap(state, stage);
    }
}

impl Integrator for RungeKutta4 {
    fn kind(&self) -> IntegratorKind {
        IntegratorKind::RungeKutta4
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

        for buffer in [
            &mut self.k1,
            &mut self.k2,
            &mut self.k3,
            &mut self.k4,
            &mut self.stage,
        ] {
            ensure_len(buffer, state.len());
        }

        let h = (t1 - t0) / f64::from(self.substeps);
        for n in 0..self.substeps {
            self.step(dynamics, state, h);
            stats.accepted += 1;
            stats.evaluations += 4;
            if !state.is_finite() {
                return Err(IntegrationError::NonFinite {
                    t: t0 + h * f64::from(n + 1),
                });
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use horizon_types::{PhaseState, Vec3};

    use super::RungeKutta4;
    use crate::gravity::Dynamics;
    use crate::integrator::Integrator;

    struct Spring;

    impl Dynamics for Spring {
        fn body_count(&self) -> usize {
            1
        }

        fn drift_coefficient(&self) -> f64 {
            1.0
        }

        fn accelerations(&self, positions: &[Vec3], out: &mut [Vec3]) {
            for (a, r) in out.iter_mut().zip(positions) {
                *a = -*r;
            }
        }
    }

    fn error_after(substeps: u32) -> f64 {
        let mut state = PhaseState::zeros(1);
        state.positions[0] = Vec3::new(1.0, 0.0, 0.0);
        RungeKutta4::new(substeps)
            .advance(&Spring, &mut state, 0.0, 2.0)
            .expect("oscillator integrates");
        (state.positions[0].x - 2.0_f64.cos()).abs()
    }

    #[test]
    fn error_shrinks_at_fourth_order() {
        let coarse = error_after(10);
        let fine = error_after(20);
        let ratio = coarse / fine;
        assert!((12.0..20.0).contains(&ratio), "ratio = {ratio}");
    }

    #[test]
    fn zero_substeps_still_steps_once() {
        let mut state = PhaseState::zeros(1);
        state.positions[0] = Vec3::new(1.0, 0.0, 0.0);
        let stats = RungeKutta4::new(0)
            .advance(&Spring, &mut state, 0.0, 0.1)
            .expect("oscillator integrates");
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.evaluations, 4);
    }
}
