//! Dormand-Prince 5(4) with FSAL and a clamped step controller.

use std::mem;

use horizon_types::PhaseState;
use tracing::trace;

use super::{
    IntegrationError, Integrator, IntegratorKind, StepStats, check_interval, ensure_len,
};
use crate::gravity::Dynamics;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the last stage row, hence FSAL).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between fifth- and fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const UNDERFLOW_FRACTION: f64 = 1e-12;

/// Adaptive embedded Runge-Kutta 5(4).
///
/// The step size is carried across calls so consecutive output intervals
/// don't restart from a cold guess.
#[derive(Debug)]
pub struct DormandPrince {
    rtol: f64,
    atol: f64,
    max_step: Option<f64>,
    max_steps: usize,
    h: Option<f64>,
    k1: PhaseState,
    k2: PhaseState,
    k3: PhaseState,
    k4: PhaseState,
    k5: PhaseState,
    k6: PhaseState,
    k7: PhaseState,
    stage: PhaseState,
    candidate: PhaseState,
}

impl DormandPrince {
    #[must_use]
    pub fn new(rtol: f64, atol: f64, max_step: Option<f64>, max_steps: usize) -> Self {
        Self {
            rtol,
            atol,
            max_step: max_step.filter(|h| h.is_finite() && *h > 0.0),
            max_steps: max_steps.max(1),
            h: None,
            k1: PhaseState::default(),
            k2: PhaseState::default(),
            k3: PhaseState::default(),
            k4: PhaseState::default(),
            k5: PhaseState::default(),
            k6: PhaseState::default(),
            k7: PhaseState::default(),
            stage: PhaseState::default(),
            candidate: PhaseState::default(),
        }
    }

    fn resize(&mut self, len: usize) {
        for buffer in [
            &mut self.k1,
            &mut self.k2,
            &mut self.k3,
            &mut self.k4,
            &mut self.k5,
            &mut self.k6,
            &mut self.k7,
            &mut self.stage,
            &mut self.candidate,
        ] {
            ensure_len(buffer, len);
        }
    }

    /// RMS of `x / (atol + rtol·|y|)` over every component.
    fn weighted_rms(&self, x: &PhaseState, y: &PhaseState) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for (xs, ys) in [
            (&x.positions, &y.positions),
            (&x.velocities, &y.velocities),
        ] {
            for (a, b) in xs.iter().zip(ys) {
                for (xi, yi) in [(a.x, b.x), (a.y, b.y), (a.z, b.z)] {
                    let scale = self.atol + self.rtol * yi.abs();
                    sum += (xi / scale).powi(2);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum / count as f64).sqrt()
        }
    }

    /// RMS of the embedded error estimate, scaled by the larger of the old
    /// and new state.
    fn error_norm(&self, y0: &PhaseState, h: f64) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        let n = y0.len();
        for i in 0..n {
            let err_r = (self.k1.positions[i] * E1
                + self.k3.positions[i] * E3
                + self.k4.positions[i] * E4
                + self.k5.positions[i] * E5
                + self.k6.positions[i] * E6
                + self.k7.positions[i] * E7)
                * h;
            let err_v = (self.k1.velocities[i] * E1
                + self.k3.velocities[i] * E3
                + self.k4.velocities[i] * E4
                + self.k5.velocities[i] * E5
                + self.k6.velocities[i] * E6
                + self.k7.velocities[i] * E7)
                * h;
            for (err, old, new) in [
                (err_r, y0.positions[i], self.candidate.positions[i]),
                (err_v, y0.velocities[i], self.candidate.velocities[i]),
            ] {
                let components = [
                    (err.x, old.x, new.x),
                    (err.y, old.y, new.y),
                    (err.z, old.z, new.z),
                ];
                for (e, a, b) in components {
                    let scale = self.atol + self.rtol * a.abs().max(b.abs());
                    sum += (e / scale).powi(2);
                    count += 1;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum / count as f64).sqrt()
        }
    }

    /// Starting step from the first-derivative heuristic.
    fn initial_step(&self, state: &PhaseState, span: f64) -> f64 {
        let d0 = self.weighted_rms(state, state);
        let d1 = self.weighted_rms(&self.k1, state);
        let h = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        h.min(span)
    }

    /// Fill stages k2..k7 and the fifth-order candidate for step `h`.
    fn attempt(&mut self, dynamics: &dyn Dynamics, y: &PhaseState, h: f64) {
        let Self {
            ref k1,
            ref mut k2,
            ref mut k3,
            ref mut k4,
            ref mut k5,
            ref mut k6,
            ref mut k7,
            ref mut stage,
            ref mut candidate,
            ..
        } = *self;

        stage.set_linear_combination(y, &[(h * A21, k1)]);
        dynamics.derivatives(stage, k2);

        stage.set_linear_combination(y, &[(h * A31, k1), (h * A32, &*k2)]);
        dynamics.derivatives(stage, k3);

        stage.set_linear_combination(
            y,
            &[(h * A41, k1), (h * A42, &*k2), (h * A43, &*k3)],
        );
        dynamics.derivatives(stage, k4);

        stage.set_linear_combination(
            y,
            &[
                (h * A51, k1),
                (h * A52, &*k2),
                (h * A53, &*k3),
                (h * A54, &*k4),
            ],
        );
        dynamics.derivatives(stage, k5);

        stage.set_linear_combination(
            y,
            &[
                (h * A61, k1),
                (h * A62, &*k2),
                (h * A63, &*k3),
                (h * A64, &*k4),
                (h * A65, &*k5),
            ],
        );
        dynamics.derivatives(stage, k6);

        candidate.set_linear_combination(
            y,
            &[
                (h * B1, k1),
                (h * B3, &*k3),
                (h * B4, &*k4),
                (h * B5, &*k5),
                (h * B6, &*k6),
            ],
        );
        dynamics.derivatives(candidate, k7);
    }
}

impl Integrator for DormandPrince {
    fn kind(&self) -> IntegratorKind {
        IntegratorKind::DormandPrince
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
        let span = t1 - t0;
        if span == 0.0 {
            return Ok(stats);
        }

        self.resize(state.len());
        dynamics.derivatives(state, &mut self.k1);
        stats.evaluations += 1;

        let cap = self.max_step.unwrap_or(f64::INFINITY);
        let mut h = match self.h {
            Some(h) => h,
            None => self.initial_step(state, span),
        }
        .min(cap);
        let min_h = UNDERFLOW_FRACTION * span;
        let mut t = t0;
        let mut steps = 0usize;

        while t < t1 {
            if steps >= self.max_steps {
                return Err(IntegrationError::StepLimitExceeded {
                    t,
                    limit: self.max_steps,
                });
            }
            steps += 1;

            let remaining = t1 - t;
            let last = h >= remaining;
            let h_try = if last { remaining } else { h };

            self.attempt(dynamics, state, h_try);
            stats.evaluations += 6;

            let err = if self.candidate.is_finite() {
                self.error_norm(state, h_try)
            } else {
                f64::INFINITY
            };

            if err <= 1.0 {
                mem::swap(state, &mut self.candidate);
                // FSAL: the last stage is the derivative at the new state.
                mem::swap(&mut self.k1, &mut self.k7);
                t = if last { t1 } else { t + h_try };
                stats.accepted += 1;

                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                let proposed = (h_try * factor).min(cap);
                // A final step shortened to hit t1 says nothing about the
                // natural step size, so don't let it shrink the carry-over.
                h = if last && h_try < h {
                    h.max(proposed)
                } else {
                    proposed
                };
            } else {
                stats.rejected += 1;
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h = h_try * factor;
                if h < min_h {
                    trace!(t, h, err, "Dormand-Prince step rejected below minimum");
                    return Err(if err.is_finite() {
                        IntegrationError::StepSizeUnderflow { t, h }
                    } else {
                        IntegrationError::NonFinite { t }
                    });
                }
            }
        }

        self.h = Some(h);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use horizon_types::{PhaseState, Vec3};

    use super::{
        A21, A31, A32, A41, A42, A43, A51, A52, A53, A54, A61, A62, A63, A64, A65, B1, B3, B4, B5,
        B6, DormandPrince, E1, E3, E4, E5, E6, E7,
    };
    use crate::gravity::Dynamics;
    use crate::integrator::{Integrator, StepStats};

    /// Uniform motion: no forces, ṙ = v.
    struct FreeParticle;

    impl Dynamics for FreeParticle {
        fn body_count(&self) -> usize {
            1
        }

        fn drift_coefficient(&self) -> f64 {
            1.0
        }

        fn accelerations(&self, _positions: &[Vec3], out: &mut [Vec3]) {
            out.fill(Vec3::ZERO);
        }
    }

    /// Harmonic oscillator: ẍ = −x.
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

    #[test]
    fn tableau_weights_are_consistent() {
        // Each stage row sums to its node c_i.
        let rows = [
            (A21, 1.0 / 5.0),
            (A31 + A32, 3.0 / 10.0),
            (A41 + A42 + A43, 4.0 / 5.0),
            (A51 + A52 + A53 + A54, 8.0 / 9.0),
            (A61 + A62 + A63 + A64 + A65, 1.0),
        ];
        for (i, (sum, node)) in rows.into_iter().enumerate() {
            assert!((sum - node).abs() < 1e-12, "row {} sums to {sum}", i + 2);
        }

        let b_sum = B1 + B3 + B4 + B5 + B6;
        assert!((b_sum - 1.0).abs() < 1e-14);
        let e_sum = E1 + E3 + E4 + E5 + E6 + E7;
        assert!(e_sum.abs() < 1e-14);
    }

    #[test]
    fn free_particle_moves_exactly() {
        let mut state = PhaseState::zeros(1);
        state.velocities[0] = Vec3::new(1.0, -2.0, 0.5);
        let mut integrator = DormandPrince::new(1e-6, 1e-9, None, 1000);
        integrator
            .advance(&FreeParticle, &mut state, 0.0, 3.0)
            .expect("free motion integrates");
        let want = Vec3::new(3.0, -6.0, 1.5);
        assert!((state.positions[0] - want).norm() < 1e-12);
    }

    #[test]
    fn oscillator_matches_cosine() {
        let mut state = PhaseState::zeros(1);
        state.positions[0] = Vec3::new(1.0, 0.0, 0.0);
        let mut integrator = DormandPrince::new(1e-10, 1e-12, None, 100_000);
        let mut t = 0.0;
        let mut stats = StepStats::default();
        for _ in 0..10 {
            let next = t + 1.0;
            stats += integrator
                .advance(&Spring, &mut state, t, next)
                .expect("oscillator integrates");
            t = next;
        }
        assert!((state.positions[0].x - 10.0_f64.cos()).abs() < 1e-7);
        assert!((state.velocities[0].x + 10.0_f64.sin()).abs() < 1e-7);
        assert!(stats.accepted > 10);
    }

    #[test]
    fn max_step_caps_the_step_size() {
        let mut state = PhaseState::zeros(1);
        state.velocities[0] = Vec3::new(1.0, 0.0, 0.0);
        let mut integrator = DormandPrince::new(1e-6, 1e-9, Some(0.1), 1000);
        let stats = integrator
            .advance(&FreeParticle, &mut state, 0.0, 1.0)
            .expect("free motion integrates");
        assert!(stats.accepted >= 10, "accepted = {}", stats.accepted);
    }
}
