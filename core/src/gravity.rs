//! Softened Newtonian gravity between point masses.

use horizon_types::{Body, PhaseState, Vec3};

use crate::units::Normalization;

/// Separable equations of motion: `ṙ = c·v` and `v̇ = a(r)`.
///
/// Every integrator is written against this trait. Leapfrog relies on the
/// separation; the Runge-Kutta methods only use [`Dynamics::derivatives`].
pub trait Dynamics {
    fn body_count(&self) -> usize;

    /// The `c` in `ṙ = c·v`.
    fn drift_coefficient(&self) -> f64;

    /// Write the acceleration of every body into `out`.
    fn accelerations(&self, positions: &[Vec3], out: &mut [Vec3]);

    fn derivatives(&self, state: &PhaseState, out: &mut PhaseState) {
        let c = self.drift_coefficient();
        for (dr, v) in out.positions.iter_mut().zip(&state.velocities) {
            *dr = *v * c;
        }
        self.accelerations(&state.positions, &mut out.velocities);
    }
}

/// Pairwise gravity with Plummer softening `ε`:
/// `aᵢ = Σ_{j≠i} K1·mⱼ·(rⱼ − rᵢ) / (|rⱼ − rᵢ|² + ε²)^{3/2}`.
#[derive(Debug, Clone)]
pub struct GravityModel {
    masses: Vec<f64>,
    k1: f64,
    k2: f64,
    softening: f64,
}

impl GravityModel {
    #[must_use]
    pub fn new(masses: Vec<f64>, normalization: Normalization, softening: f64) -> Self {
        debug_assert!(softening > 0.0, "softening must be positive");
        Self {
            masses,
            k1: normalization.k1,
            k2: normalization.k2,
            softening,
        }
    }

    #[must_use]
    pub fn from_bodies(bodies: &[Body], normalization: Normalization, softening: f64) -> Self {
        Self::new(
            bodies.iter().map(|b| b.mass).collect(),
            normalization,
            softening,
        )
    }

    #[must_use]
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    #[must_use]
    pub fn k1(&self) -> f64 {
        self.k1
    }

    #[must_use]
    pub fn k2(&self) -> f64 {
        self.k2
    }

    #[must_use]
    pub fn softening(&self) -> f64 {
        self.softening
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Softened distance `sqrt(|d|² + ε²)`.
    #[must_use]
    pub fn softened_distance(&self, separation: Vec3) -> f64 {
        (separation.norm_squared() + self.softening * self.softening).sqrt()
    }

    /// `½·K2·Σ mᵢ|vᵢ|²`. Paired with [`Self::potential_energy`] this is the
    /// quantity the continuous equations conserve.
    #[must_use]
    pub fn kinetic_energy(&self, velocities: &[Vec3]) -> f64 {
        0.5 * self.k2
            * self
                .masses
                .iter()
                .zip(velocities)
                .map(|(m, v)| m * v.norm_squared())
                .sum::<f64>()
    }

    /// `−K1·Σ_{i<j} mᵢmⱼ / sqrt(|rᵢⱼ|² + ε²)`.
    #[must_use]
    pub fn potential_energy(&self, positions: &[Vec3]) -> f64 {
        let mut total = 0.0;
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let dist = self.softened_distance(positions[j] - positions[i]);
                total -= self.masses[i] * self.masses[j] / dist;
            }
        }
        self.k1 * total
    }

    /// Potential per unit mass felt by body `i`: `−K1·Σ_{j≠i} mⱼ / sqrt(|rᵢⱼ|² + ε²)`.
    #[must_use]
    pub fn specific_potential(&self, positions: &[Vec3], i: usize) -> f64 {
        let total: f64 = positions
            .iter()
            .zip(&self.masses)
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, (r, m))| m / self.softened_distance(*r - positions[i]))
            .sum();
        -self.k1 * total
    }
}

impl Dynamics for GravityModel {
    fn body_count(&self) -> usize {
        self.masses.len()
    }

    fn drift_coefficient(&self) -> f64 {
        self.k2
    }

    fn accelerations(&self, positions: &[Vec3], out: &mut [Vec3]) {
        out.fill(Vec3::ZERO);
        let eps2 = self.softening * self.softening;
        // Each pair once; Newton's third law gives the partner's share.
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let diff = positions[j] - positions[i];
                let dist2 = diff.norm_squared() + eps2;
                let inv_dist3 = 1.0 / (dist2 * dist2.sqrt());
                let pull = diff * (self.k1 * inv_dist3);
                out[i] += pull * self.masses[j];
                out[j] -= pull * self.masses[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_types::{PhaseState, Vec3};

    use super::{Dynamics, GravityModel};
    use crate::units::Normalization;

    fn model(masses: Vec<f64>, softening: f64) -> GravityModel {
        GravityModel::new(masses, Normalization::new(6.67e-11), softening)
    }

    #[test]
    fn equal_masses_attract_symmetrically() {
        let gravity = model(vec![1.0, 1.0], 0.01);
        let positions = [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        let mut acc = [Vec3::ZERO; 2];
        gravity.accelerations(&positions, &mut acc);

        assert!(acc[0].x > 0.0, "left body pulled right");
        assert!(acc[1].x < 0.0, "right body pulled left");
        assert!((acc[0] + acc[1]).norm() < 1e-15);
        assert_eq!(acc[0].y, 0.0);

        // Inverse square at separation 2 (softening negligible).
        let expected = gravity.k1() / 4.0;
        assert!((acc[0].x - expected).abs() / expected < 1e-4);
    }

    #[test]
    fn heavier_partner_pulls_harder() {
        let gravity = model(vec![1.0, 50.0], 0.15);
        let positions = [Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO];
        let mut acc = [Vec3::ZERO; 2];
        gravity.accelerations(&positions, &mut acc);
        assert!((acc[0].norm() / acc[1].norm() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn softening_bounds_coincident_bodies() {
        let gravity = model(vec![1.0, 1.0], 0.15);
        let positions = [Vec3::ZERO, Vec3::ZERO];
        let mut acc = [Vec3::ZERO; 2];
        gravity.accelerations(&positions, &mut acc);
        assert!(acc.iter().all(|a| a.is_finite()));
        assert_eq!(acc[0], Vec3::ZERO);
        assert!(gravity.potential_energy(&positions).is_finite());
    }

    #[test]
    fn derivatives_scale_velocity_by_drift() {
        let gravity = model(vec![1.0, 1.0], 0.15);
        let mut state = PhaseState::zeros(2);
        state.positions[1] = Vec3::new(1.0, 0.0, 0.0);
        state.velocities[0] = Vec3::new(0.0, 1.0, 0.0);
        let mut out = PhaseState::zeros(2);
        gravity.derivatives(&state, &mut out);
        assert_eq!(out.positions[0], Vec3::new(0.0, gravity.k2(), 0.0));
        assert!(out.velocities[0].x > 0.0);
    }

    #[test]
    fn energies_have_expected_signs() {
        let gravity = model(vec![2.0, 3.0], 0.1);
        let positions = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let velocities = [Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO];
        assert!(gravity.potential_energy(&positions) < 0.0);
        assert!((gravity.kinetic_energy(&velocities) - gravity.k2()).abs() < 1e-12);

        let phi0 = gravity.specific_potential(&positions, 0);
        let expected = -gravity.k1() * 3.0 / gravity.softened_distance(positions[1]);
        assert!((phi0 - expected).abs() < 1e-12);
    }
}
