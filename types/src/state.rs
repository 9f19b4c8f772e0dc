use crate::{Body, Vec3};

/// Phase-space state of the whole system: one position and one velocity per body.
///
/// Invariant: `positions.len() == velocities.len()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhaseState {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

impl PhaseState {
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; len],
            velocities: vec![Vec3::ZERO; len],
        }
    }

    #[must_use]
    pub fn from_bodies(bodies: &[Body]) -> Self {
        Self {
            positions: bodies.iter().map(|b| b.position).collect(),
            velocities: bodies.iter().map(|b| b.velocity).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.positions
            .iter()
            .chain(&self.velocities)
            .all(|v| v.is_finite())
    }

    /// `self = base + Σ cᵢ·kᵢ`, componentwise.
    ///
    /// Every state involved must have the same length as `self`.
    pub fn set_linear_combination(&mut self, base: &PhaseState, terms: &[(f64, &PhaseState)]) {
        debug_assert_eq!(self.len(), base.len());
        for i in 0..self.len() {
            let mut r = base.positions[i];
            let mut v = base.velocities[i];
            for (c, k) in terms {
                r += k.positions[i] * *c;
                v += k.velocities[i] * *c;
            }
            self.positions[i] = r;
            self.velocities[i] = v;
        }
    }
}
