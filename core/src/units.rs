//! Normalization layer.
//!
//! The equations of motion are integrated in dimensionless units anchored to
//! the Alpha Centauri system. With `r = R_ND·r'`, `v = V_ND·v'`, `t = T_ND·t'`
//! and masses in solar masses:
//!
//! ```text
//! dr'/dt' = K2 · v'
//! dv'/dt' = K1 · Σ mⱼ (r'ⱼ − r'ᵢ) / |r'ⱼ − r'ᵢ|³
//! ```

use serde::{Deserialize, Serialize};

/// Solar mass in kg.
pub const M_ND: f64 = 1.989e30;
/// Reference length in m (Alpha Centauri A/B separation scale).
pub const R_ND: f64 = 5.326e12;
/// Reference velocity in m/s (Earth's orbital speed).
pub const V_ND: f64 = 30_000.0;
/// Reference time in s (half of Alpha Centauri's orbital period, 79.91 years).
pub const T_ND: f64 = 79.91 * 365.0 * 24.0 * 3600.0 * 0.51;

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;
const METERS_PER_AU: f64 = 1.495_978_707e11;

/// Coefficients of the dimensionless equations for a given G.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Gravitational constant in SI units.
    pub g: f64,
    /// Acceleration coefficient `G·T·M / (R²·V)`.
    pub k1: f64,
    /// Drift coefficient `V·T / R`.
    pub k2: f64,
}

impl Normalization {
    #[must_use]
    pub fn new(g: f64) -> Self {
        Self {
            g,
            k1: g * T_ND * M_ND / (R_ND * R_ND * V_ND),
            k2: V_ND * T_ND / R_ND,
        }
    }

    #[must_use]
    pub fn to_seconds(t: f64) -> f64 {
        t * T_ND
    }

    #[must_use]
    pub fn to_years(t: f64) -> f64 {
        Self::to_seconds(t) / SECONDS_PER_YEAR
    }

    #[must_use]
    pub fn to_meters(r: f64) -> f64 {
        r * R_ND
    }

    #[must_use]
    pub fn to_au(r: f64) -> f64 {
        Self::to_meters(r) / METERS_PER_AU
    }

    #[must_use]
    pub fn to_meters_per_second(v: f64) -> f64 {
        v * V_ND
    }
}
