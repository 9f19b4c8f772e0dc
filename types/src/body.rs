use serde::{Deserialize, Serialize};

use crate::Vec3;

/// What a body represents. Only affects rendering and reporting; physics
/// treats every body as a point mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    #[default]
    Star,
    BlackHole,
    Planet,
}

impl BodyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::BlackHole => "black_hole",
            BodyKind::Planet => "planet",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BodyKind::Star => "Star",
            BodyKind::BlackHole => "Black hole",
            BodyKind::Planet => "Planet",
        }
    }
}

/// A point mass with its initial conditions (mass in solar masses).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    pub mass: f64,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Body {
    #[must_use]
    pub fn new(kind: BodyKind, mass: f64, position: Vec3, velocity: Vec3) -> Self {
        Self {
            kind,
            mass,
            position,
            velocity,
        }
    }

    #[must_use]
    pub fn at_rest(kind: BodyKind, mass: f64, position: Vec3) -> Self {
        Self::new(kind, mass, position, Vec3::ZERO)
    }
}
