//! Initial conditions for each scenario.

use std::f64::consts::TAU;

use horizon_types::{Body, BodyKind, Scenario, SimulationParams, Vec3};
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use thiserror::Error;

/// Mass of the central black hole in solar masses.
pub const BLACK_HOLE_MASS: f64 = 50.0;

/// Innermost radius a disk star can be placed at.
pub const MIN_DISK_RADIUS: f64 = 0.5;

/// Half-thickness of the disk.
pub const DISK_HALF_THICKNESS: f64 = 0.2;

/// Bound on the random vertical velocity.
pub const VERTICAL_JITTER: f64 = 0.02;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScenarioError {
    #[error("cannot sample {what} from [{min}, {max})")]
    EmptyRange {
        what: &'static str,
        min: f64,
        max: f64,
    },
    #[error("scenario needs at least {needed} bodies, got {got}")]
    TooFewBodies { needed: usize, got: usize },
}

/// A fresh seed. Stays within 32 bits so it fits a TOML integer and is short
/// enough to type back in with `--seed`.
#[must_use]
pub fn random_seed() -> u64 {
    u64::from(rand::random::<u32>())
}

/// Bodies for `params`, drawn from an RNG seeded with `params.seed`.
pub fn generate(params: &SimulationParams) -> Result<Vec<Body>, ScenarioError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    generate_with(params, &mut rng)
}

/// Bodies for `params`, drawing randomness from `rng`.
pub fn generate_with(
    params: &SimulationParams,
    rng: &mut StdRng,
) -> Result<Vec<Body>, ScenarioError> {
    match params.scenario {
        Scenario::Vortex => vortex(params, rng),
        Scenario::BinaryPlanet => Ok(binary_planet()),
    }
}

fn uniform(what: &'static str, min: f64, max: f64) -> Result<Uniform<f64>, ScenarioError> {
    Uniform::new(min, max).map_err(|_| ScenarioError::EmptyRange { what, min, max })
}

/// Flattened disk on tangential orbits, with an optional heavy body at rest
/// in the centre.
fn vortex(params: &SimulationParams, rng: &mut StdRng) -> Result<Vec<Body>, ScenarioError> {
    let n = params.body_count;
    let needed = if params.central_black_hole { 2 } else { 1 };
    if n < needed {
        return Err(ScenarioError::TooFewBodies { needed, got: n });
    }

    let radius_dist = uniform("radius", MIN_DISK_RADIUS, params.disk_radius)?;
    let angle_dist = uniform("angle", 0.0, TAU)?;
    let z_dist = uniform("height", -DISK_HALF_THICKNESS, DISK_HALF_THICKNESS)?;
    let vz_dist = uniform("vertical velocity", -VERTICAL_JITTER, VERTICAL_JITTER)?;

    let mut masses = vec![params.mass_mean; n];
    if params.central_black_hole {
        masses[0] = BLACK_HOLE_MASS;
    }
    // The circular speed uses the mean over all bodies, black hole included.
    let mean_mass = masses.iter().sum::<f64>() / n as f64;

    let mut bodies = Vec::with_capacity(n);
    for (i, &mass) in masses.iter().enumerate() {
        if i == 0 && params.central_black_hole {
            bodies.push(Body::at_rest(BodyKind::BlackHole, mass, Vec3::ZERO));
            continue;
        }

        let radius = radius_dist.sample(rng);
        let angle = angle_dist.sample(rng);
        let (sin, cos) = angle.sin_cos();
        let position = Vec3::new(radius * cos, radius * sin, z_dist.sample(rng));

        let speed = params.vortex_strength * (mean_mass / radius).sqrt();
        let velocity = Vec3::new(-speed * sin, speed * cos, vz_dist.sample(rng));

        bodies.push(Body::new(BodyKind::Star, mass, position, velocity));
    }
    Ok(bodies)
}

/// Alpha Centauri A and B with a light planet between them.
fn binary_planet() -> Vec<Body> {
    vec![
        Body::new(
            BodyKind::Star,
            1.1,
            Vec3::new(-0.5, 0.0, 0.0),
            Vec3::new(0.01, 0.01, 0.0),
        ),
        Body::new(
            BodyKind::Star,
            0.907,
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(-0.05, 0.0, -0.1),
        ),
        Body::new(
            BodyKind::Planet,
            1.0e-3,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -0.01, 0.0),
        ),
    ]
}

/// Half-width of the viewing cube, fixed for the whole run.
#[must_use]
pub fn view_extent(params: &SimulationParams) -> f64 {
    match params.scenario {
        Scenario::Vortex => params.disk_radius * 1.5,
        Scenario::BinaryPlanet => 2.0,
    }
}
