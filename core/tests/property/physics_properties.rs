use horizon_core::gravity::{Dynamics, GravityModel};
use horizon_core::integrator::{IntegratorKind, IntegratorSettings};
use horizon_core::scenario::{self, BLACK_HOLE_MASS, DISK_HALF_THICKNESS, MIN_DISK_RADIUS};
use horizon_core::units::Normalization;
use horizon_types::{
    BodyKind, Direction, GravityPreset, ParamField, PhaseState, SimulationParams, Vec3,
};
use proptest::prelude::*;

fn vec3(range: f64) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn system(max: usize) -> impl Strategy<Value = (Vec<f64>, PhaseState)> {
    (2..=max).prop_flat_map(|n| {
        (
            prop::collection::vec(0.1f64..5.0, n),
            prop::collection::vec(vec3(3.0), n),
            prop::collection::vec(vec3(0.2), n),
        )
            .prop_map(|(masses, positions, velocities)| {
                (masses, PhaseState {
                    positions,
                    velocities,
                })
            })
    })
}

fn momentum(masses: &[f64], state: &PhaseState) -> Vec3 {
    state
        .velocities
        .iter()
        .zip(masses)
        .fold(Vec3::ZERO, |acc, (v, m)| acc + *v * *m)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn vortex_bodies_respect_disk_geometry(
        seed in any::<u64>(),
        n in 2usize..=60,
        radius in 1.0f64..=10.0,
        strength in 0.0f64..=2.5,
        black_hole in any::<bool>(),
    ) {
        let params = SimulationParams {
            body_count: n,
            disk_radius: radius,
            vortex_strength: strength,
            central_black_hole: black_hole,
            seed,
            ..SimulationParams::default()
        };
        let bodies = scenario::generate(&params).unwrap();
        prop_assert_eq!(bodies.len(), n);
        prop_assert_eq!(&bodies, &scenario::generate(&params).unwrap());

        for (i, body) in bodies.iter().enumerate() {
            if i == 0 && black_hole {
                prop_assert_eq!(body.kind, BodyKind::BlackHole);
                prop_assert_eq!(body.mass, BLACK_HOLE_MASS);
                prop_assert_eq!(body.position, Vec3::ZERO);
                continue;
            }
            let planar = body.position.x.hypot(body.position.y);
            prop_assert!(planar >= MIN_DISK_RADIUS - 1e-12 && planar <= radius + 1e-12);
            prop_assert!(body.position.z.abs() <= DISK_HALF_THICKNESS);
            let radial = body.position.x * body.velocity.x + body.position.y * body.velocity.y;
            prop_assert!(radial.abs() < 1e-9 * (1.0 + planar));
        }
    }

    #[test]
    fn internal_forces_cancel((masses, state) in system(12), softening in 0.01f64..0.5) {
        let gravity = GravityModel::new(masses.clone(), Normalization::new(6.67e-11), softening);
        let mut acc = vec![Vec3::ZERO; state.len()];
        gravity.accelerations(&state.positions, &mut acc);
        let net = acc.iter().zip(&masses).fold(Vec3::ZERO, |sum, (a, m)| sum + *a * *m);
        let scale = acc.iter().zip(&masses).map(|(a, m)| a.norm() * m).sum::<f64>();
        prop_assert!(net.norm() <= 1e-12 * (1.0 + scale));
    }

    #[test]
    fn integrators_conserve_momentum(
        (masses, start) in system(6),
        kind in prop::sample::select(IntegratorKind::ALL.to_vec()),
    ) {
        let gravity = GravityModel::new(masses.clone(), Normalization::new(6.67e-11), 0.15);
        let mut state = start.clone();
        let settings = IntegratorSettings {
            substeps: 50,
            ..IntegratorSettings::default()
        }
        .with_kind(kind);
        settings.build().advance(&gravity, &mut state, 0.0, 0.5).unwrap();
        let p0 = momentum(&masses, &start);
        let p1 = momentum(&masses, &state);
        prop_assert!((p1 - p0).norm() < 1e-9, "{kind}: {p0} -> {p1}");
    }

    #[test]
    fn adjusting_never_leaves_valid_ranges(
        steps in prop::collection::vec(
            (prop::sample::select(ParamField::ALL.to_vec()), any::<bool>()),
            0..200,
        ),
    ) {
        let mut params = SimulationParams::default();
        for (field, up) in steps {
            let direction = if up { Direction::Increase } else { Direction::Decrease };
            params.adjust(field, direction);
            prop_assert!(params.validate().is_ok(), "{field}: {params:?}");
        }
        prop_assert!(GravityPreset::ALL.contains(&params.gravity));
    }
}
