//! Run driver: generate bodies, integrate to each output time, summarize.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use horizon_types::{Body, BodyKind, ParamError, PhaseState, SimulationParams, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::diagnostics::{ConservationReport, Invariants};
use crate::gravity::GravityModel;
use crate::integrator::{IntegrationError, IntegratorKind, IntegratorSettings, StepStats};
use crate::scenario::{self, ScenarioError};
use crate::stability::{self, DEFAULT_DRIFT_TOLERANCE, StabilityReport};
use crate::units::Normalization;

/// Output frames per run.
pub const DEFAULT_SAMPLES: usize = 300;
/// Fewest frames that still span the interval.
pub const MIN_SAMPLES: usize = 2;
/// Most frames a run may request.
pub const MAX_SAMPLES: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub integrator: IntegratorSettings,
    pub samples: usize,
    pub drift_tolerance: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            integrator: IntegratorSettings::default(),
            samples: DEFAULT_SAMPLES,
            drift_tolerance: DEFAULT_DRIFT_TOLERANCE,
        }
    }
}

/// Reported to the observer while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Bodies are generated; integration is about to start.
    Initialized {
        bodies: usize,
        integrator: IntegratorKind,
    },
    /// `done` of `total` frames are recorded.
    Frame { done: usize, total: usize },
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),
    #[error("cannot generate initial conditions: {0}")]
    Scenario(#[from] ScenarioError),
    #[error("integration failed before frame {frame}: {source}")]
    Integration {
        frame: usize,
        #[source]
        source: IntegrationError,
    },
    #[error("simulation cancelled")]
    Cancelled,
    #[error("run produced no frames")]
    NoFrames,
}

/// A finished run: sampled trajectories plus its diagnostics.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub params: SimulationParams,
    pub integrator: IntegratorKind,
    pub normalization: Normalization,
    /// Initial conditions.
    pub bodies: Vec<Body>,
    pub times: Vec<f64>,
    /// `frames[k][i]` is the position of body `i` at `times[k]`.
    pub frames: Vec<Vec<Vec3>>,
    pub invariants: Vec<Invariants>,
    pub stats: StepStats,
    pub conservation: ConservationReport,
    pub stability: StabilityReport,
    pub elapsed: Duration,
}

impl SimulationRun {
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn positions_at(&self, frame: usize) -> Option<&[Vec3]> {
        self.frames.get(frame).map(Vec::as_slice)
    }

    #[must_use]
    pub fn time_at(&self, frame: usize) -> Option<f64> {
        self.times.get(frame).copied()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<BodyKind> {
        self.bodies.iter().map(|b| b.kind).collect()
    }

    /// Half-width of the viewing cube for this scenario.
    #[must_use]
    pub fn extent(&self) -> f64 {
        scenario::view_extent(&self.params)
    }
}

/// `samples` evenly spaced times from 0 to `end`, both included.
#[must_use]
pub fn output_times(end: f64, samples: usize) -> Vec<f64> {
    let samples = samples.max(MIN_SAMPLES);
    let last = (samples - 1) as f64;
    (0..samples)
        .map(|k| {
            if k + 1 == samples {
                end
            } else {
                end * k as f64 / last
            }
        })
        .collect()
}

/// Run the whole pipeline for `params`.
///
/// `observer` sees every [`Progress`] event and may stop the run by returning
/// [`ControlFlow::Break`], which yields [`SimulationError::Cancelled`].
pub fn simulate<F>(
    params: &SimulationParams,
    settings: &SimulationSettings,
    mut observer: F,
) -> Result<SimulationRun, SimulationError>
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let started = Instant::now();
    params.validate()?;

    let normalization = Normalization::new(params.gravity.value());
    let bodies = scenario::generate(params)?;
    let gravity = GravityModel::from_bodies(&bodies, normalization, params.softening);
    let kind = settings.integrator.kind;
    info!(
        scenario = params.scenario.as_str(),
        bodies = bodies.len(),
        seed = params.seed,
        integrator = kind.as_str(),
        "Starting simulation"
    );

    if observer(Progress::Initialized {
        bodies: bodies.len(),
        integrator: kind,
    })
    .is_break()
    {
        return Err(SimulationError::Cancelled);
    }

    let times = output_times(params.time_span, settings.samples);
    let total = times.len();
    let mut state = PhaseState::from_bodies(&bodies);
    let mut integrator = settings.integrator.build();
    let mut frames = Vec::with_capacity(total);
    let mut invariants = Vec::with_capacity(total);
    let mut stats = StepStats::default();

    frames.push(state.positions.clone());
    invariants.push(Invariants::measure(&gravity, &state));
    if observer(Progress::Frame { done: 1, total }).is_break() {
        return Err(SimulationError::Cancelled);
    }

    for (frame, window) in times.windows(2).enumerate() {
        let step = integrator
            .advance(&gravity, &mut state, window[0], window[1])
            .map_err(|source| SimulationError::Integration {
                frame: frame + 1,
                source,
            })?;
        debug!(
            frame = frame + 1,
            t = window[1],
            accepted = step.accepted,
            rejected = step.rejected,
            "Interval integrated"
        );
        stats += step;
        frames.push(state.positions.clone());
        invariants.push(Invariants::measure(&gravity, &state));

        if observer(Progress::Frame {
            done: frame + 2,
            total,
        })
        .is_break()
        {
            return Err(SimulationError::Cancelled);
        }
    }

    let conservation = ConservationReport::from_series(&invariants)
        .ok_or(SimulationError::NoFrames)?;
    let kinds: Vec<BodyKind> = bodies.iter().map(|b| b.kind).collect();
    let stability = stability::classify(
        &gravity,
        &kinds,
        &state,
        conservation.max_energy_drift,
        settings.drift_tolerance,
    );
    let elapsed = started.elapsed();

    info!(
        frames = frames.len(),
        accepted = stats.accepted,
        rejected = stats.rejected,
        energy_drift = conservation.energy_drift,
        verdict = stability.verdict.label(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Simulation finished"
    );

    Ok(SimulationRun {
        params: *params,
        integrator: kind,
        normalization,
        bodies,
        times,
        frames,
        invariants,
        stats,
        conservation,
        stability,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use horizon_types::{ParamError, Scenario, SimulationParams};

    use super::{Progress, SimulationError, SimulationSettings, output_times, simulate};
    use crate::integrator::IntegratorKind;
    use crate::scenario::view_extent;
    use crate::stability::Verdict;

    fn quick_settings() -> SimulationSettings {
        SimulationSettings {
            samples: 40,
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn output_times_span_the_interval() {
        let times = output_times(15.0, 300);
        assert_eq!(times.len(), 300);
        assert_eq!(times[0], 0.0);
        assert_eq!(times[299], 15.0);
        assert!(times.windows(2).all(|w| w[1] > w[0]));

        assert_eq!(output_times(2.0, 0), vec![0.0, 2.0]);
    }

    #[test]
    fn binary_run_records_every_frame() {
        let params = SimulationParams {
            scenario: Scenario::BinaryPlanet,
            time_span: 2.0,
            ..SimulationParams::default()
        };
        let mut events = Vec::new();
        let run = simulate(&params, &quick_settings(), |p| {
            events.push(p);
            ControlFlow::Continue(())
        })
        .expect("binary run succeeds");

        assert_eq!(run.frame_count(), 40);
        assert_eq!(run.times.len(), 40);
        assert_eq!(run.invariants.len(), 40);
        assert_eq!(run.body_count(), 3);
        assert!(run.frames.iter().all(|f| f.len() == 3));
        assert_eq!(run.positions_at(0).unwrap()[0], run.bodies[0].position);
        assert!(run.positions_at(40).is_none());
        assert_eq!(run.integrator, IntegratorKind::DormandPrince);
        assert!(run.conservation.max_energy_drift < 1e-2);
        assert_ne!(run.stability.verdict, Verdict::Unreliable);

        assert_eq!(
            events.first(),
            Some(&Progress::Initialized {
                bodies: 3,
                integrator: IntegratorKind::DormandPrince
            })
        );
        assert_eq!(events.last(), Some(&Progress::Frame { done: 40, total: 40 }));
    }

    #[test]
    fn extent_stays_fixed_when_bodies_escape() {
        let params = SimulationParams {
            body_count: 12,
            time_span: 5.0,
            disk_radius: 2.0,
            ..SimulationParams::default()
        }
        .with_seed(7);
        let run = simulate(&params, &quick_settings(), |_| ControlFlow::Continue(())).unwrap();

        assert_eq!(run.extent(), view_extent(&params));
        assert_eq!(run.extent(), 3.0);

        let binary = SimulationParams {
            scenario: Scenario::BinaryPlanet,
            time_span: 1.0,
            ..SimulationParams::default()
        };
        let run = simulate(&binary, &quick_settings(), |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(run.extent(), 2.0);
    }

    #[test]
    fn same_seed_reproduces_trajectories() {
        let params = SimulationParams {
            body_count: 8,
            time_span: 1.0,
            ..SimulationParams::default()
        }
        .with_seed(99);
        let a = simulate(&params, &quick_settings(), |_| ControlFlow::Continue(())).unwrap();
        let b = simulate(&params, &quick_settings(), |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(a.frames, b.frames);
    }

    #[test]
    fn observer_can_cancel() {
        let params = SimulationParams {
            body_count: 5,
            time_span: 1.0,
            ..SimulationParams::default()
        };
        let mut seen = 0;
        let result = simulate(&params, &quick_settings(), |p| {
            if let Progress::Frame { done, .. } = p {
                seen = done;
                if done == 5 {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        });
        assert!(matches!(result, Err(SimulationError::Cancelled)));
        assert_eq!(seen, 5);
    }

    #[test]
    fn invalid_params_are_rejected_before_work() {
        let params = SimulationParams {
            softening: 0.0,
            ..SimulationParams::default()
        };
        let mut called = false;
        let err = simulate(&params, &quick_settings(), |_| {
            called = true;
            ControlFlow::Continue(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Params(ParamError::OutOfRange { .. })
        ));
        assert!(!called);
    }
}
