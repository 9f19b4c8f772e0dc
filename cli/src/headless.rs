//! `eventhorizon simulate`: one run, no terminal UI.

use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use horizon_core::{
    ExportFormat, MAX_SAMPLES, MIN_SAMPLES, Normalization, SimulationRun, SimulationSettings,
    export, simulate,
};
use horizon_engine::AppSettings;
use horizon_types::SimulationParams;
use horizon_utils::{atomic_write, ensure_parent_dir};

use crate::cli::SimulateArgs;

/// Apply command-line overrides on top of the configured defaults.
pub(crate) fn resolve(
    base: &AppSettings,
    seed: Option<u64>,
    args: &SimulateArgs,
) -> (SimulationParams, SimulationSettings) {
    let mut params = base.params;
    let mut settings = base.simulation;

    if let Some(seed) = seed {
        params.seed = seed;
    }
    if let Some(scenario) = args.scenario {
        params.scenario = scenario;
    }
    if let Some(bodies) = args.bodies {
        params.body_count = bodies;
    }
    if let Some(time_span) = args.time_span {
        params.time_span = time_span;
    }
    if let Some(gravity) = args.gravity {
        params.gravity = gravity;
    }
    if let Some(softening) = args.softening {
        params.softening = softening;
    }
    if let Some(kind) = args.integrator {
        settings.integrator.kind = kind;
    }
    if let Some(samples) = args.samples {
        settings.samples = samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
    }
    (params, settings)
}

/// `--format` wins, then the `--out` extension, then JSON.
pub(crate) fn output_format(args: &SimulateArgs) -> ExportFormat {
    args.format
        .or_else(|| {
            args.out
                .as_deref()
                .and_then(Path::extension)
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
        })
        .unwrap_or_default()
}

pub(crate) fn summary(run: &SimulationRun) -> String {
    let mut out = String::new();
    let params = &run.params;
    let stats = run.stats;
    let conservation = &run.conservation;
    let stability = &run.stability;
    let end = run.times.last().copied().unwrap_or_default();

    let _ = writeln!(
        out,
        "Scenario:    {} ({} bodies, seed {})",
        params.scenario.label(),
        run.body_count(),
        params.seed
    );
    let _ = writeln!(
        out,
        "Integrator:  {} ({} steps, {} rejected, {} evaluations)",
        run.integrator.label(),
        stats.accepted,
        stats.rejected,
        stats.evaluations
    );
    let _ = writeln!(
        out,
        "Frames:      {} over t = {end:.2} ({:.1} yr)",
        run.frame_count(),
        Normalization::to_years(end)
    );
    let _ = writeln!(
        out,
        "Energy:      drift {:.2e} (max {:.2e})",
        conservation.energy_drift, conservation.max_energy_drift
    );
    let _ = writeln!(
        out,
        "Momentum:    drift {:.2e}, angular {:.2e}",
        conservation.momentum_drift, conservation.angular_momentum_drift
    );
    let _ = writeln!(
        out,
        "Verdict:     {} ({} bound, {} escaping)",
        stability.verdict, stability.bound, stability.escaping
    );
    let _ = write!(out, "Elapsed:     {:.2}s", run.elapsed.as_secs_f64());
    out
}

pub(crate) fn run(base: &AppSettings, seed: Option<u64>, args: &SimulateArgs) -> Result<()> {
    let (params, settings) = resolve(base, seed, args);
    let run = simulate(&params, &settings, |_| ControlFlow::Continue(()))
        .context("simulation failed")?;
    println!("{}", summary(&run));

    if let Some(path) = &args.out {
        let format = output_format(args);
        let body = export::render(&run, format)?;
        ensure_parent_dir(path)
            .with_context(|| format!("failed to create directory for {}", path.display()))?;
        atomic_write(path, body.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), %format, "Run exported");
        println!("Wrote {}", path.display());
    }
    Ok(())
}
