//! Serialized form of a finished run.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use horizon_types::{BodyKind, SimulationParams, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::ConservationReport;
use crate::integrator::{IntegratorKind, StepStats};
use crate::simulation::SimulationRun;
use crate::stability::{StabilityReport, Verdict};
use crate::units::Normalization;

/// Bumped whenever the JSON layout changes incompatibly.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown export format '{0}' (expected json or csv)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize run: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to format CSV: {0}")]
    Csv(#[from] fmt::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedBody {
    pub kind: BodyKind,
    pub mass: f64,
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilitySummary {
    pub verdict: Verdict,
    pub bound: usize,
    pub escaping: usize,
}

impl From<&StabilityReport> for StabilitySummary {
    fn from(report: &StabilityReport) -> Self {
        Self {
            verdict: report.verdict,
            bound: report.bound,
            escaping: report.escaping,
        }
    }
}

/// Versioned JSON document for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExport {
    pub format_version: u32,
    pub seed: u64,
    pub params: SimulationParams,
    pub integrator: IntegratorKind,
    pub normalization: Normalization,
    pub bodies: Vec<ExportedBody>,
    pub times: Vec<f64>,
    pub frames: Vec<Vec<Vec3>>,
    pub stats: StepStats,
    pub conservation: ConservationReport,
    pub stability: StabilitySummary,
}

impl RunExport {
    #[must_use]
    pub fn from_run(run: &SimulationRun) -> Self {
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            seed: run.params.seed,
            params: run.params,
            integrator: run.integrator,
            normalization: run.normalization,
            bodies: run
                .bodies
                .iter()
                .map(|b| ExportedBody {
                    kind: b.kind,
                    mass: b.mass,
                    position: b.position,
                    velocity: b.velocity,
                })
                .collect(),
            times: run.times.clone(),
            frames: run.frames.clone(),
            stats: run.stats,
            conservation: run.conservation,
            stability: StabilitySummary::from(&run.stability),
        }
    }
}

pub fn to_json(run: &SimulationRun) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&RunExport::from_run(run))?)
}

/// One row per body per frame under a `frame,time,body,kind,x,y,z` header.
pub fn to_csv(run: &SimulationRun) -> Result<String, ExportError> {
    let mut out = String::from("frame,time,body,kind,x,y,z\n");
    for (k, (time, positions)) in run.times.iter().zip(&run.frames).enumerate() {
        for (i, (r, body)) in positions.iter().zip(&run.bodies).enumerate() {
            writeln!(
                out,
                "{k},{time},{i},{},{},{},{}",
                body.kind.as_str(),
                r.x,
                r.y,
                r.z
            )?;
        }
    }
    Ok(out)
}

pub fn render(run: &SimulationRun, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(run),
        ExportFormat::Csv => to_csv(run),
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use horizon_types::{Scenario, SimulationParams};

    use super::{EXPORT_FORMAT_VERSION, ExportFormat, RunExport, render, to_csv, to_json};
    use crate::simulation::{SimulationRun, SimulationSettings, simulate};

    fn small_run() -> SimulationRun {
        let params = SimulationParams {
            scenario: Scenario::BinaryPlanet,
            time_span: 1.0,
            ..SimulationParams::default()
        };
        let settings = SimulationSettings {
            samples: 6,
            ..SimulationSettings::default()
        };
        simulate(&params, &settings, |_| ControlFlow::Continue(())).unwrap()
    }

    #[test]
    fn json_round_trips_through_serde() {
        let run = small_run();
        let json = to_json(&run).unwrap();
        let parsed: RunExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.format_version, EXPORT_FORMAT_VERSION);
        assert_eq!(parsed.frames.len(), 6);
        assert_eq!(parsed.bodies.len(), 3);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["integrator"], "dopri5");
        assert_eq!(value["params"]["scenario"], "binary_planet");
        assert!(value["conservation"]["final"]["total"].is_number());
        assert_eq!(value["bodies"][2]["kind"], "planet");
    }

    #[test]
    fn csv_has_one_row_per_body_per_frame() {
        let run = small_run();
        let csv = to_csv(&run).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6 * 3 + 1);
        assert_eq!(lines[0], "frame,time,body,kind,x,y,z");
        assert!(lines[1].starts_with("0,0,0,star,-0.5,0,0"));
        assert!(lines[18].starts_with("5,1,2,planet,"));
    }

    #[test]
    fn format_parsing_and_dispatch() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Json.extension(), "json");

        let run = small_run();
        assert!(render(&run, ExportFormat::Csv).unwrap().starts_with("frame,"));
        assert!(render(&run, ExportFormat::Json).unwrap().starts_with('{'));
    }
}
