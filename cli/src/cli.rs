use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use horizon_core::{ExportFormat, IntegratorKind};
use horizon_types::{GravityPreset, Scenario};

/// EventHorizon - N-body gravity simulator for the terminal
#[derive(Debug, Parser)]
#[command(name = "eventhorizon")]
#[command(about = "Simulate and watch binary stars and vortex galaxies in 3D")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: ~/.eventhorizon/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Random seed for the first run
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Draw with ASCII glyphs only
    #[arg(long)]
    pub ascii: bool,

    /// Use the high-contrast palette
    #[arg(long)]
    pub high_contrast: bool,

    /// Disable spinner and modal animations
    #[arg(long)]
    pub reduced_motion: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one simulation without the TUI and print a summary
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// vortex | binary
    #[arg(long)]
    pub scenario: Option<Scenario>,

    /// Number of bodies (vortex only)
    #[arg(long)]
    pub bodies: Option<usize>,

    /// Time span in dimensionless units
    #[arg(long = "time")]
    pub time_span: Option<f64>,

    /// Gravitational constant: 1e-11, 6.67e-11, 1e-10 or 5e-10
    #[arg(long, value_parser = parse_gravity)]
    pub gravity: Option<GravityPreset>,

    /// Softening length
    #[arg(long)]
    pub softening: Option<f64>,

    /// dopri5 | rk4 | leapfrog
    #[arg(long)]
    pub integrator: Option<IntegratorKind>,

    /// Output frames
    #[arg(long)]
    pub samples: Option<usize>,

    /// Write the run to this file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// json | csv (default: from --out extension, else json)
    #[arg(long)]
    pub format: Option<ExportFormat>,
}

fn parse_gravity(raw: &str) -> Result<GravityPreset, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid number '{raw}': {e}"))?;
    GravityPreset::try_from(value).map_err(|e| e.to_string())
}
