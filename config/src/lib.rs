//! Configuration for EventHorizon.
//!
//! The file lives at `~/.eventhorizon/config.toml`. Every table and field is
//! optional; the `*_settings` methods resolve what is present into validated
//! values and fall back to defaults, logging a warning for anything unusable.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [simulation]
//! scenario = "vortex"
//! bodies = 20
//! time_span = 15.0
//! gravity = 6.67e-11
//! softening = 0.15
//! seed = 42
//! samples = 300
//!
//! [integrator]
//! method = "dopri5"
//! rtol = 1e-6
//! atol = 1e-9
//!
//! [render]
//! fps = 30
//! trail_length = 0
//!
//! [export]
//! directory = "~/eventhorizon-exports"
//! format = "json"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use horizon_core::integrator::{DEFAULT_MAX_STEPS, DEFAULT_SUBSTEPS};
use horizon_core::simulation::{MAX_SAMPLES, MIN_SAMPLES};
use horizon_core::{
    DEFAULT_DRIFT_TOLERANCE, DEFAULT_SAMPLES, ExportFormat, IntegratorKind, IntegratorSettings,
    SimulationSettings, random_seed,
};
use horizon_types::{GravityPreset, Scenario, SimulationParams, UiOptions};
use horizon_utils::{AtomicWriteOptions, atomic_write_with_options, recover_bak_file};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Directory under the home directory that holds config and logs.
pub const APP_DIR: &str = ".eventhorizon";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_EXPORT_DIR: &str = "~/eventhorizon-exports";

pub const DEFAULT_FPS: u32 = 30;
const MAX_FPS: u32 = 120;
const MAX_SUBSTEPS: u32 = 10_000;

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct HorizonConfig {
    pub app: Option<AppConfig>,
    pub simulation: Option<SimulationConfig>,
    pub integrator: Option<IntegratorConfig>,
    pub render: Option<RenderConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for markers and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable modal animations and the spinner.
    #[serde(default)]
    pub reduced_motion: bool,
}

/// Sidebar defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SimulationConfig {
    pub scenario: Option<String>,
    pub bodies: Option<usize>,
    pub time_span: Option<f64>,
    pub gravity: Option<f64>,
    pub softening: Option<f64>,
    pub mass_mean: Option<f64>,
    pub disk_radius: Option<f64>,
    pub vortex_strength: Option<f64>,
    pub central_black_hole: Option<bool>,
    /// Absent means a new random seed every launch.
    pub seed: Option<u64>,
    pub samples: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntegratorConfig {
    /// `dopri5`, `rk4` or `leapfrog`.
    pub method: Option<String>,
    pub rtol: Option<f64>,
    pub atol: Option<f64>,
    pub max_step: Option<f64>,
    pub substeps: Option<u32>,
    pub max_steps: Option<usize>,
    pub drift_tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    /// Frames of history drawn behind each body. 0 draws the full history.
    pub trail_length: Option<usize>,
    pub fps: Option<u32>,
    #[serde(default = "default_true")]
    pub show_trails: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trail_length: None,
            fps: None,
            show_trails: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    pub directory: Option<String>,
    pub format: Option<String>,
}

/// Resolved `[render]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// `None` draws the full history.
    pub trail_length: Option<usize>,
    pub fps: u32,
    pub show_trails: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            trail_length: None,
            fps: DEFAULT_FPS,
            show_trails: true,
        }
    }
}

/// Resolved `[export]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub directory: PathBuf,
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: expand_home(DEFAULT_EXPORT_DIR),
            format: ExportFormat::Json,
        }
    }
}

/// Expand a leading `~` to the home directory.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

fn positive(name: &str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            warn!("Ignoring non-positive {name} = {v}, using {default}");
            default
        }
        None => default,
    }
}

impl HorizonConfig {
    /// Load from the default path. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        recover_bak_file(path);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
                reduced_motion: app.reduced_motion,
            })
            .unwrap_or_default()
    }

    /// The configured seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.simulation.as_ref().and_then(|sim| sim.seed)
    }

    /// Sidebar parameters. Out-of-range numbers are clamped; a missing seed
    /// draws a random one.
    #[must_use]
    pub fn resolve_params(&self) -> SimulationParams {
        let mut params = SimulationParams::default().with_seed(random_seed());
        let Some(sim) = &self.simulation else {
            return params;
        };

        if let Some(name) = &sim.scenario {
            match name.parse::<Scenario>() {
                Ok(scenario) => params.scenario = scenario,
                Err(e) => warn!("{e}, using {}", params.scenario),
            }
        }
        if let Some(g) = sim.gravity {
            match GravityPreset::from_value(g) {
                Some(preset) => params.gravity = preset,
                None => warn!(
                    "Gravity {g:e} is not one of the presets, using {}",
                    params.gravity
                ),
            }
        }
        if let Some(bodies) = sim.bodies {
            params.body_count = bodies;
        }
        if let Some(v) = sim.time_span {
            params.time_span = v;
        }
        if let Some(v) = sim.softening {
            params.softening = v;
        }
        if let Some(v) = sim.mass_mean {
            params.mass_mean = v;
        }
        if let Some(v) = sim.disk_radius {
            params.disk_radius = v;
        }
        if let Some(v) = sim.vortex_strength {
            params.vortex_strength = v;
        }
        if let Some(v) = sim.central_black_hole {
            params.central_black_hole = v;
        }
        if let Some(seed) = sim.seed {
            params.seed = seed;
        }

        for field in params.clamp_to_ranges() {
            warn!(
                "Config value for {field} out of range, clamped to {}",
                params.display_value(field)
            );
        }
        params
    }

    #[must_use]
    pub fn integrator_settings(&self) -> IntegratorSettings {
        let defaults = IntegratorSettings::default();
        let Some(cfg) = &self.integrator else {
            return defaults;
        };

        let kind = match cfg.method.as_deref().map(str::parse::<IntegratorKind>) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                warn!("{e}, using {}", defaults.kind);
                defaults.kind
            }
            None => defaults.kind,
        };
        let max_step = match cfg.max_step {
            Some(h) if h.is_finite() && h > 0.0 => Some(h),
            Some(h) => {
                warn!("Ignoring non-positive max_step = {h}");
                None
            }
            None => None,
        };

        IntegratorSettings {
            kind,
            rtol: positive("rtol", cfg.rtol, defaults.rtol),
            atol: positive("atol", cfg.atol, defaults.atol),
            max_step,
            substeps: cfg
                .substeps
                .unwrap_or(DEFAULT_SUBSTEPS)
                .clamp(1, MAX_SUBSTEPS),
            max_steps: cfg.max_steps.unwrap_or(DEFAULT_MAX_STEPS).max(1),
        }
    }

    #[must_use]
    pub fn simulation_settings(&self) -> SimulationSettings {
        let samples = self
            .simulation
            .as_ref()
            .and_then(|sim| sim.samples)
            .unwrap_or(DEFAULT_SAMPLES)
            .clamp(MIN_SAMPLES, MAX_SAMPLES);
        let drift_tolerance = positive(
            "drift_tolerance",
            self.integrator.as_ref().and_then(|i| i.drift_tolerance),
            DEFAULT_DRIFT_TOLERANCE,
        );
        SimulationSettings {
            integrator: self.integrator_settings(),
            samples,
            drift_tolerance,
        }
    }

    #[must_use]
    pub fn render_settings(&self) -> RenderSettings {
        let Some(render) = &self.render else {
            return RenderSettings::default();
        };
        RenderSettings {
            trail_length: render.trail_length.filter(|&n| n > 0),
            fps: render.fps.unwrap_or(DEFAULT_FPS).clamp(1, MAX_FPS),
            show_trails: render.show_trails,
        }
    }

    #[must_use]
    pub fn export_settings(&self) -> ExportSettings {
        let mut settings = ExportSettings::default();
        let Some(export) = &self.export else {
            return settings;
        };
        if let Some(dir) = &export.directory {
            settings.directory = expand_home(dir);
        }
        if let Some(format) = &export.format {
            match format.parse::<ExportFormat>() {
                Ok(format) => settings.format = format,
                Err(e) => warn!("{e}, using {}", settings.format),
            }
        }
        settings
    }

    /// Persist sidebar parameters to the default config file.
    pub fn persist_params(params: &SimulationParams) -> io::Result<PathBuf> {
        let path = config_path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine config path")
        })?;
        Self::persist_params_to(&path, params)?;
        Ok(path)
    }

    /// Write `params` into the `[simulation]` table of `path`.
    ///
    /// Uses `toml_edit` so comments, unrelated keys and other tables survive.
    /// Creates the file and its parent directory if needed.
    pub fn persist_params_to(path: &Path, params: &SimulationParams) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = if path.exists() {
            fs::read_to_string(path)?
        } else {
            String::new()
        };
        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if !doc.contains_key("simulation") {
            doc["simulation"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        let sim = &mut doc["simulation"];
        sim["scenario"] = toml_edit::value(params.scenario.as_str());
        sim["bodies"] = toml_edit::value(params.body_count as i64);
        sim["time_span"] = toml_edit::value(params.time_span);
        sim["gravity"] = toml_edit::value(params.gravity.value());
        sim["softening"] = toml_edit::value(params.softening);
        sim["mass_mean"] = toml_edit::value(params.mass_mean);
        sim["disk_radius"] = toml_edit::value(params.disk_radius);
        sim["vortex_strength"] = toml_edit::value(params.vortex_strength);
        sim["central_black_hole"] = toml_edit::value(params.central_black_hole);
        match i64::try_from(params.seed) {
            Ok(seed) => sim["seed"] = toml_edit::value(seed),
            Err(_) => warn!(seed = params.seed, "Seed too large for TOML, not saved"),
        }

        atomic_write_with_options(
            path,
            doc.to_string().as_bytes(),
            AtomicWriteOptions::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use horizon_core::{ExportFormat, IntegratorKind};
    use horizon_types::{GravityPreset, ParamField, Scenario, SimulationParams};

    use super::{ConfigError, HorizonConfig, RenderSettings, expand_home};

    fn parse(toml: &str) -> HorizonConfig {
        toml::from_str(toml).expect("valid config")
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let config = parse("");
        let params = config.resolve_params();
        let defaults = SimulationParams::default();
        assert_eq!(params.body_count, defaults.body_count);
        assert_eq!(params.gravity, GravityPreset::Newtonian);
        assert_eq!(config.integrator_settings().kind, IntegratorKind::DormandPrince);
        assert_eq!(config.simulation_settings().samples, 300);
        assert_eq!(config.render_settings(), RenderSettings::default());
        assert_eq!(config.export_settings().format, ExportFormat::Json);
        assert!(config.seed().is_none());
        assert!(!config.ui_options().ascii_only);
    }

    #[test]
    fn parses_simulation_table() {
        let config = parse(
            r#"
[simulation]
scenario = "binary"
bodies = 12
time_span = 7.5
gravity = 1e-10
softening = 0.05
central_black_hole = false
seed = 1234
samples = 120
"#,
        );
        let params = config.resolve_params();
        assert_eq!(params.scenario, Scenario::BinaryPlanet);
        assert_eq!(params.body_count, 12);
        assert_eq!(params.time_span, 7.5);
        assert_eq!(params.gravity, GravityPreset::Strong);
        assert_eq!(params.softening, 0.05);
        assert!(!params.central_black_hole);
        assert_eq!(params.seed, 1234);
        assert_eq!(config.simulation_settings().samples, 120);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse(
            r"
[simulation]
bodies = 500
time_span = 0.1
softening = 3.0
",
        );
        let params = config.resolve_params();
        assert_eq!(params.body_count, 60);
        assert_eq!(params.time_span, 1.0);
        assert_eq!(params.softening, 0.5);
        assert!(params.validate().is_ok());
        assert_eq!(params.display_value(ParamField::Softening), "0.50");
    }

    #[test]
    fn unknown_names_fall_back() {
        let config = parse(
            r#"
[simulation]
scenario = "spiral"
gravity = 3.0

[integrator]
method = "euler"
rtol = -1.0

[export]
format = "xml"
"#,
        );
        let params = config.resolve_params();
        assert_eq!(params.scenario, Scenario::Vortex);
        assert_eq!(params.gravity, GravityPreset::Newtonian);
        let integrator = config.integrator_settings();
        assert_eq!(integrator.kind, IntegratorKind::DormandPrince);
        assert_eq!(integrator.rtol, 1e-6);
        assert_eq!(config.export_settings().format, ExportFormat::Json);
    }

    #[test]
    fn parses_integrator_render_and_export() {
        let config = parse(
            r#"
[app]
ascii_only = true
reduced_motion = true

[integrator]
method = "leapfrog"
substeps = 0
max_step = 0.05
drift_tolerance = 0.001

[render]
trail_length = 40
fps = 500
show_trails = false

[export]
directory = "/tmp/runs"
format = "csv"
"#,
        );
        let integrator = config.integrator_settings();
        assert_eq!(integrator.kind, IntegratorKind::Leapfrog);
        assert_eq!(integrator.substeps, 1);
        assert_eq!(integrator.max_step, Some(0.05));
        assert_eq!(config.simulation_settings().drift_tolerance, 0.001);

        let render = config.render_settings();
        assert_eq!(render.trail_length, Some(40));
        assert_eq!(render.fps, 120);
        assert!(!render.show_trails);

        let export = config.export_settings();
        assert_eq!(export.directory.to_str(), Some("/tmp/runs"));
        assert_eq!(export.format, ExportFormat::Csv);

        let ui = config.ui_options();
        assert!(ui.ascii_only && ui.reduced_motion && !ui.high_contrast);
    }

    #[test]
    fn missing_file_is_none_and_bad_file_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        assert!(HorizonConfig::load_from(&path).unwrap().is_none());

        fs::write(&path, "[simulation\nbodies = ").unwrap();
        let err = HorizonConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn persist_creates_new_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let params = SimulationParams {
            body_count: 33,
            scenario: Scenario::BinaryPlanet,
            ..SimulationParams::default()
        }
        .with_seed(77);

        HorizonConfig::persist_params_to(&path, &params).unwrap();
        let loaded = HorizonConfig::load_from(&path).unwrap().unwrap();
        let resolved = loaded.resolve_params();
        assert_eq!(resolved, params);
    }

    #[test]
    fn persist_preserves_comments_and_other_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "# my settings\n[render]\nfps = 24 # smooth enough\n\n[simulation]\nbodies = 5\n",
        )
        .unwrap();

        let params = SimulationParams {
            body_count: 9,
            ..SimulationParams::default()
        };
        HorizonConfig::persist_params_to(&path, &params).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# my settings"));
        assert!(written.contains("fps = 24 # smooth enough"));
        assert!(written.contains("bodies = 9"));
        assert!(!written.contains("bodies = 5"));
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home("/abs/path").to_str(), Some("/abs/path"));
        assert_eq!(expand_home("rel/~/x").to_str(), Some("rel/~/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/runs"), home.join("runs"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
