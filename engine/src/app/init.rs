use std::path::{Path, PathBuf};
use std::time::Instant;

use horizon_config::{ExportSettings, HorizonConfig, RenderSettings};
use horizon_core::{SimulationSettings, random_seed};
use horizon_types::{InputMode, ParamField, SimulationParams, UiOptions};
use tracing::{info, warn};

use super::{App, CoreState, RuntimeState, UiState};
use crate::camera::Camera;
use crate::playback::Playback;
use crate::run::RunState;
use crate::status::{StatusLevel, StatusLog};

/// Everything `App::new` needs, resolved from config and command line.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub params: SimulationParams,
    pub simulation: SimulationSettings,
    pub render: RenderSettings,
    pub export: ExportSettings,
    pub ui: UiOptions,
    /// Where `save_defaults` writes. `None` disables saving.
    pub config_path: Option<PathBuf>,
    /// Shown as warnings in the status log at startup.
    pub notices: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            params: SimulationParams::default().with_seed(random_seed()),
            simulation: SimulationSettings::default(),
            render: RenderSettings::default(),
            export: ExportSettings::default(),
            ui: UiOptions::default(),
            config_path: HorizonConfig::path(),
            notices: Vec::new(),
        }
    }
}

impl AppSettings {
    #[must_use]
    pub fn from_config(config: &HorizonConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            params: config.resolve_params(),
            simulation: config.simulation_settings(),
            render: config.render_settings(),
            export: config.export_settings(),
            ui: config.ui_options(),
            config_path,
            notices: Vec::new(),
        }
    }

    /// Load `path`, or the default config file. A missing file yields defaults;
    /// an unreadable one yields defaults plus a notice.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(HorizonConfig::path);
        let loaded = match &path {
            Some(path) => HorizonConfig::load_from(path),
            None => Ok(None),
        };
        match loaded {
            Ok(Some(config)) => Self::from_config(&config, path),
            Ok(None) => Self {
                config_path: path,
                ..Self::default()
            },
            Err(e) => {
                warn!("Config error, using defaults: {e}");
                Self {
                    config_path: path,
                    notices: vec![format!("Config error, using defaults: {e}")],
                    ..Self::default()
                }
            }
        }
    }
}

impl App {
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        let AppSettings {
            params,
            simulation,
            render,
            export,
            ui,
            config_path,
            notices,
        } = settings;

        info!(
            seed = params.seed,
            integrator = simulation.integrator.kind.as_str(),
            "App initialized"
        );

        let now = Instant::now();
        let mut app = Self {
            ui: UiState {
                options: ui,
                input_mode: InputMode::Normal,
                modal_effect: None,
                camera: Camera::default(),
                show_trails: render.show_trails,
                should_quit: false,
                last_ui_tick: now,
                last_frame: now,
            },
            core: CoreState {
                params,
                selected: ParamField::default(),
                simulation,
                render,
                export,
                config_path,
                run: RunState::Idle,
                playback: Playback::default(),
                status: StatusLog::default(),
            },
            runtime: RuntimeState {
                tick: 0,
                last_playback: now,
            },
        };

        for notice in notices {
            app.push_status(StatusLevel::Warning, notice);
        }
        app.push_status(
            StatusLevel::Info,
            format!("Ready. Seed {}. Press Enter to run.", app.core.params.seed),
        );
        app
    }
}
