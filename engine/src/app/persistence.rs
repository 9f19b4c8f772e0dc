use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use horizon_config::HorizonConfig;
use tracing::{info, warn};

use super::App;
use crate::export::write_export;
use crate::status::StatusLevel;

impl App {
    /// Write the ready run to the export directory.
    pub fn export_run(&mut self) -> Result<PathBuf> {
        let Some(run) = self.ready_run().cloned() else {
            self.push_status(StatusLevel::Warning, "Nothing to export: run a simulation first");
            return Err(anyhow!("no finished run to export"));
        };

        match write_export(&run, &self.core.export, Local::now()) {
            Ok(path) => {
                info!(path = %path.display(), "Run exported");
                self.push_status(
                    StatusLevel::Success,
                    format!("Exported to {}", path.display()),
                );
                Ok(path)
            }
            Err(e) => {
                warn!("Export failed: {e:#}");
                self.push_status(StatusLevel::Error, format!("Export failed: {e:#}"));
                Err(e)
            }
        }
    }

    /// Persist the sidebar parameters as the config defaults.
    pub fn save_defaults(&mut self) -> Result<PathBuf> {
        let Some(path) = self.core.config_path.clone() else {
            self.push_status(StatusLevel::Error, "No config path available");
            return Err(anyhow!("could not determine config path"));
        };

        let result = HorizonConfig::persist_params_to(&path, &self.core.params)
            .with_context(|| format!("failed to write {}", path.display()));
        match result {
            Ok(()) => {
                info!(path = %path.display(), "Defaults saved");
                self.push_status(
                    StatusLevel::Success,
                    format!("Saved defaults to {}", path.display()),
                );
                Ok(path)
            }
            Err(e) => {
                warn!("Saving defaults failed: {e:#}");
                self.push_status(StatusLevel::Error, format!("Saving defaults failed: {e:#}"));
                Err(e)
            }
        }
    }
}
