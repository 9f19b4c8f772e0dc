use std::sync::Arc;

use horizon_core::{Progress, SimulationError, SimulationRun};
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{info, warn};

use super::App;
use crate::run::{ActiveRun, RunEvent, RunState};
use crate::status::StatusLevel;

impl App {
    /// Start a run with the current parameters on a blocking task.
    pub fn start_simulation(&mut self) {
        if self.is_running() {
            self.push_status(StatusLevel::Warning, "A simulation is already running");
            return;
        }
        if let Err(e) = self.core.params.validate() {
            self.push_status(StatusLevel::Error, format!("Invalid parameters: {e}"));
            return;
        }

        match ActiveRun::spawn(self.core.params, self.core.simulation) {
            Ok(active) => {
                info!(seed = self.core.params.seed, "Simulation started");
                self.core.playback.unload();
                self.core.run = RunState::Running(active);
                self.push_status(StatusLevel::Info, "Initializing stellar positions...");
            }
            Err(e) => {
                warn!("Cannot start simulation: {e}");
                self.core.run = RunState::Failed(e.to_string());
                self.push_status(StatusLevel::Error, format!("Cannot start simulation: {e}"));
            }
        }
    }

    /// Ask the solver to stop at the next frame boundary.
    pub fn cancel_simulation(&mut self) {
        if let RunState::Running(active) = &self.core.run {
            active.cancel();
            self.push_status(StatusLevel::Info, "Cancelling simulation...");
        }
    }

    pub(super) fn poll_run(&mut self) {
        loop {
            let RunState::Running(active) = &mut self.core.run else {
                return;
            };
            match active.try_recv() {
                Ok(RunEvent::Progress(progress)) => {
                    active.record(progress);
                    if let Progress::Initialized { integrator, .. } = progress {
                        self.push_status(
                            StatusLevel::Info,
                            format!("Integrating trajectories ({})...", integrator.label()),
                        );
                    }
                }
                Ok(RunEvent::Finished(result)) => {
                    self.finish_run(result);
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    warn!("Simulation task ended without a result");
                    let message = "Simulation task ended unexpectedly".to_string();
                    self.push_status(StatusLevel::Error, message.clone());
                    self.core.run = RunState::Failed(message);
                    return;
                }
            }
        }
    }

    fn finish_run(&mut self, result: Result<SimulationRun, SimulationError>) {
        match result {
            Ok(run) => {
                self.push_status(StatusLevel::Info, "Rendering 3D animation...");
                let stability = &run.stability;
                let summary = format!(
                    "Run complete: {} frames, {} ({} bound, {} escaping), energy drift {:.2e}",
                    run.frame_count(),
                    stability.verdict,
                    stability.bound,
                    stability.escaping,
                    run.conservation.energy_drift,
                );
                self.core.playback.load(run.frame_count());
                self.core.run = RunState::Ready(Arc::new(run));
                self.push_status(StatusLevel::Success, summary);
            }
            Err(SimulationError::Cancelled) => {
                info!("Simulation cancelled");
                self.core.run = RunState::Idle;
                self.push_status(StatusLevel::Warning, "Simulation cancelled");
            }
            Err(e) => {
                warn!("Simulation failed: {e}");
                self.push_status(StatusLevel::Error, format!("Simulation failed: {e}"));
                self.core.run = RunState::Failed(e.to_string());
            }
        }
    }
}
