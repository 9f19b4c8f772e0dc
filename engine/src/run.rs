//! Background simulation runs.
//!
//! The solver is CPU-bound, so it runs on a blocking tokio task. Progress and
//! the final result come back over an unbounded channel that the app drains
//! on every tick; cancellation is a shared flag the observer checks between
//! frames.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use horizon_core::{IntegratorKind, Progress, SimulationError, SimulationRun, SimulationSettings};
use horizon_types::SimulationParams;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc;

#[derive(Debug)]
pub(crate) enum RunEvent {
    Progress(Progress),
    Finished(Result<SimulationRun, SimulationError>),
}

/// Where the solver currently is, for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Initializing,
    Integrating,
}

/// A run in flight. Dropping it cancels the solver.
#[derive(Debug)]
pub struct ActiveRun {
    integrator: IntegratorKind,
    phase: RunPhase,
    done: usize,
    total: usize,
    started: Instant,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedReceiver<RunEvent>,
}

impl ActiveRun {
    /// Spawn `params` on the current runtime's blocking pool.
    ///
    /// Fails when called outside a tokio runtime.
    pub(crate) fn spawn(
        params: SimulationParams,
        settings: SimulationSettings,
    ) -> Result<Self, TryCurrentError> {
        let handle = Handle::try_current()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        handle.spawn_blocking(move || {
            let result = horizon_core::simulate(&params, &settings, |progress| {
                if flag.load(Ordering::Relaxed) {
                    return ControlFlow::Break(());
                }
                // A closed receiver means the run was dropped.
                if tx.send(RunEvent::Progress(progress)).is_err() {
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            });
            let _ = tx.send(RunEvent::Finished(result));
        });

        Ok(Self {
            integrator: settings.integrator.kind,
            phase: RunPhase::Initializing,
            done: 0,
            total: settings.samples,
            started: Instant::now(),
            cancel,
            events: rx,
        })
    }

    #[must_use]
    pub fn integrator(&self) -> IntegratorKind {
        self.integrator
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// `(done, total)` frames.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.done, self.total)
    }

    /// Completed fraction in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.done as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub(crate) fn try_recv(&mut self) -> Result<RunEvent, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }

    pub(crate) fn record(&mut self, progress: Progress) {
        match progress {
            Progress::Initialized { integrator, .. } => {
                self.integrator = integrator;
                self.phase = RunPhase::Integrating;
            }
            Progress::Frame { done, total } => {
                self.phase = RunPhase::Integrating;
                self.done = done;
                self.total = total;
            }
        }
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Lifecycle of the current run.
#[derive(Debug, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running(ActiveRun),
    Ready(Arc<SimulationRun>),
    Failed(String),
}

impl RunState {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Running(_) => "Running",
            RunState::Ready(_) => "Ready",
            RunState::Failed(_) => "Failed",
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(_))
    }

    #[must_use]
    pub fn ready(&self) -> Option<&Arc<SimulationRun>> {
        match self {
            RunState::Ready(run) => Some(run),
            _ => None,
        }
    }
}
