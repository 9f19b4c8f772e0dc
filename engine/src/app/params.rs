use horizon_core::random_seed;
use horizon_types::{Direction, ParamField, SimulationParams};

use super::App;
use crate::status::StatusLevel;

const LOCKED: &str = "Parameters are locked while a simulation runs";

impl App {
    pub fn params(&self) -> &SimulationParams {
        &self.core.params
    }

    pub fn selected_field(&self) -> ParamField {
        self.core.selected
    }

    pub fn select_next(&mut self) {
        self.core.selected = self.core.selected.next();
    }

    pub fn select_prev(&mut self) {
        self.core.selected = self.core.selected.prev();
    }

    /// Step the selected parameter. Refused while a run is in flight or when
    /// the field does not apply to the current scenario.
    pub fn adjust_selected(&mut self, direction: Direction) {
        if self.is_running() {
            self.push_status(StatusLevel::Warning, LOCKED);
            return;
        }
        let field = self.core.selected;
        if !field.applies_to(self.core.params.scenario) {
            self.push_status(
                StatusLevel::Info,
                format!(
                    "{} does not apply to {}",
                    field.label(),
                    self.core.params.scenario.label()
                ),
            );
            return;
        }
        self.core.params.adjust(field, direction);
    }

    /// Draw a fresh seed for the next run.
    pub fn reseed(&mut self) {
        if self.is_running() {
            self.push_status(StatusLevel::Warning, LOCKED);
            return;
        }
        self.core.params.seed = random_seed();
        self.push_status(
            StatusLevel::Info,
            format!("New seed: {}", self.core.params.seed),
        );
    }
}
