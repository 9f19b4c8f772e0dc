use std::ops::Range;

use horizon_core::scenario::view_extent;
use horizon_types::Vec3;

use super::App;
use crate::camera::Camera;
use crate::playback::Playback;

/// Degrees per rotate/tilt key press.
const ROTATE_STEP: f64 = 10.0;
const TILT_STEP: f64 = 5.0;

impl App {
    pub fn playback(&self) -> &Playback {
        &self.core.playback
    }

    pub fn camera(&self) -> &Camera {
        &self.ui.camera
    }

    pub fn show_trails(&self) -> bool {
        self.ui.show_trails
    }

    /// Frame being shown.
    pub fn current_frame(&self) -> usize {
        self.core.playback.frame()
    }

    /// Positions at the current frame of the ready run.
    pub fn current_positions(&self) -> Option<&[Vec3]> {
        self.ready_run()?.positions_at(self.current_frame())
    }

    pub fn current_time(&self) -> Option<f64> {
        self.ready_run()?.time_at(self.current_frame())
    }

    pub fn toggle_playback(&mut self) {
        self.core.playback.toggle();
    }

    pub fn step_frame(&mut self, delta: isize) {
        self.core.playback.step(delta);
    }

    pub fn restart_playback(&mut self) {
        self.core.playback.restart();
    }

    pub fn toggle_looping(&mut self) {
        self.core.playback.toggle_looping();
    }

    pub fn faster(&mut self) {
        self.core.playback.faster();
    }

    pub fn slower(&mut self) {
        self.core.playback.slower();
    }

    pub fn rotate_left(&mut self) {
        self.ui.camera.rotate(-ROTATE_STEP);
    }

    pub fn rotate_right(&mut self) {
        self.ui.camera.rotate(ROTATE_STEP);
    }

    pub fn tilt_up(&mut self) {
        self.ui.camera.tilt(TILT_STEP);
    }

    pub fn tilt_down(&mut self) {
        self.ui.camera.tilt(-TILT_STEP);
    }

    pub fn zoom_in(&mut self) {
        self.ui.camera.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.ui.camera.zoom_out();
    }

    pub fn reset_camera(&mut self) {
        self.ui.camera.reset();
    }

    pub fn toggle_trails(&mut self) {
        self.ui.show_trails = !self.ui.show_trails;
    }

    /// Half-width of the scene cube: the ready run's, else the sidebar scenario's.
    pub fn view_extent(&self) -> f64 {
        match self.ready_run() {
            Some(run) => run.extent(),
            None => view_extent(&self.core.params),
        }
    }

    /// Frames whose positions make up the trail ending at `frame`.
    pub fn trail_window(&self, frame: usize) -> Range<usize> {
        let end = frame + 1;
        let start = match self.core.render.trail_length {
            Some(len) if len > 0 => end.saturating_sub(len),
            _ => 0,
        };
        start..end
    }
}
