//! Frame clock for the animation.

use std::time::Duration;

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    frame: usize,
    frame_count: usize,
    playing: bool,
    looping: bool,
    speed: f64,
    /// Fractional frames carried between ticks.
    carry: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            frame: 0,
            frame_count: 0,
            playing: false,
            looping: true,
            speed: 1.0,
            carry: 0.0,
        }
    }
}

impl Playback {
    /// Rewind onto a new run of `frame_count` frames and start playing.
    pub fn load(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        self.frame = 0;
        self.carry = 0.0;
        self.playing = frame_count > 1;
    }

    pub fn unload(&mut self) {
        self.frame_count = 0;
        self.frame = 0;
        self.carry = 0.0;
        self.playing = false;
    }

    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn toggle(&mut self) {
        if self.frame_count == 0 {
            return;
        }
        if !self.playing && self.frame + 1 == self.frame_count && !self.looping {
            self.frame = 0;
        }
        self.playing = !self.playing;
        self.carry = 0.0;
    }

    pub fn toggle_looping(&mut self) {
        self.looping = !self.looping;
    }

    pub fn restart(&mut self) {
        self.frame = 0;
        self.carry = 0.0;
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed * 2.0).min(MAX_SPEED);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed / 2.0).max(MIN_SPEED);
    }

    /// Move `delta` frames and pause. Stepping wraps around the ends.
    pub fn step(&mut self, delta: isize) {
        if self.frame_count == 0 {
            return;
        }
        self.playing = false;
        self.carry = 0.0;
        let count = self.frame_count as isize;
        self.frame = (self.frame as isize + delta).rem_euclid(count) as usize;
    }

    /// Advance by wall-clock `elapsed` at `fps` frames per second.
    pub fn advance(&mut self, elapsed: Duration, fps: u32) {
        if !self.playing || self.frame_count < 2 {
            return;
        }
        self.carry += elapsed.as_secs_f64() * f64::from(fps) * self.speed;
        let whole = self.carry.floor();
        if whole < 1.0 {
            return;
        }
        self.carry -= whole;

        let last = self.frame_count - 1;
        let target = self.frame + whole as usize;
        if target <= last {
            self.frame = target;
        } else if self.looping {
            self.frame = target % self.frame_count;
        } else {
            self.frame = last;
            self.playing = false;
            self.carry = 0.0;
        }
    }
}
