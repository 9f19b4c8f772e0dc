//! Pop-in animation for the help overlay.

use std::time::Duration;

use super::animation::EffectTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEffectKind {
    /// Grow from the centre.
    PopScale,
    /// Rise from the bottom edge.
    SlideUp,
}

#[derive(Debug, Clone)]
pub struct ModalEffect {
    kind: ModalEffectKind,
    timer: EffectTimer,
}

impl ModalEffect {
    #[must_use]
    pub fn pop_scale(duration: Duration) -> Self {
        Self {
            kind: ModalEffectKind::PopScale,
            timer: EffectTimer::new(duration),
        }
    }

    #[must_use]
    pub fn slide_up(duration: Duration) -> Self {
        Self {
            kind: ModalEffectKind::SlideUp,
            timer: EffectTimer::new(duration),
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.timer.advance(delta);
    }

    /// 0.0 at the start, 1.0 once finished.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.timer.progress()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }

    #[must_use]
    pub fn kind(&self) -> ModalEffectKind {
        self.kind
    }
}
