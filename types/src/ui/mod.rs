//! UI state types shared by the engine (state ownership) and tui (rendering/input).
//!
//! Pure data types with no IO, no async, no ratatui dependency.

mod animation;
mod modal;

pub use modal::{ModalEffect, ModalEffectKind};

/// Accessibility and rendering options resolved from `[app]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

/// Which surface receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Sidebar, playback and camera keys.
    #[default]
    Normal,
    /// Key reference overlay; any key closes it.
    Help,
}
