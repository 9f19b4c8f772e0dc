//! Color theme and glyphs for the EventHorizon TUI.
//!
//! Uses Kanagawa Wave for the chrome with an optional high-contrast override.
//! The viewport keeps a black sky in both palettes.

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::widgets::{Block, BorderType, Borders};

use horizon_engine::UiOptions;

/// Kanagawa Wave color palette constants.
mod colors {
    use super::Color;

    // === Backgrounds (Sumi Ink) ===
    pub const BG_DARK: Color = Color::Rgb(22, 22, 29); // sumiInk0
    pub const BG_PANEL: Color = Color::Rgb(31, 31, 40); // sumiInk3
    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4
    pub const BG_BORDER: Color = Color::Rgb(84, 84, 109); // sumiInk6

    // === Foregrounds (Fuji) ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray
    pub const TEXT_DISABLED: Color = Color::Rgb(84, 84, 109); // sumiInk6

    // === Primary/Brand ===
    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet

    // === Accent Colors ===
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const GREEN: Color = Color::Rgb(152, 187, 108); // springGreen
    pub const YELLOW: Color = Color::Rgb(230, 195, 132); // carpYellow
    pub const ORANGE: Color = Color::Rgb(255, 160, 102); // surimiOrange
    pub const RED: Color = Color::Rgb(255, 93, 98); // peachRed

    // === Semantic Aliases ===
    pub const ACCENT: Color = CYAN;
    pub const SUCCESS: Color = GREEN;
    pub const WARNING: Color = YELLOW;
    pub const ERROR: Color = RED;
    pub const PEACH: Color = ORANGE;

    // === Sky ===
    pub const SPACE: Color = Color::Black;
    pub const TRAIL: Color = Color::Rgb(0, 170, 190);
    pub const STAR: Color = Color::White;
    pub const BLACK_HOLE: Color = Color::Rgb(255, 215, 0);
    pub const PLANET: Color = Color::Rgb(80, 220, 100);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_disabled: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub peach: Color,
    pub space: Color,
    pub trail: Color,
    pub star: Color,
    pub black_hole: Color,
    pub planet: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            text_disabled: colors::TEXT_DISABLED,
            primary: colors::PRIMARY,
            accent: colors::ACCENT,
            success: colors::SUCCESS,
            warning: colors::WARNING,
            error: colors::ERROR,
            peach: colors::PEACH,
            space: colors::SPACE,
            trail: colors::TRAIL,
            star: colors::STAR,
            black_hole: colors::BLACK_HOLE,
            planet: colors::PLANET,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::Gray,
            text_disabled: Color::DarkGray,
            primary: Color::White,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            peach: Color::Yellow,
            space: Color::Black,
            trail: Color::Cyan,
            star: Color::White,
            black_hole: Color::Yellow,
            planet: Color::Green,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for icons and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub selected: &'static str,
    pub running: &'static str,
    pub paused: &'static str,
    pub looping: &'static str,
    pub bullet: &'static str,
    pub separator: &'static str,
    pub info: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub black_hole: &'static str,
    pub planet: &'static str,
    /// Only used where the canvas cannot plot markers, i.e. ASCII mode.
    pub star: &'static str,
    pub trail: &'static str,
    pub bar_full: &'static str,
    pub bar_empty: &'static str,
    pub delta: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            selected: ">",
            running: ">",
            paused: "||",
            looping: "@",
            bullet: "*",
            separator: "|",
            info: "i",
            success: "+",
            warning: "!",
            error: "x",
            black_hole: "@",
            planet: "o",
            star: "*",
            trail: ".",
            bar_full: "#",
            bar_empty: ".",
            delta: "d",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            selected: "▸",
            running: "▶",
            paused: "⏸",
            looping: "↻",
            bullet: "•",
            separator: "│",
            info: "•",
            success: "✓",
            warning: "⚠",
            error: "✗",
            black_hole: "●",
            planet: "◉",
            star: "•",
            trail: "·",
            bar_full: "█",
            bar_empty: "░",
            delta: "Δ",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// A bordered panel: rounded corners, or `+-|` in ASCII mode.
#[must_use]
pub fn panel<'a>(options: UiOptions) -> Block<'a> {
    let block = Block::default().borders(Borders::ALL);
    if options.ascii_only {
        block.border_set(border::Set {
            top_left: "+",
            top_right: "+",
            bottom_left: "+",
            bottom_right: "+",
            vertical_left: "|",
            vertical_right: "|",
            horizontal_top: "-",
            horizontal_bottom: "-",
        })
    } else {
        block.border_type(BorderType::Rounded)
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border(palette: &Palette) -> Style {
        Style::default().fg(palette.bg_border)
    }

    #[must_use]
    pub fn selected_row(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn label(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn value(palette: &Palette) -> Style {
        Style::default().fg(palette.text_primary)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.peach)
            .add_modifier(Modifier::BOLD)
    }
}
