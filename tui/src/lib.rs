//! TUI rendering for EventHorizon using ratatui.

mod diagnostics;
mod effects;
mod format;
mod input;
mod sidebar;
mod theme;
mod viewport;

pub use effects::apply_modal_effect;
pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Padding, Paragraph};

use horizon_engine::{App, InputMode, RunState};

use self::diagnostics::{DIAGNOSTICS_HEIGHT, draw_diagnostics};
use self::sidebar::{SIDEBAR_WIDTH, draw_sidebar};
use self::viewport::draw_viewport;

/// Key reference shown by the help overlay, grouped by section.
const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Command Center",
        &[
            ("Up/Down j/k", "select parameter"),
            ("Left/Right h/l", "adjust parameter"),
            ("Enter r", "run simulation"),
            ("Esc", "cancel run"),
            ("n", "new random seed"),
            ("p", "save parameters as defaults"),
            ("e", "export run"),
        ],
    ),
    (
        "Playback",
        &[
            ("Space", "play / pause"),
            ("[ ]", "slower / faster"),
            (", .", "step one frame"),
            ("g", "restart"),
            ("L", "toggle looping"),
        ],
    ),
    (
        "Camera",
        &[
            ("a d", "rotate"),
            ("w s", "tilt"),
            ("+ -", "zoom"),
            ("0", "reset view"),
            ("t", "toggle trails"),
        ],
    ),
    ("General", &[("?", "toggle this help"), ("q Ctrl-C", "quit")]),
];

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let [body, status_bar] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [sidebar, scene] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)]).areas(body);
    let [view, strip] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(DIAGNOSTICS_HEIGHT)])
            .areas(scene);

    draw_sidebar(frame, app, sidebar, &palette, &glyphs);
    draw_viewport(frame, app, view, &palette, &glyphs);
    draw_diagnostics(frame, app, strip, &palette, &glyphs);
    draw_status_bar(frame, app, status_bar, &palette);

    if app.input_mode() == InputMode::Help {
        draw_help(frame, app, &palette);
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let state = app.run_state();
    let state_color = match state {
        RunState::Idle => palette.text_secondary,
        RunState::Running(_) => palette.primary,
        RunState::Ready(_) => palette.success,
        RunState::Failed(_) => palette.error,
    };

    let hints: &[(&str, &str)] = match state {
        RunState::Running(_) => &[("Esc", "cancel"), ("?", "help"), ("q", "quit")],
        RunState::Ready(_) => &[
            ("Space", "play"),
            ("a/d w/s", "orbit"),
            ("+/-", "zoom"),
            ("e", "export"),
            ("?", "help"),
            ("q", "quit"),
        ],
        RunState::Idle | RunState::Failed(_) => &[
            ("Enter", "run"),
            ("Up/Down", "select"),
            ("Left/Right", "adjust"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.label()),
            Style::default()
                .fg(palette.bg_dark)
                .bg(state_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    for (key, action) in hints {
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}  "), styles::key_hint(palette)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame, app: &mut App, palette: &Palette) {
    let area = frame.area();

    let mut lines: Vec<Line> = Vec::new();
    for (i, (section, keys)) in HELP_SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *section,
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, action) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<16}"), styles::key_highlight(palette)),
                Span::styled(*action, Style::default().fg(palette.text_secondary)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from(Span::styled(
            "Press any key to close",
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    );

    let width = 52.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 4).min(area.height.saturating_sub(2));
    let base_area = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 2),
        width,
        height,
    };

    let elapsed = app.frame_elapsed();
    let (help_area, effect_done) = if let Some(effect) = app.modal_effect_mut() {
        effect.advance(elapsed);
        (
            apply_modal_effect(effect, base_area, area),
            effect.is_finished(),
        )
    } else {
        (base_area, false)
    };
    if effect_done {
        app.clear_modal_effect();
    }

    frame.render_widget(Clear, help_area);
    let block = theme::panel(app.ui_options())
        .border_style(Style::default().fg(palette.primary))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1))
        .title(Line::from(Span::styled(" Keys ", styles::title(palette))));
    frame.render_widget(Paragraph::new(lines).block(block), help_area);
}
