//! The Simulation Command Center: parameters, run control, status log.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph};

use horizon_engine::{App, ParamField, RunPhase, RunState, StatusLevel, UiOptions};

use crate::format::{asciify, format_duration, progress_bar, truncate_with_ellipsis};
use crate::theme::{self, Glyphs, Palette, spinner_frame, styles};

pub(crate) const SIDEBAR_WIDTH: u16 = 44;
const LABEL_WIDTH: usize = 23;
const BAR_WIDTH: usize = 16;

pub(crate) fn draw_sidebar(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let params_height = ParamField::ALL.len() as u16 + 4;
    let [params_area, run_area, status_area] = Layout::vertical([
        Constraint::Length(params_height),
        Constraint::Length(5),
        Constraint::Min(3),
    ])
    .areas(area);

    draw_params(frame, app, params_area, palette, glyphs);
    draw_run(frame, app, run_area, palette, glyphs);
    draw_status_log(frame, app, status_area, palette, glyphs);
}

fn panel<'a>(title: &'a str, palette: &Palette, options: UiOptions) -> Block<'a> {
    theme::panel(options)
        .border_style(styles::border(palette))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title(Span::styled(title, styles::title(palette)))
}

fn draw_params(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let params = app.params();
    let locked = app.is_running();
    let ascii = app.ui_options().ascii_only;

    let mut lines: Vec<Line> = Vec::with_capacity(ParamField::ALL.len() + 2);
    for field in ParamField::ALL {
        let selected = field == app.selected_field();
        let applies = field.applies_to(params.scenario);
        let value = asciify(&params.display_value(field), ascii);

        let marker = if selected { glyphs.selected } else { " " };
        let label = format!("{marker} {:<LABEL_WIDTH$}", field.label());
        let (label_style, value_style) = if selected {
            let row = styles::selected_row(palette);
            let value = if locked || !applies {
                row.fg(palette.text_muted)
            } else {
                row.fg(palette.accent)
            };
            (row, value)
        } else if applies {
            (styles::label(palette), styles::value(palette))
        } else {
            let dim = Style::default().fg(palette.text_disabled);
            (dim, dim)
        };
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<LABEL_WIDTH$}", "Seed"), styles::label(palette)),
        Span::styled(params.seed.to_string(), styles::value(palette)),
    ]));

    let title = if locked {
        " Simulation Command Center (locked) "
    } else {
        " Simulation Command Center "
    };
    let block = panel(title, palette, app.ui_options());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_run(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let lines = match app.run_state() {
        RunState::Running(active) => {
            let spinner = spinner_frame(app.tick_count(), app.ui_options());
            let phase = match active.phase() {
                RunPhase::Initializing => "Initializing",
                RunPhase::Integrating => "Integrating",
            };
            let (done, total) = active.progress();
            vec![
                Line::from(Span::styled(
                    format!("{spinner} {phase} {}", active.integrator().label()),
                    Style::default().fg(palette.primary),
                )),
                Line::from(vec![
                    Span::styled(
                        progress_bar(active.ratio(), BAR_WIDTH, glyphs),
                        Style::default().fg(palette.accent),
                    ),
                    Span::styled(
                        format!(" {done}/{total} {}", format_duration(active.elapsed())),
                        styles::label(palette),
                    ),
                ]),
                hint_line(&[("Esc", "cancel")], palette),
            ]
        }
        RunState::Ready(run) => vec![
            Line::from(Span::styled(
                format!(
                    "{} {} frames in {}",
                    glyphs.success,
                    run.frame_count(),
                    format_duration(run.elapsed)
                ),
                Style::default().fg(palette.success),
            )),
            Line::from(""),
            hint_line(&[("Enter", "run again"), ("e", "export")], palette),
        ],
        RunState::Failed(message) => vec![
            Line::from(Span::styled(
                format!(
                    "{} {}",
                    glyphs.error,
                    truncate_with_ellipsis(message, usize::from(area.width.saturating_sub(6)))
                ),
                Style::default().fg(palette.error),
            )),
            Line::from(""),
            hint_line(&[("Enter", "retry")], palette),
        ],
        RunState::Idle => vec![
            Line::from(Span::styled(
                "Ready to launch",
                Style::default().fg(palette.text_secondary),
            )),
            Line::from(""),
            hint_line(&[("Enter", "run simulation")], palette),
        ],
    };

    let block = panel(" Run ", palette, app.ui_options());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn hint_line(hints: &[(&'static str, &'static str)], palette: &Palette) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (i, (key, action)) in hints.iter().enumerate() {
        let sep = if i == 0 { "" } else { "  " };
        spans.push(Span::styled(format!("{sep}{key}"), styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }
    Line::from(spans)
}

fn draw_status_log(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let visible = usize::from(area.height.saturating_sub(2));
    let text_width = usize::from(area.width.saturating_sub(4)).saturating_sub(11);
    let entries = app.status().entries();
    let skip = entries.len().saturating_sub(visible);

    let lines: Vec<Line> = entries
        .skip(skip)
        .map(|entry| {
            let (icon, color) = match entry.level {
                StatusLevel::Info => (glyphs.info, palette.text_secondary),
                StatusLevel::Success => (glyphs.success, palette.success),
                StatusLevel::Warning => (glyphs.warning, palette.warning),
                StatusLevel::Error => (glyphs.error, palette.error),
            };
            Line::from(vec![
                Span::styled(
                    entry.at.format("%H:%M:%S ").to_string(),
                    Style::default()
                        .fg(palette.text_muted)
                        .add_modifier(Modifier::DIM),
                ),
                Span::styled(format!("{icon} "), Style::default().fg(color)),
                Span::styled(
                    truncate_with_ellipsis(&entry.message, text_width),
                    Style::default().fg(color),
                ),
            ])
        })
        .collect();

    let block = panel(" Status ", palette, app.ui_options());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
