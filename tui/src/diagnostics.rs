//! Strip under the viewport: clock, conservation, solver work and verdict.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Padding, Paragraph};

use horizon_engine::{App, Normalization, Verdict};

use crate::format::{format_count, format_drift, format_duration};
use crate::theme::{self, Glyphs, Palette, styles};

pub(crate) const DIAGNOSTICS_HEIGHT: u16 = 6;

pub(crate) fn draw_diagnostics(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = theme::panel(app.ui_options())
        .border_style(styles::border(palette))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title(Span::styled(" Diagnostics ", styles::title(palette)));

    let Some(run) = app.ready_run() else {
        let text = Line::from(Span::styled(
            "No finished run yet",
            Style::default().fg(palette.text_muted),
        ));
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    };

    let label = styles::label(palette);
    let value = styles::value(palette);
    let sep = Span::styled(format!("  {}  ", glyphs.separator), label);
    let playback = app.playback();
    let frame_index = app.current_frame();
    let t = app.current_time().unwrap_or_default();
    let d = glyphs.delta;

    let clock = Line::from(vec![
        Span::styled("t ", label),
        Span::styled(format!("{t:.2}"), value),
        Span::styled(format!(" ({:.1} yr)", Normalization::to_years(t)), label),
        sep.clone(),
        Span::styled("frame ", label),
        Span::styled(
            format!("{}/{}", frame_index + 1, playback.frame_count()),
            value,
        ),
        sep.clone(),
        Span::styled(
            if playback.is_playing() {
                glyphs.running
            } else {
                glyphs.paused
            },
            Style::default().fg(palette.accent),
        ),
        Span::styled(format!(" {}x", playback.speed()), value),
        Span::styled(
            if playback.is_looping() {
                format!(" {}", glyphs.looping)
            } else {
                String::new()
            },
            label,
        ),
    ]);

    let conservation = &run.conservation;
    let tolerance = app.simulation_settings().drift_tolerance;
    let energy_color = if conservation.max_energy_drift > tolerance {
        palette.warning
    } else {
        palette.text_primary
    };
    let drift = Line::from(vec![
        Span::styled(format!("{d}E/E "), label),
        Span::styled(
            format_drift(conservation.energy_drift),
            Style::default().fg(energy_color),
        ),
        Span::styled(
            format!(" (max {})", format_drift(conservation.max_energy_drift)),
            label,
        ),
        sep.clone(),
        Span::styled(format!("{d}p "), label),
        Span::styled(format_drift(conservation.momentum_drift), value),
        sep.clone(),
        Span::styled(format!("{d}L "), label),
        Span::styled(format_drift(conservation.angular_momentum_drift), value),
    ]);

    let stats = run.stats;
    let solver = Line::from(vec![
        Span::styled(run.integrator.label(), value),
        sep.clone(),
        Span::styled(format!("{} steps", format_count(stats.accepted)), value),
        Span::styled(format!(" ({} rejected)", stats.rejected), label),
        sep.clone(),
        Span::styled(format!("{} evals", format_count(stats.evaluations)), value),
        sep.clone(),
        Span::styled(format_duration(run.elapsed), value),
    ]);

    let stability = &run.stability;
    let verdict_color = match stability.verdict {
        Verdict::Stable => palette.success,
        Verdict::Evaporating => palette.warning,
        Verdict::Disrupted => palette.error,
        Verdict::Unreliable => palette.text_muted,
    };
    let verdict = Line::from(vec![
        Span::styled("Verdict ", label),
        Span::styled(
            stability.verdict.label(),
            Style::default()
                .fg(verdict_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " ({} bound, {} escaping)",
                stability.bound, stability.escaping
            ),
            label,
        ),
        sep,
        Span::styled("seed ", label),
        Span::styled(run.params.seed.to_string(), value),
    ]);

    frame.render_widget(
        Paragraph::new(vec![clock, drift, solver, verdict]).block(block),
        area,
    );
}
