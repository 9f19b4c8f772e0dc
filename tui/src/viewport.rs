//! 3D scene: trails and bodies projected through the app camera.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};

use horizon_engine::{App, BodyKind, Camera, RunState, SimulationRun};

use crate::theme::{self, Glyphs, Palette, spinner_frame, styles};

/// Terminal cells are about twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// Canvas bounds that keep one world unit equally long on both axes.
pub(crate) fn scene_bounds(extent: f64, width: u16, height: u16) -> ([f64; 2], [f64; 2]) {
    let physical_w = f64::from(width.max(1)) * CELL_ASPECT;
    let physical_h = f64::from(height.max(1));
    let (half_x, half_y) = if physical_w >= physical_h {
        (extent * physical_w / physical_h, extent)
    } else {
        (extent, extent * physical_h / physical_w)
    };
    ([-half_x, half_x], [-half_y, half_y])
}

pub(crate) fn draw_viewport(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let camera = app.camera();
    let title = format!(
        " 3D View  elev {:.0}°  azim {:.0}°  zoom {:.2}x ",
        camera.elevation(),
        camera.azimuth(),
        camera.zoom()
    );
    let ascii = app.ui_options().ascii_only;
    let title = if ascii { title.replace('°', "") } else { title };
    let block = theme::panel(app.ui_options())
        .border_style(styles::border(palette))
        .title(Span::styled(title, styles::title(palette)));

    let inner = block.inner(area);
    let (x_bounds, y_bounds) = scene_bounds(app.view_extent(), inner.width, inner.height);

    let overlay = overlay_message(app, glyphs);
    let scene = app.ready_run().map(|run| SceneData::collect(app, run, camera));

    let canvas = Canvas::default()
        .block(block)
        .background_color(palette.space)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            if let Some(scene) = &scene {
                if ascii {
                    // Canvas markers are all Unicode, so plot text instead.
                    for &(x, y) in &scene.trails {
                        let dot = Span::styled(glyphs.trail, Style::default().fg(palette.trail));
                        ctx.print(x, y, dot);
                    }
                    for &(x, y) in &scene.stars {
                        let star = Span::styled(glyphs.star, Style::default().fg(palette.star));
                        ctx.print(x, y, star);
                    }
                } else {
                    if !scene.trails.is_empty() {
                        ctx.draw(&Points {
                            coords: &scene.trails,
                            color: palette.trail,
                        });
                        ctx.layer();
                    }
                    ctx.draw(&Points {
                        coords: &scene.stars,
                        color: palette.star,
                    });
                }
                for &(x, y) in &scene.planets {
                    ctx.print(
                        x,
                        y,
                        Span::styled(glyphs.planet, Style::default().fg(palette.planet)),
                    );
                }
                for &(x, y) in &scene.black_holes {
                    ctx.print(
                        x,
                        y,
                        Span::styled(
                            glyphs.black_hole,
                            Style::default()
                                .fg(palette.black_hole)
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
            if let Some(message) = &overlay {
                let x = x_bounds[0] + (x_bounds[1] - x_bounds[0]) * 0.5
                    - (x_bounds[1] - x_bounds[0]) * message.chars().count() as f64
                        / (2.0 * f64::from(inner.width.max(1)));
                ctx.print(
                    x,
                    0.0,
                    Line::from(Span::styled(
                        message.clone(),
                        Style::default().fg(palette.text_secondary),
                    )),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn overlay_message(app: &App, glyphs: &Glyphs) -> Option<String> {
    match app.run_state() {
        RunState::Running(active) => {
            let spinner = spinner_frame(app.tick_count(), app.ui_options());
            Some(format!(
                "{spinner} Integrating trajectories... {:.0}%",
                active.ratio() * 100.0
            ))
        }
        RunState::Ready(_) => None,
        RunState::Failed(_) => Some(format!("{} Run failed. Press Enter to retry", glyphs.error)),
        RunState::Idle => Some("Press Enter to run".to_string()),
    }
}

/// Projected points for one frame, grouped by how they are drawn.
#[derive(Default)]
struct SceneData {
    trails: Vec<(f64, f64)>,
    stars: Vec<(f64, f64)>,
    planets: Vec<(f64, f64)>,
    black_holes: Vec<(f64, f64)>,
}

impl SceneData {
    fn collect(app: &App, run: &SimulationRun, camera: &Camera) -> Self {
        let mut scene = Self::default();
        let frame = app.current_frame().min(run.frame_count().saturating_sub(1));
        let Some(positions) = run.positions_at(frame) else {
            return scene;
        };

        if app.show_trails() {
            for k in app.trail_window(frame) {
                if let Some(past) = run.positions_at(k) {
                    scene.trails.extend(past.iter().map(|&p| {
                        let q = camera.project(p);
                        (q.x, q.y)
                    }));
                }
            }
        }

        // Far bodies first so nearer glyphs print over them.
        let mut order: Vec<(usize, f64)> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| (i, camera.project(p).depth))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (i, _) in order {
            let q = camera.project(positions[i]);
            let point = (q.x, q.y);
            match run.bodies.get(i).map(|b| b.kind) {
                Some(BodyKind::BlackHole) => scene.black_holes.push(point),
                Some(BodyKind::Planet) => scene.planets.push(point),
                _ => scene.stars.push(point),
            }
        }
        scene
    }
}
