//! Modal animation effects for TUI overlays.

use ratatui::layout::Rect;

use horizon_engine::{ModalEffect, ModalEffectKind};

/// Apply a modal effect to transform the base rectangle.
#[must_use]
pub fn apply_modal_effect(effect: &ModalEffect, base: Rect, viewport: Rect) -> Rect {
    let t = ease_out_cubic(effect.progress());
    match effect.kind() {
        ModalEffectKind::PopScale => scale_rect(base, 0.6 + 0.4 * t),
        ModalEffectKind::SlideUp => {
            let viewport_bottom = viewport.y.saturating_add(viewport.height);
            let base_bottom = base.y.saturating_add(base.height);
            let max_offset = viewport_bottom.saturating_sub(base_bottom);
            let offset = max_offset.min(base.height.saturating_div(2)).min(6);
            let y_offset = ((1.0 - t) * f32::from(offset)).round() as u16;
            Rect {
                y: base.y.saturating_add(y_offset),
                ..base
            }
        }
    }
}

fn scale_rect(base: Rect, scale: f32) -> Rect {
    let width = (f32::from(base.width) * scale).round() as u16;
    let height = (f32::from(base.height) * scale).round() as u16;
    let width = width.max(1).min(base.width);
    let height = height.max(1).min(base.height);
    Rect {
        x: base.x + (base.width.saturating_sub(width) / 2),
        y: base.y + (base.height.saturating_sub(height) / 2),
        width,
        height,
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}
