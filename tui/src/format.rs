use std::time::Duration;

use crate::theme::Glyphs;

/// Relative drift in compact scientific notation.
pub(crate) fn format_drift(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2e}")
    } else {
        "n/a".to_string()
    }
}

pub(crate) fn format_count(value: usize) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 10_000 {
        format!("{}k", value / 1000)
    } else if value >= 1000 {
        format!("{:.1}k", value as f64 / 1000.0)
    } else {
        value.to_string()
    }
}

pub(crate) fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{secs:.1}s")
    }
}

/// `[####......]`-style bar of `width` cells.
pub(crate) fn progress_bar(ratio: f64, width: usize, glyphs: &Glyphs) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "{}{}",
        glyphs.bar_full.repeat(filled),
        glyphs.bar_empty.repeat(width - filled)
    )
}

/// Cut `raw` to `max` chars, ending in an ellipsis when shortened.
pub(crate) fn truncate_with_ellipsis(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    if max <= 3 {
        return raw.chars().take(max).collect();
    }
    let mut out: String = raw.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Swap symbols a plain ASCII terminal cannot show.
pub(crate) fn asciify(text: &str, ascii_only: bool) -> String {
    if ascii_only {
        text.replace('☉', "sun")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use horizon_engine::UiOptions;

    use super::{
        asciify, format_count, format_drift, format_duration, progress_bar, truncate_with_ellipsis,
    };
    use crate::theme::glyphs;

    #[test]
    fn numbers() {
        assert_eq!(format_drift(1.234e-7), "1.23e-7");
        assert_eq!(format_drift(f64::NAN), "n/a");
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(8_600), "8.6k");
        assert_eq!(format_count(86_000), "86k");
        assert_eq!(format_count(2_500_000), "2.5M");
        assert_eq!(format_duration(Duration::from_millis(420)), "420ms");
        assert_eq!(format_duration(Duration::from_millis(2_340)), "2.3s");
    }

    #[test]
    fn bar_and_truncation() {
        let ascii = glyphs(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        });
        assert_eq!(progress_bar(0.5, 10, &ascii), "#####.....");
        assert_eq!(progress_bar(2.0, 4, &ascii), "####");
        assert_eq!(truncate_with_ellipsis("Integrating", 8), "Integ...");
        assert_eq!(truncate_with_ellipsis("short", 8), "short");
        assert_eq!(asciify("1.0 M☉", true), "1.0 Msun");
    }
}
