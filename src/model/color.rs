//! `rgba(...)` color text helpers.

use ratatui::style::Color;

/// Alpha value the glow and dim variants are derived from.
const BASE_ALPHA: &str = "0.8";

/// Replace the literal `0.8` alpha with `alpha`.
///
/// Colors authored with any other alpha come back unchanged.
pub fn with_alpha(color: &str, alpha: &str) -> String {
    color.replace(BASE_ALPHA, alpha)
}

pub fn glow(color: &str) -> String {
    with_alpha(color, "1")
}

pub fn dim(color: &str) -> String {
    with_alpha(color, "0.3")
}

/// Parse `rgba(r, g, b, a)` / `rgb(r, g, b)` into a terminal color with the
/// alpha folded into brightness.
pub fn parse(color: &str) -> Option<Color> {
    let text = color.trim();
    let inner = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0));
    let (r, g, b) = (channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };
    Some(Color::Rgb(
        (r * alpha).round() as u8,
        (g * alpha).round() as u8,
        (b * alpha).round() as u8,
    ))
}

/// Parsed color, or white when the text is unreadable.
pub fn parse_or_default(color: &str) -> Color {
    parse(color).unwrap_or(Color::White)
}

/// Scale an RGB color toward black by `opacity` (0..=1).
pub fn fade(color: Color, opacity: f64) -> Color {
    let o = opacity.clamp(0.0, 1.0);
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f64 * o).round() as u8,
            (g as f64 * o).round() as u8,
            (b as f64 * o).round() as u8,
        ),
        _ if o < 0.5 => Color::DarkGray,
        other => other,
    }
}
