use crate::constants::{FALLBACK_GLYPH, ICON_GLYPHS, MAX_FRAME_DT_SEC};
use glam::Vec2;

/// Last pointer position in canvas backing pixels.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub inside: bool,
}

/// Map a CSS-pixel offset inside an element of `css_w` x `css_h` onto a
/// backing store of `px_w` x `px_h`.
#[inline]
pub fn css_to_canvas_px(x_css: f32, y_css: f32, css_w: f32, css_h: f32, px_w: f32, px_h: f32) -> Vec2 {
    if css_w <= 0.0 || css_h <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(x_css / css_w * px_w, y_css / css_h * px_h)
}

/// Canvas pixel to normalized device coordinates, +y up, clamped to [-1, 1].
#[inline]
pub fn canvas_px_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Vec2::new(
        (2.0 * x / w - 1.0).clamp(-1.0, 1.0),
        (1.0 - 2.0 * y / h).clamp(-1.0, 1.0),
    )
}

/// Pointer NDC for the frame; a pointer outside the canvas recentres.
#[inline]
pub fn mouse_ndc(mouse: &MouseState, width: f32, height: f32) -> Vec2 {
    if mouse.inside {
        canvas_px_to_ndc(mouse.x, mouse.y, width, height)
    } else {
        Vec2::ZERO
    }
}

#[inline]
pub fn glyph_for_icon(icon: &str) -> &'static str {
    ICON_GLYPHS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(icon))
        .map_or(FALLBACK_GLYPH, |(_, glyph)| glyph)
}

/// Text for the percent readout; never shows 100 until progress is complete.
pub fn percent_label(progress: f32) -> String {
    let p = if progress.is_finite() { progress } else { 0.0 };
    let shown = if p >= 100.0 { 100.0 } else { p.clamp(0.0, 99.0).floor() };
    format!("{}%", shown as u32)
}

/// Seconds between two RAF timestamps, clamped for stalls and clock skew.
#[inline]
pub fn frame_dt_sec(prev_ms: Option<f64>, now_ms: f64) -> f32 {
    match prev_ms {
        Some(prev) => (((now_ms - prev) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT_SEC),
        None => 0.0,
    }
}
