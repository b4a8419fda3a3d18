use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::analysis::binning::Category;

// ---------------------------------------------------------------------------
// Category colours: fixed lookup table
// ---------------------------------------------------------------------------

/// `(category, colour name, colour)` for the four labelled bins.
pub const CATEGORY_COLORS: [(Category, &str, Color32); 4] = [
    (Category::Low, "green", Color32::from_rgb(0, 128, 0)),
    (Category::Medium, "yellow", Color32::from_rgb(255, 255, 0)),
    (Category::High, "orange", Color32::from_rgb(255, 165, 0)),
    (Category::VeryHigh, "red", Color32::from_rgb(255, 0, 0)),
];

/// Used for `Unclassified` and for NaN heatmap cells.
pub const UNAVAILABLE_COLOR: Color32 = Color32::GRAY;

pub fn category_color(category: Category) -> Color32 {
    CATEGORY_COLORS
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|&(_, _, color)| color)
        .unwrap_or(UNAVAILABLE_COLOR)
}

// ---------------------------------------------------------------------------
// Diverging ramp for correlation coefficients
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

/// Blue (-1) → light grey (0) → red (+1), mixed in linear RGB.
/// `NaN` maps to [`UNAVAILABLE_COLOR`].
pub fn diverging(value: f64) -> Color32 {
    if !value.is_finite() {
        return UNAVAILABLE_COLOR;
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let lin = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };

    let mixed = if t < 0.0 {
        lin(NEUTRAL).mix(lin(COOL), -t)
    } else {
        lin(NEUTRAL).mix(lin(WARM), t)
    };
    let rgb: Srgb<u8> = Srgb::from_linear(mixed);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
