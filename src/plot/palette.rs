//! Sequential "plasma" color map for filled contours.

use plotters::style::RGBColor;

/// Number of discrete contour levels.
pub const CONTOUR_LEVELS: usize = 75;

// Plasma sampled at t = 0, 1/8, ..., 1.
const PLASMA: [(u8, u8, u8); 9] = [
    (13, 8, 135),
    (76, 2, 161),
    (126, 3, 168),
    (169, 35, 149),
    (204, 71, 120),
    (230, 108, 92),
    (248, 149, 64),
    (253, 197, 39),
    (240, 249, 33),
];

/// Interpolated plasma color for `t` in `[0, 1]` (clamped).
pub fn plasma(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (PLASMA.len() - 1) as f64;
    let i = (pos.floor() as usize).min(PLASMA.len() - 2);
    let u = pos - i as f64;
    let (r0, g0, b0) = PLASMA[i];
    let (r1, g1, b1) = PLASMA[i + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * u).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Snap `value` in `[min, max]` to one of `levels` bands, as a fraction.
pub fn quantize(value: f64, min: f64, max: f64, levels: usize) -> f64 {
    if !(max > min) || levels < 2 {
        return 0.0;
    }
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let band = (t * levels as f64).floor().min(levels as f64 - 1.0);
    band / (levels as f64 - 1.0)
}

/// Contour color of `value` on a `[min, max]` log-error scale.
pub fn level_color(value: f64, min: f64, max: f64) -> RGBColor {
    plasma(quantize(value, min, max, CONTOUR_LEVELS))
}
