//! Tachometer colour gradient

use serde::Serialize;

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Colour for an rpm ratio.
///
/// Green to yellow below 0.7, yellow to orange up to 0.9, orange to red up to
/// the limiter. Input is clamped to `[0, 1]`; channels are truncated.
pub fn rpm_color(ratio: f64) -> Rgb {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

    if ratio < 0.7 {
        Rgb::new((255.0 * (ratio / 0.7)) as u8, 255, 0)
    } else if ratio < 0.9 {
        Rgb::new(255, (255.0 * (1.0 - (ratio - 0.7) / 0.325)) as u8, 0)
    } else {
        Rgb::new(255, (100.0 * (1.0 - (ratio - 0.9) / 0.1)) as u8, 0)
    }
}
