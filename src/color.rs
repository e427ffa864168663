use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Heat ramp
// ---------------------------------------------------------------------------

/// Hue at zero intensity (blue) and full intensity (red).
const COLD_HUE: f32 = 240.0;
const HOT_HUE: f32 = 0.0;

/// Colour for a density in `[0, 1]`: blue and faint when sparse, red and
/// opaque when dense. Values outside the range are clamped.
pub fn heat_color(intensity: f32) -> Color32 {
    let t = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };
    let hue = COLD_HUE + (HOT_HUE - COLD_HUE) * t;
    let hsl = Hsl::new(hue, 0.85, 0.5);
    let rgb: Srgb = hsl.into_color();
    let alpha = 90.0 + 150.0 * t;
    Color32::from_rgba_unmultiplied(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
        alpha as u8,
    )
}

/// `n` evenly spaced ramp colours with their intensity, for the legend.
pub fn legend_stops(n: usize) -> Vec<(f32, Color32)> {
    match n {
        0 => Vec::new(),
        1 => vec![(1.0, heat_color(1.0))],
        _ => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                (t, heat_color(t))
            })
            .collect(),
    }
}
