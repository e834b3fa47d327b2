use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Number of distinct line colours before the cycle repeats.
pub const LINE_CYCLE_LEN: usize = 10;

/// Step through the hue wheel; coprime with [`LINE_CYCLE_LEN`] so every hue
/// is visited and neighbours in the cycle are far apart.
const HUE_STRIDE: usize = 3;

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Line colour cycle
// ---------------------------------------------------------------------------

/// Deterministic colour cycle for drill lines.
#[derive(Debug, Clone)]
pub struct LineColors {
    palette: Vec<Color32>,
    next: usize,
}

impl Default for LineColors {
    fn default() -> Self {
        Self {
            palette: generate_palette(LINE_CYCLE_LEN),
            next: 0,
        }
    }
}

impl LineColors {
    /// Colour of the `n`-th line ever drawn.
    pub fn nth(&self, n: usize) -> Color32 {
        self.palette[(n * HUE_STRIDE) % self.palette.len()]
    }

    pub fn next_color(&mut self) -> Color32 {
        let color = self.nth(self.next);
        self.next += 1;
        color
    }
}
