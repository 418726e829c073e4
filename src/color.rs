//! Pure 8-bit linear RGB colour math: clamping, transparency/brightness
//! application, and the weighted-averaging accumulator the compositor uses
//! to merge overlapping segment contributions onto one LED.

/// An 8-bit linear RGB triple. No gamma correction, no colour space beyond
/// plain channel math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Color::new(value.0, value.1, value.2)
    }
}

/// Saturate a floating-point channel value into `[0,255]`.
#[must_use]
pub fn clamp(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else if value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        value as u8
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// `c * (1 - clamp(t, 0, 1))`; `t=0` is opaque (identity), `t=1` is invisible.
#[must_use]
pub fn apply_transparency(c: Color, t: f64) -> Color {
    let factor = 1.0 - clamp01(t);
    scale(c, factor)
}

/// `c * clamp(b, 0, 1)`.
#[must_use]
pub fn apply_brightness(c: Color, b: f64) -> Color {
    scale(c, clamp01(b))
}

/// `c * (m/255)`; identity at `m=255`.
#[must_use]
pub fn apply_master_brightness(c: Color, m: u8) -> Color {
    scale(c, f64::from(m) / 255.0)
}

fn scale(c: Color, factor: f64) -> Color {
    Color::new(
        clamp(f64::from(c.r) * factor),
        clamp(f64::from(c.g) * factor),
        clamp(f64::from(c.b) * factor),
    )
}

/// Linear interpolation `a*(1-p) + b*p`, clamped; the crossfade primitive.
#[must_use]
pub fn lerp(a: Color, b: Color, p: f64) -> Color {
    let p = clamp01(p);
    Color::new(
        clamp(f64::from(a.r) * (1.0 - p) + f64::from(b.r) * p),
        clamp(f64::from(a.g) * (1.0 - p) + f64::from(b.g) * p),
        clamp(f64::from(a.b) * (1.0 - p) + f64::from(b.b) * p),
    )
}

/// Per-frame accumulator mapping LED index to weighted colour contributions.
///
/// `finalize` collapses each entry to a floor-averaged colour, or black if
/// the accumulated weight is zero. LEDs that never received a contribution
/// are left at whatever the framebuffer was initialized to.
#[derive(Debug, Default)]
pub struct Accumulator {
    contributions: Vec<Vec<(Color, f64)>>,
}

impl Accumulator {
    #[must_use]
    pub fn new(led_count: usize) -> Self {
        Accumulator { contributions: vec![Vec::new(); led_count] }
    }

    pub fn reset(&mut self, led_count: usize) {
        if self.contributions.len() != led_count {
            self.contributions = vec![Vec::new(); led_count];
        } else {
            for slot in &mut self.contributions {
                slot.clear();
            }
        }
    }

    /// Add a contribution at `index`; out-of-bounds indices are dropped
    /// silently (callers are expected to clip to framebuffer bounds first).
    pub fn add(&mut self, index: usize, color: Color, weight: f64) {
        if let Some(slot) = self.contributions.get_mut(index) {
            slot.push((color, weight));
        }
    }

    /// Collapse every LED's contributions into `fb`. `fb.len()` must equal
    /// the accumulator's LED count.
    pub fn finalize(&self, fb: &mut [Color]) {
        for (i, slot) in self.contributions.iter().enumerate() {
            let Some(cell) = fb.get_mut(i) else { continue };
            if slot.is_empty() {
                continue;
            }
            let mut sum_r = 0.0;
            let mut sum_g = 0.0;
            let mut sum_b = 0.0;
            let mut sum_w = 0.0;
            for (c, w) in slot {
                sum_r += f64::from(c.r) * w;
                sum_g += f64::from(c.g) * w;
                sum_b += f64::from(c.b) * w;
                sum_w += w;
            }
            *cell = if sum_w == 0.0 {
                Color::BLACK
            } else {
                Color::new(
                    (sum_r / sum_w).floor() as u8,
                    (sum_g / sum_w).floor() as u8,
                    (sum_b / sum_w).floor() as u8,
                )
            };
        }
    }
}
