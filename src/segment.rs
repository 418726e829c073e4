//! The smallest animated unit: a position integrator, a dimmer envelope, and
//! a palette-indexed contribution emitter.

use crate::color::{self, Color};
use crate::time::Instant;

/// One leg of a piecewise-linear brightness cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimmerTriple {
    pub duration_ms: u64,
    pub start_pct: f64,
    pub end_pct: f64,
}

impl DimmerTriple {
    #[must_use]
    pub fn new(duration_ms: u64, start_pct: f64, end_pct: f64) -> Self {
        DimmerTriple {
            duration_ms: duration_ms.max(1),
            start_pct: start_pct.clamp(0.0, 100.0),
            end_pct: end_pct.clamp(0.0, 100.0),
        }
    }
}

#[must_use]
pub fn default_dimmer_time() -> Vec<DimmerTriple> {
    vec![DimmerTriple::new(1000, 0.0, 100.0)]
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub segment_id: i64,
    pub color: Vec<i32>,
    pub transparency: Vec<f64>,
    pub length: Vec<u32>,
    pub move_speed: f64,
    pub move_range: (i64, i64),
    pub initial_position: i64,
    pub current_position: i64,
    pub is_edge_reflect: bool,
    pub dimmer_time: Vec<DimmerTriple>,
    pub segment_start_time: Instant,
    fractional_accumulator: f64,
}

impl Segment {
    /// Build a segment from already-normalized fields, applying the
    /// padding/default invariants (`transparency`/`length` padded up to
    /// `color`'s length, empty `dimmer_time` defaulted).
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        segment_id: i64,
        mut color: Vec<i32>,
        mut transparency: Vec<f64>,
        mut length: Vec<u32>,
        move_speed: f64,
        move_range: (i64, i64),
        initial_position: i64,
        current_position: i64,
        is_edge_reflect: bool,
        dimmer_time: Vec<DimmerTriple>,
        now: Instant,
    ) -> Self {
        if color.is_empty() {
            color.push(0);
        }
        while transparency.len() < color.len() {
            transparency.push(0.0);
        }
        while length.len() < color.len() {
            length.push(1);
        }
        let dimmer_time = if dimmer_time.is_empty() { default_dimmer_time() } else { dimmer_time };

        Segment {
            segment_id,
            color,
            transparency,
            length,
            move_speed,
            move_range,
            initial_position,
            current_position,
            is_edge_reflect,
            dimmer_time,
            segment_start_time: now,
            fractional_accumulator: 0.0,
        }
    }

    fn reset_timing(&mut self, now: Instant) {
        self.segment_start_time = now;
        self.fractional_accumulator = 0.0;
    }

    /// `Σ length[i]` plus one LED for each `color[i]` with `i ≥ |length|`.
    #[must_use]
    pub fn total_emitted_leds(&self) -> usize {
        let from_parts: usize = self.length.iter().map(|&l| l as usize).sum();
        let tail = self.color.len().saturating_sub(self.length.len());
        from_parts + tail
    }

    /// Brightness factor in `[0,1]` at `now`, sampled from the dimmer cycle.
    #[must_use]
    pub fn dimmer_factor(&self, now: Instant) -> f64 {
        if self.dimmer_time.is_empty() {
            return 1.0;
        }
        let cycle: u64 = self.dimmer_time.iter().map(|t| t.duration_ms).sum();
        if cycle == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_since(self.segment_start_time);
        let t = elapsed % cycle;

        let mut offset = 0u64;
        for triple in &self.dimmer_time {
            let next_offset = offset + triple.duration_ms;
            if t < next_offset {
                let local = t - offset;
                let progress = (local as f64 / triple.duration_ms as f64).clamp(0.0, 1.0);
                let pct = triple.start_pct + (triple.end_pct - triple.start_pct) * progress;
                return (pct / 100.0).clamp(0.0, 1.0);
            }
            offset = next_offset;
        }
        let last = self.dimmer_time.last().expect("checked non-empty above");
        (last.end_pct / 100.0).clamp(0.0, 1.0)
    }

    /// Advance the fractional position accumulator by `dt_scaled` seconds,
    /// applying reflect/wrap boundary behavior. `move_range=(0,0)` disables
    /// movement and bounds enforcement entirely.
    pub fn update_position(&mut self, dt_scaled_secs: f64, now: Instant) {
        let (lo, hi) = self.move_range;
        if lo == 0 && hi == 0 {
            return;
        }
        if self.move_speed == 0.0 {
            return;
        }

        self.fractional_accumulator += self.move_speed * dt_scaled_secs;
        let whole = self.fractional_accumulator.trunc();
        self.current_position += whole as i64;
        self.fractional_accumulator -= whole;

        let l = self.total_emitted_leds() as i64;
        let hi_eff = (hi - l + 1).max(lo);

        if self.is_edge_reflect {
            let mut direction_changed = false;
            if self.current_position <= lo {
                self.current_position = lo;
                if self.move_speed < 0.0 {
                    self.move_speed = -self.move_speed;
                    direction_changed = true;
                }
            } else if self.current_position >= hi_eff {
                self.current_position = hi_eff;
                if self.move_speed > 0.0 {
                    self.move_speed = -self.move_speed;
                    direction_changed = true;
                }
            }
            if direction_changed {
                self.reset_timing(now);
            }
        } else {
            let span = hi_eff - lo;
            if span > 0 {
                let mut rel = (self.current_position - lo) % (span + 1);
                if rel < 0 {
                    rel += span + 1;
                }
                self.current_position = lo + rel;
            } else {
                self.current_position = lo;
            }
        }
    }

    pub fn reset_position(&mut self, now: Instant) {
        self.current_position = self.initial_position;
        self.reset_timing(now);
    }

    /// Colours for the current frame, `len() == total_emitted_leds()`
    /// (empty if the dimmer factor is exactly zero, which is semantically
    /// equivalent to an all-zero contribution and skipped as an optimization).
    #[must_use]
    pub fn emit_colors(&self, palette: &[Color], now: Instant) -> Vec<Color> {
        let factor = self.dimmer_factor(now);
        if factor <= 0.0 {
            return Vec::new();
        }

        let mut colors = Vec::with_capacity(self.total_emitted_leds());
        for (part, &len) in self.length.iter().enumerate() {
            let base = palette_color(palette, self.color.get(part).copied().unwrap_or(0));
            let transparency = self.transparency.get(part).copied().unwrap_or(0.0);
            let final_color = part_color(base, transparency, factor);
            for _ in 0..len {
                colors.push(final_color);
            }
        }
        for idx in self.length.len()..self.color.len() {
            let base = palette_color(palette, self.color[idx]);
            let transparency = self.transparency.get(idx).copied().unwrap_or(0.0);
            colors.push(part_color(base, transparency, factor));
        }
        colors
    }
}

fn palette_color(palette: &[Color], index: i32) -> Color {
    if index < 0 {
        return Color::BLACK;
    }
    palette.get(index as usize).copied().unwrap_or(Color::BLACK)
}

fn part_color(base: Color, transparency: f64, dimmer_factor: f64) -> Color {
    let with_transparency = color::apply_transparency(base, transparency);
    color::apply_brightness(with_transparency, dimmer_factor)
}
