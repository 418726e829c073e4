//! An ordered set of [`Segment`]s advanced and rendered together.

use crate::color::{self, Accumulator, Color};
use crate::segment::Segment;
use crate::time::Instant;

#[derive(Debug, Clone)]
pub struct Effect {
    pub effect_id: i64,
    pub segments: Vec<Segment>,
}

impl Effect {
    #[must_use]
    pub fn new(effect_id: i64, segments: Vec<Segment>) -> Self {
        Effect { effect_id, segments }
    }

    /// Advance every segment's position using the original (unscaled or
    /// speed-scaled, caller decides) `dt`.
    pub fn advance(&mut self, dt_secs: f64, now: Instant) {
        for segment in &mut self.segments {
            segment.update_position(dt_secs, now);
        }
    }

    /// Render every segment's contribution into `acc`, clipped to
    /// `led_count` LEDs.
    pub fn render(&self, palette: &[Color], acc: &mut Accumulator, led_count: usize, now: Instant) {
        for segment in &self.segments {
            let colors = segment.emit_colors(palette, now);
            if colors.is_empty() {
                continue;
            }
            place_contribution(segment, &colors, acc, led_count);
        }
    }
}

fn place_contribution(segment: &Segment, colors: &[Color], acc: &mut Accumulator, led_count: usize) {
    let (lo, hi) = segment.move_range;
    let base = segment.current_position;

    if lo == 0 && hi == 0 {
        let base = base.max(0) as usize;
        if base >= led_count {
            return;
        }
        let available = led_count - base;
        let colors = &colors[..colors.len().min(available)];
        for (k, c) in colors.iter().enumerate() {
            acc.add(base + k, *c, 1.0);
        }
        return;
    }

    let max_allowed = hi - colors.len() as i64 + 1;
    let safe_position = base.min(max_allowed);

    if safe_position < 0 {
        if safe_position < -(colors.len() as i64) {
            return;
        }
        let skip = (-safe_position) as usize;
        for (k, c) in colors[skip..].iter().enumerate() {
            let idx = k;
            if idx < led_count {
                acc.add(idx, *c, 1.0);
            }
        }
        return;
    }

    let safe_position = safe_position as usize;
    for (k, c) in colors.iter().enumerate() {
        let idx = safe_position + k;
        if idx < led_count {
            acc.add(idx, *c, 1.0);
        }
    }
}

/// Apply master brightness per-LED to an already-finalized framebuffer.
pub fn apply_master_brightness(fb: &mut [Color], master_brightness: u8) {
    for c in fb {
        *c = color::apply_master_brightness(*c, master_brightness);
    }
}
