//! Per-LED crossfade: schedule compilation, continuous dual-pattern
//! blending, and the independent schedule registry.

use std::collections::HashMap;

use log::warn;

use crate::color::{self, Color};
use crate::error::{EngineError, EngineResult};
use crate::scene::PatternState;
use crate::time::Instant;

/// One entry of a [`DissolveSchedule`]: assign `(delay_ms, duration_ms)` to
/// every LED in `[led_start, led_end]` that doesn't already have one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DissolveTransition {
    pub delay_ms: u64,
    pub duration_ms: u64,
    pub led_start: usize,
    pub led_end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DissolveSchedule {
    pub transitions: Vec<DissolveTransition>,
}

#[derive(Debug, Clone, Copy)]
struct PerLedCrossfade {
    start_time_abs: Instant,
    duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissolveState {
    Completed,
    Crossfading,
}

/// Per-LED crossfade state between two fully-qualified patterns. Both
/// `old` and `new` are rendered fresh every frame by the caller (continuous
/// dual-pattern rendering, see the design notes on sub-LED snapshotting).
#[derive(Debug)]
pub struct DissolveEngine {
    state: DissolveState,
    old: Option<PatternState>,
    new: Option<PatternState>,
    led_schedule: Vec<Option<PerLedCrossfade>>,
}

impl DissolveEngine {
    #[must_use]
    pub fn new() -> Self {
        DissolveEngine { state: DissolveState::Completed, old: None, new: None, led_schedule: Vec::new() }
    }

    #[must_use]
    pub fn state(&self) -> DissolveState {
        self.state
    }

    #[must_use]
    pub fn is_crossfading(&self) -> bool {
        self.state == DissolveState::Crossfading
    }

    #[must_use]
    pub fn old_pattern(&self) -> Option<PatternState> {
        self.old
    }

    #[must_use]
    pub fn new_pattern(&self) -> Option<PatternState> {
        self.new
    }

    /// Compile `schedule` into a per-LED `(start_time_abs, duration_ms)`
    /// table and transition to CROSSFADING, or directly to COMPLETED if no
    /// LED ends up with an active assignment. `old = None` means "crossfade
    /// up from black" (first activation since load).
    pub fn start(
        &mut self,
        old: Option<PatternState>,
        new: PatternState,
        schedule: &DissolveSchedule,
        led_count: usize,
        now: Instant,
    ) {
        let mut table: Vec<Option<PerLedCrossfade>> = vec![None; led_count];
        let mut assigned = vec![false; led_count];

        for t in &schedule.transitions {
            if led_count == 0 {
                break;
            }
            let lo = t.led_start.min(led_count - 1);
            let hi = t.led_end.min(led_count - 1);
            if lo > hi {
                continue;
            }
            for i in assigned.iter_mut().enumerate().skip(lo).take(hi - lo + 1).filter(|(_, a)| !**a).map(|(i, _)| i) {
                table[i] = Some(PerLedCrossfade { start_time_abs: now.add_millis(t.delay_ms), duration_ms: t.duration_ms });
                assigned[i] = true;
            }
        }

        let any_active = table.iter().any(Option::is_some);
        self.old = old;
        self.new = Some(new);
        self.led_schedule = table;
        self.state = if any_active { DissolveState::Crossfading } else { DissolveState::Completed };
    }

    fn progress(&self, i: usize, now: Instant) -> f64 {
        match self.led_schedule.get(i).and_then(|c| *c) {
            None => 1.0,
            Some(c) => {
                if now < c.start_time_abs {
                    0.0
                } else {
                    let elapsed = now.saturating_since(c.start_time_abs);
                    if elapsed >= c.duration_ms {
                        1.0
                    } else {
                        elapsed as f64 / c.duration_ms as f64
                    }
                }
            }
        }
    }

    /// Blend freshly-rendered `fb_old`/`fb_new` per the compiled schedule.
    /// Transitions to COMPLETED once every scheduled LED reaches progress 1.
    pub fn blend(&mut self, fb_old: &[Color], fb_new: &[Color], now: Instant) -> Vec<Color> {
        let led_count = self.led_schedule.len();
        let mut fb = Vec::with_capacity(led_count);
        let mut all_done = true;
        for i in 0..led_count {
            let p = self.progress(i, now);
            if p < 1.0 {
                all_done = false;
            }
            let old_c = fb_old.get(i).copied().unwrap_or(Color::BLACK);
            let new_c = fb_new.get(i).copied().unwrap_or(Color::BLACK);
            fb.push(color::lerp(old_c, new_c, p));
        }
        if all_done {
            self.state = DissolveState::Completed;
        }
        fb
    }
}

impl Default for DissolveEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Independent registry of named dissolve schedules plus a "current
/// pattern id" selection. Unrelated to `SceneManager`'s own state.
#[derive(Debug, Default)]
pub struct DissolveScheduleRegistry {
    patterns: HashMap<i64, DissolveSchedule>,
    current: Option<i64>,
}

impl DissolveScheduleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry from raw `(pattern_id, [(delay,duration,start,end)])`
    /// entries. Invalid transitions are dropped with a warning; a pattern
    /// left with zero valid entries is retained as an instantaneous
    /// transition rather than discarded outright.
    pub fn load_from_payload(&mut self, raw: &HashMap<i64, Vec<(i64, i64, i64, i64)>>) {
        let mut patterns = HashMap::with_capacity(raw.len());
        for (&pattern_id, entries) in raw {
            let mut transitions = Vec::with_capacity(entries.len());
            for &(delay_ms, duration_ms, led_start, led_end) in entries {
                if delay_ms < 0 || duration_ms <= 0 || led_start < 0 || led_end < 0 || led_start > led_end {
                    warn!(
                        "dropping invalid dissolve transition in pattern {pattern_id}: \
                         delay={delay_ms} duration={duration_ms} range=[{led_start},{led_end}]"
                    );
                    continue;
                }
                transitions.push(DissolveTransition {
                    delay_ms: delay_ms as u64,
                    duration_ms: duration_ms as u64,
                    led_start: led_start as usize,
                    led_end: led_end as usize,
                });
            }
            patterns.insert(pattern_id, DissolveSchedule { transitions });
        }
        self.patterns = patterns;
        if let Some(current) = self.current {
            if !self.patterns.contains_key(&current) {
                self.current = None;
            }
        }
    }

    pub fn set_current(&mut self, pattern_id: i64) -> EngineResult<()> {
        if !self.patterns.contains_key(&pattern_id) {
            return Err(EngineError::ValidationError {
                field: "pattern_id",
                reason: format!("unknown dissolve pattern id {pattern_id}"),
            });
        }
        self.current = Some(pattern_id);
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Option<&DissolveSchedule> {
        self.current.and_then(|id| self.patterns.get(&id))
    }

    #[must_use]
    pub fn current_id(&self) -> Option<i64> {
        self.current
    }
}
