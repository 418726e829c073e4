//! Millisecond-resolution instants.
//!
//! The engine's timing-sensitive components (dimmer envelopes, dissolve
//! schedules, reflection bounce resets) need to construct arbitrary
//! timestamps in tests without sleeping. `std::time::Instant` cannot be
//! built from a raw tick count on stable Rust, so tick values are carried as
//! a plain `u64` of milliseconds since an arbitrary reference point. The
//! daemon establishes that reference once at startup with
//! `std::time::Instant::now()` and converts every wall-clock read to
//! `Instant::from_millis` from there.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Instant(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// `self - earlier` in milliseconds, saturating at zero if `earlier` is
    /// actually later (clock went backward, or a stale anchor).
    #[must_use]
    pub fn saturating_since(self, earlier: Instant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[must_use]
    pub fn add(self, delta: Duration) -> Self {
        Instant(self.0.saturating_add(delta.as_millis() as u64))
    }

    #[must_use]
    pub fn add_millis(self, ms: u64) -> Self {
        Instant(self.0.saturating_add(ms))
    }
}

/// A shared wall-clock reference point. The daemon constructs one `Clock`
/// at startup and hands clones to the `FrameScheduler` and `ControlSurface`
/// so both sides compute `Instant`s against the same origin: a dissolve
/// started from a control-worker thread and rendered from the render
/// thread must agree on what "now" means.
#[derive(Debug, Clone)]
pub struct Clock {
    epoch: std::time::Instant,
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Clock { epoch: std::time::Instant::now() }
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        Instant::from_millis(self.epoch.elapsed().as_millis() as u64)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
