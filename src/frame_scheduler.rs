//! Fixed-interval render tick loop.
//!
//! Drift correction and the deadline/sleep-duration split are carried over
//! from frame pacing designed for a bare render loop with no OS scheduler to
//! rely on; here the same tick logic drives a dedicated OS thread instead of
//! a caller-supplied `sleep_ms`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant as StdInstant};

use log::{info, warn};

use crate::scene_manager::SharedSceneManager;
use crate::sink::Sink;
use crate::time::Clock;

/// Default target frame rate.
pub const DEFAULT_FPS: u32 = 60;

/// Frames of slack before the scheduler gives up trying to catch up and
/// just resets its deadline to `now`.
const MAX_DRIFT_FRAMES: u64 = 2;

/// Bounded timeout for `stop()` to join the render thread.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to sleep between retries while no scene is loaded or no pattern
/// has been activated yet.
const IDLE_RETRY_MS: u64 = 20;

/// Runs [`SceneManager::advance`]/[`SceneManager::render_frame`] at a fixed
/// interval on a dedicated thread and hands the result to a [`Sink`].
/// Shutdown is cooperative: a stop flag is checked once per tick and
/// `stop()` joins the thread within a bounded timeout.
pub struct FrameScheduler {
    target_fps: u32,
    frame_duration_ms: u64,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameScheduler {
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        FrameScheduler {
            target_fps,
            frame_duration_ms: 1000 / u64::from(target_fps),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Spawn the render thread. `manager` is touched only through its
    /// reentrant mutex, held for the span of one frame's
    /// `advance + render_frame` call (the frame critical section).
    pub fn start<S>(&mut self, manager: SharedSceneManager, mut sink: S, clock: Clock)
    where
        S: Sink + Send + 'static,
    {
        let stop = Arc::clone(&self.stop);
        let frame_duration_ms = self.frame_duration_ms;
        let target_fps = self.target_fps;

        let handle = thread::spawn(move || {
            let wall_now = || clock.now();

            let mut next_frame = wall_now();
            let mut t_last = next_frame;
            let mut fps_window_start = next_frame;
            let mut fps_window_frames: u32 = 0;

            manager.lock().borrow_mut().set_animation_running(true);

            while !stop.load(Ordering::Acquire) {
                let now = wall_now();

                if !manager.lock().borrow().is_ready_to_render() {
                    t_last = now;
                    next_frame = now;
                    thread::sleep(Duration::from_millis(IDLE_RETRY_MS));
                    continue;
                }

                let max_drift_ms = frame_duration_ms * MAX_DRIFT_FRAMES;
                if now.as_millis() > next_frame.as_millis() + max_drift_ms {
                    next_frame = now;
                }

                let dt_secs = now.saturating_since(t_last) as f64 / 1000.0;
                t_last = now;

                let frame_started = StdInstant::now();
                {
                    let guard = manager.lock();
                    let mut mgr = guard.borrow_mut();
                    mgr.advance(dt_secs, now);
                    let fb = mgr.render_frame(now);
                    if let Err(reason) = sink.emit(&fb) {
                        warn!("sink emit failed: {reason}");
                        mgr.record_sink_error();
                    }
                }
                let frame_elapsed_ms = frame_started.elapsed().as_millis() as u64;
                if frame_elapsed_ms > frame_duration_ms * 2 {
                    warn!("frame took {frame_elapsed_ms}ms, over twice the {frame_duration_ms}ms target interval");
                }

                next_frame = next_frame.add_millis(frame_duration_ms);

                fps_window_frames += 1;
                let window_elapsed_ms = now.saturating_since(fps_window_start);
                if window_elapsed_ms >= 1000 {
                    let fps = f64::from(fps_window_frames) * 1000.0 / window_elapsed_ms as f64;
                    manager.lock().borrow_mut().set_actual_fps(fps);
                    fps_window_frames = 0;
                    fps_window_start = now;
                }

                let sleep_ms = next_frame.as_millis().saturating_sub(wall_now().as_millis());
                if sleep_ms > 0 {
                    thread::sleep(Duration::from_millis(sleep_ms));
                }
            }

            manager.lock().borrow_mut().set_animation_running(false);
            info!("render thread stopped (target {target_fps} fps)");
        });

        self.handle = Some(handle);
    }

    /// Flip the cooperative stop flag and join the render thread within a
    /// bounded timeout, logging (rather than panicking) if it does not
    /// exit in time.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else { return };

        let (tx, rx) = mpsc::channel();
        let waiter = thread::spawn(move || {
            let _ = tx.send(handle.join());
        });
        if rx.recv_timeout(JOIN_TIMEOUT).is_err() {
            warn!("render thread did not exit within {JOIN_TIMEOUT:?}");
        }
        let _ = waiter.join();
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
