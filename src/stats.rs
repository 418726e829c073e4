//! Aggregate counters surfaced by engine status queries.

/// A point-in-time snapshot of engine health, the concrete shape behind
/// "status queries include aggregate counters (frames, FPS, command counts,
/// error counts)".
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct EngineStats {
    pub target_fps: u32,
    pub actual_fps: f64,
    pub frame_count: u64,
    pub active_leds: usize,
    pub total_leds: usize,
    pub animation_time_secs: f64,
    pub master_brightness: u8,
    pub speed_percent: u16,
    pub command_count: u64,
    pub error_count: u64,
    pub sink_error_count: u64,
    pub animation_running: bool,
}
