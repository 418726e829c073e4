//! Daemon configuration: an optional JSON config file, overridable by CLI
//! flags (OSC input address, LED output destinations, target FPS, initial
//! master brightness). Out-of-range values are clamped and warned about at
//! the command boundary instead, so config-time validation only needs to
//! reject structurally broken input.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use led_dissolve_engine::EngineResult;

#[derive(Debug, Clone, Deserialize)]
pub struct LedDestination {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub osc_input_host: String,
    pub osc_input_port: u16,
    pub target_fps: u32,
    pub master_brightness: u8,
    pub control_workers: usize,
    pub led_destinations: Vec<LedDestination>,
    pub scene_path: Option<String>,
    pub dissolve_path: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            osc_input_host: "127.0.0.1".to_string(),
            osc_input_port: 8000,
            target_fps: led_dissolve_engine::DEFAULT_FPS,
            master_brightness: 255,
            control_workers: 4,
            led_destinations: vec![LedDestination { ip: "127.0.0.1".to_string(), port: 7000 }],
            scene_path: None,
            dissolve_path: None,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}
