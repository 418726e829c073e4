//! Maps external commands (address + typed args) to `SceneManager`
//! mutations. Handlers run on a worker pool so a slow handler never blocks
//! the receiver; each handler validates, mutates, and logs, and never lets
//! an error escape to the scheduler.

use std::fs;
use std::sync::Arc;

use log::{error, info, warn};
use threadpool::ThreadPool;

use crate::error::{EngineError, EngineResult};
use crate::json;
use crate::scene_manager::SharedSceneManager;
use crate::time::Clock;

/// A positional, typed OSC-style argument.
#[derive(Debug, Clone)]
pub enum CommandArg {
    Int(i64),
    Float(f64),
    Str(String),
}

impl CommandArg {
    fn as_int(&self) -> Option<i64> {
        match self {
            CommandArg::Int(v) => Some(*v),
            CommandArg::Float(v) => Some(*v as i64),
            CommandArg::Str(_) => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            CommandArg::Str(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Command {
    pub address: String,
    pub args: Vec<CommandArg>,
}

/// Dispatches commands from the (external) receiver onto a small worker
/// pool, each worker holding the shared reentrant mutex only for the span
/// of its own mutation.
pub struct ControlSurface {
    manager: SharedSceneManager,
    clock: Clock,
    pool: ThreadPool,
}

impl ControlSurface {
    #[must_use]
    pub fn new(manager: SharedSceneManager, clock: Clock, workers: usize) -> Self {
        ControlSurface { manager, clock, pool: ThreadPool::new(workers.max(1)) }
    }

    /// Hand `cmd` to the worker pool; returns immediately.
    pub fn dispatch(&self, cmd: Command) {
        let manager = Arc::clone(&self.manager);
        let clock = self.clock.clone();
        self.pool.execute(move || {
            let address = cmd.address.clone();
            let result = handle(&manager, &clock, &cmd);
            let guard = manager.lock();
            guard.borrow_mut().record_command_result(result.is_ok());
            match result {
                Ok(()) => info!("{address}: ok"),
                Err(err) => warn!("{address}: {err}"),
            }
        });
    }
}

fn handle(manager: &SharedSceneManager, clock: &Clock, cmd: &Command) -> EngineResult<()> {
    match cmd.address.as_str() {
        "/load_json" => load_json(manager, clock, cmd),
        "/change_scene" => {
            let id = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_scene(id)
        }
        "/change_effect" => {
            let id = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_effect(id)
        }
        "/change_palette" => {
            let id = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_palette(id)
        }
        "/load_dissolve_json" => load_dissolve_json(manager, cmd),
        "/set_dissolve_pattern" => {
            let id = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_dissolve_pattern(id)
        }
        "/change_pattern" => {
            let now = clock.now();
            manager.lock().borrow_mut().change_pattern(now)
        }
        "/set_speed_percent" => {
            let percent = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_speed_percent(percent);
            Ok(())
        }
        "/master_brightness" => {
            let brightness = require_int(cmd, 0)?;
            manager.lock().borrow_mut().set_master_brightness(brightness);
            Ok(())
        }
        addr if addr.starts_with("/palette/") => handle_palette(manager, addr, cmd),
        other => {
            error!("unknown address {other}, dropping");
            Err(EngineError::ValidationError { field: "address", reason: format!("unknown address {other}") })
        }
    }
}

fn require_int(cmd: &Command, index: usize) -> EngineResult<i64> {
    cmd.args
        .get(index)
        .and_then(CommandArg::as_int)
        .ok_or_else(|| EngineError::ValidationError {
            field: "args",
            reason: format!("{} expects an int argument at position {index}", cmd.address),
        })
}

fn require_path(cmd: &Command) -> EngineResult<&str> {
    cmd.args.first().and_then(CommandArg::as_str).ok_or_else(|| EngineError::ValidationError {
        field: "args",
        reason: format!("{} expects a string path argument", cmd.address),
    })
}

fn load_json(manager: &SharedSceneManager, clock: &Clock, cmd: &Command) -> EngineResult<()> {
    let path = require_path(cmd)?;
    let text = fs::read_to_string(path).map_err(|err| EngineError::ConfigError {
        path: Some(path.into()),
        reason: err.to_string(),
    })?;
    let scenes = json::parse_scenes_document(&text, clock.now())?;
    manager.lock().borrow_mut().load_scenes(scenes);
    Ok(())
}

fn load_dissolve_json(manager: &SharedSceneManager, cmd: &Command) -> EngineResult<()> {
    let path = require_path(cmd)?;
    let text = fs::read_to_string(path).map_err(|err| EngineError::ConfigError {
        path: Some(path.into()),
        reason: err.to_string(),
    })?;
    let raw = json::parse_dissolve_document(&text)?;
    manager.lock().borrow_mut().load_dissolve_patterns(&raw);
    Ok(())
}

/// `/palette/{p}/{c}` where `p` is `0..4` or a letter `A..E`, `c` is `0..5`.
fn handle_palette(manager: &SharedSceneManager, addr: &str, cmd: &Command) -> EngineResult<()> {
    let mut parts = addr.trim_start_matches("/palette/").split('/');
    let p = parts.next().ok_or_else(|| invalid_address(addr))?;
    let c = parts.next().ok_or_else(|| invalid_address(addr))?;

    let palette_id = parse_palette_letter_or_digit(p).ok_or_else(|| invalid_address(addr))?;
    let color_id: i64 = c.parse().map_err(|_| invalid_address(addr))?;

    let r = require_int(cmd, 0)?;
    let g = require_int(cmd, 1)?;
    let b = require_int(cmd, 2)?;

    manager.lock().borrow_mut().update_palette_color(palette_id, color_id, r, g, b)
}

fn invalid_address(addr: &str) -> EngineError {
    EngineError::ValidationError { field: "address", reason: format!("malformed palette address {addr}") }
}

fn parse_palette_letter_or_digit(token: &str) -> Option<i64> {
    if let Ok(digit) = token.parse::<i64>() {
        return Some(digit);
    }
    let ch = token.chars().next()?;
    if ('A'..='E').contains(&ch) {
        Some(i64::from(ch as u8 - b'A'))
    } else {
        None
    }
}
