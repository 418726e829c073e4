//! OSC/UDP daemon wrapping the engine: parses CLI flags and an optional
//! JSON config file, wires up the frame scheduler against a UDP `Sink`, and
//! serves OSC commands on a receiver thread until interrupted.

mod config;
mod osc;

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use led_dissolve_engine::{new_shared, Clock, ControlSurface, FrameScheduler, SceneManager};

use config::DaemonConfig;

#[derive(Debug, Parser)]
#[command(name = "led-dissolve-daemon", about = "OSC/UDP LED dissolve playback daemon")]
struct Cli {
    /// Path to a JSON config file; built-in defaults are used if omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Initial scene library JSON, loaded at startup (overrides config).
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Initial dissolve schedule JSON, loaded at startup (overrides config).
    #[arg(long, value_name = "PATH")]
    dissolve: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match DaemonConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!("failed to load config {}: {err}", path.display());
                DaemonConfig::default()
            }
        },
        None => DaemonConfig::default(),
    };

    let clock = Clock::new();
    let manager = new_shared(SceneManager::new(config.target_fps));

    if let Some(path) = cli.scene.as_deref().or(config.scene_path.as_deref().map(std::path::Path::new)) {
        load_startup_scene(&manager, &clock, path);
    }
    if let Some(path) = cli.dissolve.as_deref().or(config.dissolve_path.as_deref().map(std::path::Path::new)) {
        load_startup_dissolve(&manager, path);
    }
    manager.lock().borrow_mut().set_master_brightness(i64::from(config.master_brightness));

    let destinations = resolve_destinations(&config);
    let send_socket = match UdpSocket::bind("0.0.0.0:0") {
        Ok(socket) => socket,
        Err(err) => {
            error!("failed to bind outbound UDP socket: {err}");
            std::process::exit(1);
        }
    };
    let sink = osc::OscUdpSink::new(send_socket, destinations);

    let mut scheduler = FrameScheduler::new(config.target_fps);
    scheduler.start(Arc::clone(&manager), sink, clock.clone());

    let control = Arc::new(ControlSurface::new(Arc::clone(&manager), clock, config.control_workers));
    let receiver_control = Arc::clone(&control);
    let input_addr = format!("{}:{}", config.osc_input_host, config.osc_input_port);
    let recv_socket = match UdpSocket::bind(&input_addr) {
        Ok(socket) => socket,
        Err(err) => {
            error!("failed to bind OSC input socket {input_addr}: {err}");
            scheduler.stop();
            std::process::exit(1);
        }
    };
    info!("listening for OSC commands on {input_addr}");
    std::thread::spawn(move || osc::run_receiver(recv_socket, receiver_control));

    let stop_scheduler = std::sync::Mutex::new(Some(scheduler));
    ctrlc::set_handler(move || {
        info!("shutdown requested");
        if let Some(mut scheduler) = stop_scheduler.lock().unwrap().take() {
            scheduler.stop();
        }
        std::process::exit(0);
    })
    .expect("failed to install signal handler");

    loop {
        std::thread::park();
    }
}

fn load_startup_scene(manager: &led_dissolve_engine::SharedSceneManager, clock: &Clock, path: &std::path::Path) {
    match std::fs::read_to_string(path) {
        Ok(text) => match led_dissolve_engine::json::parse_scenes_document(&text, clock.now()) {
            Ok(scenes) => manager.lock().borrow_mut().load_scenes(scenes),
            Err(err) => error!("failed to parse scene file {}: {err}", path.display()),
        },
        Err(err) => error!("failed to read scene file {}: {err}", path.display()),
    }
}

fn load_startup_dissolve(manager: &led_dissolve_engine::SharedSceneManager, path: &std::path::Path) {
    match std::fs::read_to_string(path) {
        Ok(text) => match led_dissolve_engine::json::parse_dissolve_document(&text) {
            Ok(raw) => manager.lock().borrow_mut().load_dissolve_patterns(&raw),
            Err(err) => error!("failed to parse dissolve file {}: {err}", path.display()),
        },
        Err(err) => error!("failed to read dissolve file {}: {err}", path.display()),
    }
}

fn resolve_destinations(config: &DaemonConfig) -> Vec<SocketAddr> {
    config
        .led_destinations
        .iter()
        .filter_map(|dest| {
            let addr = format!("{}:{}", dest.ip, dest.port);
            match addr.to_socket_addrs() {
                Ok(mut addrs) => addrs.next(),
                Err(err) => {
                    error!("invalid LED destination {addr}: {err}");
                    None
                }
            }
        })
        .collect()
}
