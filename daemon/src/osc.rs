//! The concrete OSC-over-UDP collaborators: a command receiver that turns
//! incoming OSC messages into `control_surface::Command`s, and a `Sink`
//! that wraps each rendered framebuffer as an OSC blob at `/light/serial`
//! and fans it out over UDP to one or more LED controllers.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use log::{debug, warn};
use rosc::{OscMessage, OscPacket, OscType};

use led_dissolve_engine::{Color, Command, CommandArg, ControlSurface, Sink};

/// Blocks on a UDP socket decoding OSC packets and dispatching them to a
/// `ControlSurface`. Runs on its own receiver thread; command
/// handling itself happens on the control worker pool `ControlSurface` owns,
/// so a slow handler never stalls this loop.
pub fn run_receiver(socket: UdpSocket, control: Arc<ControlSurface>) {
    let mut buf = [0u8; 8192];
    loop {
        let (size, _src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(err) => {
                warn!("OSC receive failed: {err}");
                continue;
            }
        };

        match rosc::decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => dispatch_packet(&control, packet),
            Err(err) => warn!("malformed OSC packet: {err:?}"),
        }
    }
}

fn dispatch_packet(control: &ControlSurface, packet: OscPacket) {
    match packet {
        OscPacket::Message(msg) => dispatch_message(control, msg),
        OscPacket::Bundle(bundle) => {
            for nested in bundle.content {
                dispatch_packet(control, nested);
            }
        }
    }
}

fn dispatch_message(control: &ControlSurface, msg: OscMessage) {
    let args = msg.args.into_iter().filter_map(convert_arg).collect();
    debug!("received OSC command {}", msg.addr);
    control.dispatch(Command { address: msg.addr, args });
}

fn convert_arg(arg: OscType) -> Option<CommandArg> {
    match arg {
        OscType::Int(v) => Some(CommandArg::Int(i64::from(v))),
        OscType::Long(v) => Some(CommandArg::Int(v)),
        OscType::Float(v) => Some(CommandArg::Float(f64::from(v))),
        OscType::Double(v) => Some(CommandArg::Float(v)),
        OscType::String(v) => Some(CommandArg::Str(v)),
        _ => None,
    }
}

/// Fire-and-forget UDP sink: wraps each framebuffer as a single OSC blob
/// message at `/light/serial` and sends it to every configured destination.
pub struct OscUdpSink {
    socket: UdpSocket,
    destinations: Vec<SocketAddr>,
}

impl OscUdpSink {
    pub fn new(socket: UdpSocket, destinations: Vec<SocketAddr>) -> Self {
        OscUdpSink { socket, destinations }
    }
}

impl Sink for OscUdpSink {
    fn emit(&mut self, fb: &[Color]) -> Result<(), String> {
        let blob = led_dissolve_engine::sink::encode_rgbw(fb);
        let packet = OscPacket::Message(OscMessage { addr: "/light/serial".to_string(), args: vec![OscType::Blob(blob)] });
        let bytes = rosc::encoder::encode(&packet).map_err(|err| err.to_string())?;

        let mut last_err = None;
        for dest in &self.destinations {
            if let Err(err) = self.socket.send_to(&bytes, dest) {
                last_err = Some(err.to_string());
            }
        }
        match last_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
