//! The `Sink` collaborator: fire-and-forget framebuffer emission. The wire
//! encoding (OSC blob over UDP) lives in the daemon; this crate only
//! specifies the trait and the byte layout both sides agree on.

use crate::color::Color;

/// Emits one rendered framebuffer per frame. Implementations are expected to
/// be fire-and-forget: a failed `emit` increments a counter upstream and the
/// render loop continues producing frames.
pub trait Sink {
    /// # Errors
    /// Any transport failure; the caller treats this as `TransientIOError`.
    fn emit(&mut self, fb: &[Color]) -> Result<(), String>;
}

/// Packs a framebuffer as `4*N` bytes, `R,G,B,0` per LED, the payload that
/// goes inside the OSC blob argument at `/light/serial`. `W=0` is a
/// fixed fourth channel; this engine has no white channel to populate.
#[must_use]
pub fn encode_rgbw(fb: &[Color]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(fb.len() * 4);
    for c in fb {
        bytes.push(c.r);
        bytes.push(c.g);
        bytes.push(c.b);
        bytes.push(0);
    }
    bytes
}

/// An in-memory sink for tests: records every framebuffer emitted.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<Vec<Color>>,
}

impl Sink for RecordingSink {
    fn emit(&mut self, fb: &[Color]) -> Result<(), String> {
        self.frames.push(fb.to_vec());
        Ok(())
    }
}
