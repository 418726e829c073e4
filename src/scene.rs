//! Scenes: an ordered set of [`Effect`]s and palettes, plus current
//! selection.

use crate::color::{Accumulator, Color};
use crate::effect::Effect;
use crate::time::Instant;

/// Exactly six colours, indexed `[0,5]`.
pub type Palette = [Color; 6];

/// A fully-qualified `(scene, effect, palette)` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternState {
    pub scene_id: i64,
    pub effect_id: i64,
    pub palette_id: i64,
}

impl PatternState {
    #[must_use]
    pub const fn new(scene_id: i64, effect_id: i64, palette_id: i64) -> Self {
        PatternState { scene_id, effect_id, palette_id }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub scene_id: i64,
    pub led_count: usize,
    pub fps: u32,
    pub effects: Vec<Effect>,
    pub palettes: Vec<Palette>,
    pub current_effect_id: i64,
    pub current_palette_id: i64,
}

impl Scene {
    #[must_use]
    pub fn effect(&self, effect_id: i64) -> Option<&Effect> {
        self.effects.iter().find(|e| e.effect_id == effect_id)
    }

    #[must_use]
    pub fn effect_mut(&mut self, effect_id: i64) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|e| e.effect_id == effect_id)
    }

    #[must_use]
    pub fn palette(&self, palette_id: i64) -> Option<&Palette> {
        if palette_id < 0 {
            return None;
        }
        self.palettes.get(palette_id as usize)
    }

    #[must_use]
    pub fn has_effect(&self, effect_id: i64) -> bool {
        self.effects.iter().any(|e| e.effect_id == effect_id)
    }

    #[must_use]
    pub fn has_palette(&self, palette_id: i64) -> bool {
        palette_id >= 0 && (palette_id as usize) < self.palettes.len()
    }

    /// Render `effects[current_effect_id]` against `palettes[current_palette_id]`
    /// into `acc`. No-op if either selection is invalid.
    pub fn render(&self, acc: &mut Accumulator, now: Instant) {
        let (Some(effect), Some(palette)) =
            (self.effect(self.current_effect_id), self.palette(self.current_palette_id))
        else {
            return;
        };
        effect.render(palette, acc, self.led_count, now);
    }

    /// Advance the currently-selected effect by `dt_secs`.
    pub fn advance_current(&mut self, dt_secs: f64, now: Instant) {
        let id = self.current_effect_id;
        if let Some(effect) = self.effect_mut(id) {
            effect.advance(dt_secs, now);
        }
    }
}
