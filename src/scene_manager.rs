//! Scene library ownership, pattern activation, dissolve orchestration, and
//! the speed/brightness model. The single component every thread touches,
//! see `shared` below for the reentrant-mutex wrapper the render thread and
//! control workers actually hold.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::ReentrantMutex;

use crate::color::{Accumulator, Color};
use crate::dissolve::{DissolveEngine, DissolveScheduleRegistry};
use crate::effect;
use crate::error::{EngineError, EngineResult};
use crate::scene::{PatternState, Scene};
use crate::stats::EngineStats;
use crate::time::Instant;

/// `ReentrantMutex<RefCell<_>>` is the idiomatic parking_lot combination for
/// "one mutex guards everything, and the render thread's own critical
/// section re-enters it while rendering a dissolve's old/new patterns", and a
/// plain non-reentrant `Mutex` would deadlock the render thread against
/// itself in that path.
pub type SharedSceneManager = Arc<ReentrantMutex<RefCell<SceneManager>>>;

#[must_use]
pub fn new_shared(manager: SceneManager) -> SharedSceneManager {
    Arc::new(ReentrantMutex::new(RefCell::new(manager)))
}

#[derive(Debug)]
pub struct SceneManager {
    scenes: HashMap<i64, Scene>,
    current_scene_id: Option<i64>,
    last_activated: Option<PatternState>,
    original_speed_map: HashMap<(i64, i64, i64), f64>,
    speed_percent: u16,
    master_brightness: u8,
    dissolve_registry: DissolveScheduleRegistry,
    dissolve_engine: DissolveEngine,
    stats: EngineStats,
}

impl SceneManager {
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        SceneManager {
            scenes: HashMap::new(),
            current_scene_id: None,
            last_activated: None,
            original_speed_map: HashMap::new(),
            speed_percent: 100,
            master_brightness: 255,
            dissolve_registry: DissolveScheduleRegistry::new(),
            dissolve_engine: DissolveEngine::new(),
            stats: EngineStats { target_fps, speed_percent: 100, master_brightness: 255, ..EngineStats::default() },
        }
    }

    // ---- loading -----------------------------------------------------

    /// Replace the scene library, rebuild the original-speed map, and
    /// select the lowest-id scene as active if none is currently selected.
    /// The previous library and selection are left untouched if any scene
    /// fails to parse upstream (callers build the full `Vec<Scene>` before
    /// calling this, so a partially-applied load never happens here).
    pub fn load_scenes(&mut self, scenes: Vec<Scene>) {
        let mut map = HashMap::new();
        let mut by_id = HashMap::with_capacity(scenes.len());
        for scene in scenes {
            for effect in &scene.effects {
                for segment in &effect.segments {
                    map.insert((scene.scene_id, effect.effect_id, segment.segment_id), segment.move_speed);
                }
            }
            by_id.insert(scene.scene_id, scene);
        }
        self.scenes = by_id;
        self.original_speed_map = map;
        self.last_activated = None;
        self.dissolve_engine = DissolveEngine::new();

        if self.current_scene_id.is_none_or(|id| !self.scenes.contains_key(&id)) {
            self.current_scene_id = self.scenes.keys().copied().min();
        }
        info!("loaded {} scene(s)", self.scenes.len());
    }

    pub fn load_dissolve_patterns(&mut self, raw: &HashMap<i64, Vec<(i64, i64, i64, i64)>>) {
        self.dissolve_registry.load_from_payload(raw);
    }

    #[must_use]
    pub fn original_speed(&self, scene_id: i64, effect_id: i64, segment_id: i64) -> Option<f64> {
        self.original_speed_map.get(&(scene_id, effect_id, segment_id)).copied()
    }

    // ---- parameter-only mutations (no dissolve) -----------------------

    pub fn set_scene(&mut self, scene_id: i64) -> EngineResult<()> {
        if !self.scenes.contains_key(&scene_id) {
            return Err(EngineError::ValidationError {
                field: "scene_id",
                reason: format!("unknown scene id {scene_id}"),
            });
        }
        self.current_scene_id = Some(scene_id);
        Ok(())
    }

    pub fn set_effect(&mut self, effect_id: i64) -> EngineResult<()> {
        let scene = self.current_scene_mut()?;
        if !scene.has_effect(effect_id) {
            return Err(EngineError::ValidationError {
                field: "effect_id",
                reason: format!("unknown effect id {effect_id}"),
            });
        }
        scene.current_effect_id = effect_id;
        Ok(())
    }

    pub fn set_palette(&mut self, palette_id: i64) -> EngineResult<()> {
        let scene = self.current_scene_mut()?;
        if !scene.has_palette(palette_id) {
            return Err(EngineError::ValidationError {
                field: "palette_id",
                reason: format!("unknown palette id {palette_id}"),
            });
        }
        scene.current_palette_id = palette_id;
        Ok(())
    }

    pub fn update_palette_color(&mut self, palette_id: i64, color_id: i64, r: i64, g: i64, b: i64) -> EngineResult<()> {
        let scene = self.current_scene_mut()?;
        if !scene.has_palette(palette_id) {
            return Err(EngineError::ValidationError {
                field: "palette_id",
                reason: format!("unknown palette id {palette_id}"),
            });
        }
        if !(0..=5).contains(&color_id) {
            return Err(EngineError::ValidationError {
                field: "color_id",
                reason: format!("color index {color_id} out of range [0,5]"),
            });
        }
        let r_clamped = r.clamp(0, 255) as u8;
        let g_clamped = g.clamp(0, 255) as u8;
        let b_clamped = b.clamp(0, 255) as u8;
        if i64::from(r_clamped) != r || i64::from(g_clamped) != g || i64::from(b_clamped) != b {
            warn!(
                "palette {palette_id} color {color_id} rgb=({r},{g},{b}) out of range [0,255]; \
                 clamped to ({r_clamped},{g_clamped},{b_clamped})"
            );
        }
        scene.palettes[palette_id as usize][color_id as usize] = Color::new(r_clamped, g_clamped, b_clamped);
        Ok(())
    }

    fn current_scene_mut(&mut self) -> EngineResult<&mut Scene> {
        let scene_id = self.current_scene_id.ok_or_else(|| EngineError::ValidationError {
            field: "scene_id",
            reason: "no scene selected".to_string(),
        })?;
        self.scenes.get_mut(&scene_id).ok_or_else(|| EngineError::ValidationError {
            field: "scene_id",
            reason: format!("current scene {scene_id} no longer exists"),
        })
    }

    /// True once a scene library is loaded and a pattern has been activated
    /// with `change_pattern`. The frame scheduler checks this before
    /// advancing or rendering a frame, so it idles instead of emitting an
    /// empty or prematurely-selected framebuffer.
    #[must_use]
    pub fn is_ready_to_render(&self) -> bool {
        self.current_scene_id.is_some() && self.last_activated.is_some()
    }

    // ---- pattern activation --------------------------------------------

    /// Activate the current `(scene, effect, palette)` selection: a fade-in
    /// from black on first activation since load, a crossfade from the
    /// previously-active pattern otherwise. Instantaneous if no dissolve
    /// schedule is currently selected.
    pub fn change_pattern(&mut self, now: Instant) -> EngineResult<()> {
        let scene_id = self.current_scene_id.ok_or_else(|| EngineError::ValidationError {
            field: "scene_id",
            reason: "no scene selected".to_string(),
        })?;
        let scene = self.scenes.get(&scene_id).expect("current_scene_id always points at a live scene");
        let new = PatternState::new(scene_id, scene.current_effect_id, scene.current_palette_id);
        let led_count = scene.led_count;
        let schedule = self.dissolve_registry.current().cloned().unwrap_or_default();

        self.dissolve_engine.start(self.last_activated, new, &schedule, led_count, now);
        self.last_activated = Some(new);
        Ok(())
    }

    pub fn set_dissolve_pattern(&mut self, pattern_id: i64) -> EngineResult<()> {
        self.dissolve_registry.set_current(pattern_id)
    }

    // ---- speed / brightness (ClampWarning, never an Err) ---------------

    pub fn set_speed_percent(&mut self, percent: i64) {
        let clamped = percent.clamp(0, 1023) as u16;
        if i64::from(clamped) != percent {
            warn!("speed_percent {percent} out of range [0,1023]; clamped to {clamped}");
        }
        self.speed_percent = clamped;
        self.stats.speed_percent = clamped;
    }

    pub fn set_master_brightness(&mut self, brightness: i64) {
        let clamped = brightness.clamp(0, 255) as u8;
        if i64::from(clamped) != brightness {
            warn!("master_brightness {brightness} out of range [0,255]; clamped to {clamped}");
        }
        self.master_brightness = clamped;
        self.stats.master_brightness = clamped;
    }

    // ---- tick -----------------------------------------------------------

    /// Advance animation state by `dt_wall_secs` of wall-clock time, scaled
    /// by `speed_percent`. When a dissolve is active both the old and new
    /// underlying effects are advanced, each `(scene_id, effect_id)` pair at
    /// most once even if the two patterns happen to share one.
    pub fn advance(&mut self, dt_wall_secs: f64, now: Instant) {
        let dt_scaled = dt_wall_secs * (f64::from(self.speed_percent) / 100.0);

        if self.dissolve_engine.is_crossfading() {
            let mut advanced: HashSet<(i64, i64)> = HashSet::new();
            if let Some(old) = self.dissolve_engine.old_pattern() {
                self.advance_pattern_effect(old, dt_scaled, now, &mut advanced);
            }
            if let Some(new) = self.dissolve_engine.new_pattern() {
                self.advance_pattern_effect(new, dt_scaled, now, &mut advanced);
            }
        } else if let Some(scene_id) = self.current_scene_id {
            if let Some(scene) = self.scenes.get_mut(&scene_id) {
                scene.advance_current(dt_scaled, now);
            }
        }

        self.stats.frame_count += 1;
        self.stats.animation_time_secs += dt_wall_secs;
    }

    fn advance_pattern_effect(&mut self, p: PatternState, dt_scaled: f64, now: Instant, advanced: &mut HashSet<(i64, i64)>) {
        if !advanced.insert((p.scene_id, p.effect_id)) {
            return;
        }
        if let Some(scene) = self.scenes.get_mut(&p.scene_id) {
            if let Some(effect) = scene.effect_mut(p.effect_id) {
                effect.advance(dt_scaled, now);
            }
        }
    }

    /// Render the current frame: delegates to the dissolve path if a
    /// crossfade is active, otherwise a direct single-pattern render.
    /// Master brightness is applied last, after any dissolve blending.
    pub fn render_frame(&mut self, now: Instant) -> Vec<Color> {
        let Some(scene_id) = self.current_scene_id else {
            return Vec::new();
        };
        let Some(led_count) = self.scenes.get(&scene_id).map(|s| s.led_count) else {
            return Vec::new();
        };

        let mut fb = if self.dissolve_engine.is_crossfading() {
            let new = self.dissolve_engine.new_pattern().expect("crossfading implies a new pattern");
            let fb_old = match self.dissolve_engine.old_pattern() {
                Some(old) => self.render_pattern(old, led_count, now),
                None => vec![Color::BLACK; led_count],
            };
            let fb_new = self.render_pattern(new, led_count, now);
            self.dissolve_engine.blend(&fb_old, &fb_new, now)
        } else {
            let Some(scene) = self.scenes.get(&scene_id) else { return Vec::new() };
            let mut acc = Accumulator::new(led_count);
            scene.render(&mut acc, now);
            let mut fb = vec![Color::BLACK; led_count];
            acc.finalize(&mut fb);
            fb
        };

        effect::apply_master_brightness(&mut fb, self.master_brightness);

        self.stats.total_leds = led_count;
        self.stats.active_leds = fb.iter().filter(|c| **c != Color::BLACK).count();
        fb
    }

    fn render_pattern(&self, p: PatternState, led_count: usize, now: Instant) -> Vec<Color> {
        let black = || vec![Color::BLACK; led_count];
        let Some(scene) = self.scenes.get(&p.scene_id) else { return black() };
        let Some(effect) = scene.effect(p.effect_id) else { return black() };
        let Some(palette) = scene.palette(p.palette_id) else { return black() };

        let mut acc = Accumulator::new(led_count);
        effect.render(palette, &mut acc, led_count, now);
        let mut fb = black();
        acc.finalize(&mut fb);
        fb
    }

    // ---- diagnostics ----------------------------------------------------

    pub fn record_command_result(&mut self, ok: bool) {
        self.stats.command_count += 1;
        if !ok {
            self.stats.error_count += 1;
        }
    }

    pub fn record_sink_error(&mut self) {
        self.stats.sink_error_count += 1;
    }

    pub fn set_actual_fps(&mut self, fps: f64) {
        self.stats.actual_fps = fps;
    }

    pub fn set_animation_running(&mut self, running: bool) {
        self.stats.animation_running = running;
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }
}
