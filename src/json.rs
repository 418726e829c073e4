//! Scene and dissolve-schedule document parsing and normalization.
//!
//! "Runtime-flexible JSON" (mixed legacy field names, 1-D vs 2-D
//! `dimmer_time`) is absorbed here so every downstream component sees
//! exactly the canonical shapes from the data model, one schema downstream
//! of this module, however many shapes arrive in front of it.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::color::Color;
use crate::effect::Effect;
use crate::error::{EngineError, EngineResult};
use crate::scene::{Palette, Scene};
use crate::segment::{self, DimmerTriple, Segment};
use crate::time::Instant;

#[derive(Debug, Deserialize)]
struct ScenesDocument {
    scenes: Vec<SceneDoc>,
}

#[derive(Debug, Deserialize)]
struct SceneDoc {
    #[serde(alias = "scene_ID")]
    scene_id: i64,
    led_count: usize,
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default)]
    current_effect_id: i64,
    #[serde(default)]
    current_palette_id: i64,
    #[serde(default)]
    palettes: Vec<[[u8; 3]; 6]>,
    #[serde(default)]
    effects: Vec<EffectDoc>,
}

fn default_fps() -> u32 {
    60
}

#[derive(Debug, Deserialize)]
struct EffectDoc {
    effect_id: i64,
    #[serde(default)]
    segments: HashMap<String, SegmentDoc>,
}

#[derive(Debug, Deserialize)]
struct SegmentDoc {
    #[serde(alias = "segment_ID")]
    #[serde(default)]
    segment_id: i64,
    #[serde(default = "default_color")]
    color: Vec<i32>,
    #[serde(default)]
    transparency: Vec<f64>,
    #[serde(default)]
    length: Vec<u32>,
    #[serde(default)]
    move_speed: f64,
    #[serde(default = "default_move_range")]
    move_range: Vec<f64>,
    #[serde(default)]
    initial_position: i64,
    #[serde(default)]
    current_position: i64,
    #[serde(default = "default_true")]
    is_edge_reflect: bool,
    #[serde(default = "default_dimmer_time_value")]
    dimmer_time: Value,
}

fn default_color() -> Vec<i32> {
    vec![0]
}

fn default_move_range() -> Vec<f64> {
    vec![0.0, 224.0]
}

fn default_true() -> bool {
    true
}

fn default_dimmer_time_value() -> Value {
    Value::Array(vec![Value::Array(vec![1000.into(), 0.into(), 100.into()])])
}

/// Parse a scene document into domain `Scene`s, applying the legacy
/// field-name and 1-D `dimmer_time` conversions.
pub fn parse_scenes_document(text: &str, now: Instant) -> EngineResult<Vec<Scene>> {
    let doc: ScenesDocument = serde_json::from_str(text)?;
    doc.scenes.into_iter().map(|s| convert_scene(s, now)).collect()
}

fn convert_scene(doc: SceneDoc, now: Instant) -> EngineResult<Scene> {
    if doc.led_count == 0 {
        return Err(EngineError::ConfigError {
            path: None,
            reason: format!("scene {} has led_count=0", doc.scene_id),
        });
    }
    let palettes: Vec<Palette> = if doc.palettes.is_empty() {
        vec![[Color::BLACK; 6]]
    } else {
        doc.palettes
            .into_iter()
            .map(|p| p.map(|[r, g, b]| Color::new(r, g, b)))
            .collect()
    };

    let effects = doc
        .effects
        .into_iter()
        .map(|e| convert_effect(doc.scene_id, e, now))
        .collect();

    Ok(Scene {
        scene_id: doc.scene_id,
        led_count: doc.led_count,
        fps: doc.fps,
        effects,
        palettes,
        current_effect_id: doc.current_effect_id,
        current_palette_id: doc.current_palette_id,
    })
}

fn convert_effect(_scene_id: i64, doc: EffectDoc, now: Instant) -> Effect {
    let mut segments: Vec<Segment> = doc.segments.into_values().map(|s| convert_segment(s, now)).collect();
    segments.sort_by_key(|s| s.segment_id);
    Effect::new(doc.effect_id, segments)
}

fn convert_segment(doc: SegmentDoc, now: Instant) -> Segment {
    let dimmer_time = normalize_dimmer_time(&doc.dimmer_time);
    let move_range = (
        doc.move_range.first().copied().unwrap_or(0.0).round() as i64,
        doc.move_range.get(1).copied().unwrap_or(224.0).round() as i64,
    );
    let mut current_position = doc.current_position;
    if current_position == 0 {
        current_position = doc.initial_position;
    }

    Segment::new(
        doc.segment_id,
        doc.color,
        doc.transparency,
        doc.length,
        doc.move_speed,
        move_range,
        doc.initial_position,
        current_position,
        doc.is_edge_reflect,
        dimmer_time,
        now,
    )
}

/// Accept either the canonical 2-D `[[duration_ms, start_pct, end_pct], ...]`
/// shape or the legacy 1-D `[v0, v1, ..., vn]` shape (converted to pairwise
/// transitions with a 1000ms default duration).
fn normalize_dimmer_time(raw: &Value) -> Vec<DimmerTriple> {
    let Value::Array(entries) = raw else {
        return segment::default_dimmer_time();
    };
    if entries.is_empty() {
        return segment::default_dimmer_time();
    }

    if entries[0].is_array() {
        let triples: Vec<DimmerTriple> = entries
            .iter()
            .filter_map(|entry| {
                let tri = entry.as_array()?;
                if tri.len() != 3 {
                    return None;
                }
                let duration = tri[0].as_f64()? as u64;
                let start = tri[1].as_f64()?;
                let end = tri[2].as_f64()?;
                Some(DimmerTriple::new(duration, start, end))
            })
            .collect();
        if triples.is_empty() { segment::default_dimmer_time() } else { triples }
    } else {
        let values: Vec<f64> = entries.iter().filter_map(Value::as_f64).collect();
        if values.len() < 2 {
            return segment::default_dimmer_time();
        }
        values.windows(2).map(|w| DimmerTriple::new(1000, w[0], w[1])).collect()
    }
}

#[derive(Debug, Deserialize)]
struct DissolveDocument {
    dissolve_patterns: HashMap<String, Vec<[i64; 4]>>,
}

/// Parse a dissolve-schedule document into the raw
/// `pattern_id -> [(delay,duration,start,end)]` shape
/// `DissolveScheduleRegistry::load_from_payload` validates and compiles.
pub fn parse_dissolve_document(text: &str) -> EngineResult<HashMap<i64, Vec<(i64, i64, i64, i64)>>> {
    let doc: DissolveDocument = serde_json::from_str(text)?;
    let mut out = HashMap::with_capacity(doc.dissolve_patterns.len());
    for (id_str, entries) in doc.dissolve_patterns {
        let Ok(pattern_id) = id_str.parse::<i64>() else {
            continue;
        };
        let tuples = entries.into_iter().map(|[d, dur, s, e]| (d, dur, s, e)).collect();
        out.insert(pattern_id, tuples);
    }
    Ok(out)
}
