mod tests {
    use led_dissolve_engine::json::{parse_dissolve_document, parse_scenes_document};
    use led_dissolve_engine::Instant;

    #[test]
    fn test_parses_canonical_scene_document() {
        let doc = r#"{
            "scenes": [{
                "scene_id": 0, "led_count": 10, "fps": 30,
                "current_effect_id": 0, "current_palette_id": 0,
                "palettes": [[[255,0,0],[0,255,0],[0,0,255],[0,0,0],[0,0,0],[0,0,0]]],
                "effects": [{
                    "effect_id": 0,
                    "segments": {
                        "0": {
                            "segment_id": 0, "color": [0], "transparency": [0.0], "length": [5],
                            "move_speed": 0.0, "move_range": [0, 9],
                            "initial_position": 2, "current_position": 2, "is_edge_reflect": false,
                            "dimmer_time": [[1000, 100, 100]]
                        }
                    }
                }]
            }]
        }"#;
        let scenes = parse_scenes_document(doc, Instant::from_millis(0)).unwrap();
        assert_eq!(scenes.len(), 1);
        let scene = &scenes[0];
        assert_eq!(scene.scene_id, 0);
        assert_eq!(scene.led_count, 10);
        assert_eq!(scene.fps, 30);
        assert_eq!(scene.effects.len(), 1);
        let segment = &scene.effects[0].segments[0];
        assert_eq!(segment.segment_id, 0);
        assert_eq!(segment.color, vec![0]);
        assert_eq!(segment.length, vec![5]);
        assert_eq!(segment.move_range, (0, 9));
        assert_eq!(segment.current_position, 2);
    }

    #[test]
    fn test_legacy_scene_id_and_segment_id_aliases_are_accepted() {
        let doc = r#"{
            "scenes": [{
                "scene_ID": 7, "led_count": 3,
                "effects": [{
                    "effect_id": 0,
                    "segments": { "0": { "segment_ID": 4, "color": [0] } }
                }]
            }]
        }"#;
        let scenes = parse_scenes_document(doc, Instant::from_millis(0)).unwrap();
        assert_eq!(scenes[0].scene_id, 7);
        assert_eq!(scenes[0].effects[0].segments[0].segment_id, 4);
    }

    #[test]
    fn test_one_dimensional_dimmer_time_converts_to_pairwise_transitions() {
        let doc = r#"{
            "scenes": [{
                "scene_id": 0, "led_count": 1,
                "effects": [{
                    "effect_id": 0,
                    "segments": { "0": { "segment_id": 0, "color": [0], "dimmer_time": [0, 50, 100] } }
                }]
            }]
        }"#;
        let scenes = parse_scenes_document(doc, Instant::from_millis(0)).unwrap();
        let triples = &scenes[0].effects[0].segments[0].dimmer_time;
        assert_eq!(triples.len(), 2);
        assert_eq!((triples[0].duration_ms, triples[0].start_pct, triples[0].end_pct), (1000, 0.0, 50.0));
        assert_eq!((triples[1].duration_ms, triples[1].start_pct, triples[1].end_pct), (1000, 50.0, 100.0));
    }

    #[test]
    fn test_degenerate_dimmer_time_falls_back_to_default() {
        let doc = r#"{
            "scenes": [{
                "scene_id": 0, "led_count": 1,
                "effects": [{
                    "effect_id": 0,
                    "segments": { "0": { "segment_id": 0, "color": [0], "dimmer_time": [42] } }
                }]
            }]
        }"#;
        let scenes = parse_scenes_document(doc, Instant::from_millis(0)).unwrap();
        let triples = &scenes[0].effects[0].segments[0].dimmer_time;
        assert_eq!(triples.len(), 1);
        assert_eq!((triples[0].duration_ms, triples[0].start_pct, triples[0].end_pct), (1000, 0.0, 100.0));
    }

    #[test]
    fn test_missing_led_count_zero_is_rejected() {
        let doc = r#"{ "scenes": [{ "scene_id": 0, "led_count": 0, "effects": [] }] }"#;
        assert!(parse_scenes_document(doc, Instant::from_millis(0)).is_err());
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        let result = parse_scenes_document("not json", Instant::from_millis(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_parses_dissolve_document() {
        let doc = r#"{ "dissolve_patterns": { "3": [[0, 500, 0, 9], [100, 300, 10, 19]] } }"#;
        let parsed = parse_dissolve_document(doc).unwrap();
        let entries = parsed.get(&3).expect("pattern 3 present");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (0, 500, 0, 9));
        assert_eq!(entries[1], (100, 300, 10, 19));
    }
}
