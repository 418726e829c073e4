mod tests {
    use std::collections::HashMap;

    use led_dissolve_engine::{
        Color, DissolveEngine, DissolveSchedule, DissolveScheduleRegistry, DissolveState, DissolveTransition, Instant,
        PatternState,
    };

    #[test]
    fn test_dissolve_fifty_percent_blend() {
        let mut engine = DissolveEngine::new();
        let old = PatternState::new(0, 0, 0);
        let new = PatternState::new(1, 0, 0);
        let schedule = DissolveSchedule {
            transitions: vec![DissolveTransition { delay_ms: 0, duration_ms: 1000, led_start: 0, led_end: 9 }],
        };
        let t0 = Instant::from_millis(0);
        engine.start(Some(old), new, &schedule, 10, t0);
        assert_eq!(engine.state(), DissolveState::Crossfading);

        let red = vec![Color::new(255, 0, 0); 10];
        let green = vec![Color::new(0, 255, 0); 10];
        let fb = engine.blend(&red, &green, Instant::from_millis(500));

        for c in fb {
            assert!((i32::from(c.r) - 127).abs() <= 1, "got r={}", c.r);
            assert!((i32::from(c.g) - 127).abs() <= 1, "got g={}", c.g);
            assert_eq!(c.b, 0);
        }
        assert_eq!(engine.state(), DissolveState::Crossfading, "not yet complete at 50%");
    }

    #[test]
    fn test_dissolve_completes_when_every_led_reaches_full_progress() {
        let mut engine = DissolveEngine::new();
        let new = PatternState::new(0, 0, 0);
        let schedule = DissolveSchedule {
            transitions: vec![DissolveTransition { delay_ms: 0, duration_ms: 100, led_start: 0, led_end: 2 }],
        };
        let t0 = Instant::from_millis(0);
        engine.start(None, new, &schedule, 3, t0);

        let black = vec![Color::BLACK; 3];
        let white = vec![Color::new(255, 255, 255); 3];
        let _ = engine.blend(&black, &white, Instant::from_millis(50));
        assert_eq!(engine.state(), DissolveState::Crossfading);

        let fb = engine.blend(&black, &white, Instant::from_millis(200));
        assert_eq!(fb, white);
        assert_eq!(engine.state(), DissolveState::Completed);
    }

    #[test]
    fn test_empty_schedule_is_instant_activation() {
        let mut engine = DissolveEngine::new();
        let new = PatternState::new(0, 0, 0);
        let schedule = DissolveSchedule::default();
        engine.start(None, new, &schedule, 10, Instant::from_millis(0));
        assert_eq!(engine.state(), DissolveState::Completed, "no transitions ⇒ never crossfades");
    }

    #[test]
    fn test_leds_outside_any_transition_range_snap_instantly() {
        let mut engine = DissolveEngine::new();
        let new = PatternState::new(0, 0, 0);
        // only LEDs 0..4 get a schedule; LEDs 5..9 have none and must be
        // treated as already-complete ("instant").
        let schedule = DissolveSchedule {
            transitions: vec![DissolveTransition { delay_ms: 0, duration_ms: 1000, led_start: 0, led_end: 4 }],
        };
        engine.start(None, new, &schedule, 10, Instant::from_millis(0));

        let black = vec![Color::BLACK; 10];
        let white = vec![Color::new(255, 255, 255); 10];
        let fb = engine.blend(&black, &white, Instant::from_millis(1));
        assert_eq!(fb[5], Color::new(255, 255, 255), "unscheduled LED snaps straight to the new pattern");
        assert_eq!(fb[0], Color::BLACK, "scheduled LED has barely started");
    }

    #[test]
    fn test_delayed_transition_holds_old_until_delay_elapses() {
        let mut engine = DissolveEngine::new();
        let old = PatternState::new(0, 0, 0);
        let new = PatternState::new(1, 0, 0);
        let schedule = DissolveSchedule {
            transitions: vec![DissolveTransition { delay_ms: 500, duration_ms: 500, led_start: 0, led_end: 0 }],
        };
        engine.start(Some(old), new, &schedule, 1, Instant::from_millis(0));

        let black = vec![Color::BLACK];
        let white = vec![Color::new(255, 255, 255)];
        let fb = engine.blend(&black, &white, Instant::from_millis(200));
        assert_eq!(fb[0], Color::BLACK, "now < start_time_abs ⇒ p=0");
    }

    #[test]
    fn test_transition_range_clamped_and_dropped_when_inverted() {
        let mut registry = DissolveScheduleRegistry::new();
        let mut raw = HashMap::new();
        // second entry has led_start > led_end and must be dropped with a warning.
        raw.insert(1, vec![(0, 100, 0, 4), (0, 100, 8, 3)]);
        registry.load_from_payload(&raw);
        registry.set_current(1).expect("pattern 1 was loaded");
        let schedule = registry.current().expect("current schedule set").clone();
        assert_eq!(schedule.transitions.len(), 1);
    }

    #[test]
    fn test_set_current_rejects_unknown_pattern() {
        let mut registry = DissolveScheduleRegistry::new();
        assert!(registry.set_current(42).is_err());
    }

    #[test]
    fn test_pattern_retained_as_instantaneous_when_all_entries_invalid() {
        let mut registry = DissolveScheduleRegistry::new();
        let mut raw = HashMap::new();
        raw.insert(7, vec![(0, -5, 0, 1)]); // negative duration is invalid
        registry.load_from_payload(&raw);
        registry.set_current(7).expect("pattern 7 is retained even with zero valid entries");
        assert!(registry.current().unwrap().transitions.is_empty());
    }
}
