mod tests {
    use led_dissolve_engine::segment::DimmerTriple;
    use led_dissolve_engine::{Color, Instant, Segment};

    #[test]
    fn test_dimmer_ramp_halfway() {
        let t0 = Instant::from_millis(0);
        let seg = Segment::new(
            0,
            vec![0],
            vec![0.0],
            vec![5],
            0.0,
            (0, 9),
            2,
            2,
            false,
            vec![DimmerTriple::new(1000, 0.0, 100.0)],
            t0,
        );
        let factor = seg.dimmer_factor(Instant::from_millis(500));
        assert!((factor - 0.5).abs() < 0.01, "expected ~0.5, got {factor}");

        let palette = [Color::new(255, 0, 0); 6];
        let colors = seg.emit_colors(&palette, Instant::from_millis(500));
        for c in colors {
            assert!((i32::from(c.r) - 127).abs() <= 1, "expected ~127, got {}", c.r);
            assert_eq!(c.g, 0);
            assert_eq!(c.b, 0);
        }
    }

    #[test]
    fn test_dimmer_holds_final_value_after_last_triple() {
        let t0 = Instant::from_millis(0);
        let seg = Segment::new(
            0,
            vec![0],
            vec![0.0],
            vec![1],
            0.0,
            (0, 9),
            0,
            0,
            false,
            vec![DimmerTriple::new(500, 0.0, 50.0), DimmerTriple::new(500, 50.0, 80.0)],
            t0,
        );
        // cycle = 1000ms; at t=1500 -> t mod cycle = 500, which is the start of
        // the *second* triple (50 -> 80), not a hold of the last value.
        let factor_mid_second_leg = seg.dimmer_factor(Instant::from_millis(1500));
        assert!((factor_mid_second_leg - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_edge_reflection_bounces_and_resets_timing() {
        let t0 = Instant::from_millis(0);
        let mut seg = Segment::new(
            0,
            vec![0],
            vec![0.0],
            vec![3],
            5.0,
            (0, 9),
            8,
            8,
            true,
            vec![DimmerTriple::new(1000, 0.0, 100.0)],
            t0,
        );
        seg.update_position(1.0, Instant::from_millis(1000));
        assert_eq!(seg.current_position, 7, "hi_eff = max(lo, hi - L + 1) = 7");
        assert!(seg.move_speed < 0.0, "direction must flip at the bound");
        assert!((seg.move_speed + 5.0).abs() < 1e-9);
        assert_eq!(
            seg.segment_start_time,
            Instant::from_millis(1000),
            "bounce must reset segment_start_time so the dimmer envelope restarts"
        );
    }

    #[test]
    fn test_wrap_mode_folds_into_range() {
        let t0 = Instant::from_millis(0);
        let mut seg = Segment::new(
            0,
            vec![0],
            vec![0.0],
            vec![1],
            20.0,
            (0, 9),
            0,
            9,
            false,
            vec![],
            t0,
        );
        // hi_eff = max(0, 9-1+1) = 9; span = 9; moving +20 LEDs from 9 wraps.
        seg.update_position(1.0, Instant::from_millis(1000));
        assert!((0..=9).contains(&seg.current_position));
    }

    #[test]
    fn test_move_range_zero_disables_motion_and_clamping() {
        let t0 = Instant::from_millis(0);
        let mut seg = Segment::new(0, vec![0], vec![0.0], vec![1], 50.0, (0, 0), 3, 3, true, vec![], t0);
        seg.update_position(10.0, Instant::from_millis(1000));
        assert_eq!(seg.current_position, 3, "move_range=[0,0] must disable movement entirely");
    }

    #[test]
    fn test_total_emitted_leds_counts_parts_and_tails() {
        // color has one more entry than length: the extra color is a 1-LED tail.
        let seg = Segment::new(
            0,
            vec![0, 1, 2],
            vec![0.0, 0.0],
            vec![3, 2],
            0.0,
            (0, 9),
            0,
            0,
            false,
            vec![],
            Instant::from_millis(0),
        );
        assert_eq!(seg.total_emitted_leds(), 3 + 2 + 1);
    }

    #[test]
    fn test_padding_defaults_transparency_and_length() {
        let seg = Segment::new(0, vec![0, 1], vec![], vec![], 0.0, (0, 9), 0, 0, false, vec![], Instant::from_millis(0));
        assert_eq!(seg.transparency, vec![0.0, 0.0]);
        assert_eq!(seg.length, vec![1, 1]);
    }

    #[test]
    fn test_out_of_range_palette_index_yields_black() {
        let short_palette = [Color::new(255, 0, 0)];
        let seg = Segment::new(
            0,
            vec![9],
            vec![0.0],
            vec![2],
            0.0,
            (0, 9),
            0,
            0,
            false,
            vec![DimmerTriple::new(1000, 100.0, 100.0)],
            Instant::from_millis(0),
        );
        let colors = seg.emit_colors(&short_palette, Instant::from_millis(0));
        assert_eq!(colors.len(), 2);
        for c in colors {
            assert_eq!(c, Color::BLACK);
        }
    }
}
