mod tests {
    use led_dissolve_engine::sink::{encode_rgbw, RecordingSink};
    use led_dissolve_engine::{Color, Sink};

    #[test]
    fn test_encode_rgbw_layout() {
        let fb = vec![Color::new(1, 2, 3), Color::new(4, 5, 6)];
        let bytes = encode_rgbw(&fb);
        assert_eq!(bytes, vec![1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn test_encode_rgbw_empty_framebuffer() {
        assert!(encode_rgbw(&[]).is_empty());
    }

    #[test]
    fn test_recording_sink_stores_every_frame() {
        let mut sink = RecordingSink::default();
        sink.emit(&[Color::new(9, 9, 9)]).unwrap();
        sink.emit(&[Color::BLACK]).unwrap();
        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.frames[0], vec![Color::new(9, 9, 9)]);
    }
}
