use super::*;

#[test]
fn canvas_rejects_empty_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    let c = Canvas::new(140, 120).unwrap();
    assert_eq!(c.byte_len(), 140 * 120 * 4);
    assert_eq!(c.size_u16().unwrap(), (140, 120));
}

#[test]
fn fps_frame_duration_ms() {
    let fps = Fps::new(60, 1).unwrap();
    assert!((fps.frame_duration_ms() - 16.666_666).abs() < 1e-3);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn rgb_lerp_endpoints_and_midpoint() {
    let a = Rgb8::from_hex(0xFF9C26);
    let b = Rgb8::from_hex(0xF14575);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    // Math.round-style rounding on each channel.
    assert_eq!(a.lerp(b, 0.5), Rgb8::new(248, 113, 78));
    assert_eq!(a.lerp(b, f64::NAN), a);
}

#[test]
fn premul_from_straight() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.g, 64);
    assert_eq!(p.b, 0);

    assert_eq!(Rgb8::WHITE.with_alpha(0.0).to_array(), [0, 0, 0, 0]);
    assert_eq!(Rgb8::WHITE.with_alpha(1.0).to_array(), [255, 255, 255, 255]);
}
