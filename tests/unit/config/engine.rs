use super::*;
use serde_json::json;

#[test]
fn defaults_match_the_reference_loader() {
    let c = EngineConfig::default();
    assert_eq!(c.pacing, Pacing::Duration { seconds: 2.24 });
    assert_eq!(c.tail_fraction, 0.42);
    assert_eq!(c.sample_count, 500);
    assert_eq!(c.decay_exponent, 2.0);
    assert_eq!(c.negligible_intensity, 0.05);
    assert_eq!(c.core_threshold, 0.2);
    assert_eq!(c.static_progress, 0.5);
    assert_eq!(c.max_frame_delta_ms, 50.0);
    assert_eq!(c.canvas, Canvas::new(140, 140).unwrap());
    assert_eq!(c.palette, Palette::sunset());
    assert_eq!(c.direction(), Direction::Forward);
}

#[test]
fn sanitize_clamps_out_of_range_values() {
    let c = EngineConfig {
        pacing: Pacing::Duration { seconds: 0.1 },
        tail_fraction: f64::NAN,
        sample_count: 5,
        decay_exponent: 0.2,
        negligible_intensity: -1.0,
        max_frame_delta_ms: 1e9,
        ..EngineConfig::default()
    }
    .sanitized()
    .unwrap();
    assert_eq!(c.pacing, Pacing::Duration { seconds: 0.5 });
    assert_eq!(c.tail_fraction, 0.42);
    assert_eq!(c.sample_count, 16);
    assert_eq!(c.decay_exponent, 1.0);
    assert_eq!(c.negligible_intensity, 0.0);
    assert_eq!(c.max_frame_delta_ms, 1000.0);
}

#[test]
fn sanitize_rejects_empty_canvas() {
    let c = EngineConfig {
        canvas: Canvas {
            width: 0,
            height: 10,
        },
        ..EngineConfig::default()
    };
    assert!(matches!(c.sanitized(), Err(GlowError::Validation(_))));
}

#[test]
fn partial_json_fills_defaults() {
    let c: EngineConfig = serde_json::from_value(json!({
        "pacing": {"mode": "speed_range", "min": 40.0, "max": 200.0},
        "reverse": true,
        "palette": {"kind": "hue", "color": "#7A4CFF"},
        "background": {"kind": "transparent"},
        "layers": {"shimmer": false}
    }))
    .unwrap();
    assert_eq!(c.direction(), Direction::Reverse);
    assert_eq!(c.palette, Palette::violet());
    assert_eq!(c.background.fill(), None);
    assert!(!c.layers.shimmer);
    assert!(c.layers.trail);
    assert_eq!(c.sample_count, 500);
    assert!((c.speed_profile_opts().floor - 0.2).abs() < 1e-12);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EngineConfig::from_reader(br#"{"durration": 3}"#.as_slice()).unwrap_err();
    assert!(matches!(err, GlowError::Serde(_)));
}

#[test]
fn json_round_trip() {
    let c = EngineConfig {
        palette: Palette::pastel_cycle(),
        trail_mode: TrailMode::Particles,
        background: Background::Solid {
            color: Rgb8::new(1, 2, 3),
        },
        seed: 99,
        ..EngineConfig::default()
    };
    let text = c.to_json_pretty().unwrap();
    let back = EngineConfig::from_reader(text.as_bytes()).unwrap();
    assert_eq!(back, c);
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = EngineConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, GlowError::Validation(_)));
}

#[test]
fn geometry_key_tracks_sampling_inputs() {
    let a = EngineConfig::default();
    let mut b = a.clone();
    b.reverse = true;
    b.tail_fraction = 0.3;
    assert_eq!(a.geometry_key(), b.geometry_key());
    b.sample_count = 350;
    assert_ne!(a.geometry_key(), b.geometry_key());
}
