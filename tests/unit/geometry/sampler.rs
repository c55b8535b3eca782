use super::*;

fn circle(r: f64) -> Curve {
    use kurbo::Shape;
    Curve::new(kurbo::Circle::new((0.0, 0.0), r).to_path(1e-6)).unwrap()
}

#[test]
fn samples_are_evenly_spaced_and_increasing() {
    let c = Curve::from_svg("M0 0 L100 0 L100 50 L0 50 Z").unwrap();
    let t = SampleTable::build(&c, 300, &Palette::violet());
    assert_eq!(t.len(), 300);
    assert!((t.spacing() - 1.0).abs() < 1e-9);
    assert!(t.samples().windows(2).all(|w| w[1].s > w[0].s));
    assert!(t.samples().iter().all(|s| s.s < t.total_length()));
    assert!(t.samples().iter().all(|s| s.curvature >= 0.0));
}

#[test]
fn sample_count_is_clamped() {
    let c = circle(10.0);
    assert_eq!(SampleTable::build(&c, 1, &Palette::violet()).len(), 16);
    assert_eq!(SampleTable::build(&c, 1_000_000, &Palette::violet()).len(), 4096);
}

#[test]
fn building_twice_is_identical() {
    let c = Curve::loader_loop().unwrap();
    let a = SampleTable::build(&c, 500, &Palette::sunset());
    let b = SampleTable::build(&c, 500, &Palette::sunset());
    assert_eq!(a.samples(), b.samples());
}

#[test]
fn circle_curvature_is_reciprocal_radius() {
    let t = SampleTable::build(&circle(20.0), 256, &Palette::violet());
    for s in t.samples() {
        assert!((s.curvature - 0.05).abs() < 0.01, "kappa {}", s.curvature);
    }
}

#[test]
fn straight_runs_have_zero_curvature_and_corners_spike() {
    let c = Curve::from_svg("M0 0 L100 0 L100 100 L0 100 Z").unwrap();
    let t = SampleTable::build(&c, 400, &Palette::violet());
    let mid_edge = t.sample(50);
    assert!(mid_edge.curvature.abs() < 1e-9);
    let corner = t.sample(100);
    assert!(corner.curvature > 0.5);
}

#[test]
fn lookups_wrap_across_the_seam() {
    let c = Curve::from_svg("M0 0 L100 0 L100 50 L0 50 Z").unwrap();
    let t = SampleTable::build(&c, 300, &Palette::violet());
    assert_eq!(t.index_at(-0.5), 299);
    assert_eq!(t.index_at(300.0), 0);
    let a = t.position_at(0.0);
    let b = t.position_at(t.total_length());
    assert!(a.distance(b) < 1e-9);
    let mid = t.position_at(0.5);
    assert!((mid.x - 0.5).abs() < 1e-9 && mid.y.abs() < 1e-9);

    let tan = t.tangent_at(10.0);
    assert!((tan.x - 1.0).abs() < 1e-9);
}

#[test]
fn colors_follow_the_palette_by_index() {
    let c = circle(30.0);
    let p = Palette::sunset();
    let t = SampleTable::build(&c, 100, &p);
    assert_eq!(t.sample(0).color, p.color_at(0.0));
    assert_eq!(t.sample(22).color, p.color_at(0.22));
    assert_eq!(t.color_at(t.sample(50).s), p.color_at(0.5));
}

#[test]
fn degenerate_curve_yields_single_sample() {
    let c = Curve::from_svg("M3 4 L3 4").unwrap();
    let t = SampleTable::build(&c, 500, &Palette::violet());
    assert_eq!(t.len(), 1);
    assert_eq!(t.total_length(), 0.0);
    assert_eq!(t.position_at(42.0), Point::new(3.0, 4.0));
    assert_eq!(t.index_at(42.0), 0);
}

#[test]
fn polyline_visits_every_sample() {
    let c = circle(5.0);
    let t = SampleTable::build(&c, 32, &Palette::violet());
    // move_to + 31 line_to + close_path
    assert_eq!(t.polyline().elements().len(), 33);
}
