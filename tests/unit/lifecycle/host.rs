use super::*;

#[test]
fn fit_centers_with_padding() {
    let canvas = Canvas::new(140, 140).unwrap();
    let xf = fit_view_box(Rect::new(0.0, 0.0, 162.0, 162.0), canvas, 10.0).unwrap();
    let a = xf * kurbo::Point::new(0.0, 0.0);
    let b = xf * kurbo::Point::new(162.0, 162.0);
    assert!((a.x - 10.0).abs() < 1e-9 && (a.y - 10.0).abs() < 1e-9);
    assert!((b.x - 130.0).abs() < 1e-9 && (b.y - 130.0).abs() < 1e-9);
}

#[test]
fn fit_keeps_aspect_ratio() {
    let canvas = Canvas::new(200, 100).unwrap();
    let xf = fit_view_box(Rect::new(0.0, 0.0, 10.0, 10.0), canvas, 0.0).unwrap();
    let a = xf * kurbo::Point::new(0.0, 0.0);
    let b = xf * kurbo::Point::new(10.0, 10.0);
    assert!((b.y - a.y - 100.0).abs() < 1e-9);
    assert!((b.x - a.x - 100.0).abs() < 1e-9);
    assert!((a.x - 50.0).abs() < 1e-9);
}

#[test]
fn fit_rejects_unusable_inputs() {
    let canvas = Canvas::new(20, 20).unwrap();
    assert!(fit_view_box(Rect::new(0.0, 0.0, 5.0, 5.0), canvas, 10.0).is_none());
    assert!(fit_view_box(Rect::new(0.0, 0.0, f64::INFINITY, 5.0), canvas, 0.0).is_none());
}

#[test]
fn fit_centers_flat_and_point_boxes() {
    let canvas = Canvas::new(40, 40).unwrap();

    let xf = fit_view_box(Rect::new(0.0, 0.0, 100.0, 0.0), canvas, 0.0).unwrap();
    let a = xf * kurbo::Point::new(0.0, 0.0);
    let b = xf * kurbo::Point::new(100.0, 0.0);
    assert!((a.x - 0.0).abs() < 1e-9 && (b.x - 40.0).abs() < 1e-9);
    assert!((a.y - 20.0).abs() < 1e-9 && (b.y - 20.0).abs() < 1e-9);

    let xf = fit_view_box(Rect::new(0.0, 0.0, 0.0, 5.0), canvas, 0.0).unwrap();
    let mid = xf * kurbo::Point::new(0.0, 2.5);
    assert!((mid.x - 20.0).abs() < 1e-9 && (mid.y - 20.0).abs() < 1e-9);

    let xf = fit_view_box(Rect::new(5.0, 5.0, 5.0, 5.0), canvas, 4.0).unwrap();
    let p = xf * kurbo::Point::new(5.0, 5.0);
    assert!((p.x - 20.0).abs() < 1e-9 && (p.y - 20.0).abs() < 1e-9);
    assert!(xf.determinant() > 0.0);
}

#[test]
fn static_host_layout_toggle() {
    let canvas = Canvas::new(20, 20).unwrap();
    let mut host = StaticHost::new(canvas, 0.0);
    let vb = Rect::new(0.0, 0.0, 5.0, 5.0);
    assert!(host.view_transform(vb, canvas).is_some());
    host.set_layout_ready(false);
    assert!(host.view_transform(vb, canvas).is_none());
    assert!(StaticHost::detached(0.0).surface().is_none());
}

#[test]
fn manual_scheduler_tracks_one_pending_frame() {
    let mut s = ManualScheduler::new();
    let a = s.request_frame().unwrap();
    let b = s.request_frame().unwrap();
    assert_ne!(a, b);
    assert_eq!(s.pending(), Some(b));

    s.cancel_frame(a);
    assert_eq!(s.pending(), Some(b));
    assert_eq!(s.cancelled(), 0);

    s.cancel_frame(b);
    assert_eq!(s.pending(), None);
    assert_eq!(s.cancelled(), 1);
    assert_eq!(s.requested(), 2);
}

#[test]
fn unsupported_scheduler_never_schedules() {
    let mut s = ManualScheduler::unsupported();
    assert!(s.request_frame().is_none());
    assert!(s.take_due().is_none());
}
