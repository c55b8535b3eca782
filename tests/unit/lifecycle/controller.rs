use super::*;
use crate::foundation::core::Rect;
use crate::lifecycle::host::{ManualScheduler, StaticHost};

type Anim = TrailAnimator<StaticHost, ManualScheduler>;

fn canvas() -> Canvas {
    Canvas::new(48, 48).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        canvas: canvas(),
        sample_count: 64,
        padding_px: 4.0,
        ..EngineConfig::default()
    }
}

fn rect() -> Curve {
    Curve::from_svg("M0 0 H200 V100 H0 Z").unwrap()
}

fn animator(host: StaticHost) -> Anim {
    TrailAnimator::new(config(), rect(), host, ManualScheduler::new()).unwrap()
}

fn pump(a: &mut Anim, now_ms: f64) -> FrameOutcome {
    let id = a.scheduler_mut().take_due().expect("a frame is scheduled");
    a.on_frame(id, now_ms)
}

#[test]
fn mount_waits_for_a_surface() {
    let mut a = animator(StaticHost::detached(4.0));
    assert_eq!(a.mount(), LifecycleState::Idle);
    assert!(a.scheduler().pending().is_none());
    assert!(a.sample_table().is_none());

    a.host_mut().attach(canvas());
    assert_eq!(a.mount(), LifecycleState::Running);
    assert!(a.scheduler().pending().is_some());
    assert_eq!(a.sample_table().unwrap().len(), 64);
}

#[test]
fn mount_waits_for_layout() {
    let mut host = StaticHost::new(canvas(), 4.0);
    host.set_layout_ready(false);
    let mut a = animator(host);
    assert_eq!(a.mount(), LifecycleState::Idle);
    a.host_mut().set_layout_ready(true);
    assert_eq!(a.mount(), LifecycleState::Running);
}

#[test]
fn reduced_motion_draws_one_static_frame() {
    let mut a = animator(StaticHost::new(canvas(), 4.0).with_reduced_motion(true));
    assert_eq!(a.mount(), LifecycleState::PausedReducedMotion);
    assert_eq!(a.scheduler().requested(), 0);
    assert!(a.scheduler().pending().is_none());
    assert_eq!(a.stats().frames_rendered, 1);

    let head = a.head().unwrap();
    assert!((head.s_head - 300.0).abs() < 1e-6, "{}", head.s_head);
    assert!(a.frame().data.chunks_exact(4).any(|px| px[0] > 100));

    assert_eq!(a.mount(), LifecycleState::PausedReducedMotion);
    assert_eq!(a.stats().frames_rendered, 1);
}

#[test]
fn running_loop_advances_the_head() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    assert_eq!(pump(&mut a, 1000.0), FrameOutcome::Rendered);
    assert_eq!(a.head().unwrap().s_head, 0.0);

    let mut last = 0.0;
    for i in 1..=10 {
        assert_eq!(pump(&mut a, 1000.0 + 16.0 * f64::from(i)), FrameOutcome::Rendered);
        let s = a.head().unwrap().s_head;
        assert!(s > last, "frame {i}: {s} <= {last}");
        last = s;
    }
    assert_eq!(a.stats().frames_rendered, 11);
    assert!(a.scheduler().pending().is_some());
    assert!(a.frame().data.chunks_exact(4).any(|px| px[0] > 100));
}

#[test]
fn long_gaps_are_clamped() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    pump(&mut a, 60_000.0);
    let head = a.head().unwrap();
    assert!((head.elapsed_s - 0.05).abs() < 1e-12);
}

#[test]
fn stale_callbacks_are_ignored() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    assert_eq!(a.on_frame(FrameId(999), 0.0), FrameOutcome::Stale);
    assert_eq!(a.stats().stale_callbacks, 1);
    assert_eq!(a.stats().frames_rendered, 0);
    assert_eq!(pump(&mut a, 0.0), FrameOutcome::Rendered);
}

#[test]
fn teardown_is_idempotent_and_cancels_first() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    let queued = a.scheduler().pending().unwrap();
    let shown = a.frame().clone();

    a.teardown();
    assert_eq!(a.state(), LifecycleState::TornDown);
    assert!(a.scheduler().pending().is_none());
    assert_eq!(a.scheduler().cancelled(), 1);
    assert!(a.head().is_none());
    assert_eq!(a.stats().pool.retained_surfaces, 0);
    assert_eq!(a.frame(), &shown);

    a.teardown();
    assert_eq!(a.state(), LifecycleState::TornDown);
    assert_eq!(a.scheduler().cancelled(), 1);

    assert_eq!(a.on_frame(queued, 16.0), FrameOutcome::Stale);
}

#[test]
fn remount_after_teardown_starts_a_new_run() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    pump(&mut a, 16.0);
    a.teardown();
    assert_eq!(a.mount(), LifecycleState::Running);
    assert_eq!(a.head().unwrap().s_head, 0.0);
    assert_eq!(a.stats().runs_started, 2);
    assert_eq!(a.stats().geometry_builds, 1);
}

#[test]
fn transient_layout_loss_skips_without_moving_the_head() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    pump(&mut a, 16.0);
    let before = a.head().unwrap();
    let shown = a.frame().clone();

    a.host_mut().set_layout_ready(false);
    assert_eq!(
        pump(&mut a, 32.0),
        FrameOutcome::Skipped(SkipReason::TransformUnavailable)
    );
    assert_eq!(a.head().unwrap(), before);
    assert_eq!(a.frame(), &shown);
    assert!(a.scheduler().pending().is_some());

    a.host_mut().detach();
    assert_eq!(
        pump(&mut a, 48.0),
        FrameOutcome::Skipped(SkipReason::SurfaceUnavailable)
    );

    a.host_mut().attach(canvas());
    a.host_mut().set_layout_ready(true);
    assert_eq!(pump(&mut a, 64.0), FrameOutcome::Rendered);
    assert_eq!(a.stats().frames_skipped, 2);
}

#[test]
fn config_change_restarts_and_reuses_geometry() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    pump(&mut a, 16.0);

    a.update_config(config()).unwrap();
    assert_eq!(a.stats().runs_started, 1);

    a.update_config(EngineConfig {
        tail_fraction: 0.6,
        ..config()
    })
    .unwrap();
    assert_eq!(a.state(), LifecycleState::Running);
    assert_eq!(a.scheduler().cancelled(), 1);
    assert_eq!(a.head().unwrap().s_head, 0.0);
    assert_eq!(a.stats().runs_started, 2);
    assert_eq!(a.stats().geometry_builds, 1);

    a.update_config(EngineConfig {
        sample_count: 128,
        ..config()
    })
    .unwrap();
    assert_eq!(a.stats().geometry_builds, 2);
    assert_eq!(a.sample_table().unwrap().len(), 128);
}

#[test]
fn config_change_on_an_idle_animator_does_not_mount() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.update_config(EngineConfig {
        reverse: true,
        ..config()
    })
    .unwrap();
    assert_eq!(a.state(), LifecycleState::Idle);
    assert!(a.config().reverse);
    assert_eq!(a.scheduler().requested(), 0);
}

#[test]
fn curve_change_rebuilds_geometry() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    a.set_curve(rect());
    assert_eq!(a.stats().runs_started, 1);

    a.set_curve(Curve::from_svg("M0 0 H100 V100 H0 Z").unwrap());
    assert_eq!(a.state(), LifecycleState::Running);
    assert_eq!(a.stats().geometry_builds, 2);
    assert!((a.sample_table().unwrap().total_length() - 400.0).abs() < 1e-6);
}

#[test]
fn unsupported_scheduler_leaves_the_animator_inert() {
    let mut a = TrailAnimator::new(
        config(),
        rect(),
        StaticHost::new(canvas(), 4.0),
        ManualScheduler::unsupported(),
    )
    .unwrap();
    assert_eq!(a.mount(), LifecycleState::Idle);
    assert!(a.head().is_none());
    assert_eq!(a.stats().frames_rendered, 0);
    assert_eq!(a.frame().alpha_sum(), 0);
}

#[test]
fn reduced_motion_while_running_pauses() {
    let mut a = animator(StaticHost::new(canvas(), 4.0));
    a.mount();
    pump(&mut a, 0.0);
    a.host_mut().set_reduced_motion(true);
    assert_eq!(pump(&mut a, 16.0), FrameOutcome::Rendered);
    assert_eq!(a.state(), LifecycleState::PausedReducedMotion);
    assert!(a.scheduler().pending().is_none());
    assert_eq!(a.stats().frames_rendered, 2);
}

/// Host whose view transform collapses to a point once `singular` is set.
struct CollapsingHost {
    inner: StaticHost,
    singular: bool,
}

impl GeometryHost for CollapsingHost {
    fn surface(&self) -> Option<Canvas> {
        self.inner.surface()
    }

    fn view_transform(&self, view_box: Rect, surface: Canvas) -> Option<Affine> {
        if self.singular {
            Some(Affine::scale(0.0))
        } else {
            self.inner.view_transform(view_box, surface)
        }
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.inner.prefers_reduced_motion()
    }
}

#[test]
fn failed_static_frame_is_reported_as_skipped() {
    let host = CollapsingHost {
        inner: StaticHost::new(canvas(), 4.0),
        singular: false,
    };
    let mut a = TrailAnimator::new(config(), rect(), host, ManualScheduler::new()).unwrap();
    assert_eq!(a.mount(), LifecycleState::Running);
    let id = a.scheduler_mut().take_due().unwrap();
    assert_eq!(a.on_frame(id, 0.0), FrameOutcome::Rendered);
    let last = a.frame().data.clone();

    a.host_mut().singular = true;
    a.host_mut().inner.set_reduced_motion(true);
    let id = a.scheduler_mut().take_due().unwrap();
    assert_eq!(
        a.on_frame(id, 16.0),
        FrameOutcome::Skipped(SkipReason::RenderFailed)
    );
    assert_eq!(a.state(), LifecycleState::PausedReducedMotion);
    assert_eq!(a.stats().frames_rendered, 1);
    assert_eq!(a.stats().frames_skipped, 1);
    assert_eq!(a.frame().data, last);
}

#[test]
fn flat_curve_runs() {
    let flat = Curve::from_svg("M0 0 L100 0 Z").unwrap();
    assert!((flat.total_length() - 200.0).abs() < 1e-6);
    let mut a =
        TrailAnimator::new(config(), flat, StaticHost::new(canvas(), 4.0), ManualScheduler::new())
            .unwrap();
    assert_eq!(a.mount(), LifecycleState::Running);
    assert_eq!(pump(&mut a, 0.0), FrameOutcome::Rendered);
    assert_eq!(pump(&mut a, 40.0), FrameOutcome::Rendered);
    assert!(a.frame().alpha_sum() > 0);
}

#[test]
fn zero_length_curve_runs_and_pauses() {
    let point = || Curve::from_svg("M5 5 L5 5").unwrap();
    assert!(point().is_degenerate());

    let mut a = TrailAnimator::new(
        config(),
        point(),
        StaticHost::new(canvas(), 4.0),
        ManualScheduler::new(),
    )
    .unwrap();
    assert_eq!(a.mount(), LifecycleState::Running);
    assert_eq!(a.sample_table().unwrap().len(), 1);
    assert_eq!(pump(&mut a, 0.0), FrameOutcome::Rendered);
    assert_eq!(pump(&mut a, 16.0), FrameOutcome::Rendered);
    assert_eq!(a.head().unwrap().s_head, 0.0);

    let mut b = TrailAnimator::new(
        config(),
        point(),
        StaticHost::new(canvas(), 4.0).with_reduced_motion(true),
        ManualScheduler::new(),
    )
    .unwrap();
    assert_eq!(b.mount(), LifecycleState::PausedReducedMotion);
    assert_eq!(b.stats().frames_rendered, 1);
}

#[test]
fn particle_trail_runs() {
    let cfg = EngineConfig {
        trail_mode: TrailMode::Particles,
        ..config()
    };
    let mut a = TrailAnimator::new(
        cfg,
        rect(),
        StaticHost::new(canvas(), 4.0),
        ManualScheduler::new(),
    )
    .unwrap();
    a.mount();
    for i in 0..20 {
        assert_eq!(pump(&mut a, 16.0 * f64::from(i)), FrameOutcome::Rendered);
    }
    assert!(a.head().unwrap().s_head > 0.0);
}

#[test]
fn host_surface_size_wins_over_config_canvas() {
    let big = Canvas::new(64, 32).unwrap();
    let mut a = animator(StaticHost::new(big, 4.0));
    a.mount();
    pump(&mut a, 0.0);
    assert_eq!((a.frame().width, a.frame().height), (64, 32));
}
