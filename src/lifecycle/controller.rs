use crate::config::engine::{EngineConfig, GeometryKey, TrailMode};
use crate::foundation::core::{Affine, Canvas, Rgb8};
use crate::foundation::error::{GlowError, GlowResult};
use crate::geometry::curve::Curve;
use crate::geometry::sampler::SampleTable;
use crate::lifecycle::host::{FrameId, FrameScheduler, GeometryHost};
use crate::motion::driver::{HeadState, TemporalDriver};
use crate::motion::speed::SpeedProfile;
use crate::render::compositor::{Compositor, FrameScene, HeadGlow};
use crate::render::frame::FrameRGBA;
use crate::render::surface_pool::SurfacePoolStats;
use crate::trail::particles::ParticlePool;
use crate::trail::window::{Falloff, TrailSegment, TrailWindow};

const SHIMMER_RATE_PER_MS: f64 = 0.012;
const SHIMMER_DEPTH: f64 = 0.1;

/// Where an animator is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Waiting for a surface and layout.
    Idle,
    /// Building the sample table and speed profile.
    Sampling,
    /// A frame is scheduled and the head advances every tick.
    Running,
    /// One static frame was drawn; nothing is scheduled.
    PausedReducedMotion,
    /// The run ended; `mount` starts a new one.
    TornDown,
}

/// Why a frame was not drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The host has no surface right now.
    SurfaceUnavailable,
    /// The host could not resolve the view transform.
    TransformUnavailable,
    /// Rasterization failed; the previous frame stays visible.
    RenderFailed,
}

/// Result of delivering one frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A new frame is visible and the head advanced.
    Rendered,
    /// Nothing changed; the head did not move and the next frame is scheduled.
    Skipped(SkipReason),
    /// The callback did not belong to the current run and was ignored.
    Stale,
}

/// Counters over the animator's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimatorStats {
    /// Frames that reached the screen.
    pub frames_rendered: u64,
    /// Frames dropped by a transient failure.
    pub frames_skipped: u64,
    /// Callbacks ignored because they belonged to a cancelled run.
    pub stale_callbacks: u64,
    /// Sample table and speed profile rebuilds.
    pub geometry_builds: u64,
    /// Successful mounts.
    pub runs_started: u64,
    /// Layer pixmap pool counters.
    pub pool: SurfacePoolStats,
}

struct Geometry {
    curve: Curve,
    key: GeometryKey,
    table: SampleTable,
    profile: SpeedProfile,
}

struct Run {
    driver: TemporalDriver,
    window: TrailWindow,
    head: HeadState,
    particles: Option<ParticlePool>,
    pending: Option<FrameId>,
}

/// Drives one neon trail on one host surface.
///
/// The animator owns its host and scheduler. The host loop forwards every fired frame
/// callback to [`TrailAnimator::on_frame`] with the frame timestamp in milliseconds.
pub struct TrailAnimator<H, S> {
    config: EngineConfig,
    curve: Curve,
    host: H,
    scheduler: S,
    state: LifecycleState,
    geometry: Option<Geometry>,
    run: Option<Run>,
    compositor: Compositor,
    segments: Vec<TrailSegment>,
    stats: AnimatorStats,
}

impl<H: GeometryHost, S: FrameScheduler> TrailAnimator<H, S> {
    /// Create an idle animator. Fails only when the configured canvas is unusable.
    pub fn new(config: EngineConfig, curve: Curve, host: H, scheduler: S) -> GlowResult<Self> {
        let config = config.sanitized()?;
        let compositor = Compositor::new(config.canvas)?;
        Ok(Self {
            config,
            curve,
            host,
            scheduler,
            state: LifecycleState::Idle,
            geometry: None,
            run: None,
            compositor,
            segments: Vec::new(),
            stats: AnimatorStats::default(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Last complete frame. Transparent until the first frame is drawn.
    pub fn frame(&self) -> &FrameRGBA {
        self.compositor.frame()
    }

    /// Committed head state of the current run.
    pub fn head(&self) -> Option<HeadState> {
        self.run.as_ref().map(|r| r.head)
    }

    /// Counters, including the compositor's pool.
    pub fn stats(&self) -> AnimatorStats {
        AnimatorStats {
            pool: self.compositor.pool_stats(),
            ..self.stats
        }
    }

    /// Effective (sanitized) configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Curve being animated.
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Cached samples, once built.
    pub fn sample_table(&self) -> Option<&SampleTable> {
        self.geometry.as_ref().map(|g| &g.table)
    }

    /// Cached speed profile, once built.
    pub fn speed_profile(&self) -> Option<&SpeedProfile> {
        self.geometry.as_ref().map(|g| &g.profile)
    }

    /// The geometry host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the geometry host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the frame scheduler, for hosts that pump frames by hand.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Start a run when the host is ready.
    ///
    /// Stays `Idle` while the host has no surface or layout. With reduced motion a single
    /// static frame is drawn and nothing is scheduled. Mounting an active run is a no-op.
    pub fn mount(&mut self) -> LifecycleState {
        match self.state {
            LifecycleState::Running
            | LifecycleState::PausedReducedMotion
            | LifecycleState::Sampling => return self.state,
            LifecycleState::Idle | LifecycleState::TornDown => {}
        }
        self.state = LifecycleState::Idle;

        let Some(surface) = self.host.surface() else {
            tracing::debug!("mount deferred: no surface");
            return self.state;
        };
        let Some(view) = self.host.view_transform(self.curve.view_box(), surface) else {
            tracing::debug!("mount deferred: view transform unavailable");
            return self.state;
        };
        if let Err(e) = self.ensure_compositor(surface) {
            tracing::debug!(error = %e, "mount deferred: surface rejected");
            return self.state;
        }

        self.state = LifecycleState::Sampling;
        self.ensure_geometry();
        let Some(geo) = self.geometry.as_ref() else {
            self.state = LifecycleState::Idle;
            return self.state;
        };

        let driver = TemporalDriver::new(
            self.config.pacing,
            self.config.direction(),
            self.config.max_frame_delta_ms / 1000.0,
        );
        let window = TrailWindow::from_fraction(
            &geo.table,
            self.config.tail_fraction,
            Falloff::new(self.config.decay_exponent),
        );
        let particles = match self.config.trail_mode {
            TrailMode::Window => None,
            TrailMode::Particles => Some(ParticlePool::new(self.config.particles, self.config.seed)),
        };
        let head = HeadState::start(0.0, driver.direction());
        self.run = Some(Run {
            driver,
            window,
            head,
            particles,
            pending: None,
        });
        self.stats.runs_started += 1;

        if self.host.prefers_reduced_motion() {
            self.pause_static(view);
            return self.state;
        }

        self.state = LifecycleState::Running;
        self.schedule_next();
        self.state
    }

    /// Deliver a fired frame callback at host time `now_ms`.
    #[tracing::instrument(level = "trace", skip(self), fields(state = ?self.state))]
    pub fn on_frame(&mut self, id: FrameId, now_ms: f64) -> FrameOutcome {
        let is_current = self.state == LifecycleState::Running
            && self.run.as_ref().is_some_and(|r| r.pending == Some(id));
        if !is_current {
            tracing::debug!(?id, "ignoring stale frame callback");
            self.stats.stale_callbacks += 1;
            return FrameOutcome::Stale;
        }
        if let Some(run) = self.run.as_mut() {
            run.pending = None;
        }

        let view = match self.resolve_view() {
            Ok(view) => view,
            Err(reason) => {
                self.stats.frames_skipped += 1;
                self.schedule_next();
                return FrameOutcome::Skipped(reason);
            }
        };

        if self.host.prefers_reduced_motion() {
            return self.pause_static(view);
        }

        let outcome = match self.advance_and_render(view, now_ms) {
            Ok(()) => {
                self.stats.frames_rendered += 1;
                FrameOutcome::Rendered
            }
            Err(e) => {
                tracing::debug!(error = %e, "frame skipped");
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped(SkipReason::RenderFailed)
            }
        };
        self.schedule_next();
        outcome
    }

    /// Replace the configuration. Any change restarts an active run.
    pub fn update_config(&mut self, config: EngineConfig) -> GlowResult<()> {
        let config = config.sanitized()?;
        if config == self.config {
            return Ok(());
        }
        let was_active = self.is_active();
        self.stop_run();
        self.config = config;
        self.state = LifecycleState::Idle;
        if was_active {
            self.mount();
        }
        Ok(())
    }

    /// Replace the curve. Any change restarts an active run.
    pub fn set_curve(&mut self, curve: Curve) {
        if curve == self.curve {
            return;
        }
        let was_active = self.is_active();
        self.stop_run();
        self.curve = curve;
        self.state = LifecycleState::Idle;
        if was_active {
            self.mount();
        }
    }

    /// End the run: cancel the pending frame, then release layer buffers. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == LifecycleState::TornDown {
            return;
        }
        self.stop_run();
        self.state = LifecycleState::TornDown;
    }

    fn is_active(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Running | LifecycleState::PausedReducedMotion
        )
    }

    fn stop_run(&mut self) {
        if let Some(run) = self.run.take()
            && let Some(id) = run.pending
        {
            self.scheduler.cancel_frame(id);
        }
        self.segments = Vec::new();
        self.compositor.release();
    }

    fn schedule_next(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match self.scheduler.request_frame() {
            Some(id) => run.pending = Some(id),
            None => {
                tracing::warn!("host cannot schedule frames; trail animation disabled");
                self.run = None;
                self.state = LifecycleState::Idle;
            }
        }
    }

    fn resolve_view(&mut self) -> Result<Affine, SkipReason> {
        let surface = self
            .host
            .surface()
            .ok_or(SkipReason::SurfaceUnavailable)?;
        let view = self
            .host
            .view_transform(self.curve.view_box(), surface)
            .ok_or(SkipReason::TransformUnavailable)?;
        self.ensure_compositor(surface)
            .map_err(|_| SkipReason::SurfaceUnavailable)?;
        Ok(view)
    }

    fn ensure_compositor(&mut self, surface: Canvas) -> GlowResult<()> {
        if self.compositor.canvas() != surface {
            self.compositor = Compositor::new(surface)?;
        }
        Ok(())
    }

    fn ensure_geometry(&mut self) {
        let key = self.config.geometry_key();
        if self
            .geometry
            .as_ref()
            .is_some_and(|g| g.key == key && g.curve == self.curve)
        {
            return;
        }
        let table = SampleTable::build(&self.curve, key.sample_count, &key.palette);
        let profile = SpeedProfile::build(&table, key.speed);
        tracing::debug!(
            samples = table.len(),
            length = table.total_length(),
            kappa_ref = profile.kappa_ref(),
            "geometry rebuilt"
        );
        self.stats.geometry_builds += 1;
        self.geometry = Some(Geometry {
            curve: self.curve.clone(),
            key,
            table,
            profile,
        });
    }

    /// Draw the frozen frame for reduced motion and stop scheduling.
    fn pause_static(&mut self, view: Affine) -> FrameOutcome {
        if let Some(run) = self.run.as_mut()
            && let Some(id) = run.pending.take()
        {
            self.scheduler.cancel_frame(id);
        }
        self.state = LifecycleState::PausedReducedMotion;
        let Some(head) = self.geometry.as_ref().zip(self.run.as_ref()).map(|(g, r)| {
            r.driver
                .static_head(self.config.static_progress, &g.profile)
        }) else {
            self.stats.frames_skipped += 1;
            return FrameOutcome::Skipped(SkipReason::RenderFailed);
        };
        let window_only = self.config.trail_mode == TrailMode::Window;
        match self.render(view, &head, None, 0.0, window_only) {
            Ok(()) => {
                self.stats.frames_rendered += 1;
                if let Some(run) = self.run.as_mut() {
                    run.head = head;
                }
                FrameOutcome::Rendered
            }
            Err(e) => {
                tracing::debug!(error = %e, "static frame failed");
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped(SkipReason::RenderFailed)
            }
        }
    }

    fn advance_and_render(&mut self, view: Affine, now_ms: f64) -> GlowResult<()> {
        let (Some(geo), Some(run)) = (self.geometry.as_ref(), self.run.as_ref()) else {
            return Err(GlowError::render(
                "frame delivered without geometry",
            ));
        };
        let candidate = run.driver.advance(&run.head, now_ms, &geo.profile);
        let particles = match run.particles.as_ref() {
            Some(pool) => {
                let dt = run.driver.delta_s(&run.head, now_ms);
                let mut pool = pool.clone();
                let s = candidate.s_head;
                let tangent = geo.table.tangent_at(s) * candidate.direction.sign();
                let color = self.head_color(&geo.table, s, now_ms);
                pool.step(dt, geo.table.position_at(s), tangent, color);
                Some(pool)
            }
            None => None,
        };

        self.render(view, &candidate, particles.as_ref(), now_ms, true)?;

        if let Some(run) = self.run.as_mut() {
            run.head = candidate;
            if particles.is_some() {
                run.particles = particles;
            }
        }
        Ok(())
    }

    fn head_color(&self, table: &SampleTable, s: f64, now_ms: f64) -> Rgb8 {
        let palette = &self.config.palette;
        if palette.is_time_varying() && table.total_length() > 0.0 {
            palette.color_at_time(s / table.total_length(), now_ms / 1000.0)
        } else {
            table.color_at(s)
        }
    }

    fn render(
        &mut self,
        view: Affine,
        head: &HeadState,
        particles: Option<&ParticlePool>,
        now_ms: f64,
        draw_trail: bool,
    ) -> GlowResult<()> {
        let (Some(geo), Some(run)) = (self.geometry.as_ref(), self.run.as_ref()) else {
            return Err(GlowError::render(
                "render requested without an active run",
            ));
        };
        let cfg = &self.config;
        let table = &geo.table;

        self.segments.clear();
        let mut trail_alpha = 1.0;
        if cfg.layers.trail && draw_trail {
            match particles {
                Some(pool) => {
                    pool.write_segments(&mut self.segments);
                    trail_alpha = pool.opts().peak_opacity;
                }
                None => {
                    run.window.write_segments(table, head, &mut self.segments);
                    if cfg.palette.is_time_varying() && table.total_length() > 0.0 {
                        let t_s = now_ms / 1000.0;
                        for seg in &mut self.segments {
                            seg.color = cfg
                                .palette
                                .color_at_time(seg.s / table.total_length(), t_s);
                        }
                    }
                }
            }
        }

        let shimmer = if cfg.layers.shimmer {
            1.0 - SHIMMER_DEPTH + SHIMMER_DEPTH * (now_ms * SHIMMER_RATE_PER_MS).sin()
        } else {
            1.0
        };
        let head_glow = HeadGlow {
            pos: table.position_at(head.s_head),
            color: self.head_color(table, head.s_head, now_ms),
            shimmer,
        };

        let scene = FrameScene {
            canvas: self.compositor.canvas(),
            view,
            background: cfg.background.fill(),
            noise_opacity: cfg.noise_opacity,
            seed: cfg.seed,
            static_trace: cfg.layers.static_trace.then_some(self.curve.path()),
            segments: &self.segments,
            trail_alpha,
            negligible: cfg.negligible_intensity,
            core_threshold: cfg.core_threshold,
            head: Some(head_glow),
            ambient: cfg.layers.ambient,
            glow: cfg.glow,
        };
        self.compositor.compose(&scene)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/controller.rs"]
mod tests;
