//! Layered neon compositor.
//!
//! Every frame is painted back to front into a private back buffer:
//! background and grain, the static trace, then the halo, mid and core layers of the trail,
//! then the head glow. Glow layers are rasterized with `vello_cpu`, blurred, and summed with
//! additive blending. The back buffer becomes the visible frame only when every pass
//! succeeded.

use crate::config::engine::GlowStyle;
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rgb8};
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::blend;
use crate::render::blur::{BlurScratch, MAX_RADIUS_PX};
use crate::render::frame::FrameRGBA;
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::trail::window::TrailSegment;
use vello_cpu::kurbo::Shape as _;

const DISC_TOLERANCE: f64 = 0.05;

const STATIC_TRACE_RGBA: [u8; 4] = [160, 170, 190, 31];
const STATIC_TRACE_WIDTH: f64 = 0.9;

const HEAD_AMBIENT_ALPHA: f64 = 0.18;
const HEAD_BLOOM_RADIUS: f64 = 16.0;
const HEAD_BLOOM_ALPHA: f64 = 0.06;
const HEAD_BLOOM_BLUR: f64 = 36.0;
const HEAD_HALO_ALPHA: f64 = 0.85;
const HEAD_HALO_BLUR: f64 = 18.0;
const HEAD_CORE_BLUR: f64 = 7.5;

/// The glowing head drawn on top of the trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadGlow {
    /// Position in curve space.
    pub pos: Point,
    /// Halo color.
    pub color: Rgb8,
    /// Core radius multiplier, `1.0` when shimmer is off.
    pub shimmer: f64,
}

/// Everything the compositor needs to paint one frame.
#[derive(Clone, Debug)]
pub struct FrameScene<'a> {
    /// Output size; must match the compositor.
    pub canvas: Canvas,
    /// Curve space to pixel space.
    pub view: Affine,
    /// Opaque background, or `None` for transparent.
    pub background: Option<Rgb8>,
    /// Grain opacity over the background.
    pub noise_opacity: f64,
    /// Grain seed.
    pub seed: u64,
    /// Faint outline of the whole curve.
    pub static_trace: Option<&'a BezPath>,
    /// Trail segments, head first.
    pub segments: &'a [TrailSegment],
    /// Alpha multiplier applied to every trail segment.
    pub trail_alpha: f64,
    /// Segments dimmer than this are skipped.
    pub negligible: f64,
    /// Segments brighter than this get a white core.
    pub core_threshold: f64,
    /// Head glow, if drawn.
    pub head: Option<HeadGlow>,
    /// Draw the wide ambient scatter around the head.
    pub ambient: bool,
    /// Radii and strength.
    pub glow: GlowStyle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Merge {
    Over,
    Plus,
}

/// Owns the layer buffers of one animator instance.
pub struct Compositor {
    canvas: Canvas,
    front: FrameRGBA,
    back: Vec<u8>,
    bloom: Vec<u8>,
    pool: SurfacePool,
    blur: BlurScratch,
    ctx: Option<vello_cpu::RenderContext>,
    frames_composed: u64,
}

impl Compositor {
    /// Create a compositor for `canvas`, starting with a transparent frame.
    pub fn new(canvas: Canvas) -> GlowResult<Self> {
        canvas.validate()?;
        Ok(Self {
            canvas,
            front: FrameRGBA::transparent(canvas),
            back: Vec::new(),
            bloom: Vec::new(),
            pool: SurfacePool::new(SurfacePoolOpts::default()),
            blur: BlurScratch::new(),
            ctx: None,
            frames_composed: 0,
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Last complete frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.front
    }

    /// Number of frames that completed every pass.
    pub fn frames_composed(&self) -> u64 {
        self.frames_composed
    }

    /// Layer pixmap pool counters.
    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    /// Free layer buffers and caches. The last complete frame stays readable.
    pub fn release(&mut self) {
        self.pool.clear();
        self.blur.clear();
        self.ctx = None;
        self.back = Vec::new();
        self.bloom = Vec::new();
    }

    /// Paint `scene` and, on success, make it the visible frame.
    #[tracing::instrument(skip_all, fields(segments = scene.segments.len()))]
    pub fn compose(&mut self, scene: &FrameScene<'_>) -> GlowResult<()> {
        if scene.canvas != self.canvas {
            return Err(GlowError::render(format!(
                "scene canvas {}x{} does not match compositor {}x{}",
                scene.canvas.width, scene.canvas.height, self.canvas.width, self.canvas.height
            )));
        }
        let det = scene.view.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(GlowError::render("view transform is not invertible"));
        }
        let px_per_unit = det.abs().sqrt();

        self.back.clear();
        self.back.resize(self.canvas.byte_len(), 0);
        if let Some(bg) = scene.background {
            blend::fill(&mut self.back, bg.with_alpha(1.0).to_array());
            blend::grain_over_in_place(
                &mut self.back,
                self.canvas.width,
                scene.seed,
                scene.noise_opacity,
            );
        }

        if let Some(trace) = scene.static_trace {
            let path = bezpath_to_cpu(trace);
            self.layer_pass(scene.view, Merge::Over, 0.0, |ctx| {
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    STATIC_TRACE_RGBA[0],
                    STATIC_TRACE_RGBA[1],
                    STATIC_TRACE_RGBA[2],
                    STATIC_TRACE_RGBA[3],
                ));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(STATIC_TRACE_WIDTH));
                ctx.stroke_path(&path);
            })?;
        }

        self.trail_passes(scene, px_per_unit)?;
        if let Some(head) = scene.head {
            self.head_passes(scene, head, px_per_unit)?;
        }

        std::mem::swap(&mut self.front.data, &mut self.back);
        self.front.premultiplied = true;
        self.frames_composed = self.frames_composed.saturating_add(1);
        Ok(())
    }

    fn trail_passes(&mut self, scene: &FrameScene<'_>, px_per_unit: f64) -> GlowResult<()> {
        let glow = scene.glow;
        let alpha = scene.trail_alpha.clamp(0.0, 1.0) * glow.strength;
        let visible: Vec<&TrailSegment> = scene
            .segments
            .iter()
            .filter(|s| s.is_visible(scene.negligible) && s.pos.is_finite())
            .collect();
        if visible.is_empty() || alpha <= 0.0 {
            return Ok(());
        }

        let halo_radius = |i: f64| (glow.halo_radius * (0.6 + 0.8 * i)).max(0.8);

        let sigma = blur_sigma_px(glow.bloom_radius, px_per_unit);
        self.layer_pass(scene.view, Merge::Plus, sigma, |ctx| {
            for seg in &visible {
                let i = seg.intensity.clamp(0.0, 1.0);
                fill_disc(
                    ctx,
                    seg.pos,
                    halo_radius(i) * seg.scale,
                    seg.color,
                    (0.08 + 0.35 * i) * alpha,
                );
            }
        })?;

        let sigma = blur_sigma_px(halo_radius(1.0), px_per_unit);
        self.layer_pass(scene.view, Merge::Plus, sigma, |ctx| {
            for seg in &visible {
                let i = seg.intensity.clamp(0.0, 1.0);
                fill_disc(
                    ctx,
                    seg.pos,
                    (0.8 * halo_radius(i)).max(0.6) * seg.scale,
                    seg.color,
                    (0.18 + 0.42 * i) * alpha,
                );
            }
        })?;

        if !visible.iter().any(|s| s.intensity > scene.core_threshold) {
            return Ok(());
        }
        let core_radius = |i: f64| glow.core_radius * (0.7 + 0.6 * i);
        let sigma = blur_sigma_px(core_radius(1.0) * 0.75, px_per_unit);
        self.layer_pass(scene.view, Merge::Plus, sigma, |ctx| {
            for seg in visible.iter().filter(|s| s.intensity > scene.core_threshold) {
                let i = seg.intensity.clamp(0.0, 1.0);
                fill_disc(
                    ctx,
                    seg.pos,
                    core_radius(i) * seg.scale,
                    Rgb8::WHITE,
                    (0.25 + 0.6 * i) * alpha,
                );
            }
        })
    }

    fn head_passes(
        &mut self,
        scene: &FrameScene<'_>,
        head: HeadGlow,
        px_per_unit: f64,
    ) -> GlowResult<()> {
        if !head.pos.is_finite() {
            return Ok(());
        }
        let glow = scene.glow;
        let strength = glow.strength;

        if scene.ambient {
            self.layer_pass(scene.view, Merge::Plus, 0.0, |ctx| {
                fill_disc(
                    ctx,
                    head.pos,
                    glow.ambient_radius,
                    head.color,
                    HEAD_AMBIENT_ALPHA * strength,
                );
            })?;
            self.layer_pass(
                scene.view,
                Merge::Plus,
                blur_sigma_px(HEAD_BLOOM_BLUR, px_per_unit),
                |ctx| {
                    fill_disc(
                        ctx,
                        head.pos,
                        HEAD_BLOOM_RADIUS,
                        head.color,
                        HEAD_BLOOM_ALPHA * strength,
                    );
                },
            )?;
        }

        self.layer_pass(
            scene.view,
            Merge::Plus,
            blur_sigma_px(HEAD_HALO_BLUR, px_per_unit),
            |ctx| {
                fill_disc(
                    ctx,
                    head.pos,
                    glow.head_halo_radius,
                    head.color,
                    HEAD_HALO_ALPHA * strength,
                );
            },
        )?;

        let shimmer = if head.shimmer.is_finite() {
            head.shimmer.max(0.0)
        } else {
            1.0
        };
        self.layer_pass(
            scene.view,
            Merge::Plus,
            blur_sigma_px(HEAD_CORE_BLUR, px_per_unit),
            |ctx| {
                fill_disc(
                    ctx,
                    head.pos,
                    glow.head_core_radius * shimmer,
                    Rgb8::WHITE,
                    strength,
                );
            },
        )
    }

    /// Rasterize one layer and merge it (plus its bloom) into the back buffer.
    fn layer_pass(
        &mut self,
        view: Affine,
        merge: Merge,
        sigma_px: f32,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> GlowResult<()> {
        let (w, h) = self.canvas.size_u16()?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(view));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_blend_mode(match merge {
            Merge::Over => vello_cpu::peniko::BlendMode::default(),
            Merge::Plus => plus_blend(),
        });
        draw(&mut ctx);
        ctx.flush();

        let mut layer = self.pool.borrow(self.canvas)?;
        ctx.render_to_pixmap(&mut layer);
        self.ctx = Some(ctx);

        let res = self.merge_layer(layer.data_as_u8_slice(), merge, sigma_px);
        self.pool.release(self.canvas, layer);
        res
    }

    fn merge_layer(&mut self, src: &[u8], merge: Merge, sigma_px: f32) -> GlowResult<()> {
        match merge {
            Merge::Over => blend::over_in_place(&mut self.back, src),
            Merge::Plus => {
                blend::plus_in_place(&mut self.back, src)?;
                if sigma_px > 0.0 {
                    self.bloom.resize(src.len(), 0);
                    self.blur.blur(
                        src,
                        &mut self.bloom,
                        self.canvas.width,
                        self.canvas.height,
                        sigma_px,
                    )?;
                    blend::plus_in_place(&mut self.back, &self.bloom)?;
                }
                Ok(())
            }
        }
    }
}

/// Blur extent in curve units (a CSS-style shadow blur) to a pixel sigma.
fn blur_sigma_px(blur: f64, px_per_unit: f64) -> f32 {
    let sigma = 0.5 * blur * px_per_unit;
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0.0;
    }
    sigma.min(f64::from(MAX_RADIUS_PX) / 3.0) as f32
}

fn plus_blend() -> vello_cpu::peniko::BlendMode {
    vello_cpu::peniko::BlendMode::new(
        vello_cpu::peniko::Mix::Normal,
        vello_cpu::peniko::Compose::Plus,
    )
}

fn fill_disc(
    ctx: &mut vello_cpu::RenderContext,
    center: Point,
    radius: f64,
    color: Rgb8,
    alpha: f64,
) {
    if !radius.is_finite() || radius <= 0.0 || !alpha.is_finite() {
        return;
    }
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    if a == 0 {
        return;
    }
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, a,
    ));
    let disc = vello_cpu::kurbo::Circle::new(point_to_cpu(center), radius);
    ctx.fill_path(&disc.to_path(DISC_TOLERANCE));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
