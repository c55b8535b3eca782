use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{GlowError, GlowResult};
use crate::foundation::math::clamp_or;
use crate::geometry::palette::Palette;
use crate::geometry::sampler::SAMPLE_COUNT_RANGE;
use crate::motion::driver::{DEFAULT_MAX_DELTA_S, Direction, Pacing};
use crate::motion::speed::SpeedProfileOpts;
use crate::trail::particles::ParticleOpts;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Which trail model feeds the compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailMode {
    /// Deterministic window reconstructed behind the head.
    #[default]
    Window,
    /// Stochastic aging particles spawned at the head.
    Particles,
}

/// Optional render passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerToggles {
    /// Draw the trail behind the head.
    pub trail: bool,
    /// Wide faint scatter patch around the head.
    pub ambient: bool,
    /// Faint full-path trace under everything.
    pub static_trace: bool,
    /// Sinusoidal shimmer on the head core.
    pub shimmer: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            trail: true,
            ambient: true,
            static_trace: true,
            shimmer: true,
        }
    }
}

/// Radii (curve units) and blur widths of the glow passes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowStyle {
    /// Halo radius of a full-intensity trail segment.
    pub halo_radius: f64,
    /// White core radius of a full-intensity trail segment.
    pub core_radius: f64,
    /// Bloom blur width of a full-intensity trail segment.
    pub bloom_radius: f64,
    /// Colored head halo radius.
    pub head_halo_radius: f64,
    /// White head core radius before shimmer.
    pub head_core_radius: f64,
    /// Ambient scatter radius around the head.
    pub ambient_radius: f64,
    /// Overall alpha multiplier for every glow pass.
    pub strength: f64,
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self {
            halo_radius: 4.6,
            core_radius: 1.6,
            bloom_radius: 12.0,
            head_halo_radius: 5.6,
            head_core_radius: 2.5,
            ambient_radius: 22.0,
            strength: 1.0,
        }
    }
}

impl GlowStyle {
    fn sanitized(self) -> Self {
        let d = Self::default();
        let r = |v: f64, fallback: f64| clamp_or(v, 0.0, 256.0, fallback);
        Self {
            halo_radius: r(self.halo_radius, d.halo_radius),
            core_radius: r(self.core_radius, d.core_radius),
            bloom_radius: r(self.bloom_radius, d.bloom_radius),
            head_halo_radius: r(self.head_halo_radius, d.head_halo_radius),
            head_core_radius: r(self.head_core_radius, d.head_core_radius),
            ambient_radius: r(self.ambient_radius, d.ambient_radius),
            strength: clamp_or(self.strength, 0.0, 4.0, 1.0),
        }
    }
}

/// What sits behind the glow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// Leave the surface transparent.
    Transparent,
    /// Opaque fill, near-black by default.
    #[default]
    Black,
    /// Opaque fill with a custom color.
    Solid {
        /// Fill color.
        color: Rgb8,
    },
}

impl Background {
    /// Fill color, or `None` when transparent.
    pub fn fill(self) -> Option<Rgb8> {
        match self {
            Self::Transparent => None,
            Self::Black => Some(Rgb8::new(0, 0, 0)),
            Self::Solid { color } => Some(color),
        }
    }
}

/// Every knob of the animator, loadable from JSON.
///
/// Missing fields take their defaults. Call [`EngineConfig::sanitized`] (the animator does)
/// before use; out-of-range values are clamped rather than rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Loop duration or speed range.
    pub pacing: Pacing,
    /// Travel against the path direction.
    pub reverse: bool,
    /// Fraction of the curve length covered by the trail.
    pub tail_fraction: f64,
    /// Trail colors.
    pub palette: Palette,
    /// Samples per curve.
    pub sample_count: usize,
    /// Trail falloff exponent.
    pub decay_exponent: f64,
    /// Trail segments dimmer than this are not drawn.
    pub negligible_intensity: f64,
    /// Trail segments brighter than this get a white core.
    pub core_threshold: f64,
    /// Trail model.
    pub trail_mode: TrailMode,
    /// Particle model tuning.
    pub particles: ParticleOpts,
    /// Optional passes.
    pub layers: LayerToggles,
    /// Glow geometry.
    pub glow: GlowStyle,
    /// Background fill.
    pub background: Background,
    /// Opacity of the background grain; zero disables it.
    pub noise_opacity: f64,
    /// Output surface size.
    pub canvas: Canvas,
    /// Inset between the canvas edge and the fitted view box, in pixels.
    pub padding_px: f64,
    /// Loop fraction shown when motion is reduced.
    pub static_progress: f64,
    /// Largest per-frame time step in milliseconds.
    pub max_frame_delta_ms: f64,
    /// Seed for particles and grain.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            reverse: false,
            tail_fraction: 0.42,
            palette: Palette::default(),
            sample_count: 500,
            decay_exponent: 2.0,
            negligible_intensity: 0.05,
            core_threshold: 0.2,
            trail_mode: TrailMode::Window,
            particles: ParticleOpts::default(),
            layers: LayerToggles::default(),
            glow: GlowStyle::default(),
            background: Background::Black,
            noise_opacity: 0.035,
            canvas: Canvas::default(),
            padding_px: 10.0,
            static_progress: 0.5,
            max_frame_delta_ms: DEFAULT_MAX_DELTA_S * 1000.0,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GlowResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GlowError::serde(format!("parse engine config JSON: {e}")))
    }

    /// Parse from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GlowResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GlowError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> GlowResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy with every value clamped into its safe range.
    ///
    /// Each adjustment is logged at debug level. The canvas is the only field that can fail.
    pub fn sanitized(&self) -> GlowResult<Self> {
        self.canvas.validate()?;

        let fix = |name: &'static str, v: f64, lo: f64, hi: f64, fallback: f64| -> f64 {
            let out = clamp_or(v, lo, hi, fallback);
            if out.to_bits() != v.to_bits() {
                tracing::debug!(field = name, requested = v, used = out, "config value clamped");
            }
            out
        };

        let sample_count = self
            .sample_count
            .clamp(SAMPLE_COUNT_RANGE.0, SAMPLE_COUNT_RANGE.1);
        if sample_count != self.sample_count {
            tracing::debug!(
                requested = self.sample_count,
                used = sample_count,
                "sample count clamped"
            );
        }

        Ok(Self {
            pacing: self.pacing.sanitized(),
            reverse: self.reverse,
            tail_fraction: fix("tail_fraction", self.tail_fraction, 0.0, 1.0, 0.42),
            palette: self.palette.sanitized(),
            sample_count,
            decay_exponent: fix("decay_exponent", self.decay_exponent, 1.0, 4.0, 2.0),
            negligible_intensity: fix(
                "negligible_intensity",
                self.negligible_intensity,
                0.0,
                1.0,
                0.05,
            ),
            core_threshold: fix("core_threshold", self.core_threshold, 0.0, 1.0, 0.2),
            trail_mode: self.trail_mode,
            particles: self.particles.sanitized(),
            layers: self.layers,
            glow: self.glow.sanitized(),
            background: self.background,
            noise_opacity: fix("noise_opacity", self.noise_opacity, 0.0, 1.0, 0.035),
            canvas: self.canvas,
            padding_px: fix("padding_px", self.padding_px, 0.0, 4096.0, 10.0),
            static_progress: fix("static_progress", self.static_progress, 0.0, 1.0, 0.5),
            max_frame_delta_ms: fix(
                "max_frame_delta_ms",
                self.max_frame_delta_ms,
                0.0,
                1000.0,
                DEFAULT_MAX_DELTA_S * 1000.0,
            ),
            seed: self.seed,
        })
    }

    /// Travel direction from the `reverse` flag.
    pub fn direction(&self) -> Direction {
        Direction::from_reverse(self.reverse)
    }

    /// Speed profile tuning implied by the pacing.
    pub fn speed_profile_opts(&self) -> SpeedProfileOpts {
        match self.pacing {
            Pacing::SpeedRange { min, max } => SpeedProfileOpts::from_speed_range(min, max),
            Pacing::Duration { .. } => SpeedProfileOpts::default(),
        }
    }

    /// Parameters that require resampling the curve when they change.
    pub(crate) fn geometry_key(&self) -> GeometryKey {
        GeometryKey {
            sample_count: self.sample_count,
            palette: self.palette.clone(),
            speed: self.speed_profile_opts(),
        }
    }
}

/// Inputs of the cached sample table and speed profile.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GeometryKey {
    pub(crate) sample_count: usize,
    pub(crate) palette: Palette,
    pub(crate) speed: SpeedProfileOpts,
}

#[cfg(test)]
#[path = "../../tests/unit/config/engine.rs"]
mod tests;
