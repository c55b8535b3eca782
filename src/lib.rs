//! Glowtrace renders looping neon loader animations: a glowing head travels a closed
//! curve, slowing in tight bends, trailed by an additive bloom that fades with distance.
//!
//! The public API is animator-oriented:
//!
//! - Build a [`Curve`] (SVG path data, an SVG document, or [`Curve::loader_loop`])
//! - Configure an [`EngineConfig`] (JSON via serde, clamped by [`EngineConfig::sanitized`])
//! - Drive a [`TrailAnimator`] from a [`GeometryHost`] and a [`FrameScheduler`]
//! - Read [`FrameRGBA`] frames or stream them into a [`FrameSink`] with [`record`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod geometry;
pub(crate) mod lifecycle;
pub(crate) mod motion;
pub(crate) mod render;
pub(crate) mod trail;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgb8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{GlowError, GlowResult};

pub use crate::config::engine::{Background, EngineConfig, GlowStyle, LayerToggles, TrailMode};
pub use crate::encode::record::{RecordStats, record};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::geometry::curve::{Curve, LOADER_LOOP_PATH};
pub use crate::geometry::palette::{ColorStop, Palette};
pub use crate::geometry::sampler::{SAMPLE_COUNT_RANGE, Sample, SampleTable};
pub use crate::lifecycle::controller::{
    AnimatorStats, FrameOutcome, LifecycleState, SkipReason, TrailAnimator,
};
pub use crate::lifecycle::host::{
    FrameId, FrameScheduler, GeometryHost, ManualScheduler, StaticHost, fit_view_box,
};
pub use crate::motion::driver::{
    DEFAULT_DURATION_S, DEFAULT_MAX_DELTA_S, DURATION_RANGE_S, Direction, HeadState, Pacing,
    TemporalDriver,
};
pub use crate::motion::speed::{SpeedProfile, SpeedProfileOpts};
pub use crate::render::compositor::{Compositor, FrameScene, HeadGlow};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::surface_pool::SurfacePoolStats;
pub use crate::trail::particles::{Particle, ParticleOpts, ParticlePool};
pub use crate::trail::window::{Falloff, MAX_SEGMENTS, TrailSegment, TrailWindow};
