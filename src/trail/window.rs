use crate::foundation::core::{Point, Rgb8};
use crate::foundation::math::{clamp_or, wrap_arc};
use crate::geometry::sampler::SampleTable;
use crate::motion::driver::{Direction, HeadState};

/// Upper bound on segments produced per frame.
pub const MAX_SEGMENTS: usize = 8192;

/// A point on the trail, recomputed every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSegment {
    /// Trailing distance behind the head.
    pub distance: f64,
    /// Arc length of this point in `[0, L)`.
    pub s: f64,
    /// Position in curve space.
    pub pos: Point,
    /// Falloff intensity in `[0, 1]`.
    pub intensity: f64,
    /// Color sampled from the table at `s`.
    pub color: Rgb8,
    /// Radius scale, 1 for window segments.
    pub scale: f64,
}

impl TrailSegment {
    /// `true` when bright enough to draw.
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.intensity >= threshold
    }
}

/// Power-law decay `(1 - d / tail)^exponent`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Falloff {
    exponent: f64,
}

impl Falloff {
    /// Default decay exponent.
    pub const DEFAULT_EXPONENT: f64 = 2.0;

    /// Exponent is clamped into `[1, 4]`.
    pub fn new(exponent: f64) -> Self {
        Self {
            exponent: clamp_or(exponent, 1.0, 4.0, Self::DEFAULT_EXPONENT),
        }
    }

    /// Effective exponent.
    pub fn exponent(self) -> f64 {
        self.exponent
    }

    /// Intensity at trailing distance `d`. Zero when `tail <= 0`.
    pub fn intensity(self, d: f64, tail: f64) -> f64 {
        if tail.is_nan() || tail <= 0.0 || !d.is_finite() {
            return 0.0;
        }
        (1.0 - d / tail).clamp(0.0, 1.0).powf(self.exponent)
    }
}

impl Default for Falloff {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EXPONENT)
    }
}

/// Deterministic trail reconstructed from the sample table behind the head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailWindow {
    tail_length: f64,
    step: f64,
    falloff: Falloff,
}

impl TrailWindow {
    /// Window covering `tail_fraction` of the curve, stepping once per sample.
    pub fn from_fraction(table: &SampleTable, tail_fraction: f64, falloff: Falloff) -> Self {
        let fraction = clamp_or(tail_fraction, 0.0, 1.0, 0.42);
        Self::new(fraction * table.total_length(), table.spacing(), falloff)
    }

    /// Window of `tail_length` units sampled every `step` units.
    pub fn new(tail_length: f64, step: f64, falloff: Falloff) -> Self {
        Self {
            tail_length: if tail_length.is_finite() {
                tail_length.max(0.0)
            } else {
                0.0
            },
            step: if step.is_finite() { step.max(0.0) } else { 0.0 },
            falloff,
        }
    }

    /// Length of the trail in curve units.
    pub fn tail_length(&self) -> f64 {
        self.tail_length
    }

    /// Arc length between emitted segments.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Decay curve.
    pub fn falloff(&self) -> Falloff {
        self.falloff
    }

    /// Segments from the head (`d = 0`) out to the tail.
    pub fn segments(&self, table: &SampleTable, head: &HeadState) -> Vec<TrailSegment> {
        let mut out = Vec::new();
        self.write_segments(table, head, &mut out);
        out
    }

    /// Like [`TrailWindow::segments`], reusing `out`.
    pub fn write_segments(&self, table: &SampleTable, head: &HeadState, out: &mut Vec<TrailSegment>) {
        out.clear();
        if self.tail_length <= 0.0 || self.step <= 0.0 || table.total_length() <= 0.0 {
            return;
        }
        let count = ((self.tail_length / self.step).floor() as usize).min(MAX_SEGMENTS - 1) + 1;
        let behind = match head.direction {
            Direction::Forward => -1.0,
            Direction::Reverse => 1.0,
        };
        out.reserve(count);
        for k in 0..count {
            let d = k as f64 * self.step;
            let s = wrap_arc(head.s_head + behind * d, table.total_length());
            out.push(TrailSegment {
                distance: d,
                s,
                pos: table.position_at(s),
                intensity: self.falloff.intensity(d, self.tail_length),
                color: table.color_at(s),
                scale: 1.0,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trail/window.rs"]
mod tests;
