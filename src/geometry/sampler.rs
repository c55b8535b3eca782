use crate::foundation::core::{BezPath, Point, Rgb8, Vec2};
use crate::foundation::math::wrap_arc;
use crate::geometry::curve::Curve;
use crate::geometry::palette::Palette;

/// Smallest and largest accepted sample counts.
pub const SAMPLE_COUNT_RANGE: (usize, usize) = (16, 4096);

/// One arc-length sample of a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Cumulative arc length from the curve start.
    pub s: f64,
    /// Position in curve space.
    pub pos: Point,
    /// Unsigned curvature estimate (radians per unit length).
    pub curvature: f64,
    /// Palette color at `i / N`.
    pub color: Rgb8,
}

/// Dense arc-length lookup table over a closed curve.
///
/// Samples sit at `s_i = i * L / N`; index `N - 1` is adjacent to index `0`.
#[derive(Clone, Debug)]
pub struct SampleTable {
    samples: Vec<Sample>,
    total_length: f64,
    spacing: f64,
}

impl SampleTable {
    /// Sample `curve` at `count` evenly spaced arc lengths.
    ///
    /// `count` is clamped into [`SAMPLE_COUNT_RANGE`]. A degenerate curve yields one sample.
    #[tracing::instrument(level = "debug", skip(curve, palette), fields(len = curve.total_length()))]
    pub fn build(curve: &Curve, count: usize, palette: &Palette) -> Self {
        let total_length = curve.total_length();
        if curve.is_degenerate() {
            tracing::debug!("degenerate curve, single-sample table");
            return Self {
                samples: vec![Sample {
                    s: 0.0,
                    pos: curve.point_at_length(0.0),
                    curvature: 0.0,
                    color: palette.color_at(0.0),
                }],
                total_length: 0.0,
                spacing: 0.0,
            };
        }

        let n = count.clamp(SAMPLE_COUNT_RANGE.0, SAMPLE_COUNT_RANGE.1);
        let spacing = total_length / n as f64;
        let positions: Vec<Point> = (0..n)
            .map(|i| curve.point_at_length(i as f64 * spacing))
            .collect();

        let samples = (0..n)
            .map(|i| {
                let prev = positions[(i + n - 1) % n];
                let here = positions[i];
                let next = positions[(i + 1) % n];
                Sample {
                    s: i as f64 * spacing,
                    pos: here,
                    curvature: turning_curvature(prev, here, next),
                    color: palette.color_at(i as f64 / n as f64),
                }
            })
            .collect();

        Self {
            samples,
            total_length,
            spacing,
        }
    }

    /// Number of samples `N`.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; a table holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total arc length `L` of the sampled curve.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Arc length between neighbouring samples (`L / N`).
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// All samples in arc-length order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample `i`, wrapped modulo `N`.
    pub fn sample(&self, i: usize) -> &Sample {
        &self.samples[i % self.samples.len()]
    }

    /// Index of the sample at or before arc length `s`.
    pub fn index_at(&self, s: f64) -> usize {
        self.locate(s).0
    }

    /// Position at arc length `s`, linearly interpolated between samples.
    pub fn position_at(&self, s: f64) -> Point {
        let (i, frac) = self.locate(s);
        let a = self.samples[i].pos;
        let b = self.sample(i + 1).pos;
        a.lerp(b, frac)
    }

    /// Color at arc length `s`, linearly interpolated between samples.
    pub fn color_at(&self, s: f64) -> Rgb8 {
        let (i, frac) = self.locate(s);
        self.samples[i].color.lerp(self.sample(i + 1).color, frac)
    }

    /// Unit direction of travel at `s` (forward), or zero on a degenerate table.
    pub fn tangent_at(&self, s: f64) -> Vec2 {
        let i = self.index_at(s);
        let n = self.samples.len();
        let d = self.sample(i + 1).pos - self.samples[(i + n - 1) % n].pos;
        let len = d.hypot();
        if len > 1e-12 { d / len } else { Vec2::ZERO }
    }

    /// Closed polyline through every sample.
    pub fn polyline(&self) -> BezPath {
        let mut out = BezPath::new();
        let mut it = self.samples.iter();
        if let Some(first) = it.next() {
            out.move_to(first.pos);
            for smp in it {
                out.line_to(smp.pos);
            }
            out.close_path();
        }
        out
    }

    fn locate(&self, s: f64) -> (usize, f64) {
        let n = self.samples.len();
        if n <= 1 || self.spacing <= 0.0 {
            return (0, 0.0);
        }
        let x = wrap_arc(s, self.total_length) / self.spacing;
        let i = (x.floor() as usize).min(n - 1);
        let frac = (x - i as f64).clamp(0.0, 1.0);
        (i, frac)
    }
}

fn turning_curvature(prev: Point, here: Point, next: Point) -> f64 {
    let v1 = here - prev;
    let v2 = next - here;
    let mean_chord = 0.5 * (v1.hypot() + v2.hypot());
    if mean_chord <= 1e-12 {
        return 0.0;
    }
    let angle = v1.cross(v2).atan2(v1.dot(v2)).abs();
    angle / mean_chord
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sampler.rs"]
mod tests;
