use crate::foundation::core::{Point, Rgb8, Vec2};
use crate::foundation::math::clamp_or;
use crate::trail::window::TrailSegment;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Particle trail tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleOpts {
    /// Live particle bound; the oldest is evicted when full.
    pub capacity: usize,
    /// Lifetime in seconds.
    pub max_age_s: f64,
    /// Chance of spawning one particle per frame.
    pub spawn_probability: f64,
    /// Smallest particle diameter in curve units.
    pub size_min: f64,
    /// Largest particle diameter in curve units.
    pub size_max: f64,
    /// Drift speed away from the path, in curve units per second.
    pub drift_per_s: f64,
    /// Opacity of a newborn particle.
    pub peak_opacity: f64,
}

impl Default for ParticleOpts {
    fn default() -> Self {
        Self {
            capacity: 15,
            max_age_s: 1.0,
            spawn_probability: 0.7,
            size_min: 1.0,
            size_max: 4.0,
            drift_per_s: 12.5,
            peak_opacity: 0.6,
        }
    }
}

impl ParticleOpts {
    /// Clamp into usable ranges.
    pub fn sanitized(self) -> Self {
        let size_min = clamp_or(self.size_min, 0.1, 64.0, 1.0);
        let size_max = clamp_or(self.size_max, 0.1, 64.0, 4.0).max(size_min);
        Self {
            capacity: self.capacity.clamp(1, 1024),
            max_age_s: clamp_or(self.max_age_s, 0.05, 30.0, 1.0),
            spawn_probability: clamp_or(self.spawn_probability, 0.0, 1.0, 0.7),
            size_min,
            size_max,
            drift_per_s: clamp_or(self.drift_per_s, 0.0, 1000.0, 12.5),
            peak_opacity: clamp_or(self.peak_opacity, 0.0, 1.0, 0.6),
        }
    }
}

/// One aging particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in curve space.
    pub pos: Point,
    /// Seconds since spawn.
    pub age_s: f64,
    /// Diameter at birth.
    pub size: f64,
    /// Color at spawn time.
    pub color: Rgb8,
    drift: Vec2,
}

/// Bounded pool of stochastic trail particles spawned at the head.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    opts: ParticleOpts,
    rng: StdRng,
    particles: VecDeque<Particle>,
}

impl ParticlePool {
    /// Create an empty pool with a deterministic RNG.
    pub fn new(opts: ParticleOpts, seed: u64) -> Self {
        let opts = opts.sanitized();
        Self {
            particles: VecDeque::with_capacity(opts.capacity),
            opts,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Effective options.
    pub fn opts(&self) -> ParticleOpts {
        self.opts
    }

    /// Live particle count.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// `true` when no particle is alive.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Age and drift live particles by `dt_s`, drop expired ones, then maybe spawn one at `head`.
    ///
    /// `tangent` is the direction of travel; particles drift along its left normal.
    pub fn step(&mut self, dt_s: f64, head: Point, tangent: Vec2, color: Rgb8) {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        let max_age = self.opts.max_age_s;
        for p in &mut self.particles {
            p.age_s += dt_s;
            p.pos += p.drift * dt_s;
        }
        self.particles.retain(|p| p.age_s < max_age);

        if !self.rng.gen_bool(self.opts.spawn_probability) {
            return;
        }
        if self.particles.len() >= self.opts.capacity {
            self.particles.pop_front();
        }
        let normal = if tangent.hypot() > 1e-12 {
            Vec2::new(-tangent.y, tangent.x).normalize()
        } else {
            Vec2::new(0.0, 1.0)
        };
        let size = if self.opts.size_max > self.opts.size_min {
            self.rng.gen_range(self.opts.size_min..=self.opts.size_max)
        } else {
            self.opts.size_min
        };
        self.particles.push_back(Particle {
            pos: head,
            age_s: 0.0,
            size,
            color,
            drift: normal * self.opts.drift_per_s,
        });
    }

    /// Render view of the live particles, newest first.
    ///
    /// Intensity is `1 - age / max_age`; `scale` carries the size and the age shrink.
    pub fn write_segments(&self, out: &mut Vec<TrailSegment>) {
        out.clear();
        let mean_size = 0.5 * (self.opts.size_min + self.opts.size_max);
        for p in self.particles.iter().rev() {
            let ratio = (p.age_s / self.opts.max_age_s).clamp(0.0, 1.0);
            out.push(TrailSegment {
                distance: 0.0,
                s: 0.0,
                pos: p.pos,
                intensity: 1.0 - ratio,
                color: p.color,
                scale: (p.size / mean_size) * (1.0 - 0.5 * ratio),
            });
        }
    }

    /// Opacity of a particle at its current age.
    pub fn opacity_of(&self, p: &Particle) -> f64 {
        let ratio = (p.age_s / self.opts.max_age_s).clamp(0.0, 1.0);
        (1.0 - ratio) * self.opts.peak_opacity
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trail/particles.rs"]
mod tests;
