use crate::foundation::math::wrap_arc;
use crate::geometry::sampler::SampleTable;

/// Tuning for [`SpeedProfile::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedProfileOpts {
    /// Curvature percentile used as the normalization reference.
    pub percentile: f64,
    /// Exponent applied to straightness `1 - k`.
    pub response_exponent: f64,
    /// Relative speed in the tightest bends, as a fraction of the top speed.
    pub floor: f64,
}

impl Default for SpeedProfileOpts {
    fn default() -> Self {
        Self::from_speed_range(55.0, 180.0)
    }
}

impl SpeedProfileOpts {
    /// Derive the floor from a `[min, max]` speed range in path units per second.
    pub fn from_speed_range(min: f64, max: f64) -> Self {
        let floor = if max > 0.0 && min.is_finite() && max.is_finite() {
            min / max
        } else {
            1.0
        };
        Self {
            percentile: 0.95,
            response_exponent: 0.55,
            floor: floor.clamp(0.05, 1.0),
        }
    }
}

/// Per-sample relative speeds derived from curvature.
///
/// `weights` sum to 1 and are lowest in tight bends. The dwell CDF gives the fraction of a
/// loop's duration spent before each sample; the head covers sample `i` in time
/// proportional to `1 / relative_speed(i)`.
#[derive(Clone, Debug)]
pub struct SpeedProfile {
    opts: SpeedProfileOpts,
    kappa_ref: f64,
    normalized: Vec<f64>,
    relative: Vec<f64>,
    weights: Vec<f64>,
    dwell_cdf: Vec<f64>,
    total_length: f64,
    spacing: f64,
}

impl SpeedProfile {
    /// Build from a sample table.
    ///
    /// The reference curvature is the configured percentile, floored at `2π / L` so a
    /// nearly straight curve is not stretched into artificial slow zones.
    #[tracing::instrument(level = "debug", skip(table), fields(n = table.len()))]
    pub fn build(table: &SampleTable, opts: SpeedProfileOpts) -> Self {
        let opts = SpeedProfileOpts {
            percentile: if opts.percentile.is_finite() {
                opts.percentile.clamp(0.5, 1.0)
            } else {
                0.95
            },
            response_exponent: if opts.response_exponent.is_finite() {
                opts.response_exponent.clamp(0.05, 4.0)
            } else {
                0.55
            },
            floor: if opts.floor.is_finite() {
                opts.floor.clamp(0.05, 1.0)
            } else {
                1.0
            },
        };

        let kappas: Vec<f64> = table.samples().iter().map(|s| s.curvature).collect();
        let n = kappas.len().max(1);

        let mut sorted = kappas.clone();
        sorted.sort_by(f64::total_cmp);
        let pi = ((n as f64 * opts.percentile).floor() as usize).min(n - 1);
        let pct = sorted.get(pi).copied().unwrap_or(0.0);
        let length_floor = if table.total_length() > 0.0 {
            std::f64::consts::TAU / table.total_length()
        } else {
            1.0
        };
        let kappa_ref = pct.max(length_floor);

        let normalized: Vec<f64> = kappas
            .iter()
            .map(|&k| (k / kappa_ref).clamp(0.0, 1.0))
            .collect();
        let relative: Vec<f64> = normalized
            .iter()
            .map(|&k| {
                let straight = (1.0 - k).powf(opts.response_exponent);
                1.0 - (1.0 - opts.floor) * (1.0 - straight)
            })
            .collect();

        let (weights, dwell_cdf) = if relative.is_empty() {
            (vec![1.0], vec![0.0, 1.0])
        } else {
            let sum: f64 = relative.iter().sum();
            let weights = relative.iter().map(|r| r / sum).collect();

            let dwell_sum: f64 = relative.iter().map(|r| 1.0 / r).sum();
            let mut cdf = Vec::with_capacity(relative.len() + 1);
            let mut acc = 0.0;
            cdf.push(0.0);
            for r in &relative {
                acc += (1.0 / r) / dwell_sum;
                cdf.push(acc.min(1.0));
            }
            if let Some(last) = cdf.last_mut() {
                *last = 1.0;
            }
            (weights, cdf)
        };

        tracing::debug!(kappa_ref, floor = opts.floor, "speed profile built");
        Self {
            opts,
            kappa_ref,
            normalized,
            relative,
            weights,
            dwell_cdf,
            total_length: table.total_length(),
            spacing: table.spacing(),
        }
    }

    /// Effective options after clamping.
    pub fn opts(&self) -> SpeedProfileOpts {
        self.opts
    }

    /// Curvature that maps to a normalized value of 1.
    pub fn kappa_ref(&self) -> f64 {
        self.kappa_ref
    }

    /// Normalized speed weights, one per sample, summing to 1.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight of sample `i` (wrapped).
    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i % self.weights.len()]
    }

    /// Normalized curvature of sample `i` (wrapped), in `[0, 1]`.
    pub fn normalized_curvature(&self, i: usize) -> f64 {
        if self.normalized.is_empty() {
            return 0.0;
        }
        self.normalized[i % self.normalized.len()]
    }

    /// Relative speed of sample `i` (wrapped), in `[floor, 1]`.
    pub fn relative_speed(&self, i: usize) -> f64 {
        if self.relative.is_empty() {
            return 1.0;
        }
        self.relative[i % self.relative.len()]
    }

    /// Relative speed of the sample containing arc length `s`.
    pub fn relative_speed_at(&self, s: f64) -> f64 {
        self.relative_speed(self.index_at(s))
    }

    /// `(1 - k)^exponent` at arc length `s`; 1 on straights, 0 in the tightest bends.
    pub fn straightness_at(&self, s: f64) -> f64 {
        let k = self.normalized_curvature(self.index_at(s));
        (1.0 - k).powf(self.opts.response_exponent)
    }

    /// Cumulative dwell fractions, `N + 1` entries from 0 to 1.
    pub fn dwell_cdf(&self) -> &[f64] {
        &self.dwell_cdf
    }

    /// Arc length between samples this profile was built for.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Curve length this profile was built for.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    fn index_at(&self, s: f64) -> usize {
        let n = self.relative.len();
        if n <= 1 || self.spacing <= 0.0 {
            return 0;
        }
        ((wrap_arc(s, self.total_length) / self.spacing).floor() as usize).min(n - 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/speed.rs"]
mod tests;
