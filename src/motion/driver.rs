use crate::foundation::math::{clamp_or, wrap_arc};
use crate::motion::speed::SpeedProfile;
use serde::{Deserialize, Serialize};

/// Default loop duration in seconds.
pub const DEFAULT_DURATION_S: f64 = 2.24;
/// Accepted loop durations in seconds.
pub const DURATION_RANGE_S: (f64, f64) = (0.5, 10.0);
/// Default upper bound on one frame's time step.
pub const DEFAULT_MAX_DELTA_S: f64 = 0.05;

const MAX_SUBSTEPS: usize = 64;

/// Travel direction along the curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Increasing arc length.
    #[default]
    Forward,
    /// Decreasing arc length.
    Reverse,
}

impl Direction {
    /// `true` when `reverse` is set.
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Reverse } else { Self::Forward }
    }

    /// `+1.0` forward, `-1.0` reverse.
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// How elapsed time turns into arc length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pacing {
    /// One loop every `seconds`, with time redistributed by the dwell CDF.
    Duration {
        /// Loop period.
        seconds: f64,
    },
    /// Integrate a curvature-dependent speed in path units per second.
    SpeedRange {
        /// Speed in the tightest bends.
        min: f64,
        /// Speed on straights.
        max: f64,
    },
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Duration {
            seconds: DEFAULT_DURATION_S,
        }
    }
}

impl Pacing {
    /// Clamp into usable ranges. Non-finite durations fall back to the default.
    pub fn sanitized(self) -> Self {
        match self {
            Self::Duration { seconds } => {
                let (lo, hi) = DURATION_RANGE_S;
                let clamped = clamp_or(seconds, lo, hi, DEFAULT_DURATION_S);
                if clamped != seconds {
                    tracing::debug!(requested = seconds, used = clamped, "duration clamped");
                }
                Self::Duration { seconds: clamped }
            }
            Self::SpeedRange { min, max } => {
                let min = clamp_or(min, 0.0, 10_000.0, 55.0);
                let max = clamp_or(max, 0.0, 10_000.0, 180.0);
                let (min, max) = if min <= max { (min, max) } else { (max, min) };
                Self::SpeedRange { min, max }
            }
        }
    }
}

/// Mutable per-run head bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadState {
    /// Arc length of the head in `[0, L)`.
    pub s_head: f64,
    /// Travel direction.
    pub direction: Direction,
    /// Host timestamp of the last committed frame, in milliseconds.
    pub last_timestamp_ms: Option<f64>,
    /// Sum of clamped frame deltas since the run started.
    pub elapsed_s: f64,
}

impl HeadState {
    /// Fresh state at arc length `s_head`.
    pub fn start(s_head: f64, direction: Direction) -> Self {
        Self {
            s_head,
            direction,
            last_timestamp_ms: None,
            elapsed_s: 0.0,
        }
    }
}

/// Converts wall-clock frame timestamps into head positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemporalDriver {
    pacing: Pacing,
    direction: Direction,
    max_delta_s: f64,
}

impl TemporalDriver {
    /// Create a driver; `pacing` and `max_delta_s` are clamped.
    pub fn new(pacing: Pacing, direction: Direction, max_delta_s: f64) -> Self {
        Self {
            pacing: pacing.sanitized(),
            direction,
            max_delta_s: clamp_or(max_delta_s, 0.0, 1.0, DEFAULT_MAX_DELTA_S),
        }
    }

    /// Effective pacing.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Travel direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Effective loop duration, when pacing by duration.
    pub fn duration_s(&self) -> Option<f64> {
        match self.pacing {
            Pacing::Duration { seconds } => Some(seconds),
            Pacing::SpeedRange { .. } => None,
        }
    }

    /// Loop progress in `[0, 1)` at `elapsed_s`, mirrored when reversed.
    ///
    /// `None` when pacing by speed range, which has no fixed period.
    pub fn progress_at(&self, elapsed_s: f64) -> Option<f64> {
        let period = self.duration_s()?;
        let p = wrap_arc(elapsed_s, period) / period;
        Some(match self.direction {
            Direction::Forward => p,
            Direction::Reverse => wrap_arc(1.0 - p, 1.0),
        })
    }

    /// Invert the dwell CDF: arc length reached after loop fraction `p`.
    ///
    /// Linear within each sample interval; `p = 0` and `p -> 1` meet at `s = 0`.
    pub fn arc_at_progress(&self, p: f64, profile: &SpeedProfile) -> f64 {
        let cdf = profile.dwell_cdf();
        let n = cdf.len().saturating_sub(1);
        if n == 0 || profile.total_length() <= 0.0 {
            return 0.0;
        }
        let p = wrap_arc(p, 1.0);
        let i = cdf.partition_point(|&c| c <= p).saturating_sub(1).min(n - 1);
        let span = cdf[i + 1] - cdf[i];
        let frac = if span > 0.0 {
            ((p - cdf[i]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        wrap_arc((i as f64 + frac) * profile.spacing(), profile.total_length())
    }

    /// Clamped time step between the last committed frame and `now_ms`.
    ///
    /// Zero on the first frame of a run, for non-finite timestamps, and when time runs backwards.
    pub fn delta_s(&self, head: &HeadState, now_ms: f64) -> f64 {
        match head.last_timestamp_ms {
            Some(last) if now_ms.is_finite() => {
                ((now_ms - last) / 1000.0).clamp(0.0, self.max_delta_s)
            }
            _ => 0.0,
        }
    }

    /// Candidate head state for a frame at `now_ms`. The caller commits it.
    pub fn advance(&self, head: &HeadState, now_ms: f64, profile: &SpeedProfile) -> HeadState {
        let dt = self.delta_s(head, now_ms);
        let elapsed_s = head.elapsed_s + dt;
        let s_head = match self.pacing {
            Pacing::Duration { .. } => match self.progress_at(elapsed_s) {
                Some(p) => self.arc_at_progress(p, profile),
                None => head.s_head,
            },
            Pacing::SpeedRange { min, max } => {
                self.integrate(head.s_head, dt, min, max, profile)
            }
        };
        HeadState {
            s_head,
            direction: self.direction,
            last_timestamp_ms: if now_ms.is_finite() {
                Some(now_ms)
            } else {
                head.last_timestamp_ms
            },
            elapsed_s,
        }
    }

    /// Head state frozen at loop fraction `progress`, for static frames.
    pub fn static_head(&self, progress: f64, profile: &SpeedProfile) -> HeadState {
        let p = clamp_or(progress, 0.0, 1.0, 0.5);
        let s = match self.pacing {
            Pacing::Duration { .. } => self.arc_at_progress(p, profile),
            Pacing::SpeedRange { .. } => wrap_arc(p * profile.total_length(), profile.total_length()),
        };
        HeadState::start(s, self.direction)
    }

    fn integrate(&self, s0: f64, dt: f64, min: f64, max: f64, profile: &SpeedProfile) -> f64 {
        let l = profile.total_length();
        if dt <= 0.0 || l <= 0.0 {
            return s0;
        }
        let step_len = profile.spacing().max(f64::EPSILON);
        let substeps = ((max * dt / step_len).ceil() as usize).clamp(1, MAX_SUBSTEPS);
        let h = dt / substeps as f64;
        let mut s = s0;
        for _ in 0..substeps {
            let v = min + (max - min) * profile.straightness_at(s);
            s = wrap_arc(s + self.direction.sign() * v * h, l);
        }
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/driver.rs"]
mod tests;
