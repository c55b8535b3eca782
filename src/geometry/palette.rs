use crate::foundation::core::Rgb8;
use crate::foundation::error::{GlowError, GlowResult};
use serde::{Deserialize, Serialize};

/// A color keyed to a normalized position along the curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Normalized position in `[0, 1]`.
    pub offset: f64,
    /// Stop color.
    pub color: Rgb8,
}

impl ColorStop {
    /// Build a stop from an offset and a `0xRRGGBB` literal.
    pub const fn hex(offset: f64, rgb: u32) -> Self {
        Self {
            offset,
            color: Rgb8::from_hex(rgb),
        }
    }
}

/// Color scheme for the trail.
///
/// Colors are keyed to the normalized position `u = s / L` of a sample along the curve.
/// `Cycle` additionally scrolls its colors with the clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Palette {
    /// A single neon hue.
    Hue {
        /// Trail color.
        color: Rgb8,
    },
    /// Piecewise-linear gradient over sorted stops.
    Gradient {
        /// Stops, sorted by offset after sanitizing.
        stops: Vec<ColorStop>,
    },
    /// Evenly spaced colors that wrap around the loop and scroll over time.
    Cycle {
        /// Colors in loop order.
        colors: Vec<Rgb8>,
        /// Seconds for one full scroll of the colors around the loop.
        period_s: f64,
    },
}

impl Default for Palette {
    fn default() -> Self {
        Self::sunset()
    }
}

impl Palette {
    /// Warm orange into rose, rose into sky blue, and back to orange at the seam.
    pub fn sunset() -> Self {
        Self::Gradient {
            stops: vec![
                ColorStop::hex(0.0, 0xFF9C26),
                ColorStop::hex(0.22, 0xF14575),
                ColorStop::hex(0.45, 0xF14575),
                ColorStop::hex(0.70, 0x65BDEB),
                ColorStop::hex(0.90, 0x65BDEB),
                ColorStop::hex(1.0, 0xFF9C26),
            ],
        }
    }

    /// Electric violet single-hue palette.
    pub fn violet() -> Self {
        Self::Hue {
            color: Rgb8::from_hex(0x7A4CFF),
        }
    }

    /// Soft pastel rainbow that scrolls around the loop.
    pub fn pastel_cycle() -> Self {
        Self::Cycle {
            colors: vec![
                Rgb8::from_hex(0xA78BFA),
                Rgb8::from_hex(0x60A5FA),
                Rgb8::from_hex(0x22D3EE),
                Rgb8::from_hex(0xF472B6),
                Rgb8::from_hex(0xFB923C),
            ],
            period_s: 4.0,
        }
    }

    /// Look up a built-in palette by name.
    pub fn named(name: &str) -> GlowResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sunset" => Ok(Self::sunset()),
            "violet" => Ok(Self::violet()),
            "pastel" | "cycle" => Ok(Self::pastel_cycle()),
            other => Err(GlowError::validation(format!(
                "unknown palette \"{other}\" (expected sunset, violet or pastel)"
            ))),
        }
    }

    /// Return a copy with sorted, clamped stops and a usable period.
    ///
    /// Empty stop or color lists fall back to the sunset palette.
    pub fn sanitized(&self) -> Self {
        match self {
            Self::Hue { color } => Self::Hue { color: *color },
            Self::Gradient { stops } => {
                let mut stops: Vec<ColorStop> = stops
                    .iter()
                    .filter(|s| s.offset.is_finite())
                    .map(|s| ColorStop {
                        offset: s.offset.clamp(0.0, 1.0),
                        color: s.color,
                    })
                    .collect();
                if stops.is_empty() {
                    tracing::debug!("gradient palette has no usable stops, using sunset");
                    return Self::sunset();
                }
                stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
                Self::Gradient { stops }
            }
            Self::Cycle { colors, period_s } => {
                if colors.is_empty() {
                    tracing::debug!("cycle palette has no colors, using sunset");
                    return Self::sunset();
                }
                let period_s = if period_s.is_finite() {
                    period_s.clamp(0.5, 60.0)
                } else {
                    4.0
                };
                Self::Cycle {
                    colors: colors.clone(),
                    period_s,
                }
            }
        }
    }

    /// `true` when colors change with time and must be re-evaluated per frame.
    pub fn is_time_varying(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    /// Color at normalized position `u`.
    ///
    /// `u` outside `[0, 1]` is clamped for gradients and wrapped for cycles.
    pub fn color_at(&self, u: f64) -> Rgb8 {
        self.color_at_time(u, 0.0)
    }

    /// Color at normalized position `u` and elapsed time `t_s`.
    pub fn color_at_time(&self, u: f64, t_s: f64) -> Rgb8 {
        let u = if u.is_finite() { u } else { 0.0 };
        match self {
            Self::Hue { color } => *color,
            Self::Gradient { stops } => gradient_at(stops, u.clamp(0.0, 1.0)),
            Self::Cycle { colors, period_s } => {
                let shift = if t_s.is_finite() && *period_s > 0.0 {
                    t_s / period_s
                } else {
                    0.0
                };
                cycle_at(colors, (u - shift).rem_euclid(1.0))
            }
        }
    }
}

fn gradient_at(stops: &[ColorStop], u: f64) -> Rgb8 {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgb8::WHITE;
    };
    if u <= first.offset {
        return first.color;
    }
    if u >= last.offset {
        return last.color;
    }
    let hi = stops.partition_point(|s| s.offset <= u);
    let a = stops[hi - 1];
    let b = stops[hi];
    let span = b.offset - a.offset;
    if span <= f64::EPSILON {
        return b.color;
    }
    a.color.lerp(b.color, (u - a.offset) / span)
}

fn cycle_at(colors: &[Rgb8], u: f64) -> Rgb8 {
    let n = colors.len();
    if n == 0 {
        return Rgb8::WHITE;
    }
    let x = u * n as f64;
    let i = (x.floor() as usize).min(n - 1);
    let frac = x - i as f64;
    colors[i].lerp(colors[(i + 1) % n], frac)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/palette.rs"]
mod tests;
