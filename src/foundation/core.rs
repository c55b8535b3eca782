use crate::foundation::error::{GlowError, GlowResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// 0-based index of a rendered frame within one export or run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> GlowResult<Self> {
        if den == 0 {
            return Err(GlowError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GlowError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds, the unit host timestamps use.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }
}

/// Render surface dimensions in pixels.
///
/// Bounded by `u16::MAX` on both axes because layer buffers are `vello_cpu` pixmaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas.
    pub fn new(width: u32, height: u32) -> GlowResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Reject empty or oversized surfaces.
    pub fn validate(self) -> GlowResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GlowError::validation("canvas width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(GlowError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    pub(crate) fn size_u16(self) -> GlowResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| GlowError::render("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| GlowError::render("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 140,
            height: 140,
        }
    }
}

/// Opaque straight RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white, used for the hot cores.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Construct from a `0xRRGGBB` literal.
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Channel-wise linear interpolation, rounded to the nearest integer.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| -> u8 {
            let af = f64::from(a);
            let bf = f64::from(b);
            (af * (1.0 - t) + bf * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Premultiply against an opacity in `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Rgba8Premul {
        let a = if alpha.is_finite() {
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            0
        };
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            crate::foundation::math::mul_div255_u8(u16::from(c), u16::from(a))
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels in `[r, g, b, a]` byte order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
