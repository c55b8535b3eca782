use crate::foundation::core::Canvas;
use crate::foundation::error::{GlowError, GlowResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames leave the compositor **premultiplied**. Use [`FrameRGBA::to_straight`] before
/// handing bytes to an encoder that expects straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.byte_len()],
            premultiplied: true,
        }
    }

    /// Wrap premultiplied bytes, checking the length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> GlowResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if data.len() != expected {
            return Err(GlowError::render(format!(
                "frame buffer is {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Pixel at `(x, y)` as stored, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha copy of this frame.
    pub fn to_straight(&self) -> Self {
        let mut data = self.data.clone();
        if self.premultiplied {
            crate::render::blend::unpremultiply_in_place(&mut data);
        }
        Self {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Sum of all alpha values; a cheap "how much was drawn" measure.
    pub fn alpha_sum(&self) -> u64 {
        self.data.chunks_exact(4).map(|px| u64::from(px[3])).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
