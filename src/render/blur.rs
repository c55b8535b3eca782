//! Separable gaussian bloom on premultiplied RGBA8, fixed-point Q16 weights.

use crate::foundation::error::{GlowError, GlowResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Largest kernel radius in pixels.
pub(crate) const MAX_RADIUS_PX: u32 = 64;

/// Kernel radius covering three standard deviations, capped at [`MAX_RADIUS_PX`].
pub(crate) fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    ((3.0 * sigma).ceil() as u32).min(MAX_RADIUS_PX)
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> GlowResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(GlowError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(GlowError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Put the rounding residue on the center tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

/// Reusable blur buffers and a kernel cache, owned by one compositor.
#[derive(Default)]
pub(crate) struct BlurScratch {
    tmp: Vec<u8>,
    kernels: HashMap<(u32, u32), Arc<Vec<u32>>>,
}

impl BlurScratch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blur `src` into `dst` with standard deviation `sigma` pixels.
    ///
    /// A non-positive sigma copies `src` unchanged.
    pub(crate) fn blur(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        width: u32,
        height: u32,
        sigma: f32,
    ) -> GlowResult<()> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if src.len() != expected || dst.len() != expected {
            return Err(GlowError::render("blur buffer size mismatch"));
        }

        let radius = radius_for_sigma(sigma);
        if radius == 0 {
            dst.copy_from_slice(src);
            return Ok(());
        }
        let key = (radius, sigma.to_bits());
        let kernel = match self.kernels.get(&key) {
            Some(k) => k.clone(),
            None => {
                let k = Arc::new(gaussian_kernel_q16(radius, sigma)?);
                self.kernels.insert(key, k.clone());
                k
            }
        };

        self.tmp.resize(expected, 0);
        horizontal_pass(src, &mut self.tmp, width, height, &kernel);
        vertical_pass(&self.tmp, dst, width, height, &kernel);
        Ok(())
    }

    /// Drop cached kernels and scratch memory.
    pub(crate) fn clear(&mut self) {
        self.tmp = Vec::new();
        self.kernels.clear();
    }
}

// Out-of-range taps read transparent pixels, so glow fades out at the canvas edge.
fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i64 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((row + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((row + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
