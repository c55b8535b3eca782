//! Premultiplied RGBA8 compositing kernels.

use crate::foundation::error::{GlowError, GlowResult};
use crate::foundation::math::{grain_u8, mul_div255_u8};

fn check_pair(dst: &[u8], src: &[u8], op: &str) -> GlowResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GlowError::render(format!(
            "{op} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// Additive ("lighter") compositing: `dst = min(255, dst + src)` per channel.
pub(crate) fn plus_in_place(dst: &mut [u8], src: &[u8]) -> GlowResult<()> {
    check_pair(dst, src, "plus_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 && s[0] == 0 && s[1] == 0 && s[2] == 0 {
            continue;
        }
        for c in 0..4 {
            d[c] = d[c].saturating_add(s[c]);
        }
    }
    Ok(())
}

/// Source-over compositing of premultiplied pixels.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> GlowResult<()> {
    check_pair(dst, src, "over_in_place")?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, [s[0], s[1], s[2], s[3]]);
    }
    Ok(())
}

fn over_px(d: &mut [u8], s: [u8; 4]) {
    let sa = u16::from(s[3]);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - sa;
    d[3] = s[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
    }
}

/// Fill every pixel with one premultiplied color.
pub(crate) fn fill(dst: &mut [u8], rgba: [u8; 4]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

/// Overlay per-pixel gray grain (values 32..=63) at `opacity` with source-over.
pub(crate) fn grain_over_in_place(dst: &mut [u8], width: u32, seed: u64, opacity: f64) {
    if width == 0 || opacity.is_nan() || opacity <= 0.0 {
        return;
    }
    let a = (opacity.min(1.0) * 255.0).round() as u8;
    if a == 0 {
        return;
    }
    for (i, px) in dst.chunks_exact_mut(4).enumerate() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        let g = 32 + (grain_u8(seed, x, y) >> 3);
        let pg = mul_div255_u8(u16::from(g), u16::from(a));
        over_px(px, [pg, pg, pg, a]);
    }
}

/// Convert premultiplied RGBA8 to straight alpha in place.
pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((u32::from(px[c]) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
