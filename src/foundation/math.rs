#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed ^ Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Per-pixel grain value for a given seed and pixel coordinate.
pub(crate) fn grain_u8(seed: u64, x: u32, y: u32) -> u8 {
    let mut h = Fnv1a64::new(seed);
    h.write_u32(x);
    h.write_u32(y);
    (h.finish() >> 24) as u8
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Wrap an arc-length coordinate into `[0, period)`.
///
/// Returns `0.0` for a non-positive or non-finite period.
pub(crate) fn wrap_arc(s: f64, period: f64) -> f64 {
    if !(period.is_finite() && period > 0.0) || !s.is_finite() {
        return 0.0;
    }
    let w = s.rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs.
    if w >= period { 0.0 } else { w }
}

/// Clamp into `[lo, hi]`, mapping NaN and infinities to `fallback`.
pub(crate) fn clamp_or(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
