use crate::foundation::core::Canvas;
use crate::foundation::error::GlowResult;
use std::collections::HashMap;

/// Retention limits for cached layer pixmaps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub(crate) max_pool_bytes: usize,
    /// Maximum number of retained pixmaps per size bucket.
    pub(crate) max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            // A loader canvas is tiny; a handful of layers per size is plenty.
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 6,
        }
    }
}

/// Allocation counters, exposed through the animator for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Pixmaps currently parked in the pool.
    pub retained_surfaces: usize,
    /// Bytes currently parked in the pool.
    pub retained_bytes: usize,
    /// Fresh pixmaps allocated since creation.
    pub alloc_surfaces: u64,
    /// Bytes allocated since creation.
    pub alloc_bytes: u64,
    /// Releases that were dropped because a cap was hit.
    pub dropped_on_release: u64,
}

/// Bounded pool of `vello_cpu` pixmaps keyed by canvas size.
///
/// The compositor borrows a pixmap per layer pass and returns it when the pass is merged.
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<(u32, u32), Vec<vello_cpu::Pixmap>>,
}

impl SurfacePool {
    pub(crate) fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        self.stats
    }

    /// Borrow a cleared pixmap of the canvas size.
    pub(crate) fn borrow(&mut self, canvas: Canvas) -> GlowResult<vello_cpu::Pixmap> {
        let key = (canvas.width, canvas.height);
        let bytes = canvas.byte_len();
        if let Some(mut p) = self.buckets.get_mut(&key).and_then(Vec::pop) {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(bytes);
            p.data_as_u8_slice_mut().fill(0);
            return Ok(p);
        }

        let (w, h) = canvas.size_u16()?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes as u64);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    pub(crate) fn release(&mut self, canvas: Canvas, pixmap: vello_cpu::Pixmap) {
        let bytes = canvas.byte_len();
        if self.opts.max_pool_bytes == 0
            || self.opts.max_surfaces_per_bucket == 0
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self
            .buckets
            .entry((canvas.width, canvas.height))
            .or_default();
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drop every retained pixmap. Allocation counters are kept.
    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.stats.retained_surfaces = 0;
        self.stats.retained_bytes = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
