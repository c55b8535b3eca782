use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{GlowError, GlowResult};
use crate::render::frame::FrameRGBA;
use std::path::{Path, PathBuf};

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Frame rate the frames were sampled at.
    pub fps: Fps,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GlowResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlowResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> GlowResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlowResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> GlowResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as `<prefix>_<index>.png` (straight alpha) into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            cfg: None,
            written: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.prefix, idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> GlowResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            GlowError::validation(format!(
                "create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> GlowResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(GlowError::validation("push_frame called before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GlowError::validation(format!(
                "frame {}x{} does not match sink {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.path_for(idx);
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> GlowResult<()> {
        tracing::debug!(
            frames = self.written.len(),
            dir = %self.dir.display(),
            "png sequence written"
        );
        Ok(())
    }
}

/// Save one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> GlowResult<()> {
    let straight = frame.to_straight();
    image::save_buffer_with_format(
        path,
        &straight.data,
        straight.width,
        straight.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| {
        GlowError::Other(anyhow::Error::new(e).context(format!("write '{}'", path.display())))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
