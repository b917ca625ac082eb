use std::path::PathBuf;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{SplashError, SplashResult};
use crate::render::frame::FrameRGBA;

/// Writes each frame as `frame_00000.png`, `frame_00001.png`, ... into a directory.
///
/// PNGs are straight alpha; premultiplied frames are converted on the way out.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    /// Path of the file frame `idx` is written to.
    pub fn frame_path(&self, idx: u64) -> PathBuf {
        self.dir.join(format!("frame_{idx:05}.png"))
    }

    /// Frames written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> SplashResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SplashError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> SplashResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SplashError::encode("png sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SplashError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &frame.to_straight_rgba8(),
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| SplashError::encode(format!("failed to write '{}': {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> SplashResult<()> {
        if self.cfg.take().is_none() {
            return Err(SplashError::encode("png sink not started"));
        }
        tracing::info!(frames = self.written, dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
