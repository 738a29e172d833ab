use std::path::PathBuf;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SlideFxError, SlideFxResult};

/// Configuration handed to a [`FrameSink`] when a session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Presentation surface: consumes frames in presentation order.
///
/// `push_frame` indices are strictly increasing within one `begin`/`end` pair.
pub trait FrameSink {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SlideFxResult<()>;
    /// Present one frame.
    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> SlideFxResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> SlideFxResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames in presentation order.
    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.frames.last().map(|(_, f)| f)
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideFxResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> SlideFxResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SlideFxResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes every frame as `<dir>/<prefix><idx:05>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: 0,
        }
    }

    /// Frames written since `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn frame_path(&self, idx: u64) -> PathBuf {
        self.dir.join(format!("{}{idx:05}.png", self.prefix))
    }
}

/// Undo alpha premultiplication for formats that store straight alpha.
pub fn unpremultiply(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(4) {
        let a = px[3];
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
        } else if a == 255 {
            out.extend_from_slice(px);
        } else {
            let a16 = u16::from(a);
            for &c in &px[..3] {
                let v = (u16::from(c) * 255 + a16 / 2) / a16;
                out.push(v.min(255) as u8);
            }
            out.push(a);
        }
    }
    out
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideFxResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SlideFxError::validation(format!("create output dir '{}': {e}", self.dir.display()))
        })?;
        tracing::debug!(dir = %self.dir.display(), width = cfg.width, height = cfg.height, "png sink ready");
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> SlideFxResult<()> {
        let path = self.frame_path(idx);
        let data = if frame.premultiplied {
            unpremultiply(&frame.data)
        } else {
            frame.data.clone()
        };
        image::save_buffer_with_format(
            &path,
            &data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| anyhow::anyhow!("write png '{}': {e}", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> SlideFxResult<()> {
        tracing::debug!(frames = self.written, "png sink finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slideshow/sink.rs"]
mod tests;
