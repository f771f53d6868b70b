//! Consumers of the display-list frame stream.

use std::sync::{Arc, Mutex};

use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::render::backend::{FrameRGBA, RasterBackend};
use crate::render::display::Frame;
use crate::render::fingerprint::{FrameFingerprint, fingerprint_frame};

/// Receives every emitted frame in order.
pub trait FrameSink {
    fn accept(&mut self, frame: Frame) -> ChoreoResult<()>;

    /// Called once by `Scene::finish` after the last frame.
    fn finish(&mut self) -> ChoreoResult<()> {
        Ok(())
    }
}

/// Destination for rasterized frames.
pub trait FrameWriter {
    fn write_frame(&mut self, frame: &FrameRGBA) -> ChoreoResult<()>;

    fn finish(&mut self) -> ChoreoResult<()> {
        Ok(())
    }
}

impl<W: FrameWriter + ?Sized> FrameWriter for Box<W> {
    fn write_frame(&mut self, frame: &FrameRGBA) -> ChoreoResult<()> {
        (**self).write_frame(frame)
    }

    fn finish(&mut self) -> ChoreoResult<()> {
        (**self).finish()
    }
}

/// Drops every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn accept(&mut self, _frame: Frame) -> ChoreoResult<()> {
        Ok(())
    }
}

/// Buffers frames in memory. Clones share the buffer, so a clone handed to a scene can be
/// read back through the original.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.frames.lock().ok()?.get(index).cloned()
    }

    pub fn take(&self) -> Vec<Frame> {
        self.frames
            .lock()
            .map(|mut f| std::mem::take(&mut *f))
            .unwrap_or_default()
    }
}

impl FrameSink for FrameRecorder {
    fn accept(&mut self, frame: Frame) -> ChoreoResult<()> {
        self.frames
            .lock()
            .map_err(|_| ChoreoError::render("frame recorder lock poisoned"))?
            .push(frame);
        Ok(())
    }
}

/// Keeps only per-frame fingerprints.
#[derive(Clone, Debug, Default)]
pub struct FingerprintSink {
    prints: Arc<Mutex<Vec<FrameFingerprint>>>,
}

impl FingerprintSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprints(&self) -> Vec<FrameFingerprint> {
        self.prints.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl FrameSink for FingerprintSink {
    fn accept(&mut self, frame: Frame) -> ChoreoResult<()> {
        let fp = fingerprint_frame(&frame);
        self.prints
            .lock()
            .map_err(|_| ChoreoError::render("fingerprint sink lock poisoned"))?
            .push(fp);
        Ok(())
    }
}

/// Rasterizes frames as they arrive and forwards the pixels to a writer.
pub struct RasterSink<B, W> {
    backend: B,
    writer: W,
    frames: u64,
}

impl<B: RasterBackend, W: FrameWriter> RasterSink<B, W> {
    pub fn new(backend: B, writer: W) -> Self {
        Self {
            backend,
            writer,
            frames: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn into_parts(self) -> (B, W) {
        (self.backend, self.writer)
    }
}

impl<B: RasterBackend, W: FrameWriter> FrameSink for RasterSink<B, W> {
    fn accept(&mut self, frame: Frame) -> ChoreoResult<()> {
        let rgba = self.backend.render_frame(&frame)?;
        self.writer.write_frame(&rgba)?;
        self.frames += 1;
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(frames = self.frames))]
    fn finish(&mut self) -> ChoreoResult<()> {
        self.writer.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sink.rs"]
mod tests;
