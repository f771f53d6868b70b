use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::color::Color;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::render::backend::FrameRGBA;
use crate::render::sink::FrameWriter;

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
pub struct PngSequenceWriter {
    dir: PathBuf,
    next: u64,
    background: Color,
    scratch: Vec<u8>,
}

impl PngSequenceWriter {
    pub fn new(dir: impl Into<PathBuf>, background: Color) -> ChoreoResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create frame directory '{}'", dir.display()))?;
        Ok(Self {
            dir,
            next: 0,
            background,
            scratch: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> u64 {
        self.next
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl FrameWriter for PngSequenceWriter {
    fn write_frame(&mut self, frame: &FrameRGBA) -> ChoreoResult<()> {
        frame.flatten_onto(self.background, &mut self.scratch)?;
        let img = image::RgbaImage::from_raw(frame.width, frame.height, std::mem::take(&mut self.scratch))
            .ok_or_else(|| ChoreoError::render("frame buffer does not match its size"))?;
        let path = self.frame_path(self.next);
        img.save(&path)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        self.scratch = img.into_raw();
        self.next += 1;
        Ok(())
    }

    fn finish(&mut self) -> ChoreoResult<()> {
        tracing::info!(frames = self.next, dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
