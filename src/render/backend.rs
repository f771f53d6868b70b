use crate::foundation::color::Color;
use crate::foundation::core::SceneConfig;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::display::Frame;

/// Rendered pixels of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Composite the frame over an opaque `background` into straight RGBA8 with alpha 255.
    pub fn flatten_onto(&self, background: Color, out: &mut Vec<u8>) -> ChoreoResult<()> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.data.len() != expected {
            return Err(ChoreoError::render(format!(
                "{}x{} frame carries {} bytes, expected {expected}",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        let [bg_r, bg_g, bg_b, _] = background.to_rgba8().map(u16::from);
        out.clear();
        out.reserve(expected);
        for px in self.data.chunks_exact(4) {
            let a = u16::from(px[3]);
            if a == 255 {
                out.extend_from_slice(px);
                continue;
            }
            let over = |c: u8, bg: u16| {
                let c = if self.premultiplied {
                    u16::from(c)
                } else {
                    mul_div255_u16(u16::from(c), a)
                };
                (c + mul_div255_u16(bg, 255 - a)).min(255) as u8
            };
            out.extend([over(px[0], bg_r), over(px[1], bg_g), over(px[2], bg_b), 255]);
        }
        Ok(())
    }
}

/// Pixel size and world-to-pixel mapping for a rasterizer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Visible frame extent in world units.
    pub frame_width: f64,
    pub frame_height: f64,
    /// Overrides the frame background when set.
    pub clear_rgba: Option<[u8; 4]>,
}

impl RenderSettings {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            pixel_width: config.pixel_width,
            pixel_height: config.pixel_height,
            frame_width: config.frame_width,
            frame_height: config.frame_height,
            clear_rgba: None,
        }
    }

    /// Pixels per world unit along x.
    pub fn pixels_per_unit(&self) -> f64 {
        f64::from(self.pixel_width) / self.frame_width
    }

    /// Frame coordinates (origin centered, +y up) to pixel coordinates (origin top-left).
    pub fn to_pixels(&self) -> kurbo::Affine {
        let sx = f64::from(self.pixel_width) / self.frame_width;
        let sy = f64::from(self.pixel_height) / self.frame_height;
        kurbo::Affine::new([
            sx,
            0.0,
            0.0,
            -sy,
            f64::from(self.pixel_width) / 2.0,
            f64::from(self.pixel_height) / 2.0,
        ])
    }
}

/// Turns display lists into pixels.
pub trait RasterBackend {
    fn render_frame(&mut self, frame: &Frame) -> ChoreoResult<FrameRGBA>;

    /// Settings for spawning identical per-thread backends, when supported.
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
