use crate::foundation::color::{Color, palette};
use crate::foundation::error::{ChoreoError, ChoreoResult};

pub const FRAME_HEIGHT: f64 = 8.0;
pub const FRAME_WIDTH: f64 = FRAME_HEIGHT * 16.0 / 9.0;

pub const SMALL_BUFF: f64 = 0.1;
pub const MED_SMALL_BUFF: f64 = 0.25;
pub const MED_LARGE_BUFF: f64 = 0.5;
pub const LARGE_BUFF: f64 = 1.0;

pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;
pub const DEFAULT_FONT_SIZE: f64 = 48.0;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half extents of the visible frame in world units, used by edge/corner placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDims {
    pub half_width: f64,
    pub half_height: f64,
}

impl Default for FrameDims {
    fn default() -> Self {
        Self {
            half_width: FRAME_WIDTH / 2.0,
            half_height: FRAME_HEIGHT / 2.0,
        }
    }
}

/// Scene-wide settings. Every field has a default so partial JSON blocks work.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub fps: u32,
    pub frame_width: f64,
    pub frame_height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub background: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            pixel_width: 1920,
            pixel_height: 1080,
            background: palette::BLACK,
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.fps == 0 {
            return Err(ChoreoError::validation("scene fps must be non-zero"));
        }
        if !(self.frame_width > 0.0 && self.frame_height > 0.0) {
            return Err(ChoreoError::validation(
                "scene frame width/height must be positive",
            ));
        }
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(ChoreoError::validation(
                "scene pixel width/height must be non-zero",
            ));
        }
        Ok(())
    }

    /// Apply `CHOREO_FPS` when set to a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(fps) = std::env::var("CHOREO_FPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.fps = fps;
        }
        self
    }

    pub fn frame_dims(&self) -> FrameDims {
        FrameDims {
            half_width: self.frame_width / 2.0,
            half_height: self.frame_height / 2.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
