//! H.264 MP4 output through a system `ffmpeg` reading raw RGBA frames on stdin.

use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::foundation::color::Color;
use crate::foundation::core::SceneConfig;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::render::backend::FrameRGBA;
use crate::render::sink::FrameWriter;

/// x264 quality used when the caller does not pick one.
pub const DEFAULT_CRF: u8 = 18;

/// Stream parameters handed to ffmpeg.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Shows through transparent pixels; MP4 has no alpha.
    pub background: Color,
    /// x264 constant rate factor, lower is better.
    pub crf: u8,
}

impl VideoSettings {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            width: config.pixel_width,
            height: config.pixel_height,
            fps: config.fps,
            background: config.background,
            crf: DEFAULT_CRF,
        }
    }

    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf.min(51);
        self
    }

    /// Command line for writing to `out`. Odd sizes are padded by one pixel for yuv420p.
    pub fn ffmpeg_args(&self, out: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push("-video_size".into());
        args.push(format!("{}x{}", self.width, self.height).into());
        args.push("-framerate".into());
        args.push(self.fps.to_string().into());
        args.extend(["-i", "pipe:0", "-an", "-c:v", "libx264"].map(OsString::from));
        args.push("-crf".into());
        args.push(self.crf.to_string().into());
        if self.width % 2 == 1 || self.height % 2 == 1 {
            args.push("-vf".into());
            args.push("pad=ceil(iw/2)*2:ceil(ih/2)*2".into());
        }
        args.extend(["-pix_fmt", "yuv420p", "-movflags", "+faststart"].map(OsString::from));
        args.push(out.into());
        args
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

struct Pipe {
    child: Child,
    stdin: ChildStdin,
}

/// Streams flattened frames into a running ffmpeg process.
pub struct FfmpegEncoder {
    out: PathBuf,
    settings: VideoSettings,
    pipe: Option<Pipe>,
    frames: u64,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    #[tracing::instrument(skip_all, fields(out = %out.as_ref().display(), fps = settings.fps))]
    pub fn create(out: impl AsRef<Path>, settings: VideoSettings) -> ChoreoResult<Self> {
        let out = out.as_ref().to_path_buf();
        if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        }
        let mut child = Command::new("ffmpeg")
            .args(settings.ffmpeg_args(&out))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ChoreoError::render(format!("could not start ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ChoreoError::render("ffmpeg stdin was not captured"))?;
        Ok(Self {
            out,
            settings,
            pipe: Some(Pipe { child, stdin }),
            frames: 0,
            scratch: Vec::new(),
        })
    }

    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

impl FrameWriter for FfmpegEncoder {
    fn write_frame(&mut self, frame: &FrameRGBA) -> ChoreoResult<()> {
        let (w, h) = (self.settings.width, self.settings.height);
        if (frame.width, frame.height) != (w, h) {
            return Err(ChoreoError::render(format!(
                "{}x{} frame sent to a {w}x{h} video",
                frame.width, frame.height
            )));
        }
        let pipe = self
            .pipe
            .as_mut()
            .ok_or_else(|| ChoreoError::render("video is already finished"))?;
        frame.flatten_onto(self.settings.background, &mut self.scratch)?;
        pipe.stdin
            .write_all(&self.scratch)
            .map_err(|e| ChoreoError::render(format!("ffmpeg stopped reading frames: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    /// Close stdin and wait for ffmpeg. Later calls do nothing.
    fn finish(&mut self) -> ChoreoResult<()> {
        let Some(Pipe { child, stdin }) = self.pipe.take() else {
            return Ok(());
        };
        drop(stdin);
        let output = child
            .wait_with_output()
            .map_err(|e| ChoreoError::render(format!("lost track of ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(ChoreoError::render(format!(
                "ffmpeg failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::info!(frames = self.frames, out = %self.out.display(), "mp4 written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
