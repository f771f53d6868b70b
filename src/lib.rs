//! Deterministic scene choreography.
//!
//! A [`Scene`] owns a tree of graphic objects, a camera, value trackers and per-frame
//! updaters. `play` and `wait` advance a virtual clock at a fixed frame rate and hand one
//! display list per frame to a [`FrameSink`]. Display lists can be recorded, fingerprinted,
//! or rasterized with [`CpuBackend`] and written as PNG frames or MP4.
//!
//! ```no_run
//! use choreo::{Animation, Mobject, Scene, SceneConfig, animate, palette, RIGHT};
//!
//! # fn main() -> choreo::ChoreoResult<()> {
//! let mut scene = Scene::new(SceneConfig::default())?;
//! let circle = scene.spawn(Mobject::circle(1.0).with_fill(palette::BLUE, 0.5));
//! scene.play([Animation::create(circle)])?;
//! scene.play([animate(circle).shift(RIGHT * 2.0).set_color(palette::RED)])?;
//! scene.wait(1.0)?;
//! scene.finish()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod animation;
mod assets;
mod encode;
mod foundation;
mod mobject;
mod render;
mod scene;
mod script;

pub use animation::anim::{
    AlphaFn, AnimKind, Animation, DEFAULT_LAGGED_START_LAG_RATIO, DEFAULT_RUN_TIME,
    FlashAroundParams, FlashParams, TransformMode,
};
pub use animation::compose::{Schedule, Slot, lagged_starts, merge_tweens, natural_duration};
pub use animation::ease::{Ease, smooth};
pub use animation::tween::{
    CameraTween, TrackerOp, TrackerTween, Tween, animate, animate_camera, animate_tracker,
};
pub use assets::decode::{SvgShape, decode_image, parse_svg, svg_shapes};
pub use assets::image::{FsImageLoader, ImageHandle, ImageLoader, MemoryImageLoader, PreparedImage};
pub use assets::typeset::{
    BlockTypesetter, FontWeight, Glyph, GlyphCache, GlyphRun, SvgTypesetter, TextMode,
    TypesetRequest, Typesetter,
};
pub use encode::ffmpeg::{DEFAULT_CRF, FfmpegEncoder, VideoSettings, is_ffmpeg_on_path};
pub use encode::png::PngSequenceWriter;
pub use foundation::color::{Color, palette};
pub use foundation::core::{
    DEFAULT_FONT_SIZE, DEFAULT_STROKE_WIDTH, FRAME_HEIGHT, FRAME_WIDTH, FrameDims, FrameIndex,
    LARGE_BUFF, MED_LARGE_BUFF, MED_SMALL_BUFF, SMALL_BUFF, SceneConfig,
};
pub use foundation::error::{ChoreoError, ChoreoResult};
pub use foundation::math::{
    Affine3, Bounds, DL, DOWN, DR, IN, LEFT, Mat3, ORIGIN, OUT, Quat, RIGHT, UL, UP, UR, Vec3,
    lerp_f64,
};
pub use mobject::axes::AxesConfig;
pub use mobject::builder::{DEFAULT_DOT_RADIUS, Mobject};
pub use mobject::geometry::{Cubic, Geometry, ImageGeom, Subpath, VectorPath};
pub use mobject::matrix::{MATRIX_H_BUFF, MATRIX_V_BUFF, matrix_layout};
pub use mobject::shapes::ArrowStyle;
pub use mobject::style::{ObjectKind, Style, StyleEdit};
pub use render::backend::{FrameRGBA, RasterBackend, RenderSettings};
pub use render::cpu::CpuBackend;
pub use render::display::{DisplayItem, Frame, emit};
pub use render::fingerprint::{FrameFingerprint, fingerprint_frame};
pub use render::pipeline::{RenderStats, RenderThreading, render_frames, render_frames_with_stats};
pub use render::sink::{FingerprintSink, FrameRecorder, FrameSink, FrameWriter, NullSink, RasterSink};
pub use scene::camera::{Camera, CameraOp, CameraState};
pub use scene::family::{LeafSnapshot, NodeState, interpolate_transform, world_leaves};
pub use scene::graph::{Node, NodeId, NodeMut, NodeRef, SceneGraph, Selection};
pub use scene::interpreter::{AxesHandle, MatrixHandle, Scene, SegmentReport};
pub use scene::ops::MobjectOp;
pub use scene::tracker::{TrackerId, TrackerStore};
pub use scene::updater::{UpdateContext, UpdaterFn, UpdaterId, UpdaterRegistry};
pub use script::model::{
    AnimDecl, AnimSpec, CameraEditSpec, Command, EditSpec, ObjectDecl, SceneFile, SceneScript,
    ShapeSpec, TargetRef, UpdaterSpec,
};
pub use script::run::{ScriptRun, run_script};
