//! Declarative animations.
//!
//! An [`Animation`] only names its targets and parameters. Start and end snapshots are taken
//! when `Scene::play` begins the segment, never at construction time.

use crate::animation::ease::Ease;
use crate::animation::tween::{CameraTween, TrackerTween, Tween};
use crate::foundation::color::{Color, palette};
use crate::foundation::core::SMALL_BUFF;
use crate::foundation::math::Vec3;
use crate::scene::graph::{NodeId, NodeMut, Selection};

pub const DEFAULT_RUN_TIME: f64 = 1.0;
/// Lag between consecutive starts for `LaggedStart` when none is given.
pub const DEFAULT_LAGGED_START_LAG_RATIO: f64 = 0.05;

/// Client mutation driven by the eased alpha.
pub type AlphaFn = Box<dyn FnMut(&mut NodeMut<'_>, f64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformMode {
    /// `source` morphs into a copy of `target`'s appearance.
    Plain,
    /// `source` morphs, then `target` takes its place in the graph.
    Replacement,
    /// A copy of `source` morphs; `source` is untouched.
    FromCopy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashParams {
    pub point: Vec3,
    pub color: Color,
    pub flash_radius: f64,
    pub line_length: f64,
    pub num_lines: usize,
    pub stroke_width: f64,
}

impl Default for FlashParams {
    fn default() -> Self {
        Self {
            point: Vec3::ZERO,
            color: palette::YELLOW,
            flash_radius: 0.3,
            line_length: 0.2,
            num_lines: 12,
            stroke_width: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlashAroundParams {
    pub color: Color,
    pub stroke_width: f64,
    /// Fraction of the outline lit at once.
    pub time_width: f64,
    pub buff: f64,
}

impl Default for FlashAroundParams {
    fn default() -> Self {
        Self {
            color: palette::YELLOW,
            stroke_width: 4.0,
            time_width: 1.0,
            buff: SMALL_BUFF,
        }
    }
}

pub enum AnimKind {
    Tween(Tween),
    Camera(CameraTween),
    Tracker(TrackerTween),
    Transform {
        source: Selection,
        target: Selection,
        mode: TransformMode,
    },
    FadeIn {
        target: Selection,
        shift: Vec3,
    },
    FadeOut {
        target: Selection,
        shift: Vec3,
    },
    Create(Selection),
    Uncreate(Selection),
    Write(Selection),
    /// `point = None` grows from the family's center.
    Grow {
        target: Selection,
        point: Option<Vec3>,
    },
    GrowArrow(NodeId),
    Indicate {
        target: Selection,
        color: Color,
        scale: f64,
    },
    MoveAlongPath {
        target: Selection,
        path: NodeId,
    },
    Flash(FlashParams),
    FlashAround {
        target: Selection,
        params: FlashAroundParams,
    },
    UpdateFromAlphaFunc {
        target: Selection,
        f: AlphaFn,
    },
    /// Holds the timeline without touching anything.
    Pause,
    Group(Vec<Animation>),
}

impl std::fmt::Debug for AnimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tween(t) => f.debug_tuple("Tween").field(t).finish(),
            Self::Camera(t) => f.debug_tuple("Camera").field(t).finish(),
            Self::Tracker(t) => f.debug_tuple("Tracker").field(t).finish(),
            Self::Transform {
                source,
                target,
                mode,
            } => f
                .debug_struct("Transform")
                .field("source", source)
                .field("target", target)
                .field("mode", mode)
                .finish(),
            Self::FadeIn { target, shift } => f
                .debug_struct("FadeIn")
                .field("target", target)
                .field("shift", shift)
                .finish(),
            Self::FadeOut { target, shift } => f
                .debug_struct("FadeOut")
                .field("target", target)
                .field("shift", shift)
                .finish(),
            Self::Create(s) => f.debug_tuple("Create").field(s).finish(),
            Self::Uncreate(s) => f.debug_tuple("Uncreate").field(s).finish(),
            Self::Write(s) => f.debug_tuple("Write").field(s).finish(),
            Self::Grow { target, point } => f
                .debug_struct("Grow")
                .field("target", target)
                .field("point", point)
                .finish(),
            Self::GrowArrow(id) => f.debug_tuple("GrowArrow").field(id).finish(),
            Self::Indicate {
                target,
                color,
                scale,
            } => f
                .debug_struct("Indicate")
                .field("target", target)
                .field("color", color)
                .field("scale", scale)
                .finish(),
            Self::MoveAlongPath { target, path } => f
                .debug_struct("MoveAlongPath")
                .field("target", target)
                .field("path", path)
                .finish(),
            Self::Flash(p) => f.debug_tuple("Flash").field(p).finish(),
            Self::FlashAround { target, params } => f
                .debug_struct("FlashAround")
                .field("target", target)
                .field("params", params)
                .finish(),
            Self::UpdateFromAlphaFunc { target, .. } => f
                .debug_struct("UpdateFromAlphaFunc")
                .field("target", target)
                .finish_non_exhaustive(),
            Self::Pause => f.write_str("Pause"),
            Self::Group(children) => f.debug_tuple("Group").field(children).finish(),
        }
    }
}

/// One declared animation with its timing overrides.
#[derive(Debug)]
pub struct Animation {
    pub kind: AnimKind,
    pub run_time: Option<f64>,
    pub ease: Option<Ease>,
    pub lag_ratio: Option<f64>,
}

impl Animation {
    pub fn new(kind: AnimKind) -> Self {
        Self {
            kind,
            run_time: None,
            ease: None,
            lag_ratio: None,
        }
    }

    pub fn run_time(mut self, seconds: f64) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn lag_ratio(mut self, ratio: f64) -> Self {
        self.lag_ratio = Some(ratio);
        self
    }

    pub fn transform(source: impl Into<Selection>, target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Transform {
            source: source.into(),
            target: target.into(),
            mode: TransformMode::Plain,
        })
    }

    pub fn replacement_transform(source: impl Into<Selection>, target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Transform {
            source: source.into(),
            target: target.into(),
            mode: TransformMode::Replacement,
        })
    }

    pub fn transform_from_copy(source: impl Into<Selection>, target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Transform {
            source: source.into(),
            target: target.into(),
            mode: TransformMode::FromCopy,
        })
    }

    pub fn fade_in(target: impl Into<Selection>) -> Self {
        Self::fade_in_shift(target, Vec3::ZERO)
    }

    /// Fade in while arriving from `-shift` away.
    pub fn fade_in_shift(target: impl Into<Selection>, shift: Vec3) -> Self {
        Self::new(AnimKind::FadeIn {
            target: target.into(),
            shift,
        })
    }

    pub fn fade_out(target: impl Into<Selection>) -> Self {
        Self::fade_out_shift(target, Vec3::ZERO)
    }

    pub fn fade_out_shift(target: impl Into<Selection>, shift: Vec3) -> Self {
        Self::new(AnimKind::FadeOut {
            target: target.into(),
            shift,
        })
    }

    pub fn create(target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Create(target.into()))
    }

    pub fn uncreate(target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Uncreate(target.into()))
    }

    pub fn write(target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Write(target.into()))
    }

    pub fn grow_from_center(target: impl Into<Selection>) -> Self {
        Self::new(AnimKind::Grow {
            target: target.into(),
            point: None,
        })
    }

    pub fn grow_from_point(target: impl Into<Selection>, point: Vec3) -> Self {
        Self::new(AnimKind::Grow {
            target: target.into(),
            point: Some(point),
        })
    }

    pub fn grow_arrow(arrow: NodeId) -> Self {
        Self::new(AnimKind::GrowArrow(arrow))
    }

    pub fn indicate(target: impl Into<Selection>) -> Self {
        Self::indicate_with(target, palette::YELLOW, 1.2)
    }

    pub fn indicate_with(target: impl Into<Selection>, color: Color, scale: f64) -> Self {
        Self::new(AnimKind::Indicate {
            target: target.into(),
            color,
            scale,
        })
    }

    pub fn move_along_path(target: impl Into<Selection>, path: NodeId) -> Self {
        Self::new(AnimKind::MoveAlongPath {
            target: target.into(),
            path,
        })
    }

    pub fn flash(point: Vec3, color: Color) -> Self {
        Self::flash_with(FlashParams {
            point,
            color,
            ..FlashParams::default()
        })
    }

    pub fn flash_with(params: FlashParams) -> Self {
        Self::new(AnimKind::Flash(params))
    }

    pub fn flash_around(target: impl Into<Selection>) -> Self {
        Self::flash_around_with(target, FlashAroundParams::default())
    }

    pub fn flash_around_with(target: impl Into<Selection>, params: FlashAroundParams) -> Self {
        Self::new(AnimKind::FlashAround {
            target: target.into(),
            params,
        })
    }

    pub fn update_from_alpha_func(
        target: impl Into<Selection>,
        f: impl FnMut(&mut NodeMut<'_>, f64) + 'static,
    ) -> Self {
        Self::new(AnimKind::UpdateFromAlphaFunc {
            target: target.into(),
            f: Box::new(f),
        })
    }

    pub fn pause(seconds: f64) -> Self {
        Self::new(AnimKind::Pause).run_time(seconds)
    }

    /// Children start together.
    pub fn group(anims: impl IntoIterator<Item = Animation>) -> Self {
        Self::new(AnimKind::Group(anims.into_iter().collect())).lag_ratio(0.0)
    }

    /// Child `i` starts once child `i - 1` has covered `lag_ratio` of its duration.
    pub fn lagged_start(anims: impl IntoIterator<Item = Animation>, lag_ratio: f64) -> Self {
        Self::new(AnimKind::Group(anims.into_iter().collect())).lag_ratio(lag_ratio)
    }

    /// `lagged_start` over one animation per member of `group`.
    pub fn lagged_start_map(
        ctor: impl Fn(NodeId) -> Animation,
        group: impl Into<Selection>,
        lag_ratio: f64,
    ) -> Self {
        Self::lagged_start(group.into().iter().map(ctor), lag_ratio)
    }

    /// Children run one after another.
    pub fn succession(anims: impl IntoIterator<Item = Animation>) -> Self {
        Self::lagged_start(anims, 1.0)
    }

    pub fn default_ease(&self) -> Ease {
        match &self.kind {
            AnimKind::Indicate { .. } => Ease::ThereAndBack,
            AnimKind::Group(_) | AnimKind::Pause | AnimKind::Tracker(_) => Ease::Linear,
            AnimKind::FlashAround { .. } => Ease::Linear,
            _ => Ease::Smooth,
        }
    }

    pub fn effective_ease(&self) -> Ease {
        self.ease.unwrap_or_else(|| self.default_ease())
    }

    /// Node ids this animation reads or writes.
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        match &self.kind {
            AnimKind::Tween(t) => {
                let mut ids = t.target.0.clone();
                ids.extend(t.ops.iter().flat_map(|op| op.references()));
                ids
            }
            AnimKind::Camera(_) | AnimKind::Tracker(_) | AnimKind::Flash(_) | AnimKind::Pause => {
                Vec::new()
            }
            AnimKind::Transform { source, target, .. } => {
                source.0.iter().chain(&target.0).copied().collect()
            }
            AnimKind::FadeIn { target, .. }
            | AnimKind::FadeOut { target, .. }
            | AnimKind::Create(target)
            | AnimKind::Uncreate(target)
            | AnimKind::Write(target)
            | AnimKind::Grow { target, .. }
            | AnimKind::Indicate { target, .. }
            | AnimKind::FlashAround { target, .. }
            | AnimKind::UpdateFromAlphaFunc { target, .. } => target.0.clone(),
            AnimKind::GrowArrow(id) => vec![*id],
            AnimKind::MoveAlongPath { target, path } => {
                let mut ids = target.0.clone();
                ids.push(*path);
                ids
            }
            AnimKind::Group(children) => children.iter().flat_map(|c| c.referenced_nodes()).collect(),
        }
    }
}

impl From<Tween> for Animation {
    fn from(t: Tween) -> Self {
        let (run_time, ease) = (t.run_time, t.ease);
        Self {
            run_time,
            ease,
            ..Self::new(AnimKind::Tween(t))
        }
    }
}

impl From<CameraTween> for Animation {
    fn from(t: CameraTween) -> Self {
        let (run_time, ease) = (t.run_time, t.ease);
        Self {
            run_time,
            ease,
            ..Self::new(AnimKind::Camera(t))
        }
    }
}

impl From<TrackerTween> for Animation {
    fn from(t: TrackerTween) -> Self {
        let (run_time, ease) = (t.run_time, t.ease);
        Self {
            run_time,
            ease,
            ..Self::new(AnimKind::Tracker(t))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
