//! `.animate` builders.
//!
//! A tween records an ordered list of mutator calls. When played, the calls are replayed on
//! the live target to derive the end state, which is then interpolated from the start state.

use crate::animation::ease::Ease;
use crate::foundation::color::Color;
use crate::foundation::math::{OUT, Vec3};
use crate::mobject::style::StyleEdit;
use crate::scene::camera::CameraOp;
use crate::scene::graph::{NodeId, Selection};
use crate::scene::ops::MobjectOp;
use crate::scene::tracker::TrackerId;

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub target: Selection,
    pub ops: Vec<MobjectOp>,
    pub run_time: Option<f64>,
    pub ease: Option<Ease>,
}

/// Start recording mutations of `target`.
pub fn animate(target: impl Into<Selection>) -> Tween {
    Tween {
        target: target.into(),
        ops: Vec::new(),
        run_time: None,
        ease: None,
    }
}

impl Tween {
    pub fn op(mut self, op: MobjectOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn run_time(mut self, seconds: f64) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn shift(self, by: Vec3) -> Self {
        self.op(MobjectOp::Shift(by))
    }

    pub fn move_to(self, point: Vec3) -> Self {
        self.op(MobjectOp::MoveTo(point))
    }

    pub fn scale(self, factor: f64) -> Self {
        self.op(MobjectOp::Scale {
            factor,
            about: None,
        })
    }

    pub fn scale_about(self, factor: f64, about: Vec3) -> Self {
        self.op(MobjectOp::Scale {
            factor,
            about: Some(about),
        })
    }

    pub fn rotate(self, angle: f64) -> Self {
        self.op(MobjectOp::Rotate {
            angle,
            axis: OUT,
            about: None,
        })
    }

    pub fn rotate_about(self, angle: f64, axis: Vec3, about: Vec3) -> Self {
        self.op(MobjectOp::Rotate {
            angle,
            axis,
            about: Some(about),
        })
    }

    pub fn set_width(self, width: f64) -> Self {
        self.op(MobjectOp::SetWidth(width))
    }

    pub fn set_height(self, height: f64) -> Self {
        self.op(MobjectOp::SetHeight(height))
    }

    pub fn set_color(self, color: Color) -> Self {
        self.op(MobjectOp::Style(StyleEdit::color(color)))
    }

    pub fn set_fill(self, color: Color, opacity: f64) -> Self {
        self.op(MobjectOp::Style(StyleEdit::fill(Some(color), Some(opacity))))
    }

    pub fn set_stroke(self, color: Color, width: f64, opacity: f64) -> Self {
        self.op(MobjectOp::Style(StyleEdit::stroke(
            Some(color),
            Some(width),
            Some(opacity),
        )))
    }

    pub fn set_opacity(self, opacity: f64) -> Self {
        self.op(MobjectOp::Style(StyleEdit::opacity(opacity)))
    }

    pub fn next_to(self, other: impl Into<Selection>, direction: Vec3, buff: f64) -> Self {
        self.op(MobjectOp::NextTo {
            target: other.into(),
            direction,
            buff,
        })
    }

    pub fn align_to(self, other: impl Into<Selection>, direction: Vec3) -> Self {
        self.op(MobjectOp::AlignTo {
            target: other.into(),
            direction,
        })
    }

    pub fn to_edge(self, edge: Vec3, buff: f64) -> Self {
        self.op(MobjectOp::ToEdge { edge, buff })
    }

    pub fn to_corner(self, corner: Vec3, buff: f64) -> Self {
        self.op(MobjectOp::ToEdge { edge: corner, buff })
    }

    /// Morph into `other`'s current appearance.
    pub fn become_(self, other: NodeId) -> Self {
        self.op(MobjectOp::Become(other))
    }

    /// Morph back to the last `save_state`.
    pub fn restore(self) -> Self {
        self.op(MobjectOp::Restore)
    }

    pub fn set_points_as_corners(self, points: &[Vec3]) -> Self {
        self.op(MobjectOp::SetPoints {
            points: points.to_vec(),
            smooth: false,
        })
    }

    pub fn set_points_smoothly(self, points: &[Vec3]) -> Self {
        self.op(MobjectOp::SetPoints {
            points: points.to_vec(),
            smooth: true,
        })
    }

    pub(crate) fn needs_bake(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, MobjectOp::Become(_)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraTween {
    pub ops: Vec<CameraOp>,
    pub run_time: Option<f64>,
    pub ease: Option<Ease>,
}

pub fn animate_camera() -> CameraTween {
    CameraTween::default()
}

impl CameraTween {
    pub fn op(mut self, op: CameraOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn run_time(mut self, seconds: f64) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn scale(self, factor: f64) -> Self {
        self.op(CameraOp::Scale(factor))
    }

    pub fn shift(self, by: Vec3) -> Self {
        self.op(CameraOp::Shift(by))
    }

    pub fn move_to(self, point: Vec3) -> Self {
        self.op(CameraOp::MoveTo(point))
    }

    pub fn rotate(self, angle: f64, axis: Vec3) -> Self {
        self.op(CameraOp::Rotate { angle, axis })
    }

    pub fn set_width(self, width: f64) -> Self {
        self.op(CameraOp::SetWidth(width))
    }

    pub fn set_height(self, height: f64) -> Self {
        self.op(CameraOp::SetHeight(height))
    }

    pub fn restore(self) -> Self {
        self.op(CameraOp::Restore)
    }

    pub(crate) fn restores(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, CameraOp::Restore)).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrackerOp {
    Set(f64),
    Increment(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackerTween {
    pub tracker: TrackerId,
    pub ops: Vec<TrackerOp>,
    pub run_time: Option<f64>,
    pub ease: Option<Ease>,
}

pub fn animate_tracker(tracker: TrackerId) -> TrackerTween {
    TrackerTween {
        tracker,
        ops: Vec::new(),
        run_time: None,
        ease: None,
    }
}

impl TrackerTween {
    pub fn set_value(mut self, value: f64) -> Self {
        self.ops.push(TrackerOp::Set(value));
        self
    }

    pub fn increment_value(mut self, delta: f64) -> Self {
        self.ops.push(TrackerOp::Increment(delta));
        self
    }

    pub fn run_time(mut self, seconds: f64) -> Self {
        self.run_time = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Value reached after replaying the recorded ops from `start`.
    pub fn end_value(&self, start: f64) -> f64 {
        self.ops.iter().fold(start, |v, op| match op {
            TrackerOp::Set(x) => *x,
            TrackerOp::Increment(d) => v + d,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
