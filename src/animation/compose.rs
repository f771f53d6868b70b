//! Timing of composed animations.
//!
//! A segment is a tree of [`Schedule`]s. Leaves point at materialized effects; groups place
//! their children on a local clock. Child `i + 1` starts once child `i` has covered
//! `lag_ratio` of its duration, so equal durations `D` give starts `i · lag_ratio · D` and a
//! span of `(1 + (n - 1) · lag_ratio) · D`.

use crate::animation::anim::{AnimKind, Animation, DEFAULT_RUN_TIME};
use crate::animation::ease::Ease;
use crate::scene::graph::SceneGraph;

/// Glyph count from which `Write` defaults to a longer run.
const WRITE_LONG_THRESHOLD: usize = 15;

#[derive(Clone, Debug, PartialEq)]
pub enum Schedule {
    Leaf { effect: usize, ease: Ease },
    Group { slots: Vec<Slot>, span: f64, ease: Ease },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub start: f64,
    pub duration: f64,
    pub schedule: Schedule,
}

impl Slot {
    fn alpha_at(&self, tau: f64) -> f64 {
        if self.duration <= 0.0 {
            return if tau >= self.start { 1.0 } else { 0.0 };
        }
        ((tau - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl Schedule {
    /// Visit every leaf with its eased alpha for the local alpha `alpha`.
    pub fn eval(&self, alpha: f64, visit: &mut impl FnMut(usize, f64)) {
        match self {
            Self::Leaf { effect, ease } => visit(*effect, ease.apply(alpha)),
            Self::Group { slots, span, ease } => {
                let tau = ease.apply(alpha) * span;
                for slot in slots {
                    slot.schedule.eval(slot.alpha_at(tau), visit);
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Group { slots, .. } => slots.iter().map(|s| s.schedule.leaf_count()).sum(),
        }
    }
}

/// Start offsets and total span for children of the given durations.
pub fn lagged_starts(durations: &[f64], lag_ratio: f64) -> (Vec<f64>, f64) {
    let mut starts = Vec::with_capacity(durations.len());
    let mut next = 0.0;
    let mut span: f64 = 0.0;
    for d in durations {
        starts.push(next);
        span = span.max(next + d);
        next += lag_ratio * d;
    }
    (starts, span)
}

/// Duration an animation runs for when nothing overrides it.
pub fn natural_duration(anim: &Animation, graph: &SceneGraph) -> f64 {
    if let Some(rt) = anim.run_time {
        return rt;
    }
    match &anim.kind {
        AnimKind::Group(children) => {
            let durations: Vec<f64> = children.iter().map(|c| natural_duration(c, graph)).collect();
            lagged_starts(&durations, anim.lag_ratio.unwrap_or(0.0)).1
        }
        AnimKind::Write(target) => {
            let glyphs: usize = target.iter().map(|r| graph.leaves(r).len()).sum();
            if glyphs < WRITE_LONG_THRESHOLD {
                DEFAULT_RUN_TIME
            } else {
                2.0 * DEFAULT_RUN_TIME
            }
        }
        _ => DEFAULT_RUN_TIME,
    }
}

/// Fold tweens that share a target into the first one, in declaration order.
///
/// The merged tween keeps the first tween's timing.
pub fn merge_tweens(anims: Vec<Animation>) -> Vec<Animation> {
    let mut out: Vec<Animation> = Vec::with_capacity(anims.len());
    for anim in anims {
        if let AnimKind::Tween(t) = &anim.kind
            && let Some(prev) = out.iter_mut().find_map(|a| match &mut a.kind {
                AnimKind::Tween(p) if p.target == t.target => Some(p),
                _ => None,
            })
        {
            prev.ops.extend(t.ops.iter().cloned());
            continue;
        }
        out.push(anim);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/animation/compose.rs"]
mod tests;
