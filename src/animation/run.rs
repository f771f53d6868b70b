//! Materialized animations.
//!
//! `begin` snapshots the live scene when a segment starts and turns each declared
//! [`Animation`] into an [`Effect`]. Every `begin` leaves the graph as it found it (nodes it
//! creates excepted), so all animations of one segment start from the same snapshot. The
//! first tick then applies alpha 0.

use crate::animation::anim::{AlphaFn, AnimKind, Animation, FlashParams, TransformMode};
use crate::animation::compose::{Schedule, Slot, lagged_starts, natural_duration};
use crate::animation::ease::Ease;
use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Bounds, Vec3, lerp_f64};
use crate::mobject::builder::Mobject;
use crate::mobject::geometry::{Geometry, VectorPath};
use crate::mobject::style::{Style, StyleEdit};
use crate::scene::camera::{Camera, CameraState};
use crate::scene::family::{NodeState, NodeTrack, derive_tracks};
use crate::scene::graph::{NodeId, SceneGraph, Selection};
use crate::scene::morph;
use crate::scene::ops::{self, MobjectOp};
use crate::scene::tracker::{TrackerId, TrackerStore};

/// Mutable scene state an effect may touch.
pub(crate) struct Stage<'a> {
    pub graph: &'a mut SceneGraph,
    pub camera: &'a mut Camera,
    pub trackers: &'a mut TrackerStore,
}

/// Stroke width given to fill-only glyphs while `Write` draws their outline.
const WRITE_OUTLINE_WIDTH: f64 = 2.0;
const CREATE_LAG_RATIO: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PartialMode {
    Create,
    Uncreate,
    Write,
    CreationThenDestruction,
    PassingFlash { time_width: f64 },
}

#[derive(Clone, Debug)]
pub(crate) struct PartialLeaf {
    id: NodeId,
    geometry: Geometry,
    style: Style,
}

#[derive(Clone, Debug)]
pub(crate) enum Finish {
    Keep,
    /// Detach `roots`, then put `restore` back so a later re-add shows the original.
    Remove {
        roots: Vec<NodeId>,
        restore: Vec<(NodeId, NodeState)>,
    },
    /// Pairwise slot swap; surplus `old` roots leave, surplus `new` roots join the last slot's parent.
    Replace {
        old: Vec<NodeId>,
        new: Vec<NodeId>,
    },
    /// Detach `roots` and free their slots.
    Discard { roots: Vec<NodeId> },
}

pub(crate) enum Effect {
    Tracks {
        tracks: Vec<NodeTrack>,
        finish: Finish,
    },
    Partial {
        leaves: Vec<PartialLeaf>,
        lag: f64,
        mode: PartialMode,
        finish: Finish,
    },
    MoveAlongPath {
        roots: Vec<NodeId>,
        path: VectorPath,
    },
    Alpha {
        roots: Selection,
        f: AlphaFn,
    },
    Tracker {
        id: TrackerId,
        from: f64,
        to: f64,
    },
    Camera {
        from: CameraState,
        to: CameraState,
    },
    Pause,
}

/// Materialized `play` batch.
pub(crate) struct Segment {
    pub effects: Vec<Effect>,
    pub schedule: Schedule,
    pub duration: f64,
}

impl Segment {
    /// Apply every effect at segment time `t` (clamped to the segment).
    pub fn apply_at(&mut self, stage: &mut Stage<'_>, t: f64) {
        let alpha = if self.duration > 0.0 {
            (t / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let effects = &mut self.effects;
        self.schedule.eval(alpha, &mut |i, eased| {
            if let Some(effect) = effects.get_mut(i) {
                effect.apply(stage, eased);
            }
        });
    }

    /// Run end-of-segment bookkeeping (removals, replacements) in declaration order.
    pub fn finish(self, stage: &mut Stage<'_>) -> ChoreoResult<()> {
        for effect in self.effects {
            effect.finish(stage)?;
        }
        Ok(())
    }
}

/// Check a declared animation against the current scene without touching it.
///
/// `camera_restores` accumulates the number of camera stack pops the batch will perform.
pub(crate) fn validate(
    anim: &Animation,
    graph: &SceneGraph,
    trackers: &TrackerStore,
    camera_restores: &mut usize,
) -> ChoreoResult<()> {
    if let Some(rt) = anim.run_time
        && !(rt.is_finite() && rt > 0.0)
    {
        return Err(ChoreoError::validation(format!(
            "run_time must be positive, got {rt}"
        )));
    }
    if let Some(lag) = anim.lag_ratio
        && !(lag.is_finite() && lag >= 0.0)
    {
        return Err(ChoreoError::validation(format!(
            "lag_ratio must be non-negative, got {lag}"
        )));
    }
    graph.ensure(&anim.referenced_nodes())?;
    match &anim.kind {
        AnimKind::Tween(t) => {
            for op in &t.ops {
                op.validate(graph, t.target.ids())?;
            }
        }
        AnimKind::Camera(t) => *camera_restores += t.restores(),
        AnimKind::Tracker(t) => {
            trackers.get(t.tracker)?;
        }
        AnimKind::Transform { source, target, .. } => {
            if source.0.is_empty() || target.0.is_empty() {
                return Err(ChoreoError::validation("transform needs a source and a target"));
            }
            if let Some(id) = source.0.iter().find(|id| !graph.is_attached(**id)) {
                return Err(ChoreoError::unknown_target(format!(
                    "transform source {id} is not in the scene"
                )));
            }
        }
        AnimKind::MoveAlongPath { path, .. } => {
            if graph.node_ref(*path)?.world_path().is_none() {
                return Err(ChoreoError::validation(format!(
                    "path node {path} has no vector geometry"
                )));
            }
        }
        AnimKind::Group(children) => {
            for child in children {
                validate(child, graph, trackers, camera_restores)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Begin every animation of a batch, in declaration order.
///
/// `run_time` overrides the duration of each top-level animation.
pub(crate) fn build_segment(
    anims: Vec<Animation>,
    run_time: Option<f64>,
    stage: &mut Stage<'_>,
) -> ChoreoResult<Segment> {
    let mut effects = Vec::new();
    let mut slots = Vec::with_capacity(anims.len());
    for anim in anims {
        let duration = run_time.unwrap_or_else(|| natural_duration(&anim, stage.graph));
        let schedule = build(anim, stage, &mut effects)?;
        slots.push(Slot {
            start: 0.0,
            duration,
            schedule,
        });
    }
    let duration = slots.iter().map(|s| s.duration).fold(0.0, f64::max);
    Ok(Segment {
        effects,
        schedule: Schedule::Group {
            slots,
            span: duration,
            ease: Ease::Linear,
        },
        duration,
    })
}

fn build(anim: Animation, stage: &mut Stage<'_>, effects: &mut Vec<Effect>) -> ChoreoResult<Schedule> {
    let ease = anim.effective_ease();
    let lag = anim.lag_ratio;
    match anim.kind {
        AnimKind::Group(children) => {
            let durations: Vec<f64> = children
                .iter()
                .map(|c| natural_duration(c, stage.graph))
                .collect();
            let (starts, span) = lagged_starts(&durations, lag.unwrap_or(0.0));
            let mut slots = Vec::with_capacity(children.len());
            for ((child, start), duration) in children.into_iter().zip(starts).zip(durations) {
                slots.push(Slot {
                    start,
                    duration,
                    schedule: build(child, stage, effects)?,
                });
            }
            Ok(Schedule::Group { slots, span, ease })
        }
        kind => {
            effects.push(begin(kind, lag, stage)?);
            Ok(Schedule::Leaf {
                effect: effects.len() - 1,
                ease,
            })
        }
    }
}

/// Attach the topmost detached ancestor of each root to the scene.
fn implicit_add(graph: &mut SceneGraph, roots: &[NodeId]) -> ChoreoResult<()> {
    for root in roots {
        if graph.is_attached(*root) {
            continue;
        }
        let top = graph.top_ancestor(*root);
        tracing::debug!(node = %top, "adding animated node to the scene");
        graph.attach(NodeId::ROOT, top)?;
    }
    Ok(())
}

fn fade_family(graph: &mut SceneGraph, roots: &[NodeId], factor: f64) -> ChoreoResult<()> {
    for id in graph.family_of(roots) {
        let node = graph.node_data_mut(id)?;
        node.style = node.style.faded(factor);
    }
    Ok(())
}

fn partial_leaves(graph: &SceneGraph, roots: &[NodeId]) -> Vec<PartialLeaf> {
    graph
        .family_of(roots)
        .into_iter()
        .filter_map(|id| {
            let node = graph.node(id).ok()?;
            Some(PartialLeaf {
                id,
                geometry: node.geometry()?.clone(),
                style: node.style,
            })
        })
        .collect()
}

fn removal(graph: &SceneGraph, roots: &[NodeId]) -> Finish {
    Finish::Remove {
        roots: roots.to_vec(),
        restore: graph.states(&graph.family_of(roots)),
    }
}

fn grow_from(graph: &mut SceneGraph, roots: &[NodeId], point: Vec3) -> ChoreoResult<Vec<NodeTrack>> {
    derive_tracks(graph, roots, true, |g| {
        let collapse = Affine3::scale_about(0.0, point);
        for r in roots {
            g.apply_world_affine(*r, &collapse);
        }
        Ok(Vec::new())
    })
}

fn spawn_ephemeral(graph: &mut SceneGraph, m: Mobject) -> ChoreoResult<NodeId> {
    let id = graph.insert(m);
    graph.attach(NodeId::ROOT, id)?;
    Ok(id)
}

fn flash_lines(p: &FlashParams) -> Mobject {
    let n = p.num_lines.max(1);
    let lines = (0..n).map(|k| {
        let angle = std::f64::consts::TAU * k as f64 / n as f64;
        let dir = Vec3::xy(angle.cos(), angle.sin());
        Mobject::line(
            p.point + dir * (p.flash_radius - p.line_length),
            p.point + dir * p.flash_radius,
        )
        .with_stroke(p.color, p.stroke_width)
    });
    Mobject::group(lines).named("flash")
}

fn write_outline(style: &Style) -> Style {
    let stroked = style.stroke_width > 0.0 && style.stroke_opacity > 0.0;
    Style {
        fill_color: style.fill_color,
        fill_opacity: 0.0,
        stroke_color: if stroked {
            style.stroke_color
        } else {
            style.fill_color
        },
        stroke_width: if stroked {
            style.stroke_width
        } else {
            WRITE_OUTLINE_WIDTH
        },
        stroke_opacity: 1.0,
    }
}

fn window(geometry: &Geometry, a: f64, b: f64) -> Geometry {
    match geometry {
        Geometry::Path(p) => Geometry::Path(p.partial(a.clamp(0.0, 1.0), b.clamp(0.0, 1.0))),
        other => other.clone(),
    }
}

/// Alpha of leaf `i` of `n` when starts are spread by `lag`.
pub(crate) fn sub_alpha(alpha: f64, i: usize, n: usize, lag: f64) -> f64 {
    let full = n.saturating_sub(1) as f64 * lag + 1.0;
    (alpha * full - i as f64 * lag).clamp(0.0, 1.0)
}

impl PartialLeaf {
    /// Geometry and style shown at local alpha `s`.
    fn at(&self, mode: PartialMode, s: f64) -> (Geometry, Style) {
        if self.geometry.is_image() {
            let s = if mode == PartialMode::Uncreate { 1.0 - s } else { s };
            return (self.geometry.clone(), self.style.faded(s));
        }
        match mode {
            PartialMode::Create => (window(&self.geometry, 0.0, s), self.style),
            PartialMode::Uncreate => (window(&self.geometry, 0.0, 1.0 - s), self.style),
            PartialMode::Write => {
                let outline = write_outline(&self.style);
                if s < 0.5 {
                    (window(&self.geometry, 0.0, 2.0 * s), outline)
                } else {
                    (
                        self.geometry.clone(),
                        Style::lerp(&outline, &self.style, 2.0 * s - 1.0),
                    )
                }
            }
            PartialMode::CreationThenDestruction => (
                window(&self.geometry, 2.0 * s - 1.0, 2.0 * s),
                self.style,
            ),
            PartialMode::PassingFlash { time_width } => {
                let upper = s * (1.0 + time_width);
                (window(&self.geometry, upper - time_width, upper), self.style)
            }
        }
    }
}

fn begin(kind: AnimKind, lag: Option<f64>, stage: &mut Stage<'_>) -> ChoreoResult<Effect> {
    let graph = &mut *stage.graph;
    let keep = |tracks: Vec<NodeTrack>| Effect::Tracks {
        tracks,
        finish: Finish::Keep,
    };
    let effect = match kind {
        AnimKind::Tween(t) => {
            let roots = t.target.0.clone();
            implicit_add(graph, &roots)?;
            if t.needs_bake() {
                for r in &roots {
                    graph.bake_family(*r);
                }
            }
            keep(derive_tracks(graph, &roots, false, |g| {
                let mut births = Vec::new();
                for op in &t.ops {
                    births.extend(ops::apply(g, &roots, op)?);
                }
                Ok(births)
            })?)
        }
        AnimKind::Camera(t) => {
            let from = stage.camera.state();
            for op in &t.ops {
                stage.camera.apply(op)?;
            }
            let to = stage.camera.state();
            stage.camera.set_state(from);
            Effect::Camera { from, to }
        }
        AnimKind::Tracker(t) => {
            let from = stage.trackers.get(t.tracker)?;
            Effect::Tracker {
                id: t.tracker,
                from,
                to: t.end_value(from),
            }
        }
        AnimKind::Transform {
            source,
            target,
            mode,
        } => {
            let morphing = match mode {
                TransformMode::FromCopy => source
                    .0
                    .iter()
                    .map(|id| {
                        let world = graph.world_transform(*id);
                        let copy = graph.deep_copy(*id)?;
                        graph.node_data_mut(copy)?.transform = world;
                        graph.attach(NodeId::ROOT, copy)?;
                        Ok(copy)
                    })
                    .collect::<ChoreoResult<Vec<_>>>()?,
                TransformMode::Plain | TransformMode::Replacement => source.0.clone(),
            };
            for id in &morphing {
                graph.bake_family(*id);
            }
            let tracks = derive_tracks(graph, &morphing, false, |g| {
                morph::bind_selection(g, &morphing, &target.0)
            })?;
            let finish = match mode {
                TransformMode::Replacement => Finish::Replace {
                    old: source.0,
                    new: target.0,
                },
                TransformMode::Plain | TransformMode::FromCopy => Finish::Keep,
            };
            Effect::Tracks { tracks, finish }
        }
        AnimKind::FadeIn { target, shift } => {
            let roots = target.0;
            implicit_add(graph, &roots)?;
            keep(derive_tracks(graph, &roots, true, |g| {
                fade_family(g, &roots, 0.0)?;
                ops::apply(g, &roots, &MobjectOp::Shift(-shift))
            })?)
        }
        AnimKind::FadeOut { target, shift } => {
            let roots = target.0;
            implicit_add(graph, &roots)?;
            let finish = removal(graph, &roots);
            let tracks = derive_tracks(graph, &roots, false, |g| {
                fade_family(g, &roots, 0.0)?;
                ops::apply(g, &roots, &MobjectOp::Shift(shift))
            })?;
            Effect::Tracks { tracks, finish }
        }
        AnimKind::Create(target) => {
            implicit_add(graph, &target.0)?;
            Effect::Partial {
                leaves: partial_leaves(graph, &target.0),
                lag: lag.unwrap_or(CREATE_LAG_RATIO),
                mode: PartialMode::Create,
                finish: Finish::Keep,
            }
        }
        AnimKind::Uncreate(target) => {
            implicit_add(graph, &target.0)?;
            Effect::Partial {
                leaves: partial_leaves(graph, &target.0),
                lag: lag.unwrap_or(CREATE_LAG_RATIO),
                mode: PartialMode::Uncreate,
                finish: removal(graph, &target.0),
            }
        }
        AnimKind::Write(target) => {
            implicit_add(graph, &target.0)?;
            let leaves = partial_leaves(graph, &target.0);
            let n = leaves.len() as f64;
            Effect::Partial {
                lag: lag.unwrap_or((4.0 / (n + 1.0)).min(0.2)),
                leaves,
                mode: PartialMode::Write,
                finish: Finish::Keep,
            }
        }
        AnimKind::Grow { target, point } => {
            let roots = target.0;
            implicit_add(graph, &roots)?;
            let about = point
                .or_else(|| graph.selection_bounds(&roots).map(|b| b.center()))
                .unwrap_or(Vec3::ZERO);
            keep(grow_from(graph, &roots, about)?)
        }
        AnimKind::GrowArrow(arrow) => {
            implicit_add(graph, &[arrow])?;
            let start = graph.node_ref(arrow)?.start();
            keep(grow_from(graph, &[arrow], start)?)
        }
        AnimKind::Indicate {
            target,
            color,
            scale,
        } => {
            let roots = target.0;
            implicit_add(graph, &roots)?;
            keep(derive_tracks(graph, &roots, false, |g| {
                let mut births = ops::apply(
                    g,
                    &roots,
                    &MobjectOp::Scale {
                        factor: scale,
                        about: None,
                    },
                )?;
                births.extend(ops::apply(g, &roots, &MobjectOp::Style(StyleEdit::color(color)))?);
                Ok(births)
            })?)
        }
        AnimKind::MoveAlongPath { target, path } => {
            implicit_add(graph, &target.0)?;
            let path = graph.node_ref(path)?.world_path().ok_or_else(|| {
                ChoreoError::validation(format!("path node {path} has no vector geometry"))
            })?;
            Effect::MoveAlongPath {
                roots: target.0,
                path,
            }
        }
        AnimKind::Flash(params) => {
            let group = spawn_ephemeral(graph, flash_lines(&params))?;
            Effect::Partial {
                leaves: partial_leaves(graph, &[group]),
                lag: 0.0,
                mode: PartialMode::CreationThenDestruction,
                finish: Finish::Discard {
                    roots: vec![group],
                },
            }
        }
        AnimKind::FlashAround { target, params } => {
            let bounds = graph
                .selection_bounds(&target.0)
                .unwrap_or_else(|| Bounds::point(Vec3::ZERO));
            let rect = Mobject::surrounding_rectangle(bounds, params.buff)
                .with_stroke(params.color, params.stroke_width)
                .named("flash_around");
            let id = spawn_ephemeral(graph, rect)?;
            Effect::Partial {
                leaves: partial_leaves(graph, &[id]),
                lag: 0.0,
                mode: PartialMode::PassingFlash {
                    time_width: params.time_width,
                },
                finish: Finish::Discard {
                    roots: vec![id],
                },
            }
        }
        AnimKind::UpdateFromAlphaFunc { target, f } => {
            implicit_add(graph, &target.0)?;
            Effect::Alpha { roots: target, f }
        }
        AnimKind::Pause => Effect::Pause,
        AnimKind::Group(_) => {
            return Err(ChoreoError::animation("group reached effect materialization"));
        }
    };
    Ok(effect)
}

impl Effect {
    pub(crate) fn apply(&mut self, stage: &mut Stage<'_>, alpha: f64) {
        match self {
            Self::Tracks { tracks, .. } => {
                for track in tracks.iter() {
                    track.apply(stage.graph, alpha);
                }
            }
            Self::Partial {
                leaves, lag, mode, ..
            } => {
                let n = leaves.len();
                for (i, leaf) in leaves.iter().enumerate() {
                    let s = sub_alpha(alpha, i, n, *lag);
                    let (geometry, style) = leaf.at(*mode, s);
                    if let Ok(node) = stage.graph.node_data_mut(leaf.id) {
                        node.geometry = Some(geometry);
                        node.style = style;
                    }
                }
            }
            Self::MoveAlongPath { roots, path } => {
                let (Some(point), Some(bounds)) = (
                    path.point_at_proportion(alpha),
                    stage.graph.selection_bounds(roots),
                ) else {
                    return;
                };
                let step = Affine3::translate(point - bounds.center());
                for r in roots.iter() {
                    stage.graph.apply_world_affine(*r, &step);
                }
            }
            Self::Alpha { roots, f } => match stage.graph.node_mut(roots.clone()) {
                Ok(mut node) => f(&mut node, alpha),
                Err(e) => tracing::warn!(error = %e, "alpha function target missing"),
            },
            Self::Tracker { id, from, to } => {
                if let Err(e) = stage.trackers.set(*id, lerp_f64(*from, *to, alpha)) {
                    tracing::warn!(error = %e, "tracker vanished mid-segment");
                }
            }
            Self::Camera { from, to } => stage.camera.set_state(CameraState::lerp(from, to, alpha)),
            Self::Pause => {}
        }
    }

    fn finish(self, stage: &mut Stage<'_>) -> ChoreoResult<()> {
        let finish = match self {
            Self::Tracks { finish, .. } | Self::Partial { finish, .. } => finish,
            _ => return Ok(()),
        };
        let graph = &mut *stage.graph;
        match finish {
            Finish::Keep => {}
            Finish::Remove { roots, restore } => {
                for r in &roots {
                    graph.detach(*r);
                }
                graph.restore_states(&restore);
            }
            Finish::Replace { old, new } => {
                let (mut host, mut at) = (NodeId::ROOT, usize::MAX);
                for (i, id) in new.iter().enumerate() {
                    let world = graph.world_transform(*id);
                    match old.get(i) {
                        Some(o) => {
                            host = graph.node(*o)?.parent().unwrap_or(NodeId::ROOT);
                            graph.replace(*o, *id)?;
                            at = graph
                                .node(host)?
                                .children()
                                .iter()
                                .position(|c| c == id)
                                .map_or(usize::MAX, |p| p + 1);
                        }
                        None => {
                            graph.attach_at(host, *id, at)?;
                            at = at.saturating_add(1);
                        }
                    }
                    keep_world(graph, *id, world)?;
                }
                for o in old.iter().skip(new.len()) {
                    graph.detach(*o);
                }
            }
            Finish::Discard { roots } => {
                for r in roots {
                    graph.release(r);
                }
            }
        }
        Ok(())
    }
}

fn keep_world(graph: &mut SceneGraph, id: NodeId, world: Affine3) -> ChoreoResult<()> {
    match graph.parent_world(id).inverse() {
        Ok(inv) => graph.node_data_mut(id)?.transform = inv * world,
        Err(e) => tracing::warn!(error = %e, node = %id, "kept local transform of replacement"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/run.rs"]
mod tests;
