//! Mutators shared by instant [`NodeMut`](crate::scene::graph::NodeMut) calls and
//! `.animate` tweens. A tween records these ops and replays them to derive its end state.

use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Bounds, Vec3};
use crate::mobject::geometry::{Geometry, Subpath, VectorPath};
use crate::mobject::style::StyleEdit;
use crate::scene::family::NodeState;
use crate::scene::graph::{NodeId, SceneGraph, Selection};
use crate::scene::morph;

#[derive(Clone, Debug, PartialEq)]
pub enum MobjectOp {
    Shift(Vec3),
    MoveTo(Vec3),
    /// `about` defaults to the selection's center.
    Scale {
        factor: f64,
        about: Option<Vec3>,
    },
    Rotate {
        angle: f64,
        axis: Vec3,
        about: Option<Vec3>,
    },
    SetWidth(f64),
    SetHeight(f64),
    Style(StyleEdit),
    /// Also used for corners: every non-zero component of `edge` picks a frame side.
    ToEdge {
        edge: Vec3,
        buff: f64,
    },
    NextTo {
        target: Selection,
        direction: Vec3,
        buff: f64,
    },
    AlignTo {
        target: Selection,
        direction: Vec3,
    },
    Become(NodeId),
    Restore,
    SetPoints {
        points: Vec<Vec3>,
        smooth: bool,
    },
}

/// Nodes created by an op, with the state they should be born in.
pub(crate) type Births = Vec<(NodeId, NodeState)>;

impl MobjectOp {
    /// Nodes other than the op's own target that must exist.
    pub fn references(&self) -> Vec<NodeId> {
        match self {
            Self::NextTo { target, .. } | Self::AlignTo { target, .. } => target.0.clone(),
            Self::Become(source) => vec![*source],
            _ => Vec::new(),
        }
    }

    fn needs_single_target(&self) -> bool {
        matches!(self, Self::Become(_) | Self::SetPoints { .. })
    }

    /// Fail early on ops that could never apply to `roots`.
    pub(crate) fn validate(&self, graph: &SceneGraph, roots: &[NodeId]) -> ChoreoResult<()> {
        graph.ensure(roots)?;
        graph.ensure(&self.references())?;
        if self.needs_single_target() && roots.len() != 1 {
            return Err(ChoreoError::validation(format!(
                "{self:?} needs exactly one target, got {}",
                roots.len()
            )));
        }
        if let Self::Restore = self
            && let Some(id) = roots
                .iter()
                .find(|id| graph.node(**id).is_ok_and(|n| !n.has_saved_state()))
        {
            return Err(ChoreoError::animation(format!(
                "restore on {id} without a saved state"
            )));
        }
        Ok(())
    }
}

fn center_of(graph: &SceneGraph, roots: &[NodeId]) -> Vec3 {
    graph
        .selection_bounds(roots)
        .map(|b| b.center())
        .unwrap_or(Vec3::ZERO)
}

fn bounds_of(graph: &SceneGraph, roots: &[NodeId]) -> Bounds {
    graph
        .selection_bounds(roots)
        .unwrap_or(Bounds::point(center_of(graph, roots)))
}

fn transform_roots(graph: &mut SceneGraph, roots: &[NodeId], m: &Affine3) {
    for id in roots {
        graph.apply_world_affine(*id, m);
    }
}

fn resize(graph: &mut SceneGraph, roots: &[NodeId], axis: usize, length: f64) {
    let b = bounds_of(graph, roots);
    let current = b.extent(axis);
    if current <= 0.0 {
        let e = ChoreoError::degenerate_transform(format!(
            "cannot resize a selection with zero extent along axis {axis}"
        ));
        tracing::warn!(error = %e, "resize skipped");
        return;
    }
    transform_roots(
        graph,
        roots,
        &Affine3::scale_about(length / current, b.center()),
    );
}

fn per_axis(dir: Vec3, v: Vec3) -> Vec3 {
    Vec3::new(
        if dir.x != 0.0 { v.x } else { 0.0 },
        if dir.y != 0.0 { v.y } else { 0.0 },
        if dir.z != 0.0 { v.z } else { 0.0 },
    )
}

pub(crate) fn apply(graph: &mut SceneGraph, roots: &[NodeId], op: &MobjectOp) -> ChoreoResult<Births> {
    op.validate(graph, roots)?;
    match op {
        MobjectOp::Shift(v) => transform_roots(graph, roots, &Affine3::translate(*v)),
        MobjectOp::MoveTo(p) => {
            let c = center_of(graph, roots);
            transform_roots(graph, roots, &Affine3::translate(*p - c));
        }
        MobjectOp::Scale { factor, about } => {
            if *factor == 0.0 {
                let e = ChoreoError::degenerate_transform("scale by zero");
                tracing::warn!(error = %e, "collapsing selection");
            }
            let about = about.unwrap_or_else(|| center_of(graph, roots));
            transform_roots(graph, roots, &Affine3::scale_about(*factor, about));
        }
        MobjectOp::Rotate { angle, axis, about } => {
            let about = about.unwrap_or_else(|| center_of(graph, roots));
            transform_roots(graph, roots, &Affine3::rotate_about(*angle, *axis, about));
        }
        MobjectOp::SetWidth(w) => resize(graph, roots, 0, *w),
        MobjectOp::SetHeight(h) => resize(graph, roots, 1, *h),
        MobjectOp::Style(edit) => {
            for id in graph.family_of(roots) {
                edit.apply(&mut graph.node_data_mut(id)?.style);
            }
        }
        MobjectOp::ToEdge { edge, buff } => {
            let dims = graph.dims();
            let sign = edge.signum();
            let frame_point = Vec3::new(sign.x * dims.half_width, sign.y * dims.half_height, 0.0);
            let current = bounds_of(graph, roots).critical_point(*edge);
            let shift = per_axis(sign, frame_point - current - sign * *buff);
            transform_roots(graph, roots, &Affine3::translate(shift));
        }
        MobjectOp::NextTo {
            target,
            direction,
            buff,
        } => {
            let to = bounds_of(graph, target.ids()).critical_point(*direction);
            let from = bounds_of(graph, roots).critical_point(-*direction);
            transform_roots(
                graph,
                roots,
                &Affine3::translate(to - from + *direction * *buff),
            );
        }
        MobjectOp::AlignTo { target, direction } => {
            let to = bounds_of(graph, target.ids()).critical_point(*direction);
            let from = bounds_of(graph, roots).critical_point(*direction);
            transform_roots(graph, roots, &Affine3::translate(per_axis(*direction, to - from)));
        }
        MobjectOp::Become(source) => return morph::bind_become(graph, roots[0], *source),
        MobjectOp::Restore => {
            for id in roots {
                let saved = graph.node(*id)?.saved.clone().unwrap_or_default();
                graph.restore_states(&saved);
            }
        }
        MobjectOp::SetPoints { points, smooth } => {
            let id = roots[0];
            let to_local = graph.world_transform(id).inverse().unwrap_or_else(|e| {
                tracing::warn!(node = %id, error = %e, "setting points in world space");
                Affine3::IDENTITY
            });
            let local: Vec<Vec3> = points.iter().map(|p| to_local.apply(*p)).collect();
            let sub = if *smooth {
                Subpath::smooth_through(&local, false)
            } else {
                Subpath::from_corners(&local, false)
            };
            let node = graph.node_data_mut(id)?;
            if matches!(node.geometry, Some(Geometry::Image(_))) {
                return Err(ChoreoError::validation(format!(
                    "cannot set points on image node {id}"
                )));
            }
            node.geometry = Some(Geometry::Path(VectorPath::from_subpath(sub)));
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/ops.rs"]
mod tests;
