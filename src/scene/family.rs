//! Node state snapshots and the per-node tracks that interpolate between them.

use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::foundation::math::{Affine3, Mat3, Quat, Vec3, lerp_f64};
use crate::mobject::geometry::Geometry;
use crate::mobject::style::{ObjectKind, Style};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::ops::Births;

/// Everything about a node that animations may change.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    pub transform: Affine3,
    pub style: Style,
    pub geometry: Option<Geometry>,
    pub kind: ObjectKind,
}

/// World-space copy of one leaf, used as a morph source.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafSnapshot {
    pub geometry: Geometry,
    pub style: Style,
    pub kind: ObjectKind,
}

/// Pre-order world-space leaves of `id`'s family.
pub fn world_leaves(graph: &SceneGraph, id: NodeId) -> Vec<LeafSnapshot> {
    graph
        .leaves(id)
        .into_iter()
        .filter_map(|leaf| {
            let node = graph.node(leaf).ok()?;
            Some(LeafSnapshot {
                geometry: graph.world_geometry(leaf)?,
                style: node.style,
                kind: node.kind,
            })
        })
        .collect()
}

/// Interpolate two affines about `pivot`.
///
/// The pivot's image moves linearly; the linear part goes through scale and rotation
/// separately (shortest arc) when both ends are similarities, entry-wise otherwise. Both
/// endpoints are reproduced exactly.
pub fn interpolate_transform(a: &Affine3, b: &Affine3, pivot: Vec3, t: f64) -> Affine3 {
    if t <= 0.0 {
        return *a;
    }
    if t >= 1.0 {
        return *b;
    }
    let p = Vec3::lerp(a.apply(pivot), b.apply(pivot), t);
    let linear = match (a.linear.as_similarity(), b.linear.as_similarity()) {
        (Some((sa, qa)), Some((sb, qb))) => {
            // A collapsed end has no orientation of its own; borrow the other end's.
            let (qa, qb) = match (sa == 0.0, sb == 0.0) {
                (true, false) => (qb, qb),
                (false, true) => (qa, qa),
                _ => (qa, qb),
            };
            let q = Quat::slerp(qa, qb, t);
            Mat3::scale(lerp_f64(sa, sb, t)) * q.to_mat3()
        }
        _ => Mat3::lerp(&a.linear, &b.linear, t),
    };
    Affine3 {
        linear,
        translation: p - linear.mul_vec(pivot),
    }
}

#[derive(Clone, Debug)]
enum GeometryTween {
    Fixed,
    Morph(Geometry, Geometry),
    /// Kinds that cannot be point-paired swap at the midpoint under an opacity dip.
    CrossFade(Geometry, Geometry),
    Snap(Option<Geometry>),
}

/// Interpolation of one node from a start to an end state.
///
/// Only the fields that differ between the two states are written, so tracks of separate
/// animations on the same node compose when they touch different fields.
#[derive(Clone, Debug)]
pub struct NodeTrack {
    pub id: NodeId,
    pivot: Vec3,
    start: NodeState,
    end: NodeState,
    geometry: GeometryTween,
    moves: bool,
    restyles: bool,
}

impl NodeTrack {
    /// The pivot is taken from the node's current family bounds.
    pub fn new(graph: &SceneGraph, id: NodeId, start: NodeState, end: NodeState) -> Self {
        let pivot = graph
            .local_family_bounds(id)
            .map(|b| b.center())
            .unwrap_or(Vec3::ZERO);
        let geometry = match (&start.geometry, &end.geometry) {
            (a, b) if a == b => GeometryTween::Fixed,
            (Some(a), Some(b)) if Geometry::morphable(a, b) => {
                let fallback = a.bounds().map(|x| x.center()).unwrap_or(pivot);
                let (a, b) = Geometry::aligned(a, b, fallback);
                GeometryTween::Morph(a, b)
            }
            (Some(a), Some(b)) => {
                let e = ChoreoError::incompatible_morph(format!(
                    "node {id}: {:?} cannot be point-paired with {:?}; cross-fading",
                    start.kind, end.kind
                ));
                tracing::warn!(error = %e, "morph fallback");
                GeometryTween::CrossFade(a.clone(), b.clone())
            }
            (_, b) => GeometryTween::Snap(b.clone()),
        };
        Self {
            id,
            pivot,
            moves: start.transform != end.transform,
            restyles: start.style != end.style,
            start,
            end,
            geometry,
        }
    }

    /// Write the interpolated state at `t` (already eased) into the graph.
    pub fn apply(&self, graph: &mut SceneGraph, t: f64) {
        let Ok(node) = graph.node_data_mut(self.id) else {
            return;
        };
        if self.moves {
            node.transform =
                interpolate_transform(&self.start.transform, &self.end.transform, self.pivot, t);
        }
        if t >= 1.0 {
            if self.restyles {
                node.style = self.end.style;
            }
            if !matches!(self.geometry, GeometryTween::Fixed) {
                node.geometry.clone_from(&self.end.geometry);
            }
            node.kind = self.end.kind;
            return;
        }
        let t = t.max(0.0);
        let swapped = t >= 0.5;
        match &self.geometry {
            GeometryTween::Fixed => {
                if self.restyles {
                    node.style = Style::lerp(&self.start.style, &self.end.style, t);
                }
            }
            GeometryTween::Morph(a, b) => {
                if self.restyles {
                    node.style = Style::lerp(&self.start.style, &self.end.style, t);
                }
                node.geometry = Some(Geometry::lerp(a, b, t));
            }
            GeometryTween::CrossFade(a, b) => {
                if swapped {
                    node.style = self.end.style.faded(2.0 * t - 1.0);
                    node.geometry = Some(b.clone());
                } else {
                    node.style = self.start.style.faded(1.0 - 2.0 * t);
                    node.geometry = Some(a.clone());
                }
            }
            GeometryTween::Snap(b) => {
                if self.restyles {
                    node.style = Style::lerp(&self.start.style, &self.end.style, t);
                }
                node.geometry = if swapped { b.clone() } else { self.start.geometry.clone() };
            }
        }
        let kind_swaps = matches!(self.geometry, GeometryTween::CrossFade(..) | GeometryTween::Snap(_));
        node.kind = if kind_swaps && swapped {
            self.end.kind
        } else {
            self.start.kind
        };
    }
}

/// Derive tracks for the families of `roots` by running `mutate` on the live graph.
///
/// Without `reverse` the mutated state is the end and the current state the start (tweens,
/// fade-outs); with `reverse` the mutated state is where the animation starts (fade-ins,
/// grows). Either way the graph is left as it was found, except for nodes born by `mutate`,
/// which are left in their birth state.
pub(crate) fn derive_tracks(
    graph: &mut SceneGraph,
    roots: &[NodeId],
    reverse: bool,
    mutate: impl FnOnce(&mut SceneGraph) -> ChoreoResult<Births>,
) -> ChoreoResult<Vec<NodeTrack>> {
    let entry = graph.states(&graph.family_of(roots));
    let births = match mutate(graph) {
        Ok(b) => b,
        Err(e) => {
            graph.restore_states(&entry);
            return Err(e);
        }
    };
    let ids = graph.family_of(roots);
    let mutated = graph.states(&ids);
    graph.restore_states(&entry);
    graph.restore_states(&births);

    let base = |id: NodeId| {
        entry
            .iter()
            .chain(births.iter())
            .find(|(n, _)| *n == id)
            .map(|(_, s)| s.clone())
    };
    Ok(mutated
        .into_iter()
        .filter_map(|(id, changed)| {
            let base = base(id)?;
            (base != changed).then(|| {
                if reverse {
                    NodeTrack::new(graph, id, changed, base)
                } else {
                    NodeTrack::new(graph, id, base, changed)
                }
            })
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/family.rs"]
mod tests;
