//! Binding one family's geometry onto another.
//!
//! `become` pairs the target's pre-order leaves with the source's world-space leaves.
//! Selections bind the same way, root by root.
//! Surplus source leaves are born as new children of the target, collapsed onto the target's
//! last point; surplus target leaves collapse onto the source's last point and fade out.

use crate::foundation::error::ChoreoResult;
use crate::foundation::math::{Affine3, Vec3};
use crate::mobject::geometry::Geometry;
use crate::scene::family::{NodeState, world_leaves};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::ops::Births;

fn last_point(g: &Geometry) -> Option<Vec3> {
    match g {
        Geometry::Path(p) => p.end(),
        Geometry::Image(img) => Some(img.points()[3]),
    }
}

pub(crate) fn bind_become(graph: &mut SceneGraph, target: NodeId, source: NodeId) -> ChoreoResult<Births> {
    bind_selection(graph, &[target], &[source])
}

/// `bind_become` over several roots at once: the targets' leaves, in root order, take the
/// concatenated world leaves of `sources`. Births land under the last target root.
pub(crate) fn bind_selection(
    graph: &mut SceneGraph,
    targets: &[NodeId],
    sources: &[NodeId],
) -> ChoreoResult<Births> {
    graph.ensure(targets)?;
    graph.ensure(sources)?;
    let Some(&host) = targets.last() else {
        return Ok(Vec::new());
    };
    let shapes: Vec<_> = sources.iter().flat_map(|s| world_leaves(graph, *s)).collect();
    let source_center = graph
        .selection_bounds(sources)
        .map(|b| b.center())
        .or_else(|| sources.first().map(|s| graph.world_transform(*s).apply(Vec3::ZERO)))
        .unwrap_or(Vec3::ZERO);
    let source_end = shapes
        .last()
        .and_then(|s| last_point(&s.geometry))
        .unwrap_or(source_center);

    let mut leaves = Vec::new();
    let mut host_to_local = Affine3::IDENTITY;
    for t in targets {
        graph.bake_family(*t);
        let to_local = graph.parent_world(*t).inverse().unwrap_or_else(|e| {
            tracing::warn!(node = %t, error = %e, "binding in world space");
            Affine3::IDENTITY
        });
        leaves.extend(graph.leaves(*t).into_iter().map(|l| (l, to_local)));
        host_to_local = to_local;
    }

    let anchor_target = graph
        .leaves(host)
        .last()
        .and_then(|l| graph.node(*l).ok()?.geometry().and_then(last_point))
        .or_else(|| graph.local_family_bounds(host).map(|b| b.center()))
        .unwrap_or(Vec3::ZERO);

    let mut births = Vec::new();
    for i in 0..leaves.len().max(shapes.len()) {
        match (leaves.get(i), shapes.get(i)) {
            (Some((leaf, to_local)), Some(src)) => {
                let node = graph.node_data_mut(*leaf)?;
                node.geometry = Some(src.geometry.transformed(to_local));
                node.style = src.style;
                node.kind = src.kind;
            }
            (None, Some(src)) => {
                let geometry = src.geometry.transformed(&host_to_local);
                let birth = NodeState {
                    transform: Affine3::IDENTITY,
                    style: src.style.faded(0.0),
                    geometry: Some(geometry.collapsed_at(anchor_target)),
                    kind: src.kind,
                };
                let id = graph.push_child(host, src.kind, &birth);
                graph.set_state(
                    id,
                    &NodeState {
                        style: src.style,
                        geometry: Some(geometry),
                        ..birth.clone()
                    },
                );
                births.push((id, birth));
            }
            (Some((leaf, to_local)), None) => {
                let anchor = to_local.apply(source_end);
                let node = graph.node_data_mut(*leaf)?;
                node.geometry = node.geometry.as_ref().map(|g| g.collapsed_at(anchor));
                node.style = node.style.faded(0.0);
            }
            (None, None) => {}
        }
    }
    Ok(births)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/morph.rs"]
mod tests;
