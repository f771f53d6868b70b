//! Display-list emission.
//!
//! A [`Frame`] is everything a rasterizer needs: the background and one [`DisplayItem`] per
//! visible leaf, back to front. Items carry geometry in the node's local space together with
//! the camera-relative transform, so paths never need re-tessellation on camera moves.

use crate::foundation::color::Color;
use crate::foundation::core::FrameIndex;
use crate::foundation::math::{Affine3, Bounds, Vec3};
use crate::mobject::geometry::Geometry;
use crate::mobject::style::{ObjectKind, Style};
use crate::scene::camera::Camera;
use crate::scene::graph::{NodeId, SceneGraph};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DisplayItem {
    pub node: NodeId,
    pub kind: ObjectKind,
    /// Local geometry to frame coordinates (camera view composed with the node's world).
    pub transform: Affine3,
    pub geometry: Geometry,
    /// Opacities clamped, widths non-negative.
    pub style: Style,
    pub z_index: i32,
    /// Frame-space clip box, if any ancestor clips.
    pub clip: Option<Bounds>,
}

impl DisplayItem {
    /// Geometry mapped into frame coordinates.
    pub fn frame_geometry(&self) -> Geometry {
        self.geometry.transformed(&self.transform)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Frame {
    pub index: FrameIndex,
    /// Scene clock in seconds.
    pub time: f64,
    pub background: Color,
    pub items: Vec<DisplayItem>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, node: NodeId) -> Option<&DisplayItem> {
        self.items.iter().find(|i| i.node == node)
    }
}

fn view_bounds(view: &Affine3, b: &Bounds) -> Option<Bounds> {
    let corners = (0..8).map(|k| {
        let pick = |bit: usize, lo: f64, hi: f64| if k & bit == 0 { lo } else { hi };
        view.apply(Vec3::new(
            pick(1, b.min.x, b.max.x),
            pick(2, b.min.y, b.max.y),
            pick(4, b.min.z, b.max.z),
        ))
    });
    Bounds::from_points(corners)
}

/// Walk the attached graph in draw order and collect visible leaves.
pub fn emit(
    graph: &SceneGraph,
    camera: &Camera,
    index: FrameIndex,
    time: f64,
    background: Color,
) -> Frame {
    let view = camera.view();
    let mut items = Vec::new();
    let mut stack = vec![(NodeId::ROOT, view)];
    while let Some((id, parent)) = stack.pop() {
        let Ok(node) = graph.node(id) else {
            continue;
        };
        let transform = parent * *node.transform();
        if let Some(geometry) = node.geometry() {
            let style = node.style().resolved();
            if style.is_visible() {
                items.push(DisplayItem {
                    node: id,
                    kind: node.kind(),
                    transform,
                    geometry: geometry.clone(),
                    style,
                    z_index: node.z_index(),
                    clip: graph
                        .effective_clip(id)
                        .and_then(|c| view_bounds(&view, &c)),
                });
            }
        }
        for child in graph.draw_order(id).into_iter().rev() {
            stack.push((child, transform));
        }
    }
    Frame {
        index,
        time,
        background,
        items,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
