use super::*;

use crate::foundation::color::palette;
use crate::foundation::math::{RIGHT, UP};
use crate::mobject::builder::Mobject;

fn square_at(x: f64) -> Mobject {
    Mobject::square(1.0).shifted(RIGHT * x)
}

fn attached(g: &mut SceneGraph, m: Mobject) -> NodeId {
    let id = g.insert(m);
    g.attach(NodeId::ROOT, id).unwrap();
    id
}

#[test]
fn insert_keeps_nodes_detached_until_attached() {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::group([square_at(0.0), square_at(2.0)]));
    assert_eq!(g.len(), 4);
    assert!(!g.is_attached(id));
    g.attach(NodeId::ROOT, id).unwrap();
    assert!(g.is_attached(g.node(id).unwrap().children()[1]));
    g.check_integrity().unwrap();
}

#[test]
fn attach_rejects_cycles() {
    let mut g = SceneGraph::default();
    let outer = attached(&mut g, Mobject::group([square_at(0.0)]));
    let inner = g.node(outer).unwrap().children()[0];
    assert!(g.attach(inner, outer).is_err());
    assert!(g.attach(outer, outer).is_err());
    assert!(g.attach(inner, NodeId::ROOT).is_err());
    g.check_integrity().unwrap();
}

#[test]
fn attach_at_clamps_the_index() {
    let mut g = SceneGraph::default();
    let a = attached(&mut g, square_at(0.0));
    let b = attached(&mut g, square_at(1.0));
    let c = g.insert(square_at(2.0));
    g.attach_at(NodeId::ROOT, c, 0).unwrap();
    assert_eq!(g.node(NodeId::ROOT).unwrap().children(), &[c, a, b]);
    g.attach_at(NodeId::ROOT, c, 99).unwrap();
    assert_eq!(g.node(NodeId::ROOT).unwrap().children(), &[a, b, c]);
}

#[test]
fn replace_takes_over_the_slot() {
    let mut g = SceneGraph::default();
    let a = attached(&mut g, square_at(0.0));
    let b = attached(&mut g, square_at(1.0));
    let c = g.insert(square_at(2.0));
    g.replace(a, c).unwrap();
    assert_eq!(g.node(NodeId::ROOT).unwrap().children(), &[c, b]);
    assert!(!g.is_attached(a));

    let loose = g.insert(square_at(3.0));
    assert!(matches!(
        g.replace(loose, a),
        Err(ChoreoError::UnknownTarget(_))
    ));
    g.check_integrity().unwrap();
}

#[test]
fn deep_copy_uses_fresh_ids() {
    let mut g = SceneGraph::default();
    let src = attached(&mut g, Mobject::group([square_at(0.0), square_at(1.0)]));
    let copy = g.deep_copy(src).unwrap();
    assert!(!g.is_attached(copy));
    let (fa, fb) = (g.family(src), g.family(copy));
    assert_eq!(fa.len(), fb.len());
    assert!(fa.iter().all(|id| !fb.contains(id)));
    assert_eq!(g.bounds(src), g.bounds(copy));
}

#[test]
fn world_transform_composes_parents() {
    let mut g = SceneGraph::default();
    let parent = attached(&mut g, Mobject::group([square_at(1.0)]).shifted(UP));
    let child = g.node(parent).unwrap().children()[0];
    g.node_mut(parent).unwrap().scale_about(2.0, Vec3::ZERO);
    let c = g.bounds(child).unwrap().center();
    assert!((c.x - 2.0).abs() < 1e-12);
    assert!((c.y - 2.0).abs() < 1e-12);
}

#[test]
fn bake_family_preserves_world_geometry() {
    let mut g = SceneGraph::default();
    let parent = attached(&mut g, Mobject::group([square_at(1.0), square_at(-1.0)]));
    g.node_mut(parent).unwrap().rotate(0.7).shift(UP * 0.5);
    let before = g.bounds(parent).unwrap();
    g.bake_family(parent);
    let after = g.bounds(parent).unwrap();
    assert!(before.min.distance(after.min) < 1e-9);
    assert!(before.max.distance(after.max) < 1e-9);
    assert!(g.family(parent).iter().all(|id| g.node(*id).unwrap().transform().is_identity()));
}

#[test]
fn draw_order_sorts_by_depth_then_z_index() {
    let mut g = SceneGraph::default();
    let a = attached(&mut g, square_at(0.0).with_z_index(2));
    let b = attached(&mut g, square_at(0.0));
    let c = attached(&mut g, square_at(0.0).shifted(Vec3::new(0.0, 0.0, -1.0)));
    assert_eq!(g.draw_order(NodeId::ROOT), vec![c, b, a]);
}

#[test]
fn nested_clips_intersect() {
    let mut g = SceneGraph::default();
    let outer = attached(&mut g, Mobject::group([square_at(0.0)]));
    let inner = g.node(outer).unwrap().children()[0];
    g.node_mut(outer)
        .unwrap()
        .set_clip(Some(Bounds::from_points([Vec3::xy(-2.0, -2.0), Vec3::xy(1.0, 1.0)]).unwrap()));
    g.node_mut(inner)
        .unwrap()
        .set_clip(Some(Bounds::from_points([Vec3::xy(0.0, 0.0), Vec3::xy(3.0, 3.0)]).unwrap()));
    let clip = g.effective_clip(inner).unwrap();
    assert_eq!(clip.min, Vec3::xy(0.0, 0.0));
    assert_eq!(clip.max, Vec3::xy(1.0, 1.0));
}

#[test]
fn node_ref_reports_selection_geometry() {
    let mut g = SceneGraph::default();
    let a = attached(&mut g, square_at(-2.0));
    let b = attached(&mut g, square_at(2.0));
    let view = g.node_ref([a, b]).unwrap();
    assert!(view.center().length() < 1e-12);
    assert!((view.width() - 5.0).abs() < 1e-12);
    assert!(g.node_ref(NodeId(77)).is_err());
}

#[test]
fn save_and_restore_family() {
    let mut g = SceneGraph::default();
    let id = attached(&mut g, Mobject::group([square_at(0.0)]));
    g.node_mut(id).unwrap().save_state();
    g.node_mut(id).unwrap().shift(RIGHT * 3.0).set_color(palette::RED);
    g.node_mut(id).unwrap().restore().unwrap();
    assert!(g.node_ref(id).unwrap().center().length() < 1e-12);
    assert!(g.node(id).unwrap().has_saved_state());
}

#[test]
fn restore_without_save_fails() {
    let mut g = SceneGraph::default();
    let id = attached(&mut g, square_at(0.0));
    assert!(g.node_mut(id).unwrap().restore().is_err());
}

#[test]
fn integrity_catches_dangling_links() {
    let mut g = SceneGraph::default();
    let id = attached(&mut g, square_at(0.0));
    g.node_data_mut(id).unwrap().parent = None;
    assert!(g.check_integrity().is_err());
}

#[test]
fn point_from_proportion_walks_the_world_path() {
    let mut g = SceneGraph::default();
    let line = attached(&mut g, Mobject::line(Vec3::ZERO, RIGHT * 4.0));
    g.node_mut(line).unwrap().shift(UP);
    let view = g.node_ref(line).unwrap();
    let mid = view.point_from_proportion(0.25).unwrap();
    assert!(mid.distance(Vec3::xy(1.0, 1.0)) < 1e-9);

    let empty = attached(&mut g, Mobject::group([]));
    assert!(g.node_ref(empty).unwrap().point_from_proportion(0.5).is_none());
}

#[test]
fn released_families_free_their_slots() {
    let mut g = SceneGraph::default();
    let keep = attached(&mut g, square_at(0.0));
    let gone = attached(&mut g, Mobject::group([square_at(1.0), square_at(2.0)]));
    let kid = g.node(gone).unwrap().children()[0];
    assert_eq!(g.len(), 5);
    g.release(gone);
    assert_eq!(g.len(), 2);
    assert!(!g.contains(gone) && !g.contains(kid));
    assert!(g.node(kid).is_err());
    assert_eq!(g.node(NodeId::ROOT).unwrap().children(), &[keep]);
    g.check_integrity().unwrap();

    let again = attached(&mut g, Mobject::group([square_at(3.0), square_at(4.0)]));
    assert_eq!(g.len(), 5);
    assert!(again.index() < 5);
    g.release(NodeId::ROOT);
    assert!(g.contains(NodeId::ROOT));
    g.check_integrity().unwrap();
}
