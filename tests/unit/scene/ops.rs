use super::*;

use crate::foundation::color::palette;
use crate::foundation::math::{DOWN, RIGHT, UP};
use crate::mobject::builder::Mobject;

fn scene_with(ms: impl IntoIterator<Item = Mobject>) -> (SceneGraph, Vec<NodeId>) {
    let mut g = SceneGraph::default();
    let ids = ms
        .into_iter()
        .map(|m| {
            let id = g.insert(m);
            g.attach(NodeId::ROOT, id).unwrap();
            id
        })
        .collect();
    (g, ids)
}

fn center(g: &SceneGraph, id: NodeId) -> Vec3 {
    g.bounds(id).unwrap().center()
}

#[test]
fn move_to_centers_the_selection() {
    let (mut g, ids) = scene_with([Mobject::square(1.0), Mobject::square(1.0).shifted(RIGHT * 2.0)]);
    apply(&mut g, &ids, &MobjectOp::MoveTo(UP)).unwrap();
    let b = g.selection_bounds(&ids).unwrap();
    assert!(b.center().distance(UP) < 1e-12);
    assert!((center(&g, ids[1]).x - center(&g, ids[0]).x - 2.0).abs() < 1e-12);
}

#[test]
fn set_width_scales_uniformly_about_the_center() {
    let (mut g, ids) = scene_with([Mobject::rectangle(2.0, 1.0).shifted(RIGHT)]);
    apply(&mut g, &ids, &MobjectOp::SetWidth(4.0)).unwrap();
    let b = g.bounds(ids[0]).unwrap();
    assert!((b.width() - 4.0).abs() < 1e-12);
    assert!((b.height() - 2.0).abs() < 1e-12);
    assert!(b.center().distance(RIGHT) < 1e-12);
}

#[test]
fn zero_width_resize_is_skipped() {
    let (mut g, ids) = scene_with([Mobject::line(Vec3::ZERO, UP)]);
    apply(&mut g, &ids, &MobjectOp::SetWidth(3.0)).unwrap();
    assert!(g.bounds(ids[0]).unwrap().width().abs() < 1e-12);
}

#[test]
fn next_to_leaves_a_buffer() {
    let (mut g, ids) = scene_with([Mobject::square(1.0), Mobject::square(1.0).shifted(RIGHT * 5.0)]);
    let op = MobjectOp::NextTo {
        target: Selection::from(ids[0]),
        direction: DOWN,
        buff: 0.25,
    };
    apply(&mut g, &ids[1..], &op).unwrap();
    let (a, b) = (g.bounds(ids[0]).unwrap(), g.bounds(ids[1]).unwrap());
    assert!((a.min.y - b.max.y - 0.25).abs() < 1e-12);
    assert!((b.center().x - a.center().x).abs() < 1e-12);
}

#[test]
fn align_to_moves_only_the_named_axis() {
    let (mut g, ids) = scene_with([
        Mobject::square(2.0),
        Mobject::square(1.0).shifted(Vec3::xy(3.0, 3.0)),
    ]);
    let op = MobjectOp::AlignTo {
        target: Selection::from(ids[0]),
        direction: UP,
    };
    apply(&mut g, &ids[1..], &op).unwrap();
    let b = g.bounds(ids[1]).unwrap();
    assert!((b.max.y - 1.0).abs() < 1e-12);
    assert!((b.center().x - 3.0).abs() < 1e-12);
}

#[test]
fn to_edge_respects_the_frame() {
    let (mut g, ids) = scene_with([Mobject::square(1.0)]);
    apply(&mut g, &ids, &MobjectOp::ToEdge { edge: RIGHT, buff: 0.5 }).unwrap();
    let b = g.bounds(ids[0]).unwrap();
    assert!((b.max.x - (g.dims().half_width - 0.5)).abs() < 1e-12);
    assert!(b.center().y.abs() < 1e-12);
}

#[test]
fn style_edits_reach_the_whole_family() {
    let (mut g, ids) = scene_with([Mobject::group([Mobject::square(1.0), Mobject::circle(1.0)])]);
    apply(&mut g, &ids, &MobjectOp::Style(StyleEdit::color(palette::RED))).unwrap();
    for id in g.leaves(ids[0]) {
        assert_eq!(g.node(id).unwrap().style().stroke_color, palette::RED);
    }
}

#[test]
fn single_target_ops_reject_selections() {
    let (g, ids) = scene_with([Mobject::square(1.0), Mobject::square(1.0)]);
    let op = MobjectOp::SetPoints {
        points: vec![Vec3::ZERO, UP],
        smooth: false,
    };
    assert!(matches!(op.validate(&g, &ids), Err(ChoreoError::Validation(_))));
    assert!(op.validate(&g, &ids[..1]).is_ok());
    assert!(matches!(
        MobjectOp::Become(NodeId(42)).validate(&g, &ids[..1]),
        Err(ChoreoError::UnknownTarget(_))
    ));
}

#[test]
fn set_points_works_in_world_space() {
    let (mut g, ids) = scene_with([Mobject::line(Vec3::ZERO, RIGHT).shifted(UP)]);
    let op = MobjectOp::SetPoints {
        points: vec![Vec3::ZERO, RIGHT * 2.0, Vec3::xy(2.0, 2.0)],
        smooth: false,
    };
    apply(&mut g, &ids, &op).unwrap();
    let b = g.bounds(ids[0]).unwrap();
    assert!(b.min.distance(Vec3::ZERO) < 1e-12);
    assert!(b.max.distance(Vec3::xy(2.0, 2.0)) < 1e-12);
}
