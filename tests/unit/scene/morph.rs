use super::*;

use crate::foundation::color::palette;
use crate::foundation::math::{RIGHT, UP};
use crate::mobject::builder::Mobject;

fn attached(g: &mut SceneGraph, m: Mobject) -> NodeId {
    let id = g.insert(m);
    g.attach(NodeId::ROOT, id).unwrap();
    id
}

fn assert_same_bounds(g: &SceneGraph, a: NodeId, b: NodeId) {
    let (a, b) = (g.bounds(a).unwrap(), g.bounds(b).unwrap());
    assert!(a.min.distance(b.min) < 1e-9 && a.max.distance(b.max) < 1e-9);
}

#[test]
fn become_takes_world_geometry_and_style() {
    let mut g = SceneGraph::default();
    let target = attached(&mut g, Mobject::circle(1.0));
    let source = attached(&mut g, Mobject::square(1.0).shifted(RIGHT * 3.0).with_color(palette::GREEN));
    let births = bind_become(&mut g, target, source).unwrap();
    assert!(births.is_empty());
    assert_same_bounds(&g, target, source);
    assert_eq!(g.node(target).unwrap().style().stroke_color, palette::GREEN);
    assert!(g.node(target).unwrap().parent() == Some(NodeId::ROOT));
}

#[test]
fn surplus_source_leaves_are_born_collapsed() {
    let mut g = SceneGraph::default();
    let target = attached(&mut g, Mobject::square(1.0));
    let source = attached(
        &mut g,
        Mobject::group([
            Mobject::square(1.0),
            Mobject::square(1.0).shifted(UP * 2.0),
            Mobject::square(1.0).shifted(UP * 4.0),
        ]),
    );
    let births = bind_become(&mut g, target, source).unwrap();
    assert_eq!(births.len(), 2);
    for (id, birth) in &births {
        assert_eq!(g.node(*id).unwrap().parent(), Some(target));
        assert_eq!(birth.style.stroke_opacity, 0.0);
        let b = birth.geometry.as_ref().unwrap().bounds().unwrap();
        assert!(b.width() < 1e-12 && b.height() < 1e-12);
    }
    assert_eq!(g.leaves(target).len(), 3);
    assert_same_bounds(&g, target, source);
}

#[test]
fn surplus_target_leaves_fade_out() {
    let mut g = SceneGraph::default();
    let target = attached(
        &mut g,
        Mobject::group([Mobject::circle(1.0), Mobject::circle(0.5).shifted(RIGHT)]),
    );
    let source = attached(&mut g, Mobject::square(2.0));
    bind_become(&mut g, target, source).unwrap();
    let leaves = g.leaves(target);
    let last = g.node(leaves[1]).unwrap();
    assert_eq!(last.style().stroke_opacity, 0.0);
    assert_same_bounds(&g, target, source);
}

#[test]
fn become_respects_a_transformed_parent() {
    let mut g = SceneGraph::default();
    let parent = attached(&mut g, Mobject::group([Mobject::circle(1.0)]).shifted(UP));
    g.node_mut(parent).unwrap().scale(2.0);
    let target = g.node(parent).unwrap().children()[0];
    let source = attached(&mut g, Mobject::square(1.0).shifted(RIGHT * 4.0));
    bind_become(&mut g, target, source).unwrap();
    assert_same_bounds(&g, target, source);
}

#[test]
fn selections_bind_root_by_root_without_regrouping() {
    let mut g = SceneGraph::default();
    let holder = attached(
        &mut g,
        Mobject::group([Mobject::square(1.0), Mobject::square(1.0), Mobject::square(1.0)]),
    );
    let kids = g.node(holder).unwrap().children().to_vec();
    let far = attached(
        &mut g,
        Mobject::group([
            Mobject::circle(0.5).shifted(UP * 3.0),
            Mobject::circle(0.5).shifted(UP * 3.0 + RIGHT * 2.0),
        ]),
    );
    let shapes = g.node(far).unwrap().children().to_vec();

    let births = bind_selection(&mut g, &kids[..2], &shapes).unwrap();
    assert!(births.is_empty());
    assert_same_bounds(&g, kids[0], shapes[0]);
    assert_same_bounds(&g, kids[1], shapes[1]);
    assert_eq!(g.node(holder).unwrap().children(), kids.as_slice());
    assert_eq!(g.node(far).unwrap().children(), shapes.as_slice());
    g.check_integrity().unwrap();
}

#[test]
fn selection_births_land_under_the_last_root() {
    let mut g = SceneGraph::default();
    let a = attached(&mut g, Mobject::square(1.0));
    let b = attached(&mut g, Mobject::square(1.0).shifted(RIGHT * 2.0));
    let sources: Vec<NodeId> = (0..3)
        .map(|i| attached(&mut g, Mobject::circle(0.5).shifted(UP * i as f64)))
        .collect();
    let births = bind_selection(&mut g, &[a, b], &sources).unwrap();
    assert_eq!(births.len(), 1);
    assert_eq!(g.node(births[0].0).unwrap().parent(), Some(b));
    assert!(g.node(a).unwrap().children().is_empty());
}
