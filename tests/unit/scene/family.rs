use super::*;

use std::f64::consts::FRAC_PI_2;

use crate::foundation::color::palette;
use crate::foundation::math::{OUT, RIGHT, UP};
use crate::mobject::builder::Mobject;
use crate::scene::ops::{MobjectOp, apply};

#[test]
fn interpolation_hits_both_ends() {
    let a = Affine3::IDENTITY;
    let b = Affine3::translate(RIGHT * 3.0) * Affine3::scale(2.0);
    assert_eq!(interpolate_transform(&a, &b, Vec3::ZERO, 0.0), a);
    assert_eq!(interpolate_transform(&a, &b, Vec3::ZERO, 1.0), b);
    let mid = interpolate_transform(&a, &b, Vec3::ZERO, 0.5);
    assert!(mid.apply(Vec3::ZERO).distance(RIGHT * 1.5) < 1e-12);
    assert!((mid.uniform_scale() - 1.5).abs() < 1e-12);
}

#[test]
fn rotation_follows_the_arc() {
    let a = Affine3::IDENTITY;
    let b = Affine3::rotate(FRAC_PI_2, OUT);
    let mid = interpolate_transform(&a, &b, Vec3::ZERO, 0.5);
    let p = mid.apply(RIGHT);
    assert!((p.length() - 1.0).abs() < 1e-9);
    assert!((p.y.atan2(p.x) - FRAC_PI_2 / 2.0).abs() < 1e-9);
}

#[test]
fn pivot_moves_linearly_under_scale() {
    let pivot = Vec3::xy(1.0, 1.0);
    let a = Affine3::IDENTITY;
    let b = Affine3::scale_about(3.0, pivot);
    for t in [0.25, 0.5, 0.75] {
        let m = interpolate_transform(&a, &b, pivot, t);
        assert!(m.apply(pivot).distance(pivot) < 1e-12);
    }
}

#[test]
fn derive_tracks_leaves_the_graph_untouched() {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::group([Mobject::square(1.0), Mobject::circle(0.5)]));
    g.attach(NodeId::ROOT, id).unwrap();
    let before = g.states(&g.family(id));
    let tracks = derive_tracks(&mut g, &[id], false, |g| {
        apply(g, &[id], &MobjectOp::Shift(UP))
    })
    .unwrap();
    assert_eq!(g.states(&g.family(id)), before);
    // The shift lands on the root only.
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, id);

    tracks[0].apply(&mut g, 1.0);
    assert!(g.bounds(id).unwrap().center().distance(UP) < 1e-12);
}

#[test]
fn failed_mutation_restores_entry_state() {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::square(1.0));
    let before = g.state(id);
    let err = derive_tracks(&mut g, &[id], false, |g| {
        apply(g, &[id], &MobjectOp::Shift(UP))?;
        apply(g, &[id], &MobjectOp::Restore)
    });
    assert!(err.is_err());
    assert_eq!(g.state(id), before);
}

#[test]
fn reverse_tracks_end_at_the_current_state() {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::square(1.0).with_fill(palette::BLUE, 1.0));
    let tracks = derive_tracks(&mut g, &[id], true, |g| {
        g.node_data_mut(id)?.style.fill_opacity = 0.0;
        Ok(Vec::new())
    })
    .unwrap();
    assert_eq!(tracks[0].start.style.fill_opacity, 0.0);
    assert_eq!(tracks[0].end.style.fill_opacity, 1.0);
    tracks[0].apply(&mut g, 0.25);
    assert!((g.node(id).unwrap().style().fill_opacity - 0.25).abs() < 1e-12);
}

#[test]
fn incompatible_kinds_cross_fade() {
    let mut g = SceneGraph::default();
    let id = g.insert(Mobject::square(1.0));
    let start = g.state(id);
    let image = crate::assets::image::MemoryImageLoader::new();
    image.insert_solid("px", 1, 1, [255, 0, 0, 255]).unwrap();
    let handle = crate::assets::image::ImageLoader::load(&image, "px").unwrap();
    let end = NodeState {
        geometry: Some(Geometry::Image(crate::mobject::geometry::ImageGeom::centered(
            handle, 1.0,
        ))),
        kind: ObjectKind::Image,
        ..start.clone()
    };
    let track = NodeTrack::new(&g, id, start, end);
    track.apply(&mut g, 0.25);
    let n = g.node(id).unwrap();
    assert_eq!(n.kind(), ObjectKind::Polygon);
    assert!(n.style().stroke_opacity < 1.0);
    track.apply(&mut g, 0.75);
    assert_eq!(g.node(id).unwrap().kind(), ObjectKind::Image);
}

#[test]
fn world_leaves_are_in_pre_order() {
    let mut g = SceneGraph::default();
    let id = g.insert(
        Mobject::group([
            Mobject::square(1.0),
            Mobject::group([Mobject::circle(1.0), Mobject::square(2.0)]),
        ])
        .shifted(RIGHT),
    );
    let leaves = world_leaves(&g, id);
    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[1].kind, ObjectKind::FilledPath);
    let b = leaves[2].geometry.bounds().unwrap();
    assert!(b.center().distance(RIGHT) < 1e-12);
}
