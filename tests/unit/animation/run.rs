use super::*;

use crate::animation::anim::FlashAroundParams;
use crate::animation::tween::{animate, animate_camera, animate_tracker};
use crate::foundation::color::palette;
use crate::foundation::math::{RIGHT, UP};

struct Harness {
    graph: SceneGraph,
    camera: Camera,
    trackers: TrackerStore,
}

impl Harness {
    fn new() -> Self {
        Self {
            graph: SceneGraph::default(),
            camera: Camera::new(16.0, 9.0),
            trackers: TrackerStore::default(),
        }
    }

    fn add(&mut self, m: Mobject) -> NodeId {
        let id = self.graph.insert(m);
        self.graph.attach(NodeId::ROOT, id).unwrap();
        id
    }

    fn stage(&mut self) -> Stage<'_> {
        Stage {
            graph: &mut self.graph,
            camera: &mut self.camera,
            trackers: &mut self.trackers,
        }
    }

    fn segment(&mut self, anims: Vec<Animation>) -> Segment {
        build_segment(anims, None, &mut self.stage()).unwrap()
    }

    fn at(&mut self, seg: &mut Segment, t: f64) {
        seg.apply_at(&mut self.stage(), t);
    }

    fn finish(&mut self, seg: Segment) {
        seg.finish(&mut self.stage()).unwrap();
    }

    fn center(&self, id: NodeId) -> Vec3 {
        self.graph.bounds(id).unwrap().center()
    }
}

fn path_fraction(g: &SceneGraph, id: NodeId) -> f64 {
    match g.node(id).unwrap().geometry() {
        Some(Geometry::Path(p)) => p.arc_length(),
        _ => 0.0,
    }
}

#[test]
fn sub_alpha_spreads_starts() {
    assert_eq!(sub_alpha(0.0, 0, 3, 0.5), 0.0);
    assert_eq!(sub_alpha(1.0, 2, 3, 0.5), 1.0);
    // full span = 2: leaf 1 starts at alpha 0.25
    assert!((sub_alpha(0.5, 1, 3, 0.5) - 0.5).abs() < 1e-12);
    assert_eq!(sub_alpha(0.2, 1, 3, 0.5), 0.0);
    assert_eq!(sub_alpha(0.3, 0, 1, 0.0), 0.3);
}

#[test]
fn begin_leaves_the_scene_unchanged() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0));
    let before = h.graph.states(&[a]);
    let _seg = h.segment(vec![
        animate(a).shift(RIGHT * 2.0).into(),
        Animation::indicate(a),
    ]);
    assert_eq!(h.graph.states(&[a]), before);
}

#[test]
fn tween_interpolates_and_lands() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0));
    let mut seg = h.segment(vec![animate(a).shift(RIGHT * 2.0).ease(Ease::Linear).into()]);
    h.at(&mut seg, 0.25);
    assert!((h.center(a).x - 0.5).abs() < 1e-12);
    h.at(&mut seg, 1.0);
    assert!((h.center(a).x - 2.0).abs() < 1e-12);
    h.finish(seg);
}

#[test]
fn fade_out_removes_and_restores() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0).with_fill(palette::BLUE, 1.0));
    let mut seg = h.segment(vec![Animation::fade_out_shift(a, UP)]);
    h.at(&mut seg, 0.5);
    assert!((h.graph.node(a).unwrap().style().fill_opacity - 0.5).abs() < 1e-12);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    assert!(!h.graph.is_attached(a));
    assert_eq!(h.graph.node(a).unwrap().style().fill_opacity, 1.0);
    assert!(h.center(a).length() < 1e-12);
}

#[test]
fn fade_in_adds_detached_targets() {
    let mut h = Harness::new();
    let a = h.graph.insert(Mobject::square(1.0));
    let mut seg = h.segment(vec![Animation::fade_in(a)]);
    assert!(h.graph.is_attached(a));
    h.at(&mut seg, 0.0);
    assert_eq!(h.graph.node(a).unwrap().style().stroke_opacity, 0.0);
}

#[test]
fn create_grows_the_outline() {
    let mut h = Harness::new();
    let a = h.add(Mobject::line(Vec3::ZERO, RIGHT * 4.0));
    let mut seg = h.segment(vec![Animation::create(a).ease(Ease::Linear)]);
    h.at(&mut seg, 0.5);
    assert!((path_fraction(&h.graph, a) - 2.0).abs() < 1e-6);
    h.at(&mut seg, 1.0);
    assert!((path_fraction(&h.graph, a) - 4.0).abs() < 1e-6);
}

#[test]
fn uncreate_detaches_at_the_end() {
    let mut h = Harness::new();
    let a = h.add(Mobject::line(Vec3::ZERO, RIGHT * 4.0));
    let mut seg = h.segment(vec![Animation::uncreate(a)]);
    h.at(&mut seg, 1.0);
    assert!(path_fraction(&h.graph, a) < 1e-9);
    h.finish(seg);
    assert!(!h.graph.is_attached(a));
    assert!((path_fraction(&h.graph, a) - 4.0).abs() < 1e-6);
}

#[test]
fn write_draws_outline_then_fills() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0).with_fill(palette::WHITE, 1.0));
    let mut seg = h.segment(vec![Animation::write(a).ease(Ease::Linear)]);
    h.at(&mut seg, 0.25);
    assert_eq!(h.graph.node(a).unwrap().style().fill_opacity, 0.0);
    h.at(&mut seg, 1.0);
    assert_eq!(h.graph.node(a).unwrap().style().fill_opacity, 1.0);
}

#[test]
fn grow_from_center_starts_collapsed() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(2.0).shifted(RIGHT));
    let mut seg = h.segment(vec![Animation::grow_from_center(a)]);
    h.at(&mut seg, 0.0);
    let b = h.graph.bounds(a).unwrap();
    assert!(b.width() < 1e-12);
    assert!(b.center().distance(RIGHT) < 1e-12);
    h.at(&mut seg, 1.0);
    assert!((h.graph.bounds(a).unwrap().width() - 2.0).abs() < 1e-12);
}

#[test]
fn replacement_transform_swaps_nodes() {
    let mut h = Harness::new();
    let a = h.add(Mobject::circle(1.0));
    let b = h.graph.insert(Mobject::square(1.0).shifted(RIGHT * 3.0));
    let mut seg = h.segment(vec![Animation::replacement_transform(a, b)]);
    h.at(&mut seg, 1.0);
    assert!((h.center(a).x - 3.0).abs() < 1e-9);
    h.finish(seg);
    assert!(!h.graph.is_attached(a));
    assert!(h.graph.is_attached(b));
    assert!((h.center(b).x - 3.0).abs() < 1e-9);
    h.graph.check_integrity().unwrap();
}

#[test]
fn transform_from_copy_keeps_the_source() {
    let mut h = Harness::new();
    let a = h.add(Mobject::circle(1.0));
    let b = h.graph.insert(Mobject::square(1.0).shifted(RIGHT * 3.0));
    let before = h.graph.len();
    let mut seg = h.segment(vec![Animation::transform_from_copy(a, b)]);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    assert!(h.center(a).length() < 1e-9);
    assert_eq!(h.graph.node(NodeId::ROOT).unwrap().children().len(), 2);
    assert!(h.graph.len() > before);
}

#[test]
fn move_along_path_follows_arc_length() {
    let mut h = Harness::new();
    let dot = h.add(Mobject::dot(Vec3::ZERO));
    let path = h.add(Mobject::line(Vec3::ZERO, RIGHT * 4.0));
    let mut seg = h.segment(vec![Animation::move_along_path(dot, path).ease(Ease::Linear)]);
    h.at(&mut seg, 0.75);
    assert!(h.center(dot).distance(RIGHT * 3.0) < 1e-6);
}

#[test]
fn flash_lines_are_ephemeral() {
    let mut h = Harness::new();
    let mut seg = h.segment(vec![Animation::flash(Vec3::ZERO, palette::YELLOW)]);
    assert_eq!(h.graph.node(NodeId::ROOT).unwrap().children().len(), 1);
    h.at(&mut seg, 0.5);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    assert!(h.graph.node(NodeId::ROOT).unwrap().children().is_empty());
}

#[test]
fn flash_around_lights_a_time_width_window_then_goes() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(2.0));
    let params = FlashAroundParams {
        time_width: 0.3,
        buff: 0.0,
        ..FlashAroundParams::default()
    };
    let mut seg = h.segment(vec![Animation::flash_around_with(a, params).ease(Ease::Linear)]);
    let kids = h.graph.node(NodeId::ROOT).unwrap().children().to_vec();
    assert_eq!(kids.len(), 2);
    let outline = kids[1];

    h.at(&mut seg, 0.0);
    assert!(path_fraction(&h.graph, outline) < 1e-9);
    h.at(&mut seg, 0.5);
    // perimeter 8, window [0.35, 0.65]
    assert!((path_fraction(&h.graph, outline) - 0.3 * 8.0).abs() < 1e-6);
    h.at(&mut seg, 1.0);
    assert!(path_fraction(&h.graph, outline) < 1e-9);

    h.finish(seg);
    assert_eq!(h.graph.node(NodeId::ROOT).unwrap().children(), &[a]);
    assert!(!h.graph.contains(outline));
    assert_eq!(h.graph.len(), 2);
}

#[test]
fn repeated_flashes_reuse_their_slots() {
    let mut h = Harness::new();
    for _ in 0..5 {
        let mut seg = h.segment(vec![Animation::flash(Vec3::ZERO, palette::YELLOW)]);
        h.at(&mut seg, 1.0);
        h.finish(seg);
        assert_eq!(h.graph.len(), 1);
    }
    h.graph.check_integrity().unwrap();
}

#[test]
fn transform_between_slices_leaves_parents_whole() {
    let mut h = Harness::new();
    let row = |y: f64| Mobject::group((0..3).map(|i| Mobject::square(0.5).shifted(RIGHT * i as f64 + UP * y)));
    let a = h.add(row(0.0));
    let b = h.graph.insert(row(2.0));
    let a_kids = h.graph.node(a).unwrap().children().to_vec();
    let b_kids = h.graph.node(b).unwrap().children().to_vec();

    let mut seg = h.segment(vec![Animation::transform(&a_kids[..2], &b_kids[1..])]);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    assert_eq!(h.graph.node(a).unwrap().children(), a_kids.as_slice());
    assert_eq!(h.graph.node(b).unwrap().children(), b_kids.as_slice());
    assert_eq!(h.graph.node(NodeId::ROOT).unwrap().children(), &[a]);
    assert!(h.center(a_kids[0]).distance(h.center(b_kids[1])) < 1e-9);
    assert!(h.center(a_kids[1]).distance(h.center(b_kids[2])) < 1e-9);
    h.graph.check_integrity().unwrap();
}

#[test]
fn replacement_between_slices_swaps_slots_in_place() {
    let mut h = Harness::new();
    let row = |y: f64| Mobject::group((0..3).map(|i| Mobject::square(0.5).shifted(RIGHT * i as f64 + UP * y)));
    let a = h.add(row(0.0));
    let b = h.graph.insert(row(2.0));
    let a_kids = h.graph.node(a).unwrap().children().to_vec();
    let b_kids = h.graph.node(b).unwrap().children().to_vec();

    let mut seg = h.segment(vec![Animation::replacement_transform(&a_kids[..2], &b_kids[..2])]);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    assert_eq!(h.graph.node(a).unwrap().children(), &[b_kids[0], b_kids[1], a_kids[2]]);
    assert!(!h.graph.is_attached(a_kids[0]));
    assert!((h.center(b_kids[1]) - (RIGHT + UP * 2.0)).length() < 1e-9);
    h.graph.check_integrity().unwrap();
}

#[test]
fn transform_from_copy_of_a_slice_adds_loose_copies() {
    let mut h = Harness::new();
    let text = h.add(Mobject::group((0..3).map(|i| Mobject::square(0.5).shifted(RIGHT * i as f64))));
    let target = h.graph.insert(Mobject::circle(1.0).shifted(UP * 3.0));
    let kids = h.graph.node(text).unwrap().children().to_vec();

    let mut seg = h.segment(vec![Animation::transform_from_copy(&kids[1..], target)]);
    h.at(&mut seg, 1.0);
    h.finish(seg);
    let top = h.graph.node(NodeId::ROOT).unwrap().children().to_vec();
    assert_eq!(top.len(), 3);
    assert_eq!(h.graph.node(text).unwrap().children(), kids.as_slice());
    assert!((h.center(kids[2]).x - 2.0).abs() < 1e-9);
    assert!((h.graph.selection_bounds(&top[1..]).unwrap().center() - UP * 3.0).length() < 1e-9);
}

#[test]
fn camera_and_tracker_effects_interpolate() {
    let mut h = Harness::new();
    let t = h.trackers.create(0.0);
    let mut seg = h.segment(vec![
        animate_camera().shift(RIGHT * 4.0).ease(Ease::Linear).into(),
        animate_tracker(t).set_value(10.0).into(),
    ]);
    assert_eq!(h.camera.state().center, Vec3::ZERO);
    h.at(&mut seg, 0.5);
    assert!(h.camera.state().center.distance(RIGHT * 2.0) < 1e-12);
    assert!((h.trackers.value(t) - 5.0).abs() < 1e-12);
}

#[test]
fn lagged_group_offsets_children() {
    let mut h = Harness::new();
    let ids: Vec<NodeId> = (0..3).map(|i| h.add(Mobject::square(0.5).shifted(UP * i as f64))).collect();
    let group = Animation::lagged_start(
        ids.iter()
            .map(|id| Animation::from(animate(*id).shift(RIGHT).ease(Ease::Linear))),
        0.5,
    );
    let mut seg = h.segment(vec![group]);
    assert!((seg.duration - 2.0).abs() < 1e-12);
    h.at(&mut seg, 1.0);
    assert!((h.center(ids[0]).x - 1.0).abs() < 1e-12);
    assert!((h.center(ids[1]).x - 0.5).abs() < 1e-12);
    assert!(h.center(ids[2]).x.abs() < 1e-12);
}

#[test]
fn alpha_funcs_receive_eased_alpha() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0));
    let anim = Animation::update_from_alpha_func(a, |node, alpha| {
        node.move_to(RIGHT * alpha);
    })
    .ease(Ease::Linear);
    let mut seg = h.segment(vec![anim]);
    h.at(&mut seg, 0.3);
    assert!((h.center(a).x - 0.3).abs() < 1e-12);
}

#[test]
fn validate_rejects_bad_batches() {
    let mut h = Harness::new();
    let a = h.add(Mobject::square(1.0));
    let loose = h.graph.insert(Mobject::square(1.0));
    let empty = h.graph.insert(Mobject::group([]));
    let mut restores = 0;
    let check = |anim: Animation, restores: &mut usize| validate(&anim, &h.graph, &h.trackers, restores);

    assert!(check(Animation::fade_in(a).run_time(0.0), &mut restores).is_err());
    assert!(check(Animation::lagged_start([], -1.0), &mut restores).is_err());
    assert!(matches!(
        check(Animation::transform(loose, a), &mut restores),
        Err(ChoreoError::UnknownTarget(_))
    ));
    assert!(check(animate_tracker(TrackerId(4)).set_value(1.0).into(), &mut restores).is_err());
    assert!(check(Animation::move_along_path(a, NodeId(999)), &mut restores).is_err());
    assert!(matches!(
        check(Animation::move_along_path(a, empty), &mut restores),
        Err(ChoreoError::Validation(_))
    ));
    check(animate_camera().restore().into(), &mut restores).unwrap();
    assert_eq!(restores, 1);
}
