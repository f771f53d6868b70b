use super::*;

use crate::foundation::color::palette;
use crate::foundation::math::{RIGHT, UP};

#[test]
fn tween_records_calls_in_order() {
    let t = animate(NodeId(3))
        .shift(RIGHT)
        .scale(2.0)
        .set_color(palette::RED);
    assert_eq!(t.target, Selection::from(NodeId(3)));
    assert_eq!(t.ops.len(), 3);
    assert_eq!(t.ops[0], MobjectOp::Shift(RIGHT));
    assert!(matches!(t.ops[1], MobjectOp::Scale { factor, about: None } if factor == 2.0));
    assert_eq!(t.ops[2], MobjectOp::Style(StyleEdit::color(palette::RED)));
}

#[test]
fn only_become_needs_a_bake() {
    assert!(!animate(NodeId(1)).shift(UP).needs_bake());
    assert!(animate(NodeId(1)).shift(UP).become_(NodeId(2)).needs_bake());
}

#[test]
fn camera_tween_counts_restores() {
    let t = animate_camera().scale(0.5).restore().shift(UP).restore();
    assert_eq!(t.restores(), 2);
    assert_eq!(t.ops[0], CameraOp::Scale(0.5));
}

#[test]
fn tracker_end_value_replays_ops() {
    let t = animate_tracker(TrackerId(0))
        .increment_value(2.0)
        .set_value(10.0)
        .increment_value(-3.0);
    assert_eq!(t.end_value(100.0), 7.0);
    assert_eq!(animate_tracker(TrackerId(0)).end_value(1.5), 1.5);
}
